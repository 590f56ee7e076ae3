use std::collections::BTreeSet;

use crate::error::CoreResult;
use crate::types::Principal;

/// Directory of known principals, consulted once at startup.
pub trait Directory: Send + Sync {
    /// ## Summary
    /// Lists every principal that may own calendars.
    ///
    /// ## Errors
    /// Returns an error if the directory cannot be read.
    fn principals(&self) -> CoreResult<BTreeSet<Principal>>;
}

//! Payload codec contract.
//!
//! The codec owns every wire body: iCalendar text on PUT and the WebDAV XML
//! of PROPFIND, REPORT and DELETE responses.

use crate::error::CoreResult;
use crate::store::CalendarHandle;
use crate::types::{ConditionalTag, ResourceUrl};

pub trait Codec: Send + Sync {
    /// ## Summary
    /// Clears the calendar if `tag` matches its entity tag, or unconditionally
    /// when `tag` is absent. Returns a response body describing the outcome.
    ///
    /// ## Errors
    /// Returns `CoreError::PreconditionFailed` on tag mismatch, storage errors
    /// otherwise.
    fn delete(
        &self,
        tag: Option<&ConditionalTag>,
        calendar: &dyn CalendarHandle,
        url: &ResourceUrl,
    ) -> CoreResult<String>;

    /// ## Summary
    /// Answers a PROPFIND property query with a multistatus body.
    ///
    /// ## Errors
    /// Returns `CoreError::MalformedBody` for unparsable queries.
    fn propfind(
        &self,
        body: &[u8],
        calendar: &dyn CalendarHandle,
        url: &ResourceUrl,
    ) -> CoreResult<String>;

    /// ## Summary
    /// Stores decoded iCalendar text into the calendar, honoring `tag` like
    /// [`Codec::delete`].
    ///
    /// ## Errors
    /// Returns `CoreError::PreconditionFailed` on tag mismatch and
    /// `CoreError::MalformedBody` for invalid iCalendar text.
    fn put(
        &self,
        text: &str,
        calendar: &dyn CalendarHandle,
        url: &ResourceUrl,
        tag: Option<&ConditionalTag>,
    ) -> CoreResult<()>;

    /// ## Summary
    /// Answers a REPORT query with a multistatus body.
    ///
    /// ## Errors
    /// Returns `CoreError::MalformedBody` for unparsable or unsupported reports.
    fn report(
        &self,
        body: &[u8],
        calendar: &dyn CalendarHandle,
        url: &ResourceUrl,
    ) -> CoreResult<String>;
}

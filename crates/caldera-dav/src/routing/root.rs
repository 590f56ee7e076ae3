use std::collections::{BTreeSet, HashMap};

use caldera_core::directory::Directory;
use caldera_core::error::CoreResult;
use caldera_core::store::CalendarStore;
use caldera_core::types::Principal;

use super::principal::PrincipalRouter;

/// First routing stage: the known principals.
///
/// Built once from immutable snapshots of the principal and calendar sets.
#[derive(Debug, Clone, Default)]
pub struct RootRouter {
    principals: HashMap<Principal, PrincipalRouter>,
}

impl RootRouter {
    #[must_use]
    pub fn new(principals: &BTreeSet<Principal>, calendar_keys: &BTreeSet<String>) -> Self {
        let principals = principals
            .iter()
            .map(|principal| {
                (
                    principal.clone(),
                    PrincipalRouter::new(principal.clone(), calendar_keys),
                )
            })
            .collect();

        Self { principals }
    }

    /// ## Summary
    /// Snapshots the directory's principals and the store's calendar keys
    /// and builds the routing tree from them.
    ///
    /// ## Errors
    /// Returns an error if either collaborator fails to list its entries.
    #[tracing::instrument(skip_all)]
    pub fn load(directory: &dyn Directory, store: &dyn CalendarStore) -> CoreResult<Self> {
        let principals = directory.principals()?;
        let calendar_keys = store.calendar_keys()?;

        tracing::info!(
            principals = principals.len(),
            calendars = calendar_keys.len(),
            "Routing tree loaded"
        );

        Ok(Self::new(&principals, &calendar_keys))
    }

    /// Returns the router of the principal named `segment`, or `None` for an
    /// unknown principal.
    #[must_use]
    pub fn child(&self, segment: &str) -> Option<&PrincipalRouter> {
        self.principals.get(segment)
    }

    pub fn principals(&self) -> impl Iterator<Item = &Principal> {
        self.principals.keys()
    }
}

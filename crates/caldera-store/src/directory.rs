//! Principal directory backed by configuration.

use std::collections::BTreeSet;
use std::sync::Arc;

use caldera_core::config::Settings;
use caldera_core::error::CoreResult;
use caldera_core::directory::Directory;
use caldera_core::store::CalendarStore;
use caldera_core::types::{CalendarRef, Principal};

/// Directory listing the principals named by `acl.principals`, or, when that
/// list is empty, every owner of a stored calendar.
pub struct ConfigDirectory {
    principals: Vec<String>,
    store: Arc<dyn CalendarStore>,
}

impl ConfigDirectory {
    #[must_use]
    pub fn new(principals: Vec<String>, store: Arc<dyn CalendarStore>) -> Self {
        Self { principals, store }
    }

    #[must_use]
    pub fn from_settings(settings: &Settings, store: Arc<dyn CalendarStore>) -> Self {
        Self::new(settings.acl.principals.clone(), store)
    }
}

impl Directory for ConfigDirectory {
    #[tracing::instrument(skip(self))]
    fn principals(&self) -> CoreResult<BTreeSet<Principal>> {
        let configured: BTreeSet<Principal> = self
            .principals
            .iter()
            .map(|name| name.trim())
            .filter(|name| !name.is_empty())
            .map(Principal::from)
            .collect();

        if !configured.is_empty() {
            tracing::debug!(count = configured.len(), "Using configured principals");
            return Ok(configured);
        }

        let owners: BTreeSet<Principal> = self
            .store
            .calendar_keys()?
            .iter()
            .filter_map(|key| CalendarRef::parse_key(key))
            .map(|calendar| calendar.principal().clone())
            .collect();

        tracing::debug!(count = owners.len(), "Using calendar owners as principals");
        Ok(owners)
    }
}

use std::collections::BTreeSet;

use caldera_core::types::{CalendarRef, Principal};

/// Second routing stage: the calendars of one principal.
#[derive(Debug, Clone)]
pub struct PrincipalRouter {
    principal: Principal,
    calendars: BTreeSet<String>,
}

impl PrincipalRouter {
    /// ## Summary
    /// Builds the router of `principal` from the full calendar key set.
    ///
    /// Keeps the keys owned by `principal`; keys that are not exactly
    /// `principal/name` with both parts non-empty are skipped.
    #[must_use]
    pub fn new(principal: Principal, calendar_keys: &BTreeSet<String>) -> Self {
        let calendars = calendar_keys
            .iter()
            .filter_map(|key| CalendarRef::parse_key(key))
            .filter(|calendar| *calendar.principal() == principal)
            .map(|calendar| calendar.name().to_owned())
            .collect::<BTreeSet<_>>();

        tracing::trace!(%principal, calendars = calendars.len(), "Principal router built");

        Self {
            principal,
            calendars,
        }
    }

    #[must_use]
    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    /// Returns the calendar named `segment`, or `None` if the principal owns
    /// no such calendar.
    #[must_use]
    pub fn child(&self, segment: &str) -> Option<CalendarRef> {
        self.calendars
            .contains(segment)
            .then(|| CalendarRef::new(self.principal.clone(), segment))
    }

    /// Names of the calendars owned by the principal.
    pub fn calendars(&self) -> impl Iterator<Item = &str> {
        self.calendars.iter().map(String::as_str)
    }
}

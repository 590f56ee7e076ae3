//! Routing identities shared across crates.

use std::borrow::Borrow;
use std::fmt;

use crate::constants::CALENDAR_KEY_SEPARATOR;

/// Identifier of a calendar owner.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Principal(String);

impl Principal {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Principal {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Principal {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A calendar identified by its owner and its name.
///
/// Routing key only; owns no calendar data.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CalendarRef {
    principal: Principal,
    name: String,
}

impl CalendarRef {
    #[must_use]
    pub fn new(principal: Principal, name: impl Into<String>) -> Self {
        Self {
            principal,
            name: name.into(),
        }
    }

    /// ## Summary
    /// Splits a calendar key of the form `principal/name`.
    ///
    /// Returns `None` for keys that are not exactly two non-empty components.
    #[must_use]
    pub fn parse_key(key: &str) -> Option<Self> {
        let (principal, name) = key.split_once(CALENDAR_KEY_SEPARATOR)?;
        if principal.is_empty() || name.is_empty() || name.contains(CALENDAR_KEY_SEPARATOR) {
            return None;
        }
        Some(Self::new(Principal::new(principal), name))
    }

    /// Returns the `principal/name` key of this calendar.
    #[must_use]
    pub fn key(&self) -> String {
        format!("{}{CALENDAR_KEY_SEPARATOR}{}", self.principal, self.name)
    }

    #[must_use]
    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for CalendarRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{CALENDAR_KEY_SEPARATOR}{}", self.principal, self.name)
    }
}

/// Canonical absolute URL of an addressed calendar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceUrl(String);

impl ResourceUrl {
    /// ## Summary
    /// Builds `<origin>/<principal>/<calendar>`, percent-encoding both
    /// path components.
    #[must_use]
    pub fn for_calendar(origin: &str, calendar: &CalendarRef) -> Self {
        Self(format!(
            "{}/{}/{}",
            origin.trim_end_matches('/'),
            urlencoding::encode(calendar.principal().as_str()),
            urlencoding::encode(calendar.name()),
        ))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the URL of a member resource below this one.
    #[must_use]
    pub fn join(&self, member: &str) -> String {
        format!("{}/{}", self.0, urlencoding::encode(member))
    }
}

impl fmt::Display for ResourceUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Value of an `If-Match` request header, opaque to routing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionalTag(String);

impl ConditionalTag {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// ## Summary
    /// Checks the tag against an entity tag.
    ///
    /// `*` matches any existing representation.
    #[must_use]
    pub fn matches(&self, etag: &str) -> bool {
        let tag = self.0.trim();
        tag == "*" || tag.split(',').any(|candidate| candidate.trim() == etag)
    }
}

impl fmt::Display for ConditionalTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_key_splits_principal_and_name() {
        let calendar = CalendarRef::parse_key("alice/work").unwrap();

        assert_eq!(calendar.principal().as_str(), "alice");
        assert_eq!(calendar.name(), "work");
        assert_eq!(calendar.key(), "alice/work");
    }

    #[test]
    fn parse_key_rejects_malformed_keys() {
        for key in ["alice", "/work", "alice/", "alice/work/extra", ""] {
            assert!(CalendarRef::parse_key(key).is_none(), "{key} should be rejected");
        }
    }

    #[test]
    fn resource_url_encodes_components() {
        let calendar = CalendarRef::new(Principal::new("alice"), "my work");
        let url = ResourceUrl::for_calendar("http://localhost:5232/", &calendar);

        assert_eq!(url.as_str(), "http://localhost:5232/alice/my%20work");
        assert_eq!(url.join("a b.ics"), "http://localhost:5232/alice/my%20work/a%20b.ics");
    }

    #[test]
    fn conditional_tag_matching() {
        assert!(ConditionalTag::new("\"abc\"").matches("\"abc\""));
        assert!(ConditionalTag::new("\"x\", \"abc\"").matches("\"abc\""));
        assert!(ConditionalTag::new("*").matches("\"abc\""));
        assert!(!ConditionalTag::new("\"abd\"").matches("\"abc\""));
    }
}

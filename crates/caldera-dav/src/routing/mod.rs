//! Path resolution: `/<principal>/<calendar>` to a calendar endpoint.

mod principal;
mod root;

use std::borrow::Cow;
use std::fmt;

use caldera_core::error::CoreResult;
use caldera_core::store::CalendarStore;
use caldera_core::types::Principal;

pub use principal::PrincipalRouter;
pub use root::RootRouter;

use crate::endpoint::CalendarEndpoint;

/// Why a path did not resolve to a calendar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteMiss {
    /// The path has no principal or no calendar segment.
    Incomplete,
    /// A segment is not valid percent-encoded UTF-8.
    InvalidSegment(String),
    UnknownPrincipal(String),
    UnknownCalendar { principal: Principal, name: String },
}

impl fmt::Display for RouteMiss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Incomplete => f.write_str("path does not name a calendar"),
            Self::InvalidSegment(segment) => write!(f, "invalid path segment {segment:?}"),
            Self::UnknownPrincipal(name) => write!(f, "unknown principal {name:?}"),
            Self::UnknownCalendar { principal, name } => {
                write!(f, "unknown calendar {name:?} of {principal}")
            }
        }
    }
}

/// Outcome of resolving a request path.
pub enum Resolution {
    Found(CalendarEndpoint),
    NotFound(RouteMiss),
}

impl fmt::Debug for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Found(endpoint) => f.debug_tuple("Found").field(endpoint.calendar()).finish(),
            Self::NotFound(miss) => f.debug_tuple("NotFound").field(miss).finish(),
        }
    }
}

/// ## Summary
/// Resolves `path` against the routing tree.
///
/// The first segment names a principal and the second one of its calendars;
/// segments below the calendar are ignored. Segments are percent-decoded
/// before lookup. On a match the calendar is opened from `store` and bound
/// to a new endpoint.
///
/// ## Errors
/// Returns an error only if opening a known calendar fails. Unknown paths
/// resolve to [`Resolution::NotFound`].
#[tracing::instrument(skip(root, store))]
pub fn resolve(root: &RootRouter, store: &dyn CalendarStore, path: &str) -> CoreResult<Resolution> {
    let mut segments = path.trim_start_matches('/').split('/');

    let (Some(principal_segment), Some(calendar_segment)) = (segments.next(), segments.next())
    else {
        return Ok(miss(RouteMiss::Incomplete));
    };
    if principal_segment.is_empty() || calendar_segment.is_empty() {
        return Ok(miss(RouteMiss::Incomplete));
    }

    let principal_name = match decode_segment(principal_segment) {
        Ok(name) => name,
        Err(invalid) => return Ok(miss(invalid)),
    };
    let calendar_name = match decode_segment(calendar_segment) {
        Ok(name) => name,
        Err(invalid) => return Ok(miss(invalid)),
    };

    let Some(principal) = root.child(&principal_name) else {
        return Ok(miss(RouteMiss::UnknownPrincipal(principal_name.into_owned())));
    };
    let Some(calendar) = principal.child(&calendar_name) else {
        return Ok(miss(RouteMiss::UnknownCalendar {
            principal: principal.principal().clone(),
            name: calendar_name.into_owned(),
        }));
    };

    let handle = store.open(&calendar)?;
    tracing::debug!(%calendar, "Path resolved");

    Ok(Resolution::Found(CalendarEndpoint::new(calendar, handle)))
}

fn miss(reason: RouteMiss) -> Resolution {
    tracing::debug!(%reason, "Path not found");
    Resolution::NotFound(reason)
}

fn decode_segment(segment: &str) -> Result<Cow<'_, str>, RouteMiss> {
    urlencoding::decode(segment).map_err(|e| {
        tracing::debug!(segment, error = %e, "Undecodable path segment");
        RouteMiss::InvalidSegment(segment.to_owned())
    })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use caldera_core::error::CoreError;
    use caldera_core::store::{CalendarEdit, CalendarHandle};
    use caldera_core::types::{CalendarRef, ConditionalTag};

    use super::*;

    /// Store whose calendars are all empty.
    struct EmptyStore;

    struct EmptyCalendar(CalendarRef);

    impl CalendarHandle for EmptyCalendar {
        fn calendar(&self) -> &CalendarRef {
            &self.0
        }

        fn text(&self) -> CoreResult<String> {
            Ok(String::new())
        }

        fn etag(&self) -> CoreResult<String> {
            Ok("\"empty\"".to_string())
        }

        fn update(&self, _: Option<&ConditionalTag>, _: &mut CalendarEdit<'_>) -> CoreResult<()> {
            Err(CoreError::StorageError("read only".to_string()))
        }
    }

    impl CalendarStore for EmptyStore {
        fn calendar_keys(&self) -> CoreResult<BTreeSet<String>> {
            Ok(BTreeSet::new())
        }

        fn open(&self, calendar: &CalendarRef) -> CoreResult<Box<dyn CalendarHandle>> {
            Ok(Box::new(EmptyCalendar(calendar.clone())))
        }
    }

    fn root() -> RootRouter {
        RootRouter::new(
            &BTreeSet::from([Principal::from("alice"), Principal::from("j doe")]),
            &BTreeSet::from(["alice/work".to_string(), "j doe/home".to_string()]),
        )
    }

    fn found(path: &str) -> Option<CalendarRef> {
        match resolve(&root(), &EmptyStore, path).unwrap() {
            Resolution::Found(endpoint) => Some(endpoint.calendar().clone()),
            Resolution::NotFound(_) => None,
        }
    }

    fn missed(path: &str) -> Option<RouteMiss> {
        match resolve(&root(), &EmptyStore, path).unwrap() {
            Resolution::Found(_) => None,
            Resolution::NotFound(miss) => Some(miss),
        }
    }

    #[test]
    fn resolves_known_calendar() {
        assert_eq!(
            found("/alice/work"),
            Some(CalendarRef::new(Principal::from("alice"), "work"))
        );
    }

    #[test]
    fn ignores_segments_below_calendar() {
        let work = Some(CalendarRef::new(Principal::from("alice"), "work"));

        assert_eq!(found("/alice/work/"), work);
        assert_eq!(found("/alice/work/event.ics"), work);
    }

    #[test]
    fn decodes_percent_encoded_segments() {
        assert_eq!(
            found("/j%20doe/home"),
            Some(CalendarRef::new(Principal::from("j doe"), "home"))
        );
    }

    #[test]
    fn unknown_principal_is_not_found() {
        assert_eq!(
            missed("/bob/anything"),
            Some(RouteMiss::UnknownPrincipal("bob".to_string()))
        );
    }

    #[test]
    fn unknown_calendar_is_not_found() {
        assert_eq!(
            missed("/alice/home"),
            Some(RouteMiss::UnknownCalendar {
                principal: Principal::from("alice"),
                name: "home".to_string(),
            })
        );
    }

    #[test]
    fn incomplete_paths_are_not_found() {
        for path in ["", "/", "/alice", "/alice/", "//work"] {
            assert_eq!(missed(path), Some(RouteMiss::Incomplete), "{path}");
        }
    }

    #[test]
    fn invalid_encoding_is_not_found() {
        assert!(matches!(
            missed("/alice/%FF"),
            Some(RouteMiss::InvalidSegment(_))
        ));
    }
}

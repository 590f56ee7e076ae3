//! Minimal iCalendar handling: splitting calendars into components and
//! merging uploads into stored calendars.
//!
//! Component bodies are kept as the original content lines; only the
//! properties needed for identity (`UID`, `RECURRENCE-ID`, `TZID`) are read.

mod component;
mod merge;

pub(crate) use component::serialize_components;
pub use component::{Component, ICalendar, parse, serialize};
pub use merge::merge;

/// Component kinds advertised in `supported-calendar-component-set`.
pub const SUPPORTED_COMPONENTS: [&str; 3] = ["VEVENT", "VTODO", "VJOURNAL"];

pub const PRODID: &str = "-//Caldera//Caldera CalDAV Server//EN";

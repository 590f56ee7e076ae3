//! Calendar storage contract.

use std::collections::BTreeSet;

use crate::error::CoreResult;
use crate::types::{CalendarRef, ConditionalTag};

/// Edit applied to a calendar's current text, producing its new text.
pub type CalendarEdit<'a> = dyn FnMut(&str) -> CoreResult<String> + 'a;

/// Live binding to one stored calendar, opened per request.
pub trait CalendarHandle: Send {
    fn calendar(&self) -> &CalendarRef;

    /// ## Summary
    /// Returns the current iCalendar text of the calendar.
    ///
    /// ## Errors
    /// Returns an error if the calendar cannot be read.
    fn text(&self) -> CoreResult<String>;

    /// ## Summary
    /// Returns the current entity tag of the calendar.
    ///
    /// ## Errors
    /// Returns an error if the calendar cannot be read.
    fn etag(&self) -> CoreResult<String>;

    /// ## Summary
    /// Applies `edit` to the calendar text under the store's per-calendar lock.
    ///
    /// When `tag` is present it is compared with the current entity tag
    /// first, and the edit is skipped on mismatch. When absent the edit is
    /// applied unconditionally.
    ///
    /// ## Errors
    /// Returns `CoreError::PreconditionFailed` on tag mismatch, or any error
    /// raised by reading, editing or writing the calendar.
    fn update(&self, tag: Option<&ConditionalTag>, edit: &mut CalendarEdit<'_>) -> CoreResult<()>;
}

/// Source of calendars.
pub trait CalendarStore: Send + Sync {
    /// ## Summary
    /// Lists every known calendar as a `principal/name` key.
    ///
    /// ## Errors
    /// Returns an error if the calendar listing cannot be produced.
    fn calendar_keys(&self) -> CoreResult<BTreeSet<String>>;

    /// ## Summary
    /// Opens a handle on a known calendar.
    ///
    /// ## Errors
    /// Returns an error if the calendar is unknown to the store.
    fn open(&self, calendar: &CalendarRef) -> CoreResult<Box<dyn CalendarHandle>>;
}

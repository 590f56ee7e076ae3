//! In-memory calendar store.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, PoisonError};

use caldera_core::error::{CoreError, CoreResult};
use caldera_core::etag::generate_etag;
use caldera_core::store::{CalendarEdit, CalendarHandle, CalendarStore};
use caldera_core::types::{CalendarRef, ConditionalTag};

use crate::error::StoreError;

/// Store keeping every calendar text in memory, for tests and ephemeral
/// servers.
#[derive(Debug, Default)]
pub struct MemoryStore {
    calendars: BTreeMap<CalendarRef, Arc<Mutex<String>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an empty calendar.
    #[must_use]
    pub fn with_calendar(self, calendar: CalendarRef) -> Self {
        self.with_calendar_text(calendar, "")
    }

    /// Adds a calendar holding `text`.
    #[must_use]
    pub fn with_calendar_text(mut self, calendar: CalendarRef, text: &str) -> Self {
        self.calendars
            .insert(calendar, Arc::new(Mutex::new(text.to_owned())));
        self
    }

    /// Returns the current text of a calendar, if known.
    #[must_use]
    pub fn text_of(&self, calendar: &CalendarRef) -> Option<String> {
        self.calendars.get(calendar).map(|text| {
            text.lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        })
    }
}

impl CalendarStore for MemoryStore {
    fn calendar_keys(&self) -> CoreResult<BTreeSet<String>> {
        Ok(self.calendars.keys().map(CalendarRef::key).collect())
    }

    fn open(&self, calendar: &CalendarRef) -> CoreResult<Box<dyn CalendarHandle>> {
        let text = self
            .calendars
            .get(calendar)
            .ok_or_else(|| StoreError::UnknownCalendar(calendar.key()))?;

        Ok(Box::new(MemoryCalendar {
            calendar: calendar.clone(),
            text: Arc::clone(text),
        }))
    }
}

struct MemoryCalendar {
    calendar: CalendarRef,
    text: Arc<Mutex<String>>,
}

impl CalendarHandle for MemoryCalendar {
    fn calendar(&self) -> &CalendarRef {
        &self.calendar
    }

    fn text(&self) -> CoreResult<String> {
        Ok(self
            .text
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn etag(&self) -> CoreResult<String> {
        Ok(generate_etag(self.text()?.as_bytes()))
    }

    fn update(&self, tag: Option<&ConditionalTag>, edit: &mut CalendarEdit<'_>) -> CoreResult<()> {
        let mut text = self.text.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(tag) = tag {
            let etag = generate_etag(text.as_bytes());
            if !tag.matches(&etag) {
                return Err(CoreError::PreconditionFailed {
                    expected: tag.to_string(),
                    current: etag,
                });
            }
        }

        *text = edit(&text)?;
        Ok(())
    }
}

use crate::error::{RfcError, RfcResult};

use super::component::{Component, parse, serialize};

/// ## Summary
/// Merges uploaded iCalendar text into the stored calendar text.
///
/// Items replace stored items with the same `UID` and `RECURRENCE-ID`, and
/// are appended otherwise. Timezones are added once per `TZID`.
///
/// ## Errors
/// Returns `RfcError::InvalidCalendar` if either text is not valid
/// iCalendar, or if the upload holds no components at all.
pub fn merge(current: &str, incoming: &str) -> RfcResult<String> {
    let mut calendar = parse(current)?;
    let upload = parse(incoming)?;

    if upload.items.is_empty() && upload.timezones.is_empty() {
        return Err(RfcError::InvalidCalendar(
            "uploaded calendar has no components".to_string(),
        ));
    }

    for timezone in upload.timezones {
        let tzid = timezone.tzid();
        if tzid.is_none() || !calendar.timezones.iter().any(|known| known.tzid() == tzid) {
            calendar.timezones.push(timezone);
        }
    }

    for item in upload.items {
        let key = item_key(&item);
        let existing = key
            .as_ref()
            .and_then(|key| calendar.items.iter().position(|known| item_key(known).as_ref() == Some(key)));
        match existing {
            Some(index) => calendar.items[index] = item,
            None => calendar.items.push(item),
        }
    }

    Ok(serialize(&calendar))
}

/// Identity of an item: its `UID` plus `RECURRENCE-ID` for overrides.
fn item_key(item: &Component) -> Option<(String, Option<String>)> {
    item.uid().map(|uid| (uid, item.recurrence_id()))
}

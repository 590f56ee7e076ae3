use crate::error::{RfcError, RfcResult};

use super::PRODID;

const CRLF: &str = "\r\n";

/// A top-level component of a `VCALENDAR`, nested components included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    pub kind: String,
    /// Content lines from `BEGIN` to `END`, still folded.
    pub lines: Vec<String>,
}

impl Component {
    /// ## Summary
    /// Returns the unfolded value of a property of this component, ignoring
    /// properties of nested components such as `VALARM`.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<String> {
        let mut depth = 0usize;
        for line in unfold(&self.lines) {
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let prop_name = key.split(';').next().unwrap_or(key);

            if prop_name.eq_ignore_ascii_case("BEGIN") {
                depth += 1;
            } else if prop_name.eq_ignore_ascii_case("END") {
                depth = depth.saturating_sub(1);
            } else if depth == 1 && prop_name.eq_ignore_ascii_case(name) {
                return Some(value.to_owned());
            } else {
                // Property of another component or not the one asked for
            }
        }
        None
    }

    #[must_use]
    pub fn uid(&self) -> Option<String> {
        self.property("UID")
    }

    #[must_use]
    pub fn recurrence_id(&self) -> Option<String> {
        self.property("RECURRENCE-ID")
    }

    #[must_use]
    pub fn tzid(&self) -> Option<String> {
        self.property("TZID")
    }

    #[must_use]
    pub fn is_timezone(&self) -> bool {
        self.kind.eq_ignore_ascii_case("VTIMEZONE")
    }

    /// Returns the component text with CRLF line endings.
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut text = String::new();
        for line in &self.lines {
            text.push_str(line);
            text.push_str(CRLF);
        }
        text
    }
}

/// The components of one or more concatenated `VCALENDAR` objects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ICalendar {
    pub timezones: Vec<Component>,
    pub items: Vec<Component>,
}

/// ## Summary
/// Splits iCalendar text into timezones and calendar items.
///
/// Blank text is an empty calendar. `VCALENDAR` properties are dropped;
/// [`serialize`] writes its own.
///
/// ## Errors
/// Returns `RfcError::InvalidCalendar` for content outside a `VCALENDAR`,
/// unbalanced `BEGIN`/`END` lines or unterminated objects.
pub fn parse(text: &str) -> RfcResult<ICalendar> {
    let mut calendar = ICalendar::default();
    let mut in_calendar = false;
    let mut current: Option<Component> = None;
    let mut depth = 0usize;

    for (index, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let line_number = index + 1;
        let begin = begin_name(line);
        let end = end_name(line);

        if !in_calendar {
            match begin {
                Some(name) if name.eq_ignore_ascii_case("VCALENDAR") => in_calendar = true,
                _ => {
                    return Err(RfcError::InvalidCalendar(format!(
                        "line {line_number}: expected BEGIN:VCALENDAR"
                    )));
                }
            }
            continue;
        }

        if let Some(component) = current.as_mut() {
            component.lines.push(line.to_owned());
            if begin.is_some() {
                depth += 1;
            } else if let Some(name) = end {
                depth -= 1;
                if depth == 0
                    && let Some(done) = current.take()
                {
                    check_end(&done, name, line_number)?;
                    if done.is_timezone() {
                        calendar.timezones.push(done);
                    } else {
                        calendar.items.push(done);
                    }
                }
            } else {
                // Content line of the current component
            }
            continue;
        }

        if let Some(name) = begin {
            current = Some(Component {
                kind: name.to_ascii_uppercase(),
                lines: vec![line.to_owned()],
            });
            depth = 1;
        } else if let Some(name) = end {
            if !name.eq_ignore_ascii_case("VCALENDAR") {
                return Err(RfcError::InvalidCalendar(format!(
                    "line {line_number}: unexpected END:{name}"
                )));
            }
            in_calendar = false;
        } else {
            // VCALENDAR property such as VERSION or PRODID
        }
    }

    if in_calendar || current.is_some() {
        return Err(RfcError::InvalidCalendar(
            "unterminated VCALENDAR object".to_string(),
        ));
    }

    Ok(calendar)
}

/// ## Summary
/// Writes a single `VCALENDAR` holding every timezone then every item.
///
/// A calendar without components serializes to an empty string.
#[must_use]
pub fn serialize(calendar: &ICalendar) -> String {
    if calendar.timezones.is_empty() && calendar.items.is_empty() {
        return String::new();
    }
    serialize_components(calendar.timezones.iter().chain(calendar.items.iter()))
}

/// Wraps the given components in a `VCALENDAR`.
pub(crate) fn serialize_components<'a>(components: impl Iterator<Item = &'a Component>) -> String {
    let mut text = format!("BEGIN:VCALENDAR{CRLF}VERSION:2.0{CRLF}PRODID:{PRODID}{CRLF}");
    for component in components {
        text.push_str(&component.to_text());
    }
    text.push_str("END:VCALENDAR");
    text.push_str(CRLF);
    text
}

fn check_end(component: &Component, end: &str, line_number: usize) -> RfcResult<()> {
    if end.eq_ignore_ascii_case(&component.kind) {
        Ok(())
    } else {
        Err(RfcError::InvalidCalendar(format!(
            "line {line_number}: END:{end} does not close BEGIN:{}",
            component.kind
        )))
    }
}

fn begin_name(line: &str) -> Option<&str> {
    marker_value(line, "BEGIN")
}

fn end_name(line: &str) -> Option<&str> {
    marker_value(line, "END")
}

fn marker_value<'a>(line: &'a str, marker: &str) -> Option<&'a str> {
    let (key, value) = line.split_once(':')?;
    key.eq_ignore_ascii_case(marker).then(|| value.trim())
}

/// Joins folded content lines.
fn unfold(lines: &[String]) -> Vec<String> {
    let mut unfolded: Vec<String> = Vec::with_capacity(lines.len());
    for line in lines {
        match (line.strip_prefix([' ', '\t']), unfolded.last_mut()) {
            (Some(continuation), Some(previous)) => previous.push_str(continuation),
            _ => unfolded.push(line.clone()),
        }
    }
    unfolded
}

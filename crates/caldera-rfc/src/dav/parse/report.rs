//! REPORT request XML parsing.

use quick_xml::Reader;
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesRef, Event};

use super::error::{ParseError, ParseErrorKind, ParseResult};
use super::namespace::NamespaceScope;
use crate::dav::core::{CALDAV_NS, QName, ReportRequest, ReportType};

/// Parses a calendar REPORT request body.
///
/// ## Summary
/// Supports `calendar-query` and `calendar-multiget`. Requested properties
/// come from the report's `DAV:prop` child; multiget hrefs from its
/// `DAV:href` children. Query filters are accepted but not interpreted.
///
/// ## Errors
/// Returns an error for malformed XML, an empty body, or any other report.
#[tracing::instrument(skip(xml), fields(xml_len = xml.len()))]
pub fn parse_report(xml: &[u8]) -> ParseResult<ReportRequest> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut scope = NamespaceScope::default();
    let mut path: Vec<QName> = Vec::new();
    let mut report_type: Option<ReportType> = None;
    let mut properties: Vec<QName> = Vec::new();
    let mut hrefs: Vec<String> = Vec::new();
    let mut href_buf = String::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) => {
                scope.enter(e)?;
                let name = scope.resolve(e.name().as_ref())?;
                open_element(&path, &name, &mut report_type, &mut properties)?;
                path.push(name);
            }
            Event::Empty(ref e) => {
                scope.enter(e)?;
                let name = scope.resolve(e.name().as_ref())?;
                open_element(&path, &name, &mut report_type, &mut properties)?;
                scope.leave();
            }
            Event::Text(ref e) => {
                if is_report_href(&path) {
                    let decoded = reader.decoder().decode(e.as_ref())?;
                    href_buf.push_str(&decoded);
                }
            }
            Event::GeneralRef(ref e) => {
                if is_report_href(&path) {
                    href_buf.push_str(&resolve_reference(e)?);
                }
            }
            Event::End(_) => {
                if is_report_href(&path) {
                    let href = std::mem::take(&mut href_buf);
                    let href = href.trim();
                    if !href.is_empty() {
                        hrefs.push(href.to_owned());
                    }
                }
                path.pop();
                scope.leave();
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    let report_type = match report_type {
        Some(ReportType::CalendarMultiget { .. }) => ReportType::CalendarMultiget { hrefs },
        Some(other) => other,
        None => return Err(ParseError::missing_element("calendar-query or calendar-multiget")),
    };

    tracing::debug!(?report_type, properties = properties.len(), "Parsed REPORT request");

    Ok(ReportRequest {
        report_type,
        properties,
    })
}

fn open_element(
    path: &[QName],
    name: &QName,
    report_type: &mut Option<ReportType>,
    properties: &mut Vec<QName>,
) -> ParseResult<()> {
    match path {
        [] => {
            if name.namespace != CALDAV_NS {
                return Err(ParseError::unsupported_report(&name.to_string()));
            }
            *report_type = match name.local_name.as_str() {
                "calendar-query" => Some(ReportType::CalendarQuery),
                "calendar-multiget" => Some(ReportType::CalendarMultiget { hrefs: Vec::new() }),
                _ => return Err(ParseError::unsupported_report(&name.to_string())),
            };
        }
        [_root, parent] if *parent == QName::dav("prop") => properties.push(name.clone()),
        _ => {}
    }
    Ok(())
}

fn is_report_href(path: &[QName]) -> bool {
    matches!(path, [_root, href] if *href == QName::dav("href"))
}

/// Resolves a character reference or one of the predefined XML entities.
fn resolve_reference(reference: &BytesRef<'_>) -> ParseResult<String> {
    if let Some(ch) = reference
        .resolve_char_ref()
        .map_err(|e| ParseError::xml(e.to_string()))?
    {
        return Ok(ch.to_string());
    }

    let name = reference
        .decode()
        .map_err(|e| ParseError::new(ParseErrorKind::EncodingError, e.to_string()))?;
    resolve_predefined_entity(&name)
        .map(str::to_owned)
        .ok_or_else(|| ParseError::xml(format!("unknown entity: &{name};")))
}

use caldera_core::constants::{CALENDAR_CONTENT_TYPE, ICS_SUFFIX};
use caldera_core::error::{CoreError, CoreResult};
use caldera_core::etag::generate_etag;
use caldera_core::store::CalendarHandle;
use caldera_core::types::ResourceUrl;
use http::StatusCode;

use crate::dav::core::{
    DavProperty, DavResponse, Multistatus, PropertyValue, Propstat, QName, ReportRequest,
    ReportType,
};
use crate::ical::{self, Component, ICalendar};

/// A calendar object resource: every item sharing one `UID`.
struct CalendarObject<'a> {
    name: String,
    components: Vec<&'a Component>,
}

/// Builds the multistatus answering `request` for the calendar at `url`.
pub(super) fn respond(
    request: &ReportRequest,
    calendar: &dyn CalendarHandle,
    url: &ResourceUrl,
) -> CoreResult<Multistatus> {
    let text = calendar.text()?;
    let stored = ical::parse(&text).map_err(|e| {
        CoreError::StorageError(format!("stored calendar {} is invalid: {e}", calendar.calendar()))
    })?;
    let objects = group_objects(&stored);

    let properties = if request.properties.is_empty() {
        vec![QName::dav("getetag"), QName::caldav("calendar-data")]
    } else {
        request.properties.clone()
    };

    let responses = match &request.report_type {
        ReportType::CalendarQuery => objects
            .iter()
            .map(|object| object_response(object, &stored, &properties, url))
            .collect(),
        ReportType::CalendarMultiget { hrefs } => hrefs
            .iter()
            .map(|href| {
                let name = member_name(href);
                objects
                    .iter()
                    .find(|object| object.name == name)
                    .map_or_else(
                        || DavResponse::with_status(href.as_str(), StatusCode::NOT_FOUND),
                        |object| object_response(object, &stored, &properties, url),
                    )
            })
            .collect(),
    };

    tracing::debug!(objects = objects.len(), "Built REPORT response");

    Ok(Multistatus { responses })
}

fn group_objects(calendar: &ICalendar) -> Vec<CalendarObject<'_>> {
    let mut objects: Vec<CalendarObject<'_>> = Vec::new();
    for item in &calendar.items {
        let name = match item.uid() {
            Some(uid) => format!("{uid}{ICS_SUFFIX}"),
            None => {
                let etag = generate_etag(item.to_text().as_bytes());
                format!("{}{ICS_SUFFIX}", etag.trim_matches('"'))
            }
        };
        match objects.iter_mut().find(|object| object.name == name) {
            Some(object) => object.components.push(item),
            None => objects.push(CalendarObject {
                name,
                components: vec![item],
            }),
        }
    }
    objects
}

fn object_response(
    object: &CalendarObject<'_>,
    calendar: &ICalendar,
    properties: &[QName],
    url: &ResourceUrl,
) -> DavResponse {
    let data = ical::serialize_components(
        calendar.timezones.iter().chain(object.components.iter().copied()),
    );
    let etag = generate_etag(data.as_bytes());

    let mut found = Vec::new();
    let mut missing = Vec::new();
    for name in properties {
        let value = if *name == QName::dav("getetag") {
            Some(PropertyValue::Text(etag.clone()))
        } else if *name == QName::caldav("calendar-data") {
            Some(PropertyValue::Text(data.clone()))
        } else if *name == QName::dav("getcontenttype") {
            Some(PropertyValue::Text(CALENDAR_CONTENT_TYPE.to_owned()))
        } else {
            None
        };
        match value {
            Some(value) => found.push(DavProperty::new(name.clone(), value)),
            None => missing.push(DavProperty::empty(name.clone())),
        }
    }

    let mut propstats = vec![Propstat {
        status: StatusCode::OK,
        properties: found,
    }];
    if !missing.is_empty() {
        propstats.push(Propstat {
            status: StatusCode::NOT_FOUND,
            properties: missing,
        });
    }

    DavResponse::with_propstats(url.join(&object.name), propstats)
}

/// Returns the decoded last path segment of an href.
fn member_name(href: &str) -> String {
    let segment = href.trim_end_matches('/').rsplit('/').next().unwrap_or(href);
    urlencoding::decode(segment).map_or_else(|_| segment.to_owned(), |name| name.into_owned())
}

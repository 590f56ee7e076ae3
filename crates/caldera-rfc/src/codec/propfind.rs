use caldera_core::constants::CALENDAR_CONTENT_TYPE;
use caldera_core::error::CoreResult;
use caldera_core::store::CalendarHandle;
use caldera_core::types::ResourceUrl;
use http::StatusCode;

use crate::dav::core::{
    DavProperty, DavResponse, Multistatus, PropertyValue, PropfindRequest, Propstat, QName,
};
use crate::ical::SUPPORTED_COMPONENTS;

/// Builds the multistatus answering `request` for the calendar at `url`.
pub(super) fn respond(
    request: &PropfindRequest,
    calendar: &dyn CalendarHandle,
    url: &ResourceUrl,
) -> CoreResult<Multistatus> {
    let live = live_properties(calendar)?;

    let propstats = match request {
        PropfindRequest::AllProp => vec![Propstat {
            status: StatusCode::OK,
            properties: live,
        }],
        PropfindRequest::PropName => vec![Propstat {
            status: StatusCode::OK,
            properties: live.into_iter().map(|prop| DavProperty::empty(prop.name)).collect(),
        }],
        PropfindRequest::Prop(names) => select(names, live),
    };

    Ok(Multistatus {
        responses: vec![DavResponse::with_propstats(url.as_str(), propstats)],
    })
}

/// Splits requested names into a 200 propstat of known properties and a 404
/// propstat of the rest, omitting empty propstats.
fn select(names: &[QName], live: Vec<DavProperty>) -> Vec<Propstat> {
    let mut found = Vec::new();
    let mut missing = Vec::new();

    for name in names {
        match live.iter().find(|prop| prop.name == *name) {
            Some(prop) => found.push(prop.clone()),
            None => missing.push(DavProperty::empty(name.clone())),
        }
    }

    let mut propstats = Vec::new();
    if !found.is_empty() {
        propstats.push(Propstat {
            status: StatusCode::OK,
            properties: found,
        });
    }
    if !missing.is_empty() {
        propstats.push(Propstat {
            status: StatusCode::NOT_FOUND,
            properties: missing,
        });
    }
    propstats
}

fn live_properties(calendar: &dyn CalendarHandle) -> CoreResult<Vec<DavProperty>> {
    let etag = calendar.etag()?;
    let calendar_ref = calendar.calendar();

    Ok(vec![
        DavProperty::new(
            QName::dav("resourcetype"),
            PropertyValue::ResourceType(vec![QName::dav("collection"), QName::caldav("calendar")]),
        ),
        DavProperty::new(
            QName::dav("displayname"),
            PropertyValue::Text(calendar_ref.name().to_owned()),
        ),
        DavProperty::new(QName::dav("getetag"), PropertyValue::Text(etag.clone())),
        DavProperty::new(
            QName::dav("getcontenttype"),
            PropertyValue::Text(CALENDAR_CONTENT_TYPE.to_owned()),
        ),
        DavProperty::new(
            QName::dav("owner"),
            PropertyValue::Href(format!(
                "/{}/",
                urlencoding::encode(calendar_ref.principal().as_str())
            )),
        ),
        DavProperty::new(
            QName::caldav("supported-calendar-component-set"),
            PropertyValue::Components(SUPPORTED_COMPONENTS.to_vec()),
        ),
        DavProperty::new(QName::calendarserver("getctag"), PropertyValue::Text(etag)),
    ])
}

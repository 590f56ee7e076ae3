//! XML/iCalendar codec over stored calendars.

mod propfind;
mod report;

use caldera_core::codec::Codec;
use caldera_core::error::{CoreError, CoreResult};
use caldera_core::store::CalendarHandle;
use caldera_core::types::{ConditionalTag, ResourceUrl};
use http::StatusCode;

use crate::dav::build::serialize_multistatus;
use crate::dav::core::{DavResponse, Multistatus};
use crate::dav::parse::{parse_propfind, parse_report};
use crate::error::RfcError;
use crate::ical;

/// Codec speaking WebDAV XML and iCalendar text.
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlCodec;

impl XmlCodec {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Codec for XmlCodec {
    #[tracing::instrument(skip(self, calendar), fields(calendar = %calendar.calendar()))]
    fn delete(
        &self,
        tag: Option<&ConditionalTag>,
        calendar: &dyn CalendarHandle,
        url: &ResourceUrl,
    ) -> CoreResult<String> {
        calendar.update(tag, &mut |_current| Ok(String::new()))?;
        tracing::debug!("Calendar cleared");

        let multistatus = Multistatus {
            responses: vec![DavResponse::with_status(url.as_str(), StatusCode::OK)],
        };
        Ok(serialize_multistatus(&multistatus).map_err(RfcError::from)?)
    }

    #[tracing::instrument(skip(self, body, calendar), fields(calendar = %calendar.calendar()))]
    fn propfind(
        &self,
        body: &[u8],
        calendar: &dyn CalendarHandle,
        url: &ResourceUrl,
    ) -> CoreResult<String> {
        let request = parse_propfind(body).map_err(RfcError::from)?;
        let multistatus = propfind::respond(&request, calendar, url)?;
        Ok(serialize_multistatus(&multistatus).map_err(RfcError::from)?)
    }

    #[tracing::instrument(skip(self, text, calendar), fields(calendar = %calendar.calendar(), text_len = text.len()))]
    fn put(
        &self,
        text: &str,
        calendar: &dyn CalendarHandle,
        url: &ResourceUrl,
        tag: Option<&ConditionalTag>,
    ) -> CoreResult<()> {
        calendar.update(tag, &mut |current| {
            ical::merge(current, text).map_err(CoreError::from)
        })?;
        tracing::debug!("Calendar object stored");
        Ok(())
    }

    #[tracing::instrument(skip(self, body, calendar), fields(calendar = %calendar.calendar()))]
    fn report(
        &self,
        body: &[u8],
        calendar: &dyn CalendarHandle,
        url: &ResourceUrl,
    ) -> CoreResult<String> {
        let request = parse_report(body).map_err(RfcError::from)?;
        let multistatus = report::respond(&request, calendar, url)?;
        Ok(serialize_multistatus(&multistatus).map_err(RfcError::from)?)
    }
}

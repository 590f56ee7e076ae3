//! Terminal handler of one calendar.

pub mod method;

use std::fmt;

use caldera_core::codec::Codec;
use caldera_core::store::CalendarHandle;
use caldera_core::types::{CalendarRef, ResourceUrl};

use crate::error::DavResult;
use crate::method::DavMethod;
use crate::request::{DavRequest, DavResponse};

/// Endpoint bound to one (principal, calendar) pair for one request.
///
/// Holds the calendar handle opened during resolution and nothing else.
pub struct CalendarEndpoint {
    calendar: CalendarRef,
    handle: Box<dyn CalendarHandle>,
}

impl CalendarEndpoint {
    #[must_use]
    pub fn new(calendar: CalendarRef, handle: Box<dyn CalendarHandle>) -> Self {
        Self { calendar, handle }
    }

    #[must_use]
    pub fn calendar(&self) -> &CalendarRef {
        &self.calendar
    }

    #[must_use]
    pub fn handle(&self) -> &dyn CalendarHandle {
        self.handle.as_ref()
    }

    /// ## Summary
    /// Handles `request` according to its method.
    ///
    /// The resource URL is computed once from the request origin and passed
    /// to every codec call. Methods other than DELETE, OPTIONS, PROPFIND, PUT
    /// and REPORT are answered with 405 and the `Allow` header.
    ///
    /// ## Errors
    /// Returns charset errors for PUT bodies, invalid `If-Match` headers, and
    /// any error raised by the codec.
    #[tracing::instrument(skip_all, fields(method = %request.method, calendar = %self.calendar))]
    pub fn dispatch(
        &self,
        request: &DavRequest,
        codec: &dyn Codec,
        default_encoding: &str,
    ) -> DavResult<DavResponse> {
        let url = ResourceUrl::for_calendar(&request.origin, &self.calendar);
        let calendar = self.handle();

        match DavMethod::from_method(&request.method) {
            DavMethod::Delete => method::delete::delete(request, calendar, &url, codec),
            DavMethod::Options => Ok(method::options::options()),
            DavMethod::Propfind => method::propfind::propfind(request, calendar, &url, codec),
            DavMethod::Put => method::put::put(request, calendar, &url, codec, default_encoding),
            DavMethod::Report => method::report::report(request, calendar, &url, codec),
            DavMethod::Unsupported => Ok(method::options::method_not_allowed()),
        }
    }
}

impl fmt::Debug for CalendarEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CalendarEndpoint")
            .field("calendar", &self.calendar)
            .finish_non_exhaustive()
    }
}

//! PUT of iCalendar text into a calendar.

use caldera_core::codec::Codec;
use caldera_core::store::CalendarHandle;
use caldera_core::types::ResourceUrl;
use http::StatusCode;

use crate::charset::{decode_body, resolve_charset};
use crate::error::DavResult;
use crate::request::{DavRequest, DavResponse};

/// ## Summary
/// Decodes the body with the request charset, or `default_encoding` when
/// `Content-Type` names none, then stores it through the codec.
///
/// Decoding happens before the codec is called, so a body that cannot be
/// decoded never reaches storage.
///
/// ## Errors
/// Returns `DavError::UnsupportedCharset` or `DavError::UndecodableBody` for
/// charset failures, and the codec's error otherwise.
pub fn put(
    request: &DavRequest,
    calendar: &dyn CalendarHandle,
    url: &ResourceUrl,
    codec: &dyn Codec,
    default_encoding: &str,
) -> DavResult<DavResponse> {
    let charset = resolve_charset(request.content_type()?, default_encoding);
    let text = decode_body(&request.body, charset)?;
    let tag = request.if_match()?;

    tracing::debug!(charset, len = text.len(), if_match = ?tag, "Handling PUT");

    codec.put(&text, calendar, url, tag.as_ref())?;

    Ok(DavResponse::empty(StatusCode::CREATED))
}

//! DELETE of a whole calendar's content.

use caldera_core::codec::Codec;
use caldera_core::store::CalendarHandle;
use caldera_core::types::ResourceUrl;
use http::StatusCode;

use crate::error::DavResult;
use crate::request::{DavRequest, DavResponse};

/// ## Summary
/// Forwards the `If-Match` tag, possibly absent, to the codec.
///
/// ## Errors
/// Returns an error for an invalid `If-Match` header or when the codec
/// fails, e.g. on a tag mismatch.
pub fn delete(
    request: &DavRequest,
    calendar: &dyn CalendarHandle,
    url: &ResourceUrl,
    codec: &dyn Codec,
) -> DavResult<DavResponse> {
    let tag = request.if_match()?;
    tracing::debug!(if_match = ?tag, "Handling DELETE");

    let body = codec.delete(tag.as_ref(), calendar, url)?;
    // 204 carries no body; the codec's multistatus is only logged
    tracing::debug!(len = body.len(), "Calendar deleted");

    Ok(DavResponse::empty(StatusCode::NO_CONTENT))
}

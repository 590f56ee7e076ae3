use caldera_core::codec::Codec;
use caldera_core::store::CalendarHandle;
use caldera_core::types::ResourceUrl;

use crate::error::DavResult;
use crate::request::{DavRequest, DavResponse};

/// ## Summary
/// Hands the raw request body to the codec and returns its multistatus.
///
/// ## Errors
/// Returns the codec's error, e.g. for malformed XML.
pub fn propfind(
    request: &DavRequest,
    calendar: &dyn CalendarHandle,
    url: &ResourceUrl,
    codec: &dyn Codec,
) -> DavResult<DavResponse> {
    let body = codec.propfind(&request.body, calendar, url)?;
    Ok(DavResponse::multistatus(body))
}

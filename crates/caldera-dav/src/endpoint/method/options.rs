//! OPTIONS and the 405 answer to unsupported methods.

use http::StatusCode;

use crate::request::DavResponse;

/// ## Summary
/// Answers OPTIONS with the calendar methods and DAV compliance classes.
///
/// The response never depends on calendar contents.
#[must_use]
pub fn options() -> DavResponse {
    tracing::debug!("OPTIONS response built");
    DavResponse::capabilities(StatusCode::OK)
}

/// Answers a method the endpoint does not support.
#[must_use]
pub fn method_not_allowed() -> DavResponse {
    tracing::debug!("Unsupported method on calendar");
    DavResponse::capabilities(StatusCode::METHOD_NOT_ALLOWED)
}

//! Framework-neutral request and response.

use caldera_core::constants::{ALLOW_METHODS, DAV_CAPABILITIES, MULTISTATUS_CONTENT_TYPE};
use caldera_core::types::ConditionalTag;
use http::header::{ALLOW, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue, IF_MATCH};
use http::{Method, StatusCode};

use crate::error::{DavError, DavResult};

/// The `DAV` compliance header.
pub static DAV: HeaderName = HeaderName::from_static("dav");

/// An HTTP request addressed to the calendar namespace.
#[derive(Debug, Clone)]
pub struct DavRequest {
    pub method: Method,
    /// Request path, still percent-encoded.
    pub path: String,
    /// Public origin (`scheme://host[:port]`) resource URLs are built from.
    pub origin: String,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl DavRequest {
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>, origin: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            origin: origin.into(),
            headers: HeaderMap::new(),
            body: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// ## Summary
    /// Returns a header value as text, or `None` when absent.
    ///
    /// ## Errors
    /// Returns `DavError::InvalidHeader` if the value is not visible ASCII.
    pub fn header(&self, name: &HeaderName) -> DavResult<Option<&str>> {
        self.headers
            .get(name)
            .map(|value| {
                value.to_str().map_err(|e| {
                    tracing::debug!(header = %name, error = %e, "Header is not visible ASCII");
                    DavError::InvalidHeader(name.to_string())
                })
            })
            .transpose()
    }

    /// ## Summary
    /// Returns the `If-Match` tag of the request, if any.
    ///
    /// ## Errors
    /// Returns `DavError::InvalidHeader` for a non-ASCII header value.
    pub fn if_match(&self) -> DavResult<Option<ConditionalTag>> {
        Ok(self.header(&IF_MATCH)?.map(ConditionalTag::new))
    }

    /// ## Summary
    /// Returns the `Content-Type` of the request, if any.
    ///
    /// ## Errors
    /// Returns `DavError::InvalidHeader` for a non-ASCII header value.
    pub fn content_type(&self) -> DavResult<Option<&str>> {
        self.header(&CONTENT_TYPE)
    }
}

/// The response produced for a [`DavRequest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DavResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl DavResponse {
    /// A response without headers or body.
    #[must_use]
    pub fn empty(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: String::new(),
        }
    }

    /// The not-found response: 404 with an empty body.
    #[must_use]
    pub fn not_found() -> Self {
        Self::empty(StatusCode::NOT_FOUND)
    }

    /// A 207 response carrying a multistatus document.
    #[must_use]
    pub fn multistatus(body: String) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static(MULTISTATUS_CONTENT_TYPE),
        );
        Self {
            status: StatusCode::MULTI_STATUS,
            headers,
            body,
        }
    }

    /// A response advertising the calendar methods and DAV capabilities.
    #[must_use]
    pub fn capabilities(status: StatusCode) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(ALLOW, HeaderValue::from_static(ALLOW_METHODS));
        headers.insert(DAV.clone(), HeaderValue::from_static(DAV_CAPABILITIES));
        Self {
            status,
            headers,
            body: String::new(),
        }
    }

    /// The response reporting a failed request.
    #[must_use]
    pub fn from_error(error: &DavError) -> Self {
        Self::empty(error.status_code())
    }
}

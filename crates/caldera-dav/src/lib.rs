//! Request routing and method dispatch for calendar resources.
//!
//! Requests are resolved in three stages: the first path segment selects a
//! principal, the second a calendar owned by it, and the resulting
//! [`endpoint::CalendarEndpoint`] dispatches on the HTTP method. Payload
//! handling is delegated to a [`caldera_core::codec::Codec`].

pub mod charset;
pub mod endpoint;
pub mod error;
pub mod method;
pub mod request;
pub mod routing;
pub mod service;

pub use endpoint::CalendarEndpoint;
pub use error::{DavError, DavResult};
pub use method::DavMethod;
pub use request::{DavRequest, DavResponse};
pub use routing::{PrincipalRouter, Resolution, RootRouter, RouteMiss, resolve};
pub use service::DavService;

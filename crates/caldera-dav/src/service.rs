//! Request entry point tying routing, dispatch and error mapping together.

use std::sync::Arc;

use caldera_core::codec::Codec;
use caldera_core::directory::Directory;
use caldera_core::error::CoreResult;
use caldera_core::store::CalendarStore;

use crate::error::DavResult;
use crate::request::{DavRequest, DavResponse};
use crate::routing::{Resolution, RootRouter, resolve};

/// Routes and answers calendar requests.
///
/// Cheap to clone; every clone shares the same routing tree and
/// collaborators.
#[derive(Clone)]
pub struct DavService {
    root: Arc<RootRouter>,
    store: Arc<dyn CalendarStore>,
    codec: Arc<dyn Codec>,
    default_encoding: Arc<str>,
}

impl DavService {
    #[must_use]
    pub fn new(
        root: RootRouter,
        store: Arc<dyn CalendarStore>,
        codec: Arc<dyn Codec>,
        default_encoding: &str,
    ) -> Self {
        Self {
            root: Arc::new(root),
            store,
            codec,
            default_encoding: Arc::from(default_encoding),
        }
    }

    /// ## Summary
    /// Builds the service, snapshotting principals and calendar keys once.
    ///
    /// ## Errors
    /// Returns an error if the directory or the store cannot list entries.
    pub fn load(
        directory: &dyn Directory,
        store: Arc<dyn CalendarStore>,
        codec: Arc<dyn Codec>,
        default_encoding: &str,
    ) -> CoreResult<Self> {
        let root = RootRouter::load(directory, store.as_ref())?;
        Ok(Self::new(root, store, codec, default_encoding))
    }

    #[must_use]
    pub fn root(&self) -> &RootRouter {
        &self.root
    }

    /// ## Summary
    /// Answers `request`.
    ///
    /// Unknown paths get a 404 with an empty body. Failures are mapped to
    /// their status with [`crate::DavError::status_code`] and an empty body.
    #[tracing::instrument(skip_all, fields(method = %request.method, path = %request.path))]
    pub fn handle(&self, request: &DavRequest) -> DavResponse {
        match self.try_handle(request) {
            Ok(response) => {
                tracing::debug!(status = %response.status, "Request handled");
                response
            }
            Err(e) => {
                let response = DavResponse::from_error(&e);
                if response.status.is_server_error() {
                    tracing::error!(error = %e, "Request failed");
                } else {
                    tracing::warn!(error = %e, status = %response.status, "Request rejected");
                }
                response
            }
        }
    }

    fn try_handle(&self, request: &DavRequest) -> DavResult<DavResponse> {
        match resolve(&self.root, self.store.as_ref(), &request.path)? {
            Resolution::Found(endpoint) => {
                endpoint.dispatch(request, self.codec.as_ref(), &self.default_encoding)
            }
            Resolution::NotFound(_) => Ok(DavResponse::not_found()),
        }
    }
}

use std::sync::Arc;

use caldera_core::codec::Codec;
use caldera_core::config::Settings;
use caldera_core::store::CalendarStore;
use caldera_dav::DavService;
use caldera_rfc::codec::XmlCodec;
use caldera_store::{ConfigDirectory, FilesystemStore};
use salvo::Router;

use crate::error::AppResult;
use crate::handler::DavHandler;

/// ## Summary
/// Builds the request handler from configuration: the filesystem store, the
/// configured principal directory and the XML codec.
///
/// ## Errors
/// Returns an error if the store cannot be opened or the principal and
/// calendar sets cannot be listed.
#[tracing::instrument(skip_all)]
pub fn build_handler(settings: &Settings) -> AppResult<DavHandler> {
    let store: Arc<dyn CalendarStore> = Arc::new(FilesystemStore::from_settings(settings)?);
    let directory = ConfigDirectory::from_settings(settings, Arc::clone(&store));
    let codec: Arc<dyn Codec> = Arc::new(XmlCodec::new());

    let service = DavService::load(
        &directory,
        store,
        codec,
        settings.default_request_encoding(),
    )?;

    Ok(DavHandler::new(service, settings))
}

/// ## Summary
/// Routes every path to `handler`; resolution happens inside the service.
#[must_use]
pub fn routes(handler: DavHandler) -> Router {
    Router::new()
        .push(Router::with_path("{**rest}").goal(handler))
}

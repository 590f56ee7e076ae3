//! Salvo adapter around [`DavService`].

use caldera_core::config::Settings;
use caldera_dav::{DavRequest, DavResponse, DavService};
use salvo::http::StatusCode;
use salvo::http::header::{CONTENT_LENGTH, HOST};
use salvo::{Depot, FlowCtrl, Request, Response, async_trait};

/// Hands every request to the calendar service on the blocking pool.
#[derive(Clone)]
pub struct DavHandler {
    service: DavService,
    /// Configured public origin; overrides the `Host` header when set.
    serve_origin: Option<String>,
    /// Origin used when the request carries no host at all.
    fallback_origin: String,
    max_body_size: usize,
}

impl DavHandler {
    #[must_use]
    pub fn new(service: DavService, settings: &Settings) -> Self {
        Self {
            service,
            serve_origin: settings.server.serve_origin.clone(),
            fallback_origin: settings.server.origin(),
            max_body_size: settings.server.max_body_size,
        }
    }

    /// ## Summary
    /// Determines the origin resource URLs are built from.
    ///
    /// Preference order: configured origin, `Host` header, URI authority,
    /// listen address.
    fn origin(&self, req: &Request) -> String {
        if let Some(origin) = &self.serve_origin {
            return origin.trim_end_matches('/').to_owned();
        }

        let scheme = req.uri().scheme_str().unwrap_or("http");
        let host = req
            .headers()
            .get(HOST)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned)
            .or_else(|| req.uri().authority().map(ToString::to_string));

        host.map_or_else(
            || self.fallback_origin.clone(),
            |host| format!("{scheme}://{host}"),
        )
    }

    /// Whether the declared `Content-Length` is above `server.max_body_size`.
    fn exceeds_body_limit(&self, req: &Request) -> bool {
        req.headers()
            .get(CONTENT_LENGTH)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<usize>().ok())
            .is_some_and(|length| length > self.max_body_size)
    }
}

#[async_trait]
impl salvo::Handler for DavHandler {
    #[tracing::instrument(skip_all, fields(method = %req.method(), path = %req.uri().path()))]
    async fn handle(
        &self,
        req: &mut Request,
        _depot: &mut Depot,
        res: &mut Response,
        _ctrl: &mut FlowCtrl,
    ) {
        tracing::info!("Handling request");

        if self.exceeds_body_limit(req) {
            tracing::warn!(limit = self.max_body_size, "Request body too large");
            res.status_code(StatusCode::PAYLOAD_TOO_LARGE);
            res.body("");
            return;
        }

        let origin = self.origin(req);
        let body = match req.payload_with_max_size(self.max_body_size).await {
            Ok(bytes) => bytes.to_vec(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read request body");
                res.status_code(StatusCode::BAD_REQUEST);
                return;
            }
        };

        let mut request = DavRequest::new(req.method().clone(), req.uri().path(), origin)
            .with_body(body);
        request.headers = req.headers().clone();

        let service = self.service.clone();
        let response = match tokio::task::spawn_blocking(move || service.handle(&request)).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(error = %e, "Request task failed");
                res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
                return;
            }
        };

        write_response(res, response);
    }
}

fn write_response(res: &mut Response, response: DavResponse) {
    res.status_code(response.status);
    for (name, value) in &response.headers {
        res.headers_mut().insert(name.clone(), value.clone());
    }

    if response.body.is_empty() {
        // An explicit empty body keeps the error catcher from filling it in
        res.body("");
    } else if let Err(e) = res.write_body(response.body) {
        tracing::error!(error = %e, "Failed to write response body");
    }

    tracing::debug!(status = %response.status, "Response written");
}

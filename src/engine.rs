// HTTP engine for Stolypote
// One catch-all axum handler: capture -> extraction -> decoy -> reply

use crate::capture::CaptureWriter;
use crate::config::HoneypotPaths;
use crate::decoy::ResponseMapping;
use crate::error::HoneypotError;
use crate::models::InboundRequest;
use crate::parameters::scanner::extract;
use crate::wordlist::WordlistStore;
use axum::body::{to_bytes, Body};
use axum::extract::{ConnectInfo, Request, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

/// Request bodies beyond this are dropped (the request is still answered).
pub const MAX_BODY_BYTES: usize = 32 << 20;

pub struct HoneypotEngine {
    pub store: Arc<WordlistStore>,
    pub captures: CaptureWriter,
    pub responses: ResponseMapping,
}

impl HoneypotEngine {
    pub fn new(store: Arc<WordlistStore>, captures: CaptureWriter, responses: ResponseMapping) -> Self {
        Self {
            store,
            captures,
            responses,
        }
    }

    /// Loads the response mapping and preloads wordlists from the fixed layout.
    /// Directories must already exist.
    pub fn from_paths(paths: &HoneypotPaths) -> Self {
        let responses = ResponseMapping::load(&paths.response_map, &paths.responses);
        let store = WordlistStore::new(&paths.wordlists);
        store.preload();
        Self::new(Arc::new(store), CaptureWriter::new(&paths.dump), responses)
    }

    /// Runs the full pipeline for one buffered request.
    pub async fn handle(&self, request: InboundRequest) -> Response {
        info!(
            method = %request.method,
            path = %request.path(),
            query = request.query().unwrap_or(""),
            proto = request.protocol(),
            host = %request.host().unwrap_or_default(),
            "incoming request"
        );

        if let Err(e) = self.captures.capture(&request).await {
            error!(error = %e, "failed to capture request");
        }

        extract(&self.store, &request).await;

        match self.responses.select(request.path()).await {
            Ok(decoy) => {
                if let Some(source) = &decoy.source {
                    info!(path = %request.path(), %source, "served custom response");
                }
                (
                    StatusCode::OK,
                    [(header::CONTENT_TYPE, decoy.content_type)],
                    decoy.body,
                )
                    .into_response()
            }
            Err(e) => {
                error!(error = %e, "failed to serve decoy");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                    "Internal Server Error\n",
                )
                    .into_response()
            }
        }
    }
}

/// Every method and path lands in the same handler.
pub fn router(engine: Arc<HoneypotEngine>) -> Router {
    Router::new().fallback(honeypot_handler).with_state(engine)
}

pub async fn serve(listener: TcpListener, engine: Arc<HoneypotEngine>) -> Result<(), HoneypotError> {
    let app = router(engine).into_make_service_with_connect_info::<SocketAddr>();
    axum::serve(listener, app).await?;
    Ok(())
}

async fn honeypot_handler(State(engine): State<Arc<HoneypotEngine>>, request: Request) -> Response {
    let inbound = buffer_request(request).await;
    engine.handle(inbound).await
}

/// Reads the body into memory so capture and extraction can both see it.
async fn buffer_request(request: Request<Body>) -> InboundRequest {
    let (parts, body) = request.into_parts();
    let remote_addr = parts
        .extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let body = match to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(path = %parts.uri.path(), error = %e, "dropping unreadable request body");
            Default::default()
        }
    };
    InboundRequest {
        method: parts.method,
        uri: parts.uri,
        version: parts.version,
        remote_addr,
        headers: parts.headers,
        body,
    }
}

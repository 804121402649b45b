//! Blog publisher local development server.
//!
//! The application itself is written against the synchronous start/write
//! contract and driven through the serverless adapter. This binary gives
//! it an ordinary HTTP front: every request is converted to the
//! object-shape wire form, pushed through `adapt` on a blocking worker,
//! and the wire reply is converted back to an HTTP response.
//!
//! ```text
//! HTTP request
//!     → object-shape wire request
//!     → Gateway::adapt (decode → PublisherApp → encode)
//!     → object-shape wire reply
//!     → HTTP response
//! ```

use axum::body::{to_bytes, Body};
use axum::extract::{Request, State};
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use blog_publisher::adapter::{ObjectRequest, RequestWire, WireResponse};
use blog_publisher::{Gateway, PublisherApp, Services};

struct ServerState {
    gateway: Gateway<PublisherApp>,
    max_body_bytes: usize,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "blog_publisher=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("blog-publisher v{} starting", env!("CARGO_PKG_VERSION"));

    let config = blog_publisher::config::resolve()?;
    tracing::info!(
        bind_address = %config.server.bind_address,
        debug = config.server.debug,
        "configuration loaded"
    );

    // Service clients are blocking; build them off the runtime.
    let services = {
        let config = config.clone();
        tokio::task::spawn_blocking(move || Services::from_config(&config)).await?
    };
    let state = Arc::new(ServerState {
        gateway: Gateway::new(PublisherApp::new(config.clone(), services)).debug(config.server.debug),
        max_body_bytes: config.server.max_body_bytes,
    });

    let app = Router::new()
        .fallback(serve)
        .with_state(state)
        .layer(TimeoutLayer::new(Duration::from_secs(config.server.request_timeout_secs)))
        .layer(RequestBodyLimitLayer::new(config.server.max_body_bytes))
        .layer(TraceLayer::new_for_http());

    let listener = TcpListener::bind(&config.server.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "listening for connections");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("shutdown complete");
    Ok(())
}

/// Convert the HTTP request to the object wire shape, adapt it on a
/// blocking worker (the application contract is synchronous), and
/// convert the wire reply back.
async fn serve(State(state): State<Arc<ServerState>>, request: Request) -> Response {
    let request_id = Uuid::new_v4().to_string();
    let (parts, body) = request.into_parts();

    let bytes = match to_bytes(body, state.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::warn!(request_id = %request_id, error = %error, "failed to read request body");
            return (StatusCode::PAYLOAD_TOO_LARGE, "request body too large").into_response();
        }
    };

    let mut headers: Vec<(String, String)> = parts
        .headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();
    headers.push(("x-request-id".to_string(), request_id.clone()));

    let wire = RequestWire::Object(ObjectRequest {
        method: parts.method.as_str().to_string(),
        path: parts.uri.path().to_string(),
        headers,
        query: parts.uri.query().map(|q| q.as_bytes().to_vec()),
        body: bytes.to_vec(),
    });

    let worker_state = state.clone();
    let reply = match tokio::task::spawn_blocking(move || worker_state.gateway.adapt(&wire)).await {
        Ok(reply) => reply,
        Err(error) => {
            tracing::error!(request_id = %request_id, error = %error, "adapter worker failed");
            return (StatusCode::INTERNAL_SERVER_ERROR, "internal error").into_response();
        }
    };

    let reply = match reply {
        WireResponse::Object(reply) => reply,
        WireResponse::Event(_) => {
            tracing::error!(request_id = %request_id, "adapter replied in the wrong wire family");
            return (StatusCode::INTERNAL_SERVER_ERROR, "internal error").into_response();
        }
    };

    let mut builder = Response::builder()
        .status(StatusCode::from_u16(reply.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR));
    for (name, value) in &reply.headers {
        if let (Ok(name), Ok(value)) = (
            name.parse::<HeaderName>(),
            HeaderValue::from_str(value),
        ) {
            builder = builder.header(name, value);
        }
    }
    builder = builder.header("x-request-id", request_id);

    builder
        .body(Body::from(reply.body))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("shutdown signal received");
}

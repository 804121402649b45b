//! Adapter driver: decode → invoke application → collect → encode,
//! wrapped in a failure boundary.
//!
//! # Responsibilities
//! - Drive the application exactly once per invocation
//! - Remember the decoded wire family and encode into the same family
//! - Convert every failure into a fixed-shape 500 reply; nothing
//!   propagates out of [`Gateway::adapt`]
//!
//! # Design Decisions
//! - Failures are never retried: the inner application call is not known
//!   to be idempotent
//! - Each invocation allocates its request, collector, and response
//!   fresh; nothing is shared across invocations

use serde_json::json;
use thiserror::Error;

use crate::adapter::collect::ResponseCollector;
use crate::adapter::decode::{decode, CanonicalRequest, DecodeError};
use crate::adapter::encode::{encode, CanonicalResponse, EncodeError};
use crate::adapter::headers::HeaderMap;
use crate::adapter::wire::{RequestWire, WireFamily, WireResponse};

/// The inner request handler, driven through the start/write contract.
///
/// The application must call [`ResponseCollector::start`] once and may
/// then write any number of body chunks before returning. A fault is an
/// `Err` return; the driver converts it into the 500 reply.
pub trait Application {
    fn call(&self, request: &CanonicalRequest, response: &mut ResponseCollector)
        -> anyhow::Result<()>;
}

/// Everything that can go wrong between wire request and wire reply.
#[derive(Debug, Error)]
pub enum AdaptError {
    #[error("failed to decode request: {0}")]
    Decode(#[from] DecodeError),

    #[error("application fault: {0}")]
    Application(#[source] anyhow::Error),

    #[error("failed to encode response: {0}")]
    Encode(#[from] EncodeError),
}

/// Drives one application through the adaptation sequence.
pub struct Gateway<A> {
    application: A,
    debug: bool,
}

impl<A: Application> Gateway<A> {
    pub fn new(application: A) -> Self {
        Self {
            application,
            debug: false,
        }
    }

    /// Append failure detail to error replies. Development only.
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Adapt one wire request to a wire reply in the same shape family.
    /// Never fails: any internal error becomes the 500 reply.
    pub fn adapt(&self, wire: &RequestWire) -> WireResponse {
        let family = wire.family();
        match self.run(wire) {
            Ok(reply) => reply,
            Err(error) => {
                tracing::error!(error = %error, "adaptation failed");
                self.error_reply(family, &error)
            }
        }
    }

    fn run(&self, wire: &RequestWire) -> Result<WireResponse, AdaptError> {
        let request = decode(wire)?;
        tracing::debug!(
            method = %request.method,
            path = %request.path,
            scheme = %request.scheme,
            content_length = request.content_length(),
            "dispatching request"
        );

        let mut collector = ResponseCollector::new();
        self.application
            .call(&request, &mut collector)
            .map_err(AdaptError::Application)?;

        let response = CanonicalResponse::from_state(collector.into_state())?;
        tracing::debug!(status = response.status, "request handled");
        Ok(encode(family, response))
    }

    /// Fixed-shape error reply: 500, JSON diagnostic body, cross-origin
    /// defaults attached by the encoder like any other reply.
    fn error_reply(&self, family: WireFamily, error: &AdaptError) -> WireResponse {
        let mut body = json!({
            "success": false,
            "error": error.to_string(),
        });
        if self.debug {
            body["trace"] = json!(format!("{error:?}"));
        }

        let mut headers = HeaderMap::new();
        headers.insert("Content-Type", "application/json");

        encode(
            family,
            CanonicalResponse {
                status: 500,
                headers,
                body: body.to_string().into_bytes(),
            },
        )
    }
}

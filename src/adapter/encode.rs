//! Response encoding into the host's expected wire shape.
//!
//! # Responsibilities
//! - Parse the collected status line into a numeric status code
//! - Flatten the collected headers into a name→value map (last write wins)
//! - Attach permissive cross-origin defaults only where the application
//!   did not already set them
//! - Carry the body as raw bytes (object family) or text-safe transport
//!   (event family, base64 when the bytes are not valid UTF-8)

use base64::Engine as _;
use thiserror::Error;

use crate::adapter::collect::ResponseState;
use crate::adapter::headers::HeaderMap;
use crate::adapter::wire::{EventResponse, ObjectResponse, WireFamily, WireResponse};

/// Cross-origin defaults injected when the application set none.
pub const CORS_ALLOW_ORIGIN: (&str, &str) = ("Access-Control-Allow-Origin", "*");
pub const CORS_ALLOW_METHODS: (&str, &str) =
    ("Access-Control-Allow-Methods", "GET, POST, PUT, DELETE, OPTIONS");
pub const CORS_ALLOW_HEADERS: (&str, &str) =
    ("Access-Control-Allow-Headers", "Content-Type, Authorization");

/// The application produced something the wire shape cannot carry.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("application never started a response")]
    MissingStatus,

    #[error("malformed status line `{0}`")]
    MalformedStatusLine(String),
}

/// Shape-independent response, the only artifact handed to the encoder.
#[derive(Debug, Clone)]
pub struct CanonicalResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl CanonicalResponse {
    /// Build from the collected state: parse the leading token of the
    /// status line, flatten duplicate headers (last write wins), and
    /// concatenate the fragments.
    pub fn from_state(state: ResponseState) -> Result<Self, EncodeError> {
        let status_line = state.status_line.as_deref().ok_or(EncodeError::MissingStatus)?;
        let status = status_line
            .split_whitespace()
            .next()
            .and_then(|token| token.parse::<u16>().ok())
            .ok_or_else(|| EncodeError::MalformedStatusLine(status_line.to_string()))?;

        let body = state.body();
        let headers: HeaderMap = state.headers.into_iter().collect();

        Ok(Self { status, headers, body })
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }
}

/// Set the permissive cross-origin defaults where absent. Values the
/// application already set always take precedence.
pub fn apply_cors_defaults(headers: &mut HeaderMap) {
    for (name, value) in [CORS_ALLOW_ORIGIN, CORS_ALLOW_METHODS, CORS_ALLOW_HEADERS] {
        if !headers.contains(name) {
            headers.insert(name, value);
        }
    }
}

/// Encode a canonical response into the given wire family.
pub fn encode(family: WireFamily, mut response: CanonicalResponse) -> WireResponse {
    apply_cors_defaults(&mut response.headers);

    let headers = response
        .headers
        .iter()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect();

    match family {
        WireFamily::Object => WireResponse::Object(ObjectResponse {
            status: response.status,
            headers,
            body: response.body,
        }),
        WireFamily::Event => {
            let (body, is_base64_encoded) = match String::from_utf8(response.body) {
                Ok(text) => (text, false),
                Err(err) => (
                    base64::engine::general_purpose::STANDARD.encode(err.into_bytes()),
                    true,
                ),
            };
            WireResponse::Event(EventResponse {
                status_code: response.status,
                headers,
                body,
                is_base64_encoded,
            })
        }
    }
}

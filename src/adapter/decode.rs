//! Request decoding: one canonical request out of any supported shape.
//!
//! # Responsibilities
//! - Turn an [`ObjectRequest`] or [`EventRequest`] into a [`CanonicalRequest`]
//! - Base64-decode flagged event bodies before they reach the canonical form
//! - Derive content-length from the decoded body, never from a wire header
//! - Infer the scheme from the forwarded-protocol hint
//!
//! # Design Decisions
//! - Decoding fails only on structurally absent or undecodable fields;
//!   everything else is normalized
//! - The event query string is reconstructed from the parameter map; its
//!   byte ordering is unspecified, only key/value equivalence is stable

use base64::Engine as _;
use thiserror::Error;

use crate::adapter::headers::{self, HeaderMap};
use crate::adapter::wire::{EventRequest, Method, ObjectRequest, RequestWire, Scheme};

/// Malformed or incomplete inbound wire payload.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("request method is missing")]
    MissingMethod,

    #[error("unsupported request method `{0}`")]
    UnsupportedMethod(String),

    #[error("request body is not valid base64: {0}")]
    BodyEncoding(#[from] base64::DecodeError),

    #[error("query bytes are not valid UTF-8: {0}")]
    QueryEncoding(#[from] std::string::FromUtf8Error),
}

/// The shape-independent request every component downstream works with.
#[derive(Debug, Clone)]
pub struct CanonicalRequest {
    pub method: Method,
    /// Always starts with `/`.
    pub path: String,
    /// Raw, unparsed query string; empty when absent.
    pub query: String,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
    pub scheme: Scheme,
    /// Whether the body is known to be binary (a base64-flagged event body).
    pub binary_body: bool,
}

impl CanonicalRequest {
    pub fn content_type(&self) -> Option<&str> {
        self.headers.get("content-type")
    }

    pub fn content_length(&self) -> usize {
        self.body.len()
    }

    /// Look up a header by its application-convention name
    /// (`HTTP_ACCEPT`, `CONTENT_TYPE`).
    pub fn application_header(&self, name: &str) -> Option<&str> {
        self.headers.get(&headers::to_wire_name(name))
    }

    /// Parse the query string into decoded key/value pairs.
    pub fn query_params(&self) -> Vec<(String, String)> {
        self.query
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| {
                let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
                (
                    urlencoding::decode(key).map(|s| s.into_owned()).unwrap_or_else(|_| key.to_string()),
                    urlencoding::decode(value).map(|s| s.into_owned()).unwrap_or_else(|_| value.to_string()),
                )
            })
            .collect()
    }

    /// First value for a query parameter, decoded.
    pub fn query_param(&self, name: &str) -> Option<String> {
        self.query_params()
            .into_iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }
}

/// Decode one request in any supported shape into the canonical form.
pub fn decode(wire: &RequestWire) -> Result<CanonicalRequest, DecodeError> {
    match wire {
        RequestWire::Object(request) => decode_object(request),
        RequestWire::Event(request) => decode_event(request),
    }
}

fn decode_object(request: &ObjectRequest) -> Result<CanonicalRequest, DecodeError> {
    let method = parse_method(Some(request.method.as_str()))?;
    let headers: HeaderMap = request.headers.iter().cloned().collect();
    let query = match &request.query {
        Some(bytes) => String::from_utf8(bytes.clone())?,
        None => String::new(),
    };
    Ok(finish(
        method,
        &request.path,
        headers,
        query,
        request.body.clone(),
        false,
    ))
}

fn decode_event(request: &EventRequest) -> Result<CanonicalRequest, DecodeError> {
    let method = parse_method(request.http_method.as_deref())?;
    let headers: HeaderMap = request
        .headers
        .iter()
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect();

    // Parameter order follows the host map's iteration; callers must not
    // depend on byte-identity of the reconstructed string.
    let query = request
        .query_string_parameters
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&");

    let (body, binary) = match &request.body {
        Some(text) if request.is_base64_encoded => {
            let bytes = base64::engine::general_purpose::STANDARD.decode(text.trim().as_bytes())?;
            (bytes, true)
        }
        Some(text) => (text.clone().into_bytes(), false),
        None => (Vec::new(), false),
    };

    Ok(finish(method, &request.path, headers, query, body, binary))
}

fn parse_method(raw: Option<&str>) -> Result<Method, DecodeError> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty());
    match raw {
        None => Err(DecodeError::MissingMethod),
        Some(text) => text
            .parse::<Method>()
            .map_err(|_| DecodeError::UnsupportedMethod(text.to_string())),
    }
}

fn finish(
    method: Method,
    path: &str,
    mut headers: HeaderMap,
    query: String,
    body: Vec<u8>,
    binary_body: bool,
) -> CanonicalRequest {
    let path = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    };

    let scheme = match headers.get("x-forwarded-proto") {
        Some(proto) if proto.eq_ignore_ascii_case("https") => Scheme::Https,
        _ => Scheme::Http,
    };

    // Wire shapes disagree on how content-length relates to the body they
    // carry, so the declared value is never trusted.
    headers.insert("Content-Length", body.len().to_string());

    CanonicalRequest {
        method,
        path,
        query,
        headers,
        body,
        scheme,
        binary_body,
    }
}

//! Wire shapes a hosting platform may present or expect.
//!
//! # Responsibilities
//! - Model the supported inbound shapes as one tagged variant type
//! - Model the outbound reply record per shape family
//! - Strongly-typed method and scheme for the canonical request
//!
//! # Design Decisions
//! - Object shape is built programmatically (e.g. by the dev server from a
//!   hyper request); event shape arrives as JSON and derives serde
//! - Shape identity is decided once at the edge, never deep in shared logic

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Standard HTTP verbs accepted by the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Patch => "PATCH",
            Method::Head => "HEAD",
            Method::Options => "OPTIONS",
        }
    }
}

impl FromStr for Method {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "DELETE" => Ok(Method::Delete),
            "PATCH" => Ok(Method::Patch),
            "HEAD" => Ok(Method::Head),
            "OPTIONS" => Ok(Method::Options),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request scheme, inferred from a forwarded-protocol hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scheme {
    #[default]
    Http,
    Https,
}

impl Scheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which wire shape family a request arrived in. The encoder must reply
/// in the same family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireFamily {
    Object,
    Event,
}

/// Full request object: method, path, and headers read directly, the
/// query carried as raw bytes, the body already decoded.
#[derive(Debug, Clone, Default)]
pub struct ObjectRequest {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub query: Option<Vec<u8>>,
    pub body: Vec<u8>,
}

/// JSON event as produced by serverless hosts: method and path under
/// their own field names, query as a parameter map, body as text with an
/// optional base64 flag.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventRequest {
    #[serde(rename = "httpMethod", default)]
    pub http_method: Option<String>,
    #[serde(default = "default_path")]
    pub path: String,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(rename = "queryStringParameters", default)]
    pub query_string_parameters: BTreeMap<String, String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(rename = "isBase64Encoded", default)]
    pub is_base64_encoded: bool,
}

fn default_path() -> String {
    "/".to_string()
}

/// One inbound request in any supported shape.
#[derive(Debug, Clone)]
pub enum RequestWire {
    Object(ObjectRequest),
    Event(EventRequest),
}

impl RequestWire {
    pub fn family(&self) -> WireFamily {
        match self {
            RequestWire::Object(_) => WireFamily::Object,
            RequestWire::Event(_) => WireFamily::Event,
        }
    }
}

/// Reply record for the object family: raw bytes are acceptable.
#[derive(Debug, Clone, Default)]
pub struct ObjectResponse {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: Vec<u8>,
}

/// Reply record for the event family: text-safe transport, binary bodies
/// base64-encoded and flagged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
    #[serde(rename = "isBase64Encoded")]
    pub is_base64_encoded: bool,
}

/// One outbound reply, in the same family the request was decoded from.
#[derive(Debug, Clone)]
pub enum WireResponse {
    Object(ObjectResponse),
    Event(EventResponse),
}

impl WireResponse {
    pub fn family(&self) -> WireFamily {
        match self {
            WireResponse::Object(_) => WireFamily::Object,
            WireResponse::Event(_) => WireFamily::Event,
        }
    }

    pub fn status(&self) -> u16 {
        match self {
            WireResponse::Object(r) => r.status,
            WireResponse::Event(r) => r.status_code,
        }
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        match self {
            WireResponse::Object(r) => &r.headers,
            WireResponse::Event(r) => &r.headers,
        }
    }

    /// Decoded reply body bytes, undoing base64 transport when flagged.
    pub fn body_bytes(&self) -> Vec<u8> {
        use base64::Engine as _;
        match self {
            WireResponse::Object(r) => r.body.clone(),
            WireResponse::Event(r) => {
                if r.is_base64_encoded {
                    base64::engine::general_purpose::STANDARD
                        .decode(r.body.as_bytes())
                        .unwrap_or_default()
                } else {
                    r.body.clone().into_bytes()
                }
            }
        }
    }
}

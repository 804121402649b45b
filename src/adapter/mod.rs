//! Serverless request/response adapter subsystem.
//!
//! # Data Flow
//! ```text
//! host invocation (object or event shape)
//!     → wire.rs (tagged variant, shape decided once at the edge)
//!     → decode.rs (normalize into one CanonicalRequest)
//!     → driver.rs (invoke the application exactly once)
//!     → collect.rs (start/write contract fills ResponseState)
//!     → encode.rs (status parse, header flatten, CORS defaults, body transport)
//!     → wire reply in the same shape family
//! ```
//!
//! # Design Decisions
//! - Every failure is caught at the driver boundary and rendered as a
//!   fixed-shape 500 reply; the host always receives a well-formed reply
//! - No state survives an invocation; concurrent invocations share nothing
//! - The application contract is synchronous: no suspension point, no
//!   background work outliving `adapt`

pub mod collect;
pub mod decode;
pub mod driver;
pub mod encode;
pub mod headers;
pub mod wire;

pub use collect::{ResponseCollector, ResponseState};
pub use decode::{decode, CanonicalRequest, DecodeError};
pub use driver::{AdaptError, Application, Gateway};
pub use encode::{encode, CanonicalResponse, EncodeError};
pub use headers::HeaderMap;
pub use wire::{
    EventRequest, EventResponse, Method, ObjectRequest, ObjectResponse, RequestWire, Scheme,
    WireFamily, WireResponse,
};

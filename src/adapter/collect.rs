//! Response collection: the callback half of the application contract.
//!
//! # Responsibilities
//! - Capture the status line and header list from the start phase
//! - Append body fragments in call order
//! - Hand the collected state to the driver once the application returns
//!
//! # Design Decisions
//! - Start phase is forgiving: a repeated call replaces status and headers
//!   (response rewriting at two layers is common); fragments already
//!   written are kept
//! - Duplicate header names are preserved in emission order here;
//!   flattening happens in the encoder
//! - Fragments are never interleaved: the application is invoked
//!   synchronously and non-concurrently

/// Mutable response state owned by one invocation.
///
/// Created empty, filled by the application through [`ResponseCollector`],
/// discarded once the encoded reply exists.
#[derive(Debug, Default)]
pub struct ResponseState {
    /// Status line as emitted, e.g. `"200 OK"`.
    pub status_line: Option<String>,
    /// Headers in emission order; duplicates allowed.
    pub headers: Vec<(String, String)>,
    /// Body fragments in write order.
    pub fragments: Vec<Vec<u8>>,
}

impl ResponseState {
    /// Concatenation of all fragments.
    pub fn body(&self) -> Vec<u8> {
        self.fragments.concat()
    }
}

/// Start/write interface handed to the application.
#[derive(Debug, Default)]
pub struct ResponseCollector {
    state: ResponseState,
}

impl ResponseCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start phase: declare the status line and headers. Calling this
    /// again replaces both; the last call wins.
    pub fn start(&mut self, status_line: impl Into<String>, headers: Vec<(String, String)>) {
        self.state.status_line = Some(status_line.into());
        self.state.headers = headers;
    }

    /// Body phase: append the next chunk.
    pub fn write(&mut self, chunk: &[u8]) {
        self.state.fragments.push(chunk.to_vec());
    }

    pub fn started(&self) -> bool {
        self.state.status_line.is_some()
    }

    pub fn into_state(self) -> ResponseState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fragments_concatenate_in_call_order() {
        let mut collector = ResponseCollector::new();
        collector.start("200 OK", vec![]);
        collector.write(b"a");
        collector.write(b"b");
        collector.write(b"c");
        assert_eq!(collector.into_state().body(), b"abc");
    }

    #[test]
    fn repeated_start_replaces_status_and_headers() {
        let mut collector = ResponseCollector::new();
        collector.start("200 OK", vec![("X-First".into(), "1".into())]);
        collector.start("404 Not Found", vec![("X-Second".into(), "2".into())]);
        let state = collector.into_state();
        assert_eq!(state.status_line.as_deref(), Some("404 Not Found"));
        assert_eq!(state.headers, vec![("X-Second".to_string(), "2".to_string())]);
    }

    #[test]
    fn duplicate_headers_are_preserved_in_order() {
        let mut collector = ResponseCollector::new();
        collector.start(
            "200 OK",
            vec![
                ("Set-Cookie".into(), "a=1".into()),
                ("Set-Cookie".into(), "b=2".into()),
            ],
        );
        let state = collector.into_state();
        assert_eq!(state.headers.len(), 2);
        assert_eq!(state.headers[0].1, "a=1");
        assert_eq!(state.headers[1].1, "b=2");
    }

    #[test]
    fn zero_writes_yield_an_empty_body() {
        let mut collector = ResponseCollector::new();
        collector.start("204 No Content", vec![]);
        assert!(collector.into_state().body().is_empty());
    }
}

//! End-to-end checks of the adapter contract: decode, application
//! invocation, collection, encoding, and the failure boundary.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use base64::Engine as _;
use blog_publisher::adapter::{
    Application, CanonicalRequest, EventRequest, Gateway, ObjectRequest, RequestWire,
    ResponseCollector, WireFamily, WireResponse,
};

/// Application scripted from a plain function.
struct Scripted(fn(&CanonicalRequest, &mut ResponseCollector) -> anyhow::Result<()>);

impl Application for Scripted {
    fn call(
        &self,
        request: &CanonicalRequest,
        response: &mut ResponseCollector,
    ) -> anyhow::Result<()> {
        (self.0)(request, response)
    }
}

fn get_event() -> RequestWire {
    RequestWire::Event(EventRequest {
        http_method: Some("GET".to_string()),
        path: "/".to_string(),
        ..EventRequest::default()
    })
}

fn get_object() -> RequestWire {
    RequestWire::Object(ObjectRequest {
        method: "GET".to_string(),
        path: "/".to_string(),
        ..ObjectRequest::default()
    })
}

#[test]
fn cors_defaults_are_present_for_both_families() {
    let gateway = Gateway::new(Scripted(|_req, rsp| {
        rsp.start("200 OK", vec![]);
        Ok(())
    }));

    for wire in [get_event(), get_object()] {
        let reply = gateway.adapt(&wire);
        assert_eq!(reply.status(), 200);
        assert_eq!(
            reply.headers().get("Access-Control-Allow-Origin").map(String::as_str),
            Some("*")
        );
        assert_eq!(
            reply.headers().get("Access-Control-Allow-Methods").map(String::as_str),
            Some("GET, POST, PUT, DELETE, OPTIONS")
        );
        assert_eq!(
            reply.headers().get("Access-Control-Allow-Headers").map(String::as_str),
            Some("Content-Type, Authorization")
        );
    }
}

#[test]
fn application_set_cors_header_survives_unchanged() {
    let gateway = Gateway::new(Scripted(|_req, rsp| {
        rsp.start(
            "200 OK",
            vec![(
                "Access-Control-Allow-Origin".to_string(),
                "https://example.com".to_string(),
            )],
        );
        Ok(())
    }));

    let reply = gateway.adapt(&get_event());
    assert_eq!(
        reply.headers().get("Access-Control-Allow-Origin").map(String::as_str),
        Some("https://example.com")
    );
    // The other defaults are still added.
    assert!(reply.headers().contains_key("Access-Control-Allow-Methods"));
}

#[test]
fn base64_event_body_round_trips() {
    let payload: Vec<u8> = vec![0x00, 0x9f, 0x92, 0x96];
    let gateway = Gateway::new(Scripted(|req, rsp| {
        rsp.start("200 OK", vec![]);
        rsp.write(&req.body);
        Ok(())
    }));

    let wire = RequestWire::Event(EventRequest {
        http_method: Some("POST".to_string()),
        path: "/api/echo".to_string(),
        body: Some(base64::engine::general_purpose::STANDARD.encode(&payload)),
        is_base64_encoded: true,
        ..EventRequest::default()
    });

    let reply = gateway.adapt(&wire);
    match &reply {
        WireResponse::Event(event) => assert!(event.is_base64_encoded),
        WireResponse::Object(_) => panic!("wrong family"),
    }
    assert_eq!(reply.body_bytes(), payload);
}

#[test]
fn body_chunks_concatenate_in_write_order() {
    let gateway = Gateway::new(Scripted(|_req, rsp| {
        rsp.start("200 OK", vec![]);
        rsp.write(b"a");
        rsp.write(b"b");
        rsp.write(b"c");
        Ok(())
    }));

    let reply = gateway.adapt(&get_event());
    assert_eq!(reply.body_bytes(), b"abc");
}

#[test]
fn fault_mid_body_is_contained_as_500() {
    let gateway = Gateway::new(Scripted(|_req, rsp| {
        rsp.start("200 OK", vec![]);
        rsp.write(b"partial");
        anyhow::bail!("upstream exploded")
    }));

    let reply = gateway.adapt(&get_event());
    assert_eq!(reply.status(), 500);
    let body = reply.body_bytes();
    assert!(!body.is_empty());
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["success"], false);
    assert!(json["error"].as_str().unwrap().contains("upstream exploded"));
    // Even the failure reply carries the cross-origin defaults.
    assert!(reply.headers().contains_key("Access-Control-Allow-Origin"));
}

#[test]
fn base64_text_event_decodes_with_derived_length() {
    let gateway = Gateway::new(Scripted(|req, rsp| {
        assert_eq!(req.body, b"hello");
        assert_eq!(req.content_type(), Some("text/plain"));
        assert_eq!(req.content_length(), 5);
        assert_eq!(req.headers.get("content-length"), Some("5"));
        rsp.start("200 OK", vec![]);
        rsp.write(&req.body);
        Ok(())
    }));

    let wire = RequestWire::Event(EventRequest {
        http_method: Some("POST".to_string()),
        path: "/api/echo".to_string(),
        headers: BTreeMap::from([("content-type".to_string(), "text/plain".to_string())]),
        body: Some("aGVsbG8=".to_string()),
        is_base64_encoded: true,
        ..EventRequest::default()
    });

    let reply = gateway.adapt(&wire);
    assert_eq!(reply.status(), 200);
    assert_eq!(reply.body_bytes(), b"hello");
}

#[test]
fn object_query_bytes_pass_through_unchanged() {
    let gateway = Gateway::new(Scripted(|req, rsp| {
        rsp.start("200 OK", vec![]);
        rsp.write(req.query.as_bytes());
        Ok(())
    }));

    let wire = RequestWire::Object(ObjectRequest {
        method: "GET".to_string(),
        path: "/api/files".to_string(),
        query: Some(b"path=content/posts".to_vec()),
        ..ObjectRequest::default()
    });

    let reply = gateway.adapt(&wire);
    assert_eq!(reply.body_bytes(), b"path=content/posts");
}

#[test]
fn header_lookup_is_case_insensitive_inside_the_application() {
    let gateway = Gateway::new(Scripted(|req, rsp| {
        assert_eq!(req.headers.get("Content-Type"), req.headers.get("content-type"));
        rsp.start("200 OK", vec![]);
        Ok(())
    }));

    let wire = RequestWire::Event(EventRequest {
        http_method: Some("GET".to_string()),
        headers: BTreeMap::from([("Content-Type".to_string(), "application/json".to_string())]),
        ..EventRequest::default()
    });

    assert_eq!(gateway.adapt(&wire).status(), 200);
}

#[test]
fn repeated_start_last_call_wins() {
    let gateway = Gateway::new(Scripted(|_req, rsp| {
        rsp.start("200 OK", vec![("X-Layer".to_string(), "inner".to_string())]);
        rsp.start("201 Created", vec![("X-Layer".to_string(), "outer".to_string())]);
        Ok(())
    }));

    let reply = gateway.adapt(&get_event());
    assert_eq!(reply.status(), 201);
    assert_eq!(reply.headers().get("X-Layer").map(String::as_str), Some("outer"));
}

#[test]
fn malformed_status_line_becomes_500() {
    let gateway = Gateway::new(Scripted(|_req, rsp| {
        rsp.start("teapot", vec![]);
        Ok(())
    }));

    let reply = gateway.adapt(&get_event());
    assert_eq!(reply.status(), 500);
}

#[test]
fn never_starting_a_response_becomes_500() {
    let gateway = Gateway::new(Scripted(|_req, _rsp| Ok(())));
    let reply = gateway.adapt(&get_object());
    assert_eq!(reply.status(), 500);
    assert_eq!(reply.family(), WireFamily::Object);
}

#[test]
fn decode_error_short_circuits_before_the_application() {
    static INVOKED: AtomicBool = AtomicBool::new(false);

    let gateway = Gateway::new(Scripted(|_req, rsp| {
        INVOKED.store(true, Ordering::SeqCst);
        rsp.start("200 OK", vec![]);
        Ok(())
    }));

    // No method at all: structurally absent.
    let reply = gateway.adapt(&RequestWire::Event(EventRequest::default()));
    assert_eq!(reply.status(), 500);
    assert!(!INVOKED.load(Ordering::SeqCst));

    let json: serde_json::Value = serde_json::from_slice(&reply.body_bytes()).unwrap();
    assert_eq!(json["success"], false);
}

#[test]
fn reply_family_always_matches_request_family() {
    let gateway = Gateway::new(Scripted(|_req, rsp| {
        rsp.start("200 OK", vec![]);
        Ok(())
    }));

    assert_eq!(gateway.adapt(&get_event()).family(), WireFamily::Event);
    assert_eq!(gateway.adapt(&get_object()).family(), WireFamily::Object);
}

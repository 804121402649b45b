//! API surface tests: the publisher application driven through the
//! adapter with offline service substitutes.

use serde_json::{json, Value};

use blog_publisher::adapter::{EventRequest, Gateway, RequestWire, WireResponse};
use blog_publisher::config::{AppConfig, RepoConfig};
use blog_publisher::services::{ChatService, RepoService, Services};
use blog_publisher::PublisherApp;

/// Gateway over the app with the mock chat service and no repository.
fn offline_gateway() -> Gateway<PublisherApp> {
    let config = AppConfig::default();
    let services = Services {
        chat: ChatService::Mock,
        repo: None,
    };
    Gateway::new(PublisherApp::new(config, services))
}

/// Gateway with a credentialed (but never contacted) repository service,
/// for routes that validate input before any upstream call.
fn credentialed_gateway() -> Gateway<PublisherApp> {
    let mut config = AppConfig::default();
    config.repo = RepoConfig {
        token: "test-token".to_string(),
        owner: "octo".to_string(),
        repo: "blog".to_string(),
        ..RepoConfig::default()
    };
    let repo = RepoService::from_config(&config.repo).expect("credentials are set");
    let services = Services {
        chat: ChatService::Mock,
        repo: Some(repo),
    };
    Gateway::new(PublisherApp::new(config, services))
}

fn request(method: &str, path: &str) -> EventRequest {
    EventRequest {
        http_method: Some(method.to_string()),
        path: path.to_string(),
        ..EventRequest::default()
    }
}

fn request_with_body(method: &str, path: &str, body: &Value) -> EventRequest {
    EventRequest {
        body: Some(body.to_string()),
        ..request(method, path)
    }
}

fn adapt(gateway: &Gateway<PublisherApp>, event: EventRequest) -> (u16, Value) {
    let reply = gateway.adapt(&RequestWire::Event(event));
    let status = reply.status();
    let body = reply.body_bytes();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).expect("reply body is JSON")
    };
    (status, json)
}

#[test]
fn health_reports_ok_with_a_timestamp() {
    let gateway = offline_gateway();
    let (status, body) = adapt(&gateway, request("GET", "/api/health"));
    assert_eq!(status, 200);
    assert_eq!(body["success"], true);
    assert_eq!(body["status"], "ok");
    assert!(body["timestamp"].as_str().is_some());
}

#[test]
fn unknown_route_is_404_json() {
    let gateway = offline_gateway();
    let (status, body) = adapt(&gateway, request("GET", "/api/nope"));
    assert_eq!(status, 404);
    assert_eq!(body["success"], false);
}

#[test]
fn options_preflight_is_204_with_cors_headers() {
    let gateway = offline_gateway();
    let reply = gateway.adapt(&RequestWire::Event(request("OPTIONS", "/api/publish")));
    assert_eq!(reply.status(), 204);
    assert!(reply.body_bytes().is_empty());
    assert_eq!(
        reply.headers().get("Access-Control-Allow-Origin").map(String::as_str),
        Some("*")
    );
}

#[test]
fn replies_are_json_with_content_type() {
    let gateway = offline_gateway();
    let reply = gateway.adapt(&RequestWire::Event(request("GET", "/api/health")));
    match reply {
        WireResponse::Event(event) => {
            assert_eq!(event.headers.get("Content-Type").map(String::as_str), Some("application/json"));
        }
        WireResponse::Object(_) => panic!("wrong family"),
    }
}

#[test]
fn banner_answers_at_the_root() {
    let gateway = offline_gateway();
    let reply = gateway.adapt(&RequestWire::Event(request("GET", "/")));
    assert_eq!(reply.status(), 200);
    assert!(String::from_utf8(reply.body_bytes()).unwrap().contains("blog-publisher"));
}

#[test]
fn preview_renders_front_matter_block() {
    let gateway = offline_gateway();
    let (status, body) = adapt(
        &gateway,
        request_with_body(
            "POST",
            "/api/preview",
            &json!({ "title": "Hello World", "date": "2024-12-25", "tags": ["rust"] }),
        ),
    );
    assert_eq!(status, 200);
    let block = body["front_matter"].as_str().unwrap();
    assert!(block.starts_with("---"));
    assert!(block.contains("title: \"Hello World\""));
    assert!(block.contains("date: \"2024-12-25\""));
}

#[test]
fn preview_without_title_is_400() {
    let gateway = offline_gateway();
    let (status, body) = adapt(
        &gateway,
        request_with_body("POST", "/api/preview", &json!({ "content": "body" })),
    );
    assert_eq!(status, 400);
    assert_eq!(body["success"], false);
}

#[test]
fn format_with_mock_service_appends_advisory() {
    let gateway = offline_gateway();
    let (status, body) = adapt(
        &gateway,
        request_with_body("POST", "/api/format", &json!({ "content": "raw article" })),
    );
    assert_eq!(status, 200);
    let formatted = body["formatted_content"].as_str().unwrap();
    assert!(formatted.starts_with("raw article"));
    assert!(formatted.contains("<!--"));
}

#[test]
fn format_without_content_is_400() {
    let gateway = offline_gateway();
    let (status, _) = adapt(
        &gateway,
        request_with_body("POST", "/api/format", &json!({ "title": "no content" })),
    );
    assert_eq!(status, 400);
}

#[test]
fn verify_password_accepts_the_configured_password() {
    let gateway = offline_gateway();
    let password = AppConfig::default().publish.password;
    let (status, body) = adapt(
        &gateway,
        request_with_body("POST", "/api/verify-password", &json!({ "password": password })),
    );
    assert_eq!(status, 200);
    assert_eq!(body["success"], true);
}

#[test]
fn verify_password_rejects_a_wrong_password() {
    let gateway = offline_gateway();
    let (status, body) = adapt(
        &gateway,
        request_with_body("POST", "/api/verify-password", &json!({ "password": "nope" })),
    );
    assert_eq!(status, 401);
    assert_eq!(body["success"], false);
}

#[test]
fn publish_without_repository_reports_misconfiguration() {
    let gateway = offline_gateway();
    let (status, body) = adapt(
        &gateway,
        request_with_body("POST", "/api/publish", &json!({ "content": "an article" })),
    );
    assert_eq!(status, 503);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("not configured"));
}

#[test]
fn config_reports_publishing_defaults() {
    let gateway = offline_gateway();
    let (status, body) = adapt(&gateway, request("GET", "/api/config"));
    assert_eq!(status, 200);
    assert_eq!(body["config"]["default_target_dir"], "content/posts");
    assert_eq!(body["config"]["supported_formats"][0], "md");
}

#[test]
fn upload_image_rejects_unsupported_extensions() {
    let gateway = credentialed_gateway();
    let (status, body) = adapt(
        &gateway,
        request_with_body(
            "POST",
            "/api/upload-image",
            &json!({ "filename": "script.exe", "content_base64": "aGVsbG8=" }),
        ),
    );
    assert_eq!(status, 400);
    assert!(body["error"].as_str().unwrap().contains("unsupported"));
}

#[test]
fn upload_image_requires_content() {
    let gateway = credentialed_gateway();
    let (status, _) = adapt(
        &gateway,
        request_with_body("POST", "/api/upload-image", &json!({ "filename": "a.png" })),
    );
    assert_eq!(status, 400);
}

#[test]
fn file_routes_require_a_path() {
    let gateway = credentialed_gateway();
    let (status, body) = adapt(&gateway, request("GET", "/api/file"));
    assert_eq!(status, 400);
    assert!(body["error"].as_str().unwrap().contains("missing file path"));

    let (status, _) = adapt(&gateway, request("DELETE", "/api/file"));
    assert_eq!(status, 400);
}

use burrow::http::request::{Method, Request, RequestBuilder};

fn request(version: &str, path: &str, headers: &[(&str, &str)]) -> Request {
    Request {
        method: Method::GET,
        path: path.to_string(),
        version: version.to_string(),
        headers: headers.iter().copied().collect(),
        body: vec![],
    }
}

#[test]
fn test_request_header_retrieval() {
    let req = request(
        "HTTP/1.1",
        "/",
        &[("Host", "example.com"), ("Content-Type", "application/json")],
    );

    assert_eq!(req.header("Host"), Some("example.com"));
    assert_eq!(req.header("Content-Type"), Some("application/json"));
    assert_eq!(req.header("Missing"), None);
}

#[test]
fn test_request_header_lookup_ignores_case() {
    let req = request("HTTP/1.1", "/", &[("content-length", "7")]);

    assert_eq!(req.header("Content-Length"), Some("7"));
    assert_eq!(req.content_length(), 7);
}

#[test]
fn test_request_content_length_missing() {
    let req = request("HTTP/1.1", "/", &[]);
    assert_eq!(req.content_length(), 0);
}

#[test]
fn test_request_content_length_invalid() {
    let req = request("HTTP/1.1", "/", &[("Content-Length", "not-a-number")]);
    assert_eq!(req.content_length(), 0);
}

#[test]
fn test_request_keep_alive_http11_default() {
    assert!(request("HTTP/1.1", "/", &[]).keep_alive());
}

#[test]
fn test_request_keep_alive_close() {
    assert!(!request("HTTP/1.1", "/", &[("Connection", "close")]).keep_alive());
    assert!(!request("HTTP/1.1", "/", &[("connection", "Close")]).keep_alive());
}

#[test]
fn test_request_keep_alive_http10() {
    assert!(!request("HTTP/1.0", "/", &[]).keep_alive());
    assert!(request("HTTP/1.0", "/", &[("Connection", "Keep-Alive")]).keep_alive());
}

#[test]
fn test_request_path_and_query() {
    let req = request("HTTP/1.1", "/search/items?q=rust&page=2", &[]);

    assert_eq!(req.path_only(), "/search/items");
    assert_eq!(req.query().as_deref(), Some("q=rust&page=2"));
}

#[test]
fn test_request_path_without_query() {
    let req = request("HTTP/1.1", "/missing.txt", &[]);

    assert_eq!(req.path_only(), "/missing.txt");
    assert_eq!(req.query(), None);
}

#[test]
fn test_request_method_from_string() {
    assert_eq!(Method::from_str("GET"), Some(Method::GET));
    assert_eq!(Method::from_str("POST"), Some(Method::POST));
    assert_eq!(Method::from_str("INVALID"), None);
    assert_eq!(Method::from_str("get"), None); // Case-sensitive
    assert_eq!(Method::PATCH.as_str(), "PATCH");
}

#[test]
fn test_request_builder_defaults_version() {
    let req = RequestBuilder::new()
        .method(Method::POST)
        .path("/api")
        .header("Content-Type", "text/plain")
        .body(b"payload".to_vec())
        .build()
        .unwrap();

    assert_eq!(req.version, "HTTP/1.1");
    assert_eq!(req.body, b"payload".to_vec());
    assert_eq!(req.header("content-type"), Some("text/plain"));
}

#[test]
fn test_request_builder_requires_method_and_path() {
    assert!(RequestBuilder::new().path("/").build().is_err());
    assert!(RequestBuilder::new().method(Method::GET).build().is_err());
}

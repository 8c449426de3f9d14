use burrow::http::response::{html_escape, Response, ResponseBuilder, StatusCode};
use burrow::http::writer::{serialize_response, ResponseWriter};

#[test]
fn test_status_lines() {
    let cases = [
        (StatusCode::Ok, 200, "OK"),
        (StatusCode::Created, 201, "Created"),
        (StatusCode::NoContent, 204, "No Content"),
        (StatusCode::BadRequest, 400, "Bad Request"),
        (StatusCode::NotFound, 404, "Not Found"),
        (StatusCode::MethodNotAllowed, 405, "Method Not Allowed"),
        (StatusCode::PayloadTooLarge, 413, "Payload Too Large"),
        (StatusCode::InternalServerError, 500, "Internal Server Error"),
        (StatusCode::NotImplemented, 501, "Not Implemented"),
    ];

    for (status, code, reason) in cases {
        assert_eq!(status.as_u16(), code);
        assert_eq!(status.reason_phrase(), reason);

        let wire = serialize_response(&ResponseBuilder::new(status).build(), true);
        let expected = format!("HTTP/1.1 {code} {reason}\r\n");
        assert!(wire.starts_with(expected.as_bytes()));
    }
}

#[test]
fn test_response_builder_auto_content_length() {
    let response = ResponseBuilder::new(StatusCode::Ok)
        .body(b"This is the body".to_vec())
        .build();

    assert_eq!(response.header("Content-Length"), Some("16"));
}

#[test]
fn test_response_builder_preserves_custom_content_length() {
    let response = ResponseBuilder::new(StatusCode::Ok)
        .header("Content-Length", "999")
        .body(b"test".to_vec())
        .build();

    assert_eq!(response.header("content-length"), Some("999"));
    assert_eq!(response.headers.len(), 1);
}

#[test]
fn test_response_builder_empty_body() {
    let response = ResponseBuilder::new(StatusCode::NoContent).build();

    assert_eq!(response.body.len(), 0);
    assert_eq!(response.header("Content-Length"), Some("0"));
}

#[test]
fn test_response_ok_helper() {
    let response = Response::ok(b"test content".to_vec());

    assert_eq!(response.status, StatusCode::Ok);
    assert_eq!(response.body, b"test content".to_vec());
}

#[test]
fn test_response_not_found_names_the_path() {
    let response = Response::not_found("/missing.txt");
    let body = String::from_utf8(response.body.clone()).unwrap();

    assert_eq!(response.status, StatusCode::NotFound);
    assert!(body.contains("/missing.txt"));
    assert_eq!(response.header("content-type"), Some("text/html; charset=utf-8"));
}

#[test]
fn test_response_not_found_escapes_the_path() {
    let response = Response::not_found("/<script>alert(1)</script>");
    let body = String::from_utf8(response.body).unwrap();

    assert!(!body.contains("<script>"));
    assert!(body.contains("&lt;script&gt;"));
}

#[test]
fn test_error_helpers() {
    assert_eq!(Response::bad_request().status, StatusCode::BadRequest);
    assert_eq!(Response::payload_too_large().status, StatusCode::PayloadTooLarge);
    assert_eq!(Response::not_implemented().status, StatusCode::NotImplemented);

    let response = Response::internal_error();
    assert_eq!(response.status, StatusCode::InternalServerError);
    assert_eq!(response.body, b"500 Internal Server Error\n".to_vec());
}

#[test]
fn test_html_escape() {
    assert_eq!(html_escape(r#"a&b<c>"d'"#), "a&amp;b&lt;c&gt;&quot;d&#39;");
    assert_eq!(html_escape("/plain/path"), "/plain/path");
}

#[test]
fn test_serialize_response_framing() {
    let response = ResponseBuilder::new(StatusCode::Ok)
        .header("Content-Type", "text/plain")
        .body(b"hello".to_vec())
        .build();

    let wire = serialize_response(&response, true);
    assert_eq!(
        wire,
        b"HTTP/1.1 200 OK\r\nContent-Length: 5\r\nContent-Type: text/plain\r\n\r\nhello".to_vec()
    );
}

#[test]
fn test_serialize_response_without_body() {
    let response = Response::ok("hello");
    let writer = ResponseWriter::headers_only(&response);

    assert_eq!(writer.bytes(), b"HTTP/1.1 200 OK\r\nContent-Length: 5\r\n\r\n");
}

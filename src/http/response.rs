use crate::http::request::Headers;

/// Status codes the server produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    Ok,
    Created,
    NoContent,
    BadRequest,
    NotFound,
    MethodNotAllowed,
    /// The request outgrew the connection's buffer limit.
    PayloadTooLarge,
    InternalServerError,
    /// The request needs a feature the server lacks, such as chunked bodies.
    NotImplemented,
}

impl StatusCode {
    fn parts(&self) -> (u16, &'static str) {
        match self {
            StatusCode::Ok => (200, "OK"),
            StatusCode::Created => (201, "Created"),
            StatusCode::NoContent => (204, "No Content"),
            StatusCode::BadRequest => (400, "Bad Request"),
            StatusCode::NotFound => (404, "Not Found"),
            StatusCode::MethodNotAllowed => (405, "Method Not Allowed"),
            StatusCode::PayloadTooLarge => (413, "Payload Too Large"),
            StatusCode::InternalServerError => (500, "Internal Server Error"),
            StatusCode::NotImplemented => (501, "Not Implemented"),
        }
    }

    /// ```
    /// # use burrow::http::response::StatusCode;
    /// assert_eq!(StatusCode::NotFound.as_u16(), 404);
    /// ```
    pub fn as_u16(&self) -> u16 {
        self.parts().0
    }

    pub fn reason_phrase(&self) -> &'static str {
        self.parts().1
    }
}

/// A response waiting to be framed by [`crate::http::writer`].
#[derive(Debug, Clone)]
pub struct Response {
    pub status: StatusCode,
    pub headers: Headers,
    pub body: Vec<u8>,
}

/// Fluent construction of a [`Response`].
///
/// ```
/// # use burrow::http::response::{ResponseBuilder, StatusCode};
/// let response = ResponseBuilder::new(StatusCode::Ok)
///     .header("Content-Type", "application/json")
///     .body(b"{}".to_vec())
///     .build();
/// assert_eq!(response.header("content-length"), Some("2"));
/// ```
pub struct ResponseBuilder {
    status: StatusCode,
    headers: Headers,
    body: Vec<u8>,
}

impl ResponseBuilder {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: Headers::new(),
            body: Vec::new(),
        }
    }

    /// Sets a header, replacing any earlier value for the same name.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    /// Fills in `Content-Length` from the body unless it was set explicitly.
    pub fn build(mut self) -> Response {
        if !self.headers.contains("Content-Length") {
            self.headers.insert("Content-Length", self.body.len().to_string());
        }

        Response {
            status: self.status,
            headers: self.headers,
            body: self.body,
        }
    }
}

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";
const TEXT_HTML: &str = "text/html; charset=utf-8";

impl Response {
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        ResponseBuilder::new(StatusCode::Ok).body(body.into()).build()
    }

    /// HTML page saying `path` was not found. The path is escaped.
    ///
    /// ```
    /// # use burrow::http::response::{Response, StatusCode};
    /// let response = Response::not_found("/missing.txt");
    /// assert_eq!(response.status, StatusCode::NotFound);
    /// assert!(String::from_utf8_lossy(&response.body).contains("/missing.txt"));
    /// ```
    pub fn not_found(path: &str) -> Self {
        let body = format!(
            "<!DOCTYPE html>\n<html><head><title>404 Not Found</title></head>\
             <body><h1>Not Found</h1><p>The requested URL {} was not found on this server.</p></body></html>\n",
            html_escape(path)
        );
        ResponseBuilder::new(StatusCode::NotFound)
            .header("Content-Type", TEXT_HTML)
            .body(body.into_bytes())
            .build()
    }

    pub fn bad_request() -> Self {
        Self::plain_error(StatusCode::BadRequest)
    }

    pub fn payload_too_large() -> Self {
        Self::plain_error(StatusCode::PayloadTooLarge)
    }

    pub fn not_implemented() -> Self {
        Self::plain_error(StatusCode::NotImplemented)
    }

    pub fn internal_error() -> Self {
        Self::plain_error(StatusCode::InternalServerError)
    }

    fn plain_error(status: StatusCode) -> Self {
        let body = format!("{} {}\n", status.as_u16(), status.reason_phrase());
        ResponseBuilder::new(status)
            .header("Content-Type", TEXT_PLAIN)
            .body(body.into_bytes())
            .build()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }
}

/// Escapes the characters that are significant in HTML text.
pub fn html_escape(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

use burrow::http::request::{Method, Request, RequestBuilder};
use burrow::http::responder::{PathResponder, Responder, ResponderRegistry};
use burrow::http::response::{Response, StatusCode};

fn get(path: &str) -> Request {
    RequestBuilder::new().method(Method::GET).path(path).build().unwrap()
}

fn body(response: &Response) -> String {
    String::from_utf8(response.body.clone()).unwrap()
}

struct Prefix(&'static str, &'static str);

impl Responder for Prefix {
    fn matches(&self, request: &Request) -> bool {
        request.path.starts_with(self.0)
    }

    fn respond(&self, _request: &Request) -> Response {
        Response::ok(self.1)
    }
}

#[test]
fn test_empty_registry_answers_not_found() {
    let registry = ResponderRegistry::new();
    assert!(registry.is_empty());

    let response = registry.respond(&get("/missing.txt"));
    assert_eq!(response.status, StatusCode::NotFound);
    assert!(body(&response).contains("/missing.txt"));
}

#[test]
fn test_not_found_names_path_without_query() {
    let mut registry = ResponderRegistry::new();
    registry.register(PathResponder::new("/", |_| Response::ok("root")));

    let response = registry.respond(&get("/missing.txt?version=2"));
    assert_eq!(response.status, StatusCode::NotFound);
    assert!(body(&response).contains("/missing.txt"));
    assert!(!body(&response).contains("version=2"));
}

#[test]
fn test_latest_registration_wins() {
    let mut registry = ResponderRegistry::new();
    registry.register(Prefix("/", "first"));
    registry.register(Prefix("/", "second"));

    assert_eq!(registry.len(), 2);
    assert_eq!(body(&registry.respond(&get("/anything"))), "second");
}

#[test]
fn test_earlier_responder_still_serves_what_later_ones_skip() {
    let mut registry = ResponderRegistry::new();
    registry.register(Prefix("/", "catch-all"));
    registry.register(PathResponder::new("/status", |_| Response::ok("up")));

    assert_eq!(body(&registry.respond(&get("/status"))), "up");
    assert_eq!(body(&registry.respond(&get("/other"))), "catch-all");
}

#[test]
fn test_path_responder_ignores_query() {
    let mut registry = ResponderRegistry::new();
    registry.register(PathResponder::new("/search", |req: &Request| {
        Response::ok(req.query().unwrap_or_default())
    }));

    let response = registry.respond(&get("/search?q=burrow"));
    assert_eq!(response.status, StatusCode::Ok);
    assert_eq!(body(&response), "q=burrow");
}

#[test]
fn test_path_responder_method_filter() {
    let responder = PathResponder::new("/items", |_| Response::ok("created")).with_method(Method::POST);

    let post = RequestBuilder::new().method(Method::POST).path("/items").build().unwrap();
    assert!(responder.matches(&post));
    assert!(!responder.matches(&get("/items")));
}

#[test]
fn test_get_responder_answers_head() {
    let responder = PathResponder::new("/", |_| Response::ok("hi")).with_method(Method::GET);

    let head = RequestBuilder::new().method(Method::HEAD).path("/").build().unwrap();
    let delete = RequestBuilder::new().method(Method::DELETE).path("/").build().unwrap();
    assert!(responder.matches(&head));
    assert!(!responder.matches(&delete));
}

#[test]
fn test_path_responder_exact_match_only() {
    let responder = PathResponder::new("/index.html", |_| Response::ok("hello"));

    assert!(responder.matches(&get("/index.html")));
    assert!(!responder.matches(&get("/index.htm")));
    assert!(!responder.matches(&get("/index.html/extra")));
}

//! Request dispatch to responders.
//!
//! A [`ResponderRegistry`] is filled during setup, then frozen behind an
//! `Arc` and shared with every connection. Because connections only hold
//! a shared reference, nothing can register while requests are being
//! dispatched.

use std::sync::Arc;

use crate::http::request::{Method, Request};
use crate::http::response::Response;

/// Produces responses for the requests it recognises.
pub trait Responder: Send + Sync {
    fn matches(&self, request: &Request) -> bool;

    /// Only called for requests where [`matches`](Self::matches) is true.
    fn respond(&self, request: &Request) -> Response;
}

/// Ordered list of responders. The most recently registered is tried first.
#[derive(Default, Clone)]
pub struct ResponderRegistry {
    responders: Vec<Arc<dyn Responder>>,
}

impl ResponderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `responder` ahead of everything registered so far.
    pub fn register(&mut self, responder: impl Responder + 'static) {
        self.responders.insert(0, Arc::new(responder));
    }

    /// Answers with the first matching responder, or a 404 naming the
    /// requested path.
    pub fn respond(&self, request: &Request) -> Response {
        self.responders
            .iter()
            .find(|responder| responder.matches(request))
            .map(|responder| responder.respond(request))
            .unwrap_or_else(|| Response::not_found(&request.path_only()))
    }

    pub fn len(&self) -> usize {
        self.responders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.responders.is_empty()
    }
}

/// Matches one exact path (query string ignored) and hands the request to
/// a closure.
///
/// # Example
///
/// ```
/// # use burrow::http::responder::{PathResponder, ResponderRegistry};
/// # use burrow::http::response::Response;
/// let mut registry = ResponderRegistry::new();
/// registry.register(PathResponder::new("/hello", |_| Response::ok("hello")));
/// assert_eq!(registry.len(), 1);
/// ```
pub struct PathResponder<F> {
    path: String,
    method: Option<Method>,
    action: F,
}

impl<F> PathResponder<F>
where
    F: Fn(&Request) -> Response + Send + Sync,
{
    pub fn new(path: impl Into<String>, action: F) -> Self {
        Self {
            path: path.into(),
            method: None,
            action,
        }
    }

    /// Restricts matching to one method. A GET responder also answers HEAD.
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }
}

impl<F> Responder for PathResponder<F>
where
    F: Fn(&Request) -> Response + Send + Sync,
{
    fn matches(&self, request: &Request) -> bool {
        let method_ok = match self.method {
            None => true,
            Some(Method::GET) => matches!(request.method, Method::GET | Method::HEAD),
            Some(method) => request.method == method,
        };
        method_ok && request.path_only() == self.path
    }

    fn respond(&self, request: &Request) -> Response {
        (self.action)(request)
    }
}

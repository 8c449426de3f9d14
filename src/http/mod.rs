//! HTTP/1.x on top of the generic [`crate::server`] loop.
//!
//! [`server::HttpHandler`] is the [`crate::server::ServerHandler`] that
//! turns each accepted socket into an [`connection::HttpConnection`].
//! Requests are answered by the first matching responder in a
//! [`responder::ResponderRegistry`]; anything unmatched gets a 404 page.
//!
//! Bytes flow through the submodules in this order: `connection` reads,
//! `parser` builds a `request`, the `responder` registry (or a
//! `static_files` root typed via `mime`) produces a `response`, and
//! `writer` frames it back onto the socket.
//!
//! # Connection State Machine
//!
//! A connection moves through these states, advanced once per readiness
//! notification:
//!
//! ```text
//!        ┌─────────────────────┐
//!        │ AwaitingRequestLine │ ← Wait for "GET /path HTTP/1.1"
//!        └──────────┬──────────┘
//!                   │ Request line parsed
//!                   ▼
//!        ┌─────────────────────┐
//!        │   AwaitingHeaders   │ ← Header lines until a blank line
//!        └──────────┬──────────┘
//!                   │ Content-Length > 0
//!                   ▼
//!        ┌─────────────────────┐
//!        │    AwaitingBody     │ ← Declared number of body bytes
//!        └──────────┬──────────┘
//!                   │ Request complete
//!                   ▼
//!        ┌─────────────────────┐
//!        │        Ready        │ ← Registry responds, response written
//!        └──────────┬──────────┘
//!                   ├─ Keep-Alive → AwaitingRequestLine
//!                   └─ Close / end-of-stream / error → Closed
//! ```
//!
//! # Example
//!
//! ```no_run
//! use burrow::http::responder::{PathResponder, ResponderRegistry};
//! use burrow::http::response::Response;
//! use burrow::http::server::HttpServer;
//! use burrow::net::address::Endpoint;
//!
//! fn main() -> anyhow::Result<()> {
//!     let mut registry = ResponderRegistry::new();
//!     registry.register(PathResponder::new("/index.html", |_| Response::ok("hello")));
//!
//!     let endpoint = Endpoint::from("127.0.0.1:8080".parse::<std::net::SocketAddr>()?);
//!     HttpServer::new(endpoint, registry).start()?;
//!     Ok(())
//! }
//! ```

pub mod request;
pub mod response;
pub mod parser;
pub mod connection;
pub mod writer;
pub mod responder;
pub mod static_files;
pub mod mime;
pub mod server;

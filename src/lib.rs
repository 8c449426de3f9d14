//! Burrow - HTTP on a hand-rolled reactor
//!
//! Raw sockets, an epoll/kqueue readiness loop, and an HTTP/1.1
//! connection layer riding on it.

pub mod config;
pub mod error;
pub mod http;
pub mod net;
pub mod reactor;
pub mod server;

//! Protocol-agnostic accept/dispatch loop.
//!
//! A [`Server`](listener::Server) owns the listening socket, the reactor
//! and every live connection. Protocols plug in through [`ServerHandler`]:
//! it builds a connection for each accepted descriptor and routes
//! readiness to it.
//!
//! ```text
//!   poll ──► listener ready ──► accept (drain) ──► create_server_connection ──► register
//!     │
//!     └────► connection ready ──► data_received ──► Closed? ──► remove + close
//! ```

pub mod listener;

pub use listener::Server;

use crate::net::address::Endpoint;
use crate::net::socket::Descriptor;

/// What a connection wants after handling a readiness event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    /// Keep watching the descriptor.
    Open,
    /// Drop the connection; its descriptor is closed with it.
    Closed,
}

/// A live connection owned by the server loop.
pub trait Connection {
    fn descriptor(&self) -> &Descriptor;

    fn local_endpoint(&self) -> &Endpoint;

    fn remote_endpoint(&self) -> &Endpoint;

    /// Called when the descriptor is readable. Must not block waiting for
    /// more input.
    fn handle_readable(&mut self) -> ConnectionStatus;
}

/// The seam between the generic loop and a concrete protocol.
pub trait ServerHandler {
    type Connection: Connection;

    /// Wraps a freshly accepted descriptor.
    fn create_server_connection(
        &self,
        descriptor: Descriptor,
        local: Endpoint,
        remote: Endpoint,
    ) -> Self::Connection;

    /// Routes a readiness event to its connection.
    fn data_received(&self, connection: &mut Self::Connection) -> ConnectionStatus {
        connection.handle_readable()
    }
}

use std::sync::Arc;

use crate::error::ServerError;
use crate::http::connection::{HttpConnection, HttpLimits};
use crate::http::responder::ResponderRegistry;
use crate::net::address::{Endpoint, Port};
use crate::net::socket::Descriptor;
use crate::server::{ConnectionStatus, Server, ServerHandler};

const DEFAULT_BACKLOG: i32 = 128;

/// Builds [`HttpConnection`]s for the generic server loop.
pub struct HttpHandler {
    registry: Arc<ResponderRegistry>,
    limits: HttpLimits,
}

impl HttpHandler {
    pub fn new(registry: Arc<ResponderRegistry>, limits: HttpLimits) -> Self {
        Self { registry, limits }
    }

    pub fn registry(&self) -> &ResponderRegistry {
        &self.registry
    }
}

impl ServerHandler for HttpHandler {
    type Connection = HttpConnection;

    fn create_server_connection(
        &self,
        descriptor: Descriptor,
        local: Endpoint,
        remote: Endpoint,
    ) -> HttpConnection {
        HttpConnection::new(descriptor, local, remote, Arc::clone(&self.registry), self.limits)
    }

    fn data_received(&self, connection: &mut HttpConnection) -> ConnectionStatus {
        connection.handle_read()
    }
}

/// An HTTP server: an endpoint, the responders that answer on it, and
/// the per-connection limits.
///
/// # Example
///
/// ```no_run
/// use burrow::http::responder::{PathResponder, ResponderRegistry};
/// use burrow::http::response::Response;
/// use burrow::http::server::HttpServer;
///
/// let mut registry = ResponderRegistry::new();
/// registry.register(PathResponder::new("/", |_| Response::ok("hello")));
///
/// HttpServer::with_hostname("localhost", 8080, registry)?.start()?;
/// # Ok::<(), burrow::error::ServerError>(())
/// ```
pub struct HttpServer {
    endpoint: Endpoint,
    registry: Arc<ResponderRegistry>,
    limits: HttpLimits,
    backlog: i32,
}

impl HttpServer {
    pub fn new(endpoint: Endpoint, registry: ResponderRegistry) -> Self {
        Self {
            endpoint,
            registry: Arc::new(registry),
            limits: HttpLimits::default(),
            backlog: DEFAULT_BACKLOG,
        }
    }

    /// Resolves `hostname` and serves on `port`.
    pub fn with_hostname(hostname: &str, port: Port, registry: ResponderRegistry) -> Result<Self, ServerError> {
        let endpoint = Endpoint::resolve(hostname, port)
            .ok_or_else(|| ServerError::UnresolvedHostname(hostname.to_string()))?;
        Ok(Self::new(endpoint, registry))
    }

    pub fn limits(mut self, limits: HttpLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn backlog(mut self, backlog: i32) -> Self {
        self.backlog = backlog;
        self
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Binds and registers the listening socket without serving yet.
    pub fn listen(self) -> Result<Server<HttpHandler>, ServerError> {
        let handler = HttpHandler::new(self.registry, self.limits);
        Server::listen(&self.endpoint, self.backlog, handler)
    }

    /// Binds and serves until the process exits.
    pub fn start(self) -> Result<(), ServerError> {
        self.listen()?.run()
    }
}

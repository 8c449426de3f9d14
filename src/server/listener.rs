use std::collections::HashMap;
use std::io;
use std::os::fd::RawFd;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::error::ServerError;
use crate::net::address::Endpoint;
use crate::net::socket::{self, Descriptor};
use crate::reactor::{PlatformReactor, Reactor};
use crate::server::{Connection, ConnectionStatus, ServerHandler};

/// A listening socket plus every connection accepted from it, driven by
/// one reactor on one thread.
pub struct Server<H: ServerHandler, R: Reactor = PlatformReactor> {
    listener: Descriptor,
    reactor: R,
    local: Endpoint,
    handler: H,
    connections: HashMap<RawFd, H::Connection>,
    ready: Vec<RawFd>,
    /// Spare descriptor given up to refuse a connection when the process
    /// runs out of descriptors.
    reserve: Option<Descriptor>,
}

impl<H: ServerHandler, R: Reactor> Server<H, R> {
    /// Binds `endpoint`, creates the reactor and registers the listening
    /// socket. Nothing is accepted until [`turn`](Self::turn) or
    /// [`run`](Self::run) is called.
    pub fn listen(endpoint: &Endpoint, backlog: i32, handler: H) -> Result<Self, ServerError> {
        let listener = socket::create_listening_socket(endpoint, backlog)
            .ok_or_else(|| ServerError::Bind(endpoint.clone()))?;
        let local = socket::local_endpoint(&listener).unwrap_or_else(|_| endpoint.clone());

        let mut reactor = R::create()?;
        reactor.register_read(&listener)?;

        let reserve = socket::reserve_descriptor()
            .inspect_err(|e| warn!(error = %e, "No spare descriptor reserved"))
            .ok();

        info!("Listening on {}", local);

        Ok(Self {
            listener,
            reactor,
            local,
            handler,
            connections: HashMap::new(),
            ready: Vec::new(),
            reserve,
        })
    }

    /// [`listen`](Self::listen) followed by [`run`](Self::run).
    pub fn start(endpoint: &Endpoint, backlog: i32, handler: H) -> Result<(), ServerError> {
        Self::listen(endpoint, backlog, handler)?.run()
    }

    /// Serves forever. Returns only if the reactor itself fails.
    pub fn run(&mut self) -> Result<(), ServerError> {
        loop {
            self.turn(None)?;
        }
    }

    /// Runs a single poll/dispatch cycle and returns the number of
    /// readiness events it handled.
    pub fn turn(&mut self, timeout: Option<Duration>) -> Result<usize, ServerError> {
        let mut ready = std::mem::take(&mut self.ready);
        if let Err(e) = self.reactor.poll(&mut ready, timeout) {
            tracing::error!(error = %e, "Reactor poll failed");
            self.ready = ready;
            return Err(ServerError::Reactor(e));
        }

        for &fd in &ready {
            if fd == self.listener.raw() {
                self.accept_pending();
            } else {
                self.dispatch(fd);
            }
        }

        let handled = ready.len();
        self.ready = ready;
        Ok(handled)
    }

    /// The bound endpoint, with the real port when bound to port 0.
    pub fn local_endpoint(&self) -> &Endpoint {
        &self.local
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    fn accept_pending(&mut self) {
        loop {
            let (descriptor, remote) = match socket::try_accept(&self.listener) {
                Ok(Some(accepted)) => accepted,
                Ok(None) => return,
                Err(e) if socket::is_descriptor_exhaustion(&e) => {
                    self.refuse_pending(&e);
                    return;
                }
                Err(e) => {
                    warn!(local = %self.local, error = %e, "accept() failed");
                    return;
                }
            };

            let fd = descriptor.raw();
            let connection = self
                .handler
                .create_server_connection(descriptor, self.local.clone(), remote);

            if let Err(e) = self.reactor.register_read(connection.descriptor()) {
                warn!(peer = %connection.remote_endpoint(), error = %e, "Failed to register connection, dropping it");
                continue;
            }

            debug!(peer = %connection.remote_endpoint(), fd, "Accepted connection");
            self.connections.insert(fd, connection);
        }
    }

    /// Out of descriptors: frees the reserve, accepts the oldest queued
    /// connection and closes it straight away so the listener stops
    /// reporting ready.
    fn refuse_pending(&mut self, cause: &io::Error) {
        let Some(reserve) = self.reserve.take() else {
            warn!(local = %self.local, error = %cause, "accept() failed with no spare descriptor");
            return;
        };
        drop(reserve);

        match socket::try_accept(&self.listener) {
            Ok(Some((_refused, remote))) => {
                warn!(peer = %remote, error = %cause, "Out of descriptors, refusing connection");
            }
            Ok(None) => {}
            Err(e) => warn!(local = %self.local, error = %e, "accept() failed"),
        }

        self.reserve = socket::reserve_descriptor()
            .inspect_err(|e| warn!(error = %e, "Could not restore spare descriptor"))
            .ok();
    }

    fn dispatch(&mut self, fd: RawFd) {
        let Some(connection) = self.connections.get_mut(&fd) else {
            debug!(fd, "Readiness for unknown descriptor");
            return;
        };

        if self.handler.data_received(connection) == ConnectionStatus::Closed {
            if let Some(connection) = self.connections.remove(&fd) {
                debug!(peer = %connection.remote_endpoint(), fd, "Connection closed");
            }
        }
    }
}

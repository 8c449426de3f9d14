use std::fmt;

use crate::net::address::Endpoint;

/// Failures that stop a server from starting or keep its loop from
/// running. Per-connection problems never surface here.
#[derive(Debug)]
pub enum ServerError {
    /// The hostname given at construction did not resolve.
    UnresolvedHostname(String),
    /// Creating, binding or listening on the socket failed.
    Bind(Endpoint),
    /// The readiness notification context could not be created or polled.
    Reactor(std::io::Error),
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerError::UnresolvedHostname(host) => write!(f, "unable to resolve hostname {host}"),
            ServerError::Bind(endpoint) => write!(f, "unable to listen on {endpoint}"),
            ServerError::Reactor(e) => write!(f, "reactor failure: {e}"),
        }
    }
}

impl std::error::Error for ServerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ServerError::Reactor(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ServerError {
    fn from(e: std::io::Error) -> Self {
        ServerError::Reactor(e)
    }
}

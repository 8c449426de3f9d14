use std::io;
use std::sync::Arc;
use std::time::Duration;

use bytes::{Buf, BytesMut};
use tracing::debug;

use crate::http::parser::{ParseError, ParseState, RequestParser};
use crate::http::request::{Method, Request};
use crate::http::responder::ResponderRegistry;
use crate::http::response::Response;
use crate::http::writer::ResponseWriter;
use crate::net::address::Endpoint;
use crate::net::socket::Descriptor;
use crate::server::{Connection, ConnectionStatus};

const READ_CHUNK: usize = 4096;

/// Per-connection bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpLimits {
    /// Most bytes one request may occupy, headers and body together.
    pub max_request_size: usize,
    /// How long a response write may wait for the peer to drain its socket.
    ///
    /// Writes are synchronous on the loop thread, so a slow reader stalls
    /// every other connection for up to this long.
    pub write_timeout: Duration,
}

impl Default for HttpLimits {
    fn default() -> Self {
        Self {
            max_request_size: 64 * 1024,
            write_timeout: Duration::from_secs(5),
        }
    }
}

/// Where a connection is in its request/response cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    AwaitingRequestLine,
    AwaitingHeaders,
    AwaitingBody,
    /// A complete request is being answered. Only passed through inside
    /// a single read, so [`HttpConnection::state`] never reports it
    /// between calls.
    Ready,
    Closed,
}

/// One accepted HTTP client.
///
/// Each readiness event drains the socket into the buffer and advances the
/// parser. Every complete request is answered synchronously on the same
/// socket; an incomplete one simply waits for the next event.
pub struct HttpConnection {
    descriptor: Descriptor,
    local: Endpoint,
    remote: Endpoint,
    buffer: BytesMut,
    parser: RequestParser,
    registry: Arc<ResponderRegistry>,
    limits: HttpLimits,
    closed: bool,
}

impl HttpConnection {
    pub fn new(
        descriptor: Descriptor,
        local: Endpoint,
        remote: Endpoint,
        registry: Arc<ResponderRegistry>,
        limits: HttpLimits,
    ) -> Self {
        Self {
            descriptor,
            local,
            remote,
            buffer: BytesMut::with_capacity(READ_CHUNK),
            parser: RequestParser::new(),
            registry,
            limits,
            closed: false,
        }
    }

    pub fn state(&self) -> ConnectionState {
        if self.closed {
            return ConnectionState::Closed;
        }
        match self.parser.state() {
            ParseState::AwaitingRequestLine => ConnectionState::AwaitingRequestLine,
            ParseState::AwaitingHeaders => ConnectionState::AwaitingHeaders,
            ParseState::AwaitingBody(_) => ConnectionState::AwaitingBody,
            ParseState::Ready => ConnectionState::Ready,
        }
    }

    /// Bytes received but not yet consumed by a complete request.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Handles one read-readiness notification.
    pub fn handle_read(&mut self) -> ConnectionStatus {
        if self.closed {
            return ConnectionStatus::Closed;
        }

        let eof = match self.fill_buffer() {
            Ok(eof) => eof,
            Err(e) => {
                debug!(peer = %self.remote, error = %e, "Read failed");
                return self.close();
            }
        };

        if self.process_buffer() == ConnectionStatus::Closed {
            return ConnectionStatus::Closed;
        }

        if eof {
            return self.close();
        }
        ConnectionStatus::Open
    }

    /// Reads until the socket would block, the peer closes, or the buffer
    /// passes the request size limit. Returns whether end-of-stream was seen.
    fn fill_buffer(&mut self) -> io::Result<bool> {
        let mut temp = [0u8; READ_CHUNK];

        while self.buffer.len() <= self.limits.max_request_size {
            match self.descriptor.recv(&mut temp) {
                Ok(0) => return Ok(true),
                Ok(n) => self.buffer.extend_from_slice(&temp[..n]),
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => return Ok(false),
                Err(e) => return Err(e),
            }
        }

        Ok(false)
    }

    /// Answers every complete request in the buffer.
    fn process_buffer(&mut self) -> ConnectionStatus {
        loop {
            match self.parser.advance(&self.buffer) {
                Ok(Some((request, consumed))) => {
                    self.buffer.advance(consumed);

                    let keep_alive = request.keep_alive();
                    let response = self.registry.respond(&request);
                    if let Err(e) = self.send(&request, response, keep_alive) {
                        debug!(peer = %self.remote, error = %e, "Write failed");
                        return self.close();
                    }
                    if !keep_alive {
                        return self.close();
                    }
                }

                Ok(None) => {
                    if self.exceeds_limit() {
                        debug!(peer = %self.remote, buffered = self.buffer.len(), "Request too large");
                        return self.reject(Response::payload_too_large());
                    }
                    return ConnectionStatus::Open;
                }

                Err(e) => {
                    debug!(peer = %self.remote, error = ?e, "Malformed request");
                    let response = match e {
                        ParseError::UnsupportedTransferEncoding => Response::not_implemented(),
                        _ => Response::bad_request(),
                    };
                    return self.reject(response);
                }
            }
        }
    }

    fn exceeds_limit(&self) -> bool {
        let max = self.limits.max_request_size;
        match self.parser.state() {
            ParseState::AwaitingBody(length) => self.parser.cursor().saturating_add(length) > max,
            _ => self.buffer.len() > max,
        }
    }

    fn send(&mut self, request: &Request, mut response: Response, keep_alive: bool) -> io::Result<()> {
        if !keep_alive {
            response.headers.insert("Connection", "close");
        }

        debug!(
            peer = %self.remote,
            method = request.method.as_str(),
            path = %request.path,
            status = response.status.as_u16(),
            "Request served"
        );

        let mut writer = if request.method == Method::HEAD {
            ResponseWriter::headers_only(&response)
        } else {
            ResponseWriter::new(&response)
        };
        writer.write_to(&self.descriptor, self.limits.write_timeout)
    }

    /// Writes an error response, best effort, and closes.
    fn reject(&mut self, mut response: Response) -> ConnectionStatus {
        response.headers.insert("Connection", "close");
        let mut writer = ResponseWriter::new(&response);
        if let Err(e) = writer.write_to(&self.descriptor, self.limits.write_timeout) {
            debug!(peer = %self.remote, error = %e, "Failed to send error response");
        }
        self.close()
    }

    fn close(&mut self) -> ConnectionStatus {
        self.closed = true;
        self.buffer.clear();
        self.parser.reset();
        ConnectionStatus::Closed
    }
}

impl Connection for HttpConnection {
    fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    fn local_endpoint(&self) -> &Endpoint {
        &self.local
    }

    fn remote_endpoint(&self) -> &Endpoint {
        &self.remote
    }

    fn handle_readable(&mut self) -> ConnectionStatus {
        self.handle_read()
    }
}

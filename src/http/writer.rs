use std::io;
use std::time::Duration;

use crate::http::response::Response;
use crate::net::socket::{Descriptor, Interest};

const HTTP_VERSION: &str = "HTTP/1.1";

/// Frames a response for the wire: status line, headers sorted by name,
/// blank line, then the body unless `include_body` is false.
pub fn serialize_response(resp: &Response, include_body: bool) -> Vec<u8> {
    let mut head = format!(
        "{HTTP_VERSION} {} {}\r\n",
        resp.status.as_u16(),
        resp.status.reason_phrase()
    );

    let mut headers: Vec<(&str, &str)> = resp.headers.iter().collect();
    headers.sort_unstable_by_key(|(name, _)| *name);
    for (name, value) in headers {
        head.push_str(name);
        head.push_str(": ");
        head.push_str(value);
        head.push_str("\r\n");
    }
    head.push_str("\r\n");

    let mut buf = head.into_bytes();
    if include_body {
        buf.extend_from_slice(&resp.body);
    }
    buf
}

/// A serialized response and how much of it has reached the socket.
pub struct ResponseWriter {
    buffer: Vec<u8>,
    written: usize,
}

impl ResponseWriter {
    pub fn new(response: &Response) -> Self {
        Self {
            buffer: serialize_response(response, true),
            written: 0,
        }
    }

    /// Like [`new`](Self::new) but without the body, for HEAD requests.
    pub fn headers_only(response: &Response) -> Self {
        Self {
            buffer: serialize_response(response, false),
            written: 0,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Writes the whole response to a non-blocking socket.
    ///
    /// When the socket buffer is full this waits for writability, giving
    /// up with `TimedOut` if none comes within `timeout`.
    pub fn write_to(&mut self, descriptor: &Descriptor, timeout: Duration) -> io::Result<()> {
        while self.written < self.buffer.len() {
            match descriptor.send(&self.buffer[self.written..]) {
                Ok(0) => {
                    return Err(io::Error::new(
                        io::ErrorKind::WriteZero,
                        "connection closed while writing",
                    ));
                }
                Ok(n) => self.written += n,
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                    if !descriptor.wait(Interest::Writable, Some(timeout))? {
                        return Err(io::Error::new(
                            io::ErrorKind::TimedOut,
                            "peer stopped reading the response",
                        ));
                    }
                }
                Err(e) => return Err(e),
            }
        }

        Ok(())
    }
}

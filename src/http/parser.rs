use crate::http::request::{Headers, Method, Request};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    InvalidRequest,
    InvalidMethod,
    InvalidHeader,
    InvalidContentLength,
    UnsupportedTransferEncoding,
    Incomplete,
}

/// Where the parser is within the current request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseState {
    AwaitingRequestLine,
    AwaitingHeaders,
    /// Headers are done; this many body bytes are expected.
    AwaitingBody(usize),
    Ready,
}

/// Incremental HTTP/1.x request parser.
///
/// The caller keeps all bytes of the current request in one buffer and
/// hands the whole buffer to [`advance`](Self::advance) every time it
/// grows. The parser remembers how far it has scanned, so each byte is
/// looked at once no matter how the request was split across reads.
#[derive(Debug)]
pub struct RequestParser {
    state: ParseState,
    cursor: usize,
    method: Option<Method>,
    path: String,
    version: String,
    headers: Headers,
    body: Vec<u8>,
}

impl Default for RequestParser {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestParser {
    pub fn new() -> Self {
        Self {
            state: ParseState::AwaitingRequestLine,
            cursor: 0,
            method: None,
            path: String::new(),
            version: String::new(),
            headers: Headers::new(),
            body: Vec::new(),
        }
    }

    pub fn state(&self) -> ParseState {
        self.state
    }

    /// Number of bytes of the current request already consumed.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Forgets any partially parsed request.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Scans newly arrived bytes.
    ///
    /// Returns `Ok(None)` while the request is incomplete. Once complete,
    /// returns the request and how many bytes of `buf` it occupied; the
    /// caller must drop those bytes before the next call.
    pub fn advance(&mut self, buf: &[u8]) -> Result<Option<(Request, usize)>, ParseError> {
        loop {
            match self.state {
                ParseState::AwaitingRequestLine => {
                    let Some((line, next)) = next_line(buf, self.cursor) else {
                        return Ok(None);
                    };
                    self.cursor = next;

                    // Stray blank lines ahead of a request line are skipped.
                    if line.is_empty() {
                        continue;
                    }

                    self.parse_request_line(line)?;
                    self.state = ParseState::AwaitingHeaders;
                }

                ParseState::AwaitingHeaders => {
                    let Some((line, next)) = next_line(buf, self.cursor) else {
                        return Ok(None);
                    };
                    self.cursor = next;

                    if line.is_empty() {
                        let length = self.body_length()?;
                        self.state = if length > 0 {
                            ParseState::AwaitingBody(length)
                        } else {
                            ParseState::Ready
                        };
                    } else {
                        self.parse_header_line(line)?;
                    }
                }

                ParseState::AwaitingBody(length) => {
                    if buf.len() - self.cursor < length {
                        return Ok(None);
                    }
                    self.body = buf[self.cursor..self.cursor + length].to_vec();
                    self.cursor += length;
                    self.state = ParseState::Ready;
                }

                ParseState::Ready => {
                    let request = Request {
                        method: self.method.take().ok_or(ParseError::InvalidRequest)?,
                        path: std::mem::take(&mut self.path),
                        version: std::mem::take(&mut self.version),
                        headers: std::mem::take(&mut self.headers),
                        body: std::mem::take(&mut self.body),
                    };
                    let consumed = self.cursor;
                    self.reset();
                    return Ok(Some((request, consumed)));
                }
            }
        }
    }

    fn parse_request_line(&mut self, line: &[u8]) -> Result<(), ParseError> {
        let line = std::str::from_utf8(line).map_err(|_| ParseError::InvalidRequest)?;
        let mut parts = line.split_whitespace();

        let method_str = parts.next().ok_or(ParseError::InvalidRequest)?;
        let path = parts.next().ok_or(ParseError::InvalidRequest)?;
        let version = parts.next().ok_or(ParseError::InvalidRequest)?;

        if parts.next().is_some() || !version.starts_with("HTTP/") {
            return Err(ParseError::InvalidRequest);
        }

        self.method = Some(Method::from_str(method_str).ok_or(ParseError::InvalidMethod)?);
        self.path = path.to_string();
        self.version = version.to_string();
        Ok(())
    }

    fn parse_header_line(&mut self, line: &[u8]) -> Result<(), ParseError> {
        let line = std::str::from_utf8(line).map_err(|_| ParseError::InvalidHeader)?;

        let (key, value) = line
            .split_once(':')
            .ok_or(ParseError::InvalidHeader)?;

        let key = key.trim();
        if key.is_empty() || key.contains(char::is_whitespace) {
            return Err(ParseError::InvalidHeader);
        }
        let value = value.trim();

        self.headers.append(key, value);
        Ok(())
    }

    fn body_length(&self) -> Result<usize, ParseError> {
        if self.headers.contains("Transfer-Encoding") {
            return Err(ParseError::UnsupportedTransferEncoding);
        }

        let Some(value) = self.headers.get("Content-Length") else {
            return Ok(0);
        };

        let mut lengths = value
            .split(',')
            .map(|v| v.trim().parse::<usize>().map_err(|_| ParseError::InvalidContentLength));
        let first = lengths.next().ok_or(ParseError::InvalidContentLength)??;
        for length in lengths {
            if length? != first {
                return Err(ParseError::InvalidContentLength);
            }
        }
        Ok(first)
    }
}

/// Finds the next line starting at `from`, accepting `\r\n` or a bare `\n`.
///
/// Returns the line without its terminator and the offset just past it.
fn next_line(buf: &[u8], from: usize) -> Option<(&[u8], usize)> {
    let rest = buf.get(from..)?;
    let newline = rest.iter().position(|&b| b == b'\n')?;
    let line = &rest[..newline];
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    Some((line, from + newline + 1))
}

/// Parses one complete request from the start of `buf`.
///
/// Returns the request and the number of bytes it used, or
/// `ParseError::Incomplete` if `buf` ends before the request does.
pub fn parse_http_request(buf: &[u8]) -> Result<(Request, usize), ParseError> {
    RequestParser::new()
        .advance(buf)?
        .ok_or(ParseError::Incomplete)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_get() {
        let req = b"GET / HTTP/1.1\r\nHost: example.com\r\n\r\n";

        let (parsed, consumed) = parse_http_request(req).unwrap();

        assert_eq!(parsed.path, "/");
        assert_eq!(parsed.headers.get("Host").unwrap(), "example.com");
        assert_eq!(consumed, req.len());
    }

    #[test]
    fn states_follow_the_bytes() {
        let mut parser = RequestParser::new();
        let mut buf = Vec::new();

        buf.extend_from_slice(b"POST /upload HT");
        assert_eq!(parser.advance(&buf), Ok(None));
        assert_eq!(parser.state(), ParseState::AwaitingRequestLine);

        buf.extend_from_slice(b"TP/1.1\r\nContent-Length: 3\r\n");
        assert_eq!(parser.advance(&buf), Ok(None));
        assert_eq!(parser.state(), ParseState::AwaitingHeaders);

        buf.extend_from_slice(b"\r\nab");
        assert_eq!(parser.advance(&buf), Ok(None));
        assert_eq!(parser.state(), ParseState::AwaitingBody(3));

        buf.extend_from_slice(b"c");
        let (request, consumed) = parser.advance(&buf).unwrap().unwrap();
        assert_eq!(request.body, b"abc".to_vec());
        assert_eq!(consumed, buf.len());
        assert_eq!(parser.state(), ParseState::AwaitingRequestLine);
        assert_eq!(parser.cursor(), 0);
    }

    #[test]
    fn byte_at_a_time_matches_one_shot() {
        let raw = b"GET /a?b=c HTTP/1.1\r\nHost: x\r\nAccept: */*\r\n\r\n";
        let (expected, _) = parse_http_request(raw).unwrap();

        let mut parser = RequestParser::new();
        let mut result = None;
        for end in 1..=raw.len() {
            if let Some(done) = parser.advance(&raw[..end]).unwrap() {
                result = Some(done);
            }
        }

        let (request, consumed) = result.unwrap();
        assert_eq!(request, expected);
        assert_eq!(consumed, raw.len());
    }

    #[test]
    fn leaves_pipelined_bytes_alone() {
        let raw = b"GET /one HTTP/1.1\r\n\r\nGET /two HTTP/1.1\r\n\r\n";
        let (first, consumed) = parse_http_request(raw).unwrap();
        assert_eq!(first.path, "/one");

        let (second, _) = parse_http_request(&raw[consumed..]).unwrap();
        assert_eq!(second.path, "/two");
    }

    #[test]
    fn bare_newlines_and_leading_blank_lines() {
        let raw = b"\r\n\nGET / HTTP/1.0\nHost: x\n\n";
        let (parsed, consumed) = parse_http_request(raw).unwrap();
        assert_eq!(parsed.version, "HTTP/1.0");
        assert_eq!(parsed.headers.get("Host").unwrap(), "x");
        assert_eq!(consumed, raw.len());
    }

    #[test]
    fn duplicate_headers_are_joined() {
        let raw = b"GET / HTTP/1.1\r\nAccept: a\r\naccept: b\r\n\r\n";
        let (parsed, _) = parse_http_request(raw).unwrap();
        assert_eq!(parsed.header("Accept"), Some("a, b"));
    }

    #[test]
    fn conflicting_content_lengths_are_rejected() {
        let raw = b"POST / HTTP/1.1\r\nContent-Length: 3\r\nContent-Length: 4\r\n\r\nabcd";
        assert_eq!(parse_http_request(raw).unwrap_err(), ParseError::InvalidContentLength);

        let raw = b"POST / HTTP/1.1\r\nContent-Length: 3\r\nContent-Length: 3\r\n\r\nabc";
        assert_eq!(parse_http_request(raw).unwrap().0.body, b"abc".to_vec());
    }

    #[test]
    fn chunked_bodies_are_not_supported() {
        let raw = b"POST / HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n";
        assert_eq!(parse_http_request(raw).unwrap_err(), ParseError::UnsupportedTransferEncoding);
    }

    #[test]
    fn request_line_needs_a_version() {
        assert_eq!(parse_http_request(b"GET /\r\n\r\n").unwrap_err(), ParseError::InvalidRequest);
        assert_eq!(parse_http_request(b"GET / FTP/1\r\n\r\n").unwrap_err(), ParseError::InvalidRequest);
    }
}

//! Request-line parsing and response framing for the status server.
//!
//! Only the method and path of the first line are read; headers and bodies
//! of requests are ignored.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    pub method: Method,
    /// Path with any query string removed.
    pub path: String,
}

/// Parse `METHOD SP PATH [SP VERSION]` from the start of a raw request.
/// Returns `None` when no request line can be found.
pub fn parse_request_line(raw: &[u8]) -> Option<RequestLine> {
    let text = String::from_utf8_lossy(raw);
    let line = text.lines().next()?;
    let mut parts = line.split_whitespace();
    let method = match parts.next()? {
        "GET" => Method::Get,
        "POST" => Method::Post,
        _ => Method::Other,
    };
    let target = parts.next()?;
    let path = target.split(['?', '#']).next().unwrap_or(target);
    Some(RequestLine {
        method,
        path: path.to_string(),
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl Response {
    pub fn html(body: Vec<u8>) -> Self {
        Self {
            status: 200,
            content_type: "text/html",
            body,
        }
    }

    pub fn json(body: Vec<u8>) -> Self {
        Self {
            status: 200,
            content_type: "application/json",
            body,
        }
    }

    pub fn not_found(msg: &str) -> Self {
        Self {
            status: 404,
            content_type: "text/plain",
            body: msg.as_bytes().to_vec(),
        }
    }

    pub fn internal_error(msg: &str) -> Self {
        Self {
            status: 500,
            content_type: "text/plain",
            body: msg.as_bytes().to_vec(),
        }
    }

    fn reason(&self) -> &'static str {
        match self.status {
            200 => "OK",
            404 => "Not Found",
            500 => "Internal Server Error",
            _ => "Unknown",
        }
    }

    /// Wire bytes; `Content-Length` is the body length in bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let head = format!(
            "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\n\r\n",
            self.status,
            self.reason(),
            self.content_type,
            self.body.len()
        );
        let mut out = Vec::with_capacity(head.len() + self.body.len());
        out.extend_from_slice(head.as_bytes());
        out.extend_from_slice(&self.body);
        out
    }
}

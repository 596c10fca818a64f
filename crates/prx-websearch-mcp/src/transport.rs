//! Wire framing for the two transports: JSON-RPC over stdio (bare lines or
//! `Content-Length` frames) and a minimal HTTP/1.1 request/response cycle.

use std::io::{self, BufRead, Write};

use serde::Serialize;

/// Largest body accepted on either transport.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// How a stdio message arrived; replies go out the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame {
    Line,
    ContentLength,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Inbound {
    Message { payload: Vec<u8>, frame: Frame },
    /// Framing was broken; the reader already skipped past it.
    Malformed { reason: String, frame: Frame },
}

/// Next stdio message, skipping blank lines. `None` at end of input.
pub fn next_inbound<R: BufRead>(reader: &mut R) -> io::Result<Option<Inbound>> {
    let mut line = String::new();
    let first = loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            break trimmed.to_string();
        }
    };

    if !is_header_line(&first) {
        return Ok(Some(Inbound::Message {
            payload: first.into_bytes(),
            frame: Frame::Line,
        }));
    }

    let length = match read_frame_headers(reader, &first) {
        Ok(length) => length,
        Err(err) => {
            return Ok(Some(Inbound::Malformed {
                reason: format!("invalid stdio frame: {err}"),
                frame: Frame::Line,
            }));
        }
    };
    if length > MAX_BODY_BYTES {
        return Ok(Some(Inbound::Malformed {
            reason: format!("frame body of {length} bytes exceeds {MAX_BODY_BYTES}"),
            frame: Frame::ContentLength,
        }));
    }
    let mut payload = vec![0_u8; length];
    Ok(Some(match reader.read_exact(&mut payload) {
        Ok(()) => Inbound::Message {
            payload,
            frame: Frame::ContentLength,
        },
        Err(err) => Inbound::Malformed {
            reason: format!("invalid stdio frame body: {err}"),
            frame: Frame::ContentLength,
        },
    }))
}

pub fn write_frame<W: Write>(out: &mut W, message: &impl Serialize, frame: Frame) -> io::Result<()> {
    let body = serde_json::to_vec(message)?;
    match frame {
        Frame::Line => {
            out.write_all(&body)?;
            out.write_all(b"\n")?;
        }
        Frame::ContentLength => {
            write!(out, "Content-Length: {}\r\n\r\n", body.len())?;
            out.write_all(&body)?;
        }
    }
    out.flush()
}

fn is_header_line(line: &str) -> bool {
    line.split_once(':').is_some_and(|(name, _)| {
        let name = name.trim();
        name.eq_ignore_ascii_case("content-length") || name.eq_ignore_ascii_case("content-type")
    })
}

/// Consumes header lines through the blank separator.
fn read_frame_headers<R: BufRead>(reader: &mut R, first: &str) -> io::Result<usize> {
    let mut length = content_length(first);
    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "unexpected eof while reading frame headers",
            ));
        }
        let header = line.trim_end_matches(['\r', '\n']);
        if header.is_empty() {
            break;
        }
        length = content_length(header).or(length);
    }
    length.ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "missing content-length header"))
}

pub fn content_length(header: &str) -> Option<usize> {
    let (name, value) = header.split_once(':')?;
    if name.trim().eq_ignore_ascii_case("content-length") {
        value.trim().parse().ok()
    } else {
        None
    }
}

#[derive(Debug)]
pub struct HttpRequest {
    pub method: String,
    /// Request target without its query string.
    pub path: String,
    pub body: Vec<u8>,
}

#[derive(Debug)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// JSON body; a value that cannot be serialized becomes a 500.
    pub fn json(status: u16, value: &impl Serialize) -> Self {
        serde_json::to_vec(value).map_or_else(
            |_| Self {
                status: 500,
                body: br#"{"error":"failed to serialize response"}"#.to_vec(),
            },
            |body| Self { status, body },
        )
    }

    pub const fn empty(status: u16) -> Self {
        Self {
            status,
            body: Vec::new(),
        }
    }
}

/// Reads one request. `None` when the peer closed without sending one.
pub fn read_http_request<R: BufRead>(reader: &mut R) -> io::Result<Option<HttpRequest>> {
    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    let request_line = line.trim_end_matches(['\r', '\n']);
    if request_line.is_empty() {
        return Ok(None);
    }

    let mut parts = request_line.split_whitespace();
    let (Some(method), Some(target)) = (parts.next(), parts.next()) else {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("malformed http request line: {request_line}"),
        ));
    };
    let method = method.to_ascii_uppercase();
    let path = target.split_once('?').map_or(target, |(p, _)| p).to_string();

    let mut length = 0usize;
    let mut header = String::new();
    loop {
        header.clear();
        if reader.read_line(&mut header)? == 0 {
            break;
        }
        let header = header.trim_end_matches(['\r', '\n']);
        if header.is_empty() {
            break;
        }
        if let Some(v) = content_length(header) {
            length = v;
        }
    }

    if length > MAX_BODY_BYTES {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("request body of {length} bytes exceeds {MAX_BODY_BYTES}"),
        ));
    }
    let mut body = vec![0_u8; length];
    reader.read_exact(&mut body)?;
    Ok(Some(HttpRequest { method, path, body }))
}

pub fn write_http_response<W: Write>(out: &mut W, response: &HttpResponse) -> io::Result<()> {
    write!(
        out,
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        response.status,
        reason_phrase(response.status),
        response.body.len()
    )?;
    out.write_all(&response.body)?;
    out.flush()
}

const fn reason_phrase(status: u16) -> &'static str {
    match status {
        202 => "Accepted",
        400 => "Bad Request",
        404 => "Not Found",
        405 => "Method Not Allowed",
        500 => "Internal Server Error",
        _ => "OK",
    }
}

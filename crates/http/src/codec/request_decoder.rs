//! HTTP request decoder module
//!
//! This module turns raw bytes into complete `http::Request<Bytes>` values. It offers
//! two entry points:
//!
//! - [`parse_request`]: parses one buffer that already holds a whole message
//! - [`RequestDecoder`]: a streaming [`Decoder`] that buffers across reads until the
//!   head and the declared body have arrived
//!
//! # Example
//!
//! ```
//! use strand_http::codec::RequestDecoder;
//! use tokio_util::codec::Decoder;
//! use bytes::BytesMut;
//!
//! let mut decoder = RequestDecoder::new();
//! let mut buffer = BytesMut::from("POST /users HTTP/1.1\r\nContent-Length: 8\r\n\r\nname");
//! assert!(decoder.decode(&mut buffer).unwrap().is_none());
//!
//! buffer.extend_from_slice(b"=neo");
//! let request = decoder.decode(&mut buffer).unwrap().unwrap();
//! assert_eq!(&request.body()[..], b"name=neo");
//! ```

use bytes::{Bytes, BytesMut};
use http::{Request, header};
use tokio_util::codec::Decoder;
use tracing::trace;

use crate::codec::body::LengthDecoder;
use crate::codec::header::HeaderDecoder;
use crate::ensure;
use crate::protocol::{ParseError, RequestHeader};

/// Maximum size in bytes accepted for a request body
pub const MAX_BODY_BYTES: usize = 8 * 1024 * 1024;

/// Parses a buffer holding one whole request.
///
/// The body is every byte following the blank line that ends the head, whatever the
/// `Content-Length` header says.
///
/// # Errors
///
/// - [`ParseError::MissingSeparator`] if the head is not terminated by a blank line
/// - [`ParseError::InvalidStartLine`] if the start line isn't `METHOD TARGET VERSION`
/// - [`ParseError::InvalidHeader`] if a header line has no `name: value` separator
pub fn parse_request(buf: &[u8]) -> Result<Request<Bytes>, ParseError> {
    let mut src = BytesMut::from(buf);
    let header = HeaderDecoder.decode(&mut src)?.ok_or(ParseError::MissingSeparator)?;
    Ok(header.body(src.freeze()))
}

/// How the body of a decoded head is delimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyLength {
    /// `Content-Length` was declared
    Declared(usize),
    /// No framing header: the bytes received with the head are the body
    Buffered,
}

/// A decoder for HTTP requests that handles both head and body
///
/// The decoder operates in two phases:
/// 1. Head parsing: decodes the request head using [`HeaderDecoder`]
/// 2. Body collection: waits for the declared body using [`LengthDecoder`]
///
/// # State Machine
///
/// The decoder keeps its state in the `pending` field:
/// - `None`: currently parsing the head
/// - `Some((header, decoder))`: head parsed, collecting the body
#[derive(Debug, Default)]
pub struct RequestDecoder {
    header_decoder: HeaderDecoder,
    pending: Option<(RequestHeader, LengthDecoder)>,
}

impl RequestDecoder {
    /// Creates a new `RequestDecoder` instance
    pub fn new() -> Self {
        Self::default()
    }
}

impl Decoder for RequestDecoder {
    type Item = Request<Bytes>;
    type Error = ParseError;

    /// Attempts to decode a whole request from the provided buffer
    ///
    /// # Returns
    ///
    /// - `Ok(Some(request))`: head and body are complete
    /// - `Ok(None)`: need more data to proceed
    /// - `Err(_)`: the bytes are not a request we accept
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if self.pending.is_none() {
            let Some(header) = self.header_decoder.decode(src)? else {
                return Ok(None);
            };

            match body_length(&header)? {
                BodyLength::Declared(length) => {
                    trace!(content_length = length, "request head decoded");
                    self.pending = Some((header, LengthDecoder::new(length)));
                }
                BodyLength::Buffered => {
                    ensure!(src.len() <= MAX_BODY_BYTES, ParseError::too_large_body(src.len() as u64, MAX_BODY_BYTES as u64));
                    let body = src.split().freeze();
                    return Ok(Some(header.body(body)));
                }
            }
        }

        let body = match &mut self.pending {
            Some((_, length_decoder)) => length_decoder.decode(src)?,
            None => None,
        };

        match (body, self.pending.take()) {
            (Some(body), Some((header, _))) => Ok(Some(header.body(body))),
            (None, pending) => {
                self.pending = pending;
                Ok(None)
            }
            (Some(_), None) => Ok(None),
        }
    }
}

/// Works out the body framing from the request head.
fn body_length(header: &RequestHeader) -> Result<BodyLength, ParseError> {
    if let Some(te_value) = header.headers().get(header::TRANSFER_ENCODING) {
        let te = String::from_utf8_lossy(te_value.as_bytes()).into_owned();
        return Err(ParseError::UnsupportedTransferEncoding(te));
    }

    let Some(cl_value) = header.headers().get(header::CONTENT_LENGTH) else {
        return Ok(BodyLength::Buffered);
    };

    let cl_str = cl_value.to_str().map_err(ParseError::invalid_content_length)?;
    let length = cl_str
        .trim()
        .parse::<u64>()
        .map_err(|e| ParseError::invalid_content_length(format!("value {cl_str}: {e}")))?;

    ensure!(length <= MAX_BODY_BYTES as u64, ParseError::too_large_body(length, MAX_BODY_BYTES as u64));

    let length = usize::try_from(length).map_err(ParseError::invalid_content_length)?;
    Ok(BodyLength::Declared(length))
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{Method, Version};
    use indoc::indoc;

    fn crlf(str: &str) -> String {
        str.replace('\n', "\r\n")
    }

    #[test]
    fn parse_whole_message() {
        let raw = crlf(indoc! {r##"
        POST /users/42?verbose=1 HTTP/1.1
        Host: 127.0.0.1:8080
        Content-Type: application/x-www-form-urlencoded

        name=neo&age=30
        "##});

        let request = parse_request(raw.as_bytes()).unwrap();

        assert_eq!(request.method(), &Method::POST);
        assert_eq!(request.uri().path(), "/users/42");
        assert_eq!(crate::protocol::raw_target(request.uri()), "/users/42?verbose=1");
        assert_eq!(request.version(), Version::HTTP_11);
        assert_eq!(request.headers()["content-type"], "application/x-www-form-urlencoded");
        // the body is not trimmed
        assert_eq!(&request.body()[..], b"name=neo&age=30\r\n");
    }

    #[test]
    fn parse_without_separator() {
        let result = parse_request(b"GET / HTTP/1.1\r\nHost: a\r\n");
        assert!(matches!(result, Err(ParseError::MissingSeparator)));
    }

    #[test]
    fn parse_two_token_start_line() {
        let result = parse_request(b"GET /\r\n\r\n");
        assert!(matches!(result, Err(ParseError::InvalidStartLine { .. })));
    }

    #[test]
    fn parse_empty_body() {
        let request = parse_request(b"GET /ping HTTP/1.1\r\n\r\n").unwrap();
        assert!(request.body().is_empty());
    }

    #[test]
    fn decode_across_reads() {
        let mut decoder = RequestDecoder::new();
        let mut buf = BytesMut::from("POST /echo HTTP/1.1\r\nContent-");

        assert!(decoder.decode(&mut buf).unwrap().is_none());

        buf.extend_from_slice(b"Length: 11\r\n\r\nhello");
        assert!(decoder.decode(&mut buf).unwrap().is_none());

        buf.extend_from_slice(b" world");
        let request = decoder.decode(&mut buf).unwrap().unwrap();

        assert_eq!(request.uri().path(), "/echo");
        assert_eq!(&request.body()[..], b"hello world");
        assert!(buf.is_empty());
    }

    #[test]
    fn decode_without_content_length_takes_buffered_bytes() {
        let mut decoder = RequestDecoder::new();
        let mut buf = BytesMut::from("POST /echo HTTP/1.1\r\n\r\nabc");

        let request = decoder.decode(&mut buf).unwrap().unwrap();
        assert_eq!(&request.body()[..], b"abc");
    }

    #[test]
    fn decode_rejects_transfer_encoding() {
        let mut decoder = RequestDecoder::new();
        let mut buf = BytesMut::from("POST /echo HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n");

        let result = decoder.decode(&mut buf);
        assert!(matches!(result, Err(ParseError::UnsupportedTransferEncoding(te)) if te == "chunked"));
    }

    #[test]
    fn decode_rejects_bad_content_length() {
        let mut decoder = RequestDecoder::new();
        let mut buf = BytesMut::from("POST /echo HTTP/1.1\r\nContent-Length: abc\r\n\r\n");

        assert!(matches!(decoder.decode(&mut buf), Err(ParseError::InvalidContentLength { .. })));
    }

    #[test]
    fn decode_rejects_oversized_body() {
        let mut decoder = RequestDecoder::new();
        let head = format!("POST /upload HTTP/1.1\r\nContent-Length: {}\r\n\r\n", MAX_BODY_BYTES + 1);
        let mut buf = BytesMut::from(head.as_str());

        assert!(matches!(decoder.decode(&mut buf), Err(ParseError::TooLargeBody { .. })));
    }

    #[test]
    fn decoder_is_reusable() {
        let mut decoder = RequestDecoder::new();
        let mut buf = BytesMut::from("GET /a HTTP/1.1\r\nContent-Length: 0\r\n\r\n");
        assert_eq!(decoder.decode(&mut buf).unwrap().unwrap().uri().path(), "/a");

        buf.extend_from_slice(b"GET /b HTTP/1.1\r\nContent-Length: 0\r\n\r\n");
        assert_eq!(decoder.decode(&mut buf).unwrap().unwrap().uri().path(), "/b");
    }
}

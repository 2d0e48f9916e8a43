//! HTTP header decoder implementation for parsing HTTP request heads
//!
//! This module decodes the request head (start line plus header fields) from raw bytes
//! into a [`RequestHeader`]. Tokenising is delegated to `httparse`; this module maps
//! its outcome onto our own request model.
//!
//! # Features
//!
//! - Support for HTTP/1.0 and HTTP/1.1
//! - Built-in protection against oversized heads
//! - Duplicate header fields keep the last value received
//!
//! # Limits
//!
//! - Maximum number of headers: 64
//! - Maximum header size: 8KB

use bytes::{Buf, BytesMut};
use http::{HeaderName, HeaderValue, Method, Request, Uri, Version};
use httparse::{Error, Status};
use tokio_util::codec::Decoder;
use tracing::trace;

use crate::ensure;
use crate::protocol::{ParseError, RequestHeader};

/// Maximum number of headers allowed in a request
const MAX_HEADER_NUM: usize = 64;

/// Maximum size in bytes allowed for the entire header section
const MAX_HEADER_BYTES: usize = 8 * 1024;

/// Decoder for HTTP request heads implementing the [`Decoder`] trait.
///
/// On success the head bytes, including the blank line separator, are removed from
/// the source buffer; whatever follows is left in place for the body decoder.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderDecoder;

impl Decoder for HeaderDecoder {
    type Item = RequestHeader;
    type Error = ParseError;

    /// Attempts to decode a request head from the provided bytes buffer.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(header))` if a complete head was successfully parsed
    /// - `Ok(None)` if more data is needed
    /// - `Err(ParseError)` if parsing failed
    ///
    /// # Errors
    ///
    /// Returns `ParseError` if:
    /// - The start line doesn't hold a method, a target and a version
    /// - A header line has no `name: value` separator
    /// - The number of headers exceeds `MAX_HEADER_NUM`
    /// - The total head size exceeds `MAX_HEADER_BYTES`
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let mut headers = [httparse::EMPTY_HEADER; MAX_HEADER_NUM];
        let mut req = httparse::Request::new(&mut headers);

        let status = req.parse(&src[..]).map_err(|e| match e {
            Error::TooManyHeaders => ParseError::too_many_headers(MAX_HEADER_NUM),
            // no version yet: the start line itself is broken
            e if req.version.is_none() => ParseError::invalid_start_line(e),
            Error::HeaderName | Error::HeaderValue | Error::NewLine => ParseError::invalid_header(e),
            e => ParseError::invalid_start_line(e),
        })?;

        let body_offset = match status {
            Status::Complete(body_offset) => body_offset,
            Status::Partial => {
                ensure!(src.len() <= MAX_HEADER_BYTES, ParseError::too_large_header(src.len(), MAX_HEADER_BYTES));
                return Ok(None);
            }
        };

        trace!(head_size = body_offset, "parsed request head");
        ensure!(body_offset <= MAX_HEADER_BYTES, ParseError::too_large_header(body_offset, MAX_HEADER_BYTES));

        let method = req.method.ok_or_else(|| ParseError::invalid_start_line("missing method"))?;
        let method = Method::from_bytes(method.as_bytes()).map_err(ParseError::invalid_start_line)?;

        let target = req.path.ok_or_else(|| ParseError::invalid_start_line("missing request target"))?;
        let uri = Uri::try_from(target).map_err(ParseError::invalid_uri)?;

        let version = match req.version {
            Some(0) => Version::HTTP_10,
            Some(1) => Version::HTTP_11,
            v => return Err(ParseError::invalid_start_line(format!("unsupported http version {v:?}"))),
        };

        let mut header_builder = Request::builder().method(method).uri(uri).version(version);
        if let Some(header_map) = header_builder.headers_mut() {
            header_map.reserve(req.headers.len());
            for header in req.headers.iter() {
                let name = HeaderName::from_bytes(header.name.as_bytes()).map_err(ParseError::invalid_header)?;
                let value = HeaderValue::from_bytes(header.value).map_err(ParseError::invalid_header)?;
                // the last occurrence of a repeated field wins
                header_map.insert(name, value);
            }
        }

        let header = header_builder.body(()).map_err(ParseError::invalid_start_line)?;

        // drop the head, keep the body bytes in place
        src.advance(body_offset);

        Ok(Some(RequestHeader::from(header)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    fn crlf(str: &str) -> BytesMut {
        BytesMut::from(str.replace('\n', "\r\n").as_str())
    }

    #[test]
    fn test_bytes_mut_lens() {
        let mut bytes = crlf(indoc! {r##"
        GET /index.html HTTP/1.1
        Host: 127.0.0.1:8080
        User-Agent: curl/7.79.1
        Accept: */*

        "##});
        bytes.extend_from_slice(b"123");

        let result = HeaderDecoder.decode(&mut bytes).unwrap();

        assert!(result.is_some());
        assert_eq!(&bytes[..], &b"123"[..]);
    }

    #[test]
    fn from_curl() {
        let mut buf = crlf(indoc! {r##"
        GET /index.html HTTP/1.1
        Host: 127.0.0.1:8080
        User-Agent: curl/7.79.1
        Accept: */*

        "##});

        let header = HeaderDecoder.decode(&mut buf).unwrap().unwrap();

        assert_eq!(header.method(), &Method::GET);
        assert_eq!(header.version(), Version::HTTP_11);
        assert_eq!(header.uri().path(), "/index.html");
        assert_eq!(header.uri().query(), None);

        assert_eq!(header.headers().len(), 3);
        assert_eq!(header.headers().get(http::header::ACCEPT), Some(&HeaderValue::from_static("*/*")));
        assert_eq!(header.headers().get(http::header::HOST), Some(&HeaderValue::from_static("127.0.0.1:8080")));
        assert_eq!(header.headers().get(http::header::USER_AGENT), Some(&HeaderValue::from_static("curl/7.79.1")));
    }

    #[test]
    fn keeps_query_in_target() {
        let mut buf = crlf(indoc! {r##"
        GET /index/?a=1&b=2&a=3 HTTP/1.1
        Host: 127.0.0.1:8080

        "##});

        let header = HeaderDecoder.decode(&mut buf).unwrap().unwrap();

        assert_eq!(header.uri().path(), "/index/");
        assert_eq!(header.uri().query(), Some("a=1&b=2&a=3"));
    }

    #[test]
    fn last_duplicate_header_wins() {
        let mut buf = crlf(indoc! {r##"
        GET / HTTP/1.1
        X-Token: first
        X-Token: second

        "##});

        let header = HeaderDecoder.decode(&mut buf).unwrap().unwrap();

        assert_eq!(header.headers().get_all("x-token").iter().count(), 1);
        assert_eq!(header.headers().get("X-Token"), Some(&HeaderValue::from_static("second")));
    }

    #[test]
    fn partial_head_needs_more_data() {
        let mut buf = BytesMut::from("GET /index.html HTTP/1.1\r\nHost: 127.0.0.1\r\n");
        let len = buf.len();
        assert!(HeaderDecoder.decode(&mut buf).unwrap().is_none());
        // nothing consumed while waiting
        assert_eq!(buf.len(), len);
    }

    #[test]
    fn start_line_with_two_tokens() {
        let mut buf = BytesMut::from("GET /index.html\r\nHost: a\r\n\r\n");
        let result = HeaderDecoder.decode(&mut buf);
        assert!(matches!(result, Err(ParseError::InvalidStartLine { .. })));
    }

    #[test]
    fn short_start_line_is_rejected_not_awaited() {
        let mut buf = BytesMut::from("GET /\r\n\r\n");
        let result = HeaderDecoder.decode(&mut buf);
        assert!(matches!(result, Err(ParseError::InvalidStartLine { .. })));
    }

    #[test]
    fn tiny_partial_input_waits() {
        let mut buf = BytesMut::from("GE");
        assert!(HeaderDecoder.decode(&mut buf).unwrap().is_none());
    }

    #[test]
    fn header_without_separator() {
        let mut buf = BytesMut::from("GET / HTTP/1.1\r\nHost 127.0.0.1\r\n\r\n");
        let result = HeaderDecoder.decode(&mut buf);
        assert!(matches!(result, Err(ParseError::InvalidHeader { .. })));
    }

    #[test]
    fn oversized_partial_head() {
        let mut buf = BytesMut::from("GET / HTTP/1.1\r\n");
        buf.extend_from_slice(format!("X-Long: {}\r\n", "a".repeat(MAX_HEADER_BYTES)).as_bytes());
        let result = HeaderDecoder.decode(&mut buf);
        assert!(matches!(result, Err(ParseError::TooLargeHeader { .. })));
    }
}

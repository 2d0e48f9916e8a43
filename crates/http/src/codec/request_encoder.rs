//! Serializes a request back to its wire form.
//!
//! The inverse of [`parse_request`](super::parse_request): handy to drive a server from
//! a client, or to check that parsing loses nothing.

use std::io;

use bytes::{BufMut, Bytes, BytesMut};
use http::{Request, Version};

use crate::protocol::{SendError, raw_target};

/// Writes the start line, every header field as given, the blank line and the body.
///
/// No `Content-Length` is added, the header map is written verbatim.
///
/// # Errors
///
/// Returns an `InvalidInput` io error for versions other than HTTP/1.0 and HTTP/1.1.
pub fn build_request(req: &Request<Bytes>) -> Result<Bytes, SendError> {
    let version = match req.version() {
        Version::HTTP_10 => "HTTP/1.0",
        Version::HTTP_11 => "HTTP/1.1",
        v => return Err(SendError::io(io::Error::new(io::ErrorKind::InvalidInput, format!("can't write {v:?} requests")))),
    };

    let mut dst = BytesMut::with_capacity(256 + req.body().len());
    dst.put_slice(req.method().as_str().as_bytes());
    dst.put_u8(b' ');
    dst.put_slice(raw_target(req.uri()).as_bytes());
    dst.put_u8(b' ');
    dst.put_slice(version.as_bytes());
    dst.put_slice(b"\r\n");

    for (name, value) in req.headers() {
        dst.put_slice(name.as_ref());
        dst.put_slice(b": ");
        dst.put_slice(value.as_bytes());
        dst.put_slice(b"\r\n");
    }
    dst.put_slice(b"\r\n");
    dst.put_slice(req.body());

    Ok(dst.freeze())
}

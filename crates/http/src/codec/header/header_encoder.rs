//! HTTP header encoder implementation for serializing HTTP response heads
//!
//! This module encodes a response head into raw bytes: the status line, every header
//! field and the blank line closing the head.
//!
//! # Features
//!
//! - Reason phrases come from the fixed [`status`](crate::protocol::status) table
//! - `Content-Length` is always written from the actual body size
//! - Multi-valued fields are joined with `,`, except `Set-Cookie` which keeps one line per value

use std::io;
use std::io::Write;

use bytes::{BufMut, BytesMut};
use http::header;
use tokio_util::codec::Encoder;
use tracing::error;

use crate::protocol::{ResponseHead, SendError, status};

/// Initial buffer size allocated for header serialization
const INIT_HEADER_SIZE: usize = 1024;

/// Encoder for HTTP response heads implementing the [`Encoder`] trait.
///
/// The item is the head together with the exact number of body bytes that follow it.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderEncoder;

impl Encoder<(&ResponseHead, usize)> for HeaderEncoder {
    type Error = SendError;

    /// Encodes the response head into the provided bytes buffer.
    ///
    /// # Errors
    ///
    /// Returns an `InvalidInput` io error if the status code has no reason phrase.
    fn encode(&mut self, item: (&ResponseHead, usize), dst: &mut BytesMut) -> Result<(), Self::Error> {
        let (head, content_length) = item;

        let code = head.status().as_u16();
        let reason = status::reason_phrase(code).map_err(|e| {
            error!(status = code, "no reason phrase for status");
            SendError::io(io::Error::new(io::ErrorKind::InvalidInput, e))
        })?;

        dst.reserve(INIT_HEADER_SIZE);
        write!(FastWrite(dst), "HTTP/1.1 {code} {reason}\r\n")?;

        for name in head.headers().keys() {
            if *name == header::CONTENT_LENGTH {
                continue;
            }

            let mut values = head.headers().get_all(name).iter();
            if *name == header::SET_COOKIE {
                for value in values {
                    put_field(dst, name.as_ref(), value.as_bytes());
                }
                continue;
            }

            dst.put_slice(name.as_ref());
            dst.put_slice(b": ");
            if let Some(first) = values.next() {
                dst.put_slice(first.as_bytes());
            }
            for value in values {
                dst.put_u8(b',');
                dst.put_slice(value.as_bytes());
            }
            dst.put_slice(b"\r\n");
        }

        write!(FastWrite(dst), "content-length: {content_length}\r\n\r\n")?;
        Ok(())
    }
}

#[inline]
fn put_field(dst: &mut BytesMut, name: &[u8], value: &[u8]) {
    dst.put_slice(name);
    dst.put_slice(b": ");
    dst.put_slice(value);
    dst.put_slice(b"\r\n");
}

/// Fast writer implementation for writing to BytesMut.
///
/// Formats straight into the buffer, which has already been reserved.
struct FastWrite<'a>(&'a mut BytesMut);

impl Write for FastWrite<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.put_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

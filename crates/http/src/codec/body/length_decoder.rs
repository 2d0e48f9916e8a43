//! Decoder for request bodies framed by a `Content-Length` header.
//!
//! See [RFC 9112 Section 6.2](https://www.rfc-editor.org/rfc/rfc9112#name-content-length).
//! The whole body is kept in memory, so the decoder only yields once every
//! declared byte has arrived.

use bytes::{Bytes, BytesMut};
use tokio_util::codec::Decoder;
use tracing::trace;

use crate::protocol::ParseError;

/// A decoder collecting a body of a known length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LengthDecoder {
    /// The number of body bytes declared by the request
    length: usize,
}

impl LengthDecoder {
    /// Creates a new `LengthDecoder` for a body of `length` bytes.
    pub fn new(length: usize) -> Self {
        Self { length }
    }

    pub fn length(&self) -> usize {
        self.length
    }
}

impl Decoder for LengthDecoder {
    type Item = Bytes;
    type Error = ParseError;

    /// Splits the body off the front of `src`.
    ///
    /// # Returns
    /// * `Ok(Some(bytes))` once `length` bytes are buffered, extra bytes stay in `src`
    /// * `Ok(None)` when more data is needed
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.len() < self.length {
            trace!(buffered = src.len(), expected = self.length, "waiting for body bytes");
            src.reserve(self.length - src.len());
            return Ok(None);
        }

        Ok(Some(src.split_to(self.length).freeze()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic() {
        let mut buffer: BytesMut = BytesMut::from(&b"101234567890abcdef\r\n\r\n"[..]);

        let mut length_decoder = LengthDecoder::new(10);
        let bytes = length_decoder.decode(&mut buffer).unwrap().unwrap();

        assert_eq!(bytes.len(), 10);

        assert_eq!(&bytes[..], b"1012345678");
        assert_eq!(&buffer[..], b"90abcdef\r\n\r\n");
    }

    #[test]
    fn waits_for_the_whole_body() {
        let mut buffer = BytesMut::from(&b"hello"[..]);
        let mut length_decoder = LengthDecoder::new(11);

        assert!(length_decoder.decode(&mut buffer).unwrap().is_none());
        assert_eq!(&buffer[..], b"hello");

        buffer.extend_from_slice(b" world");
        let bytes = length_decoder.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(&bytes[..], b"hello world");
        assert!(buffer.is_empty());
    }

    #[test]
    fn zero_length() {
        let mut buffer = BytesMut::new();
        let bytes = LengthDecoder::new(0).decode(&mut buffer).unwrap().unwrap();
        assert!(bytes.is_empty());
    }
}

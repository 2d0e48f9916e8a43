//! HTTP response encoder: serializes a head and its body into wire bytes.

use bytes::{Bytes, BytesMut};
use tokio_util::codec::Encoder;

use crate::codec::body::BodyEncoder;
use crate::codec::header::HeaderEncoder;
use crate::protocol::{ResponseBody, ResponseHead, SendError};

/// Builds the wire form of a response.
///
/// The output is the status line, the header fields, a `Content-Length` matching the
/// serialized body, the blank line and then the body.
///
/// # Errors
///
/// Fails if the status code has no reason phrase or a JSON body can't be serialized.
pub fn build_response(head: &ResponseHead, body: &ResponseBody) -> Result<Bytes, SendError> {
    let mut dst = BytesMut::new();
    ResponseEncoder::new().encode((head, body), &mut dst)?;
    Ok(dst.freeze())
}

/// Encoder writing a whole response, head then body.
#[derive(Debug, Default)]
pub struct ResponseEncoder {
    header_encoder: HeaderEncoder,
    body_encoder: BodyEncoder,
}

impl ResponseEncoder {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Encoder<(&ResponseHead, &ResponseBody)> for ResponseEncoder {
    type Error = SendError;

    fn encode(&mut self, item: (&ResponseHead, &ResponseBody), dst: &mut BytesMut) -> Result<(), Self::Error> {
        let (head, body) = item;

        match body {
            ResponseBody::Json(_) => {
                // the length is only known once serialized
                let bytes = BodyEncoder::to_bytes(body)?;
                self.header_encoder.encode((head, bytes.len()), dst)?;
                dst.extend_from_slice(&bytes);
                Ok(())
            }
            ResponseBody::Empty => self.header_encoder.encode((head, 0), dst),
            ResponseBody::Bytes(bytes) => {
                self.header_encoder.encode((head, bytes.len()), dst)?;
                self.body_encoder.encode(body, dst)
            }
        }
    }
}

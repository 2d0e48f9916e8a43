//! Serializes a [`ResponseBody`] into the bytes written after the response head.

use bytes::{BufMut, Bytes, BytesMut};
use tokio_util::codec::Encoder;

use crate::protocol::{ResponseBody, SendError};

/// Encoder writing a whole response body in one piece.
///
/// `Bytes` are copied as they are, `Json` values are written as compact `serde_json`
/// output, `Empty` writes nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct BodyEncoder;

impl BodyEncoder {
    /// Returns the serialized form of `body`, which is also what `Content-Length` counts.
    ///
    /// # Errors
    ///
    /// Returns [`SendError::InvalidBody`] when a JSON value can't be serialized.
    pub fn to_bytes(body: &ResponseBody) -> Result<Bytes, SendError> {
        match body {
            ResponseBody::Empty => Ok(Bytes::new()),
            ResponseBody::Bytes(bytes) => Ok(bytes.clone()),
            ResponseBody::Json(value) => serde_json::to_vec(value).map(Bytes::from).map_err(SendError::invalid_body),
        }
    }
}

impl Encoder<&ResponseBody> for BodyEncoder {
    type Error = SendError;

    fn encode(&mut self, item: &ResponseBody, dst: &mut BytesMut) -> Result<(), Self::Error> {
        match item {
            ResponseBody::Empty => Ok(()),
            ResponseBody::Bytes(bytes) => {
                dst.extend_from_slice(bytes);
                Ok(())
            }
            ResponseBody::Json(value) => serde_json::to_writer(dst.writer(), value).map_err(SendError::invalid_body),
        }
    }
}

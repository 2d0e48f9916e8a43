use bytes::BytesMut;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio_util::codec::Encoder;
use tracing::trace;

use crate::codec::ResponseEncoder;
use crate::ensure;
use crate::protocol::{ResponseBody, ResponseHead, SendError};

type BoxWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// The write half of a connection, able to send exactly one response.
///
/// A response is written whole: encoded into the buffer, written, flushed, and the
/// write half is shut down afterwards.
pub struct ResponseWriter {
    writer: BoxWriter,
    buffer: BytesMut,
    encoder: ResponseEncoder,
    sent: bool,
}

impl ResponseWriter {
    pub fn new<W>(writer: W) -> Self
    where
        W: AsyncWrite + Send + Unpin + 'static,
    {
        Self::with_capacity(writer, 4 * 1024)
    }

    pub fn with_capacity<W>(writer: W, buffer_size: usize) -> Self
    where
        W: AsyncWrite + Send + Unpin + 'static,
    {
        Self { writer: Box::new(writer), buffer: BytesMut::with_capacity(buffer_size), encoder: ResponseEncoder::new(), sent: false }
    }

    /// Returns true once a response went out, or started to.
    #[inline]
    pub fn is_sent(&self) -> bool {
        self.sent
    }

    /// Writes the response and closes the write half.
    ///
    /// # Errors
    ///
    /// - [`SendError::AlreadySent`] on a second call, the socket is left untouched
    /// - [`SendError::InvalidBody`] or an `InvalidInput` io error if the response can't
    ///   be encoded, in which case nothing is written and another response may be sent
    /// - [`SendError::Io`] on transport failures
    pub async fn send(&mut self, head: &ResponseHead, body: &ResponseBody) -> Result<(), SendError> {
        ensure!(!self.sent, SendError::AlreadySent);

        self.buffer.clear();
        self.encoder.encode((head, body), &mut self.buffer)?;
        self.sent = true;

        trace!(bytes = self.buffer.len(), status = head.status().as_u16(), "writing response");
        self.writer.write_all(&self.buffer).await?;
        self.writer.flush().await?;
        self.writer.shutdown().await?;
        Ok(())
    }
}

impl std::fmt::Debug for ResponseWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseWriter").field("buffered", &self.buffer.len()).field("sent", &self.sent).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{Response, StatusCode};
    use tokio::io::AsyncReadExt;

    #[tokio::test]
    async fn second_send_fails() {
        let (client, server) = tokio::io::duplex(1024);
        let mut writer = ResponseWriter::new(server);

        let head = Response::builder().status(StatusCode::OK).body(()).unwrap();
        writer.send(&head, &ResponseBody::from("first")).await.unwrap();
        assert!(writer.is_sent());

        let result = writer.send(&head, &ResponseBody::from("second")).await;
        assert!(matches!(result, Err(SendError::AlreadySent)));

        let mut received = String::new();
        let mut client = client;
        client.read_to_string(&mut received).await.unwrap();
        assert_eq!(received, "HTTP/1.1 200 OK\r\ncontent-length: 5\r\n\r\nfirst");
    }

    #[tokio::test]
    async fn encode_failure_keeps_writer_usable() {
        let (mut client, server) = tokio::io::duplex(1024);
        let mut writer = ResponseWriter::new(server);

        let unknown = Response::builder().status(299).body(()).unwrap();
        writer.send(&unknown, &ResponseBody::Empty).await.unwrap_err();
        assert!(!writer.is_sent());

        let head = Response::builder().status(StatusCode::INTERNAL_SERVER_ERROR).body(()).unwrap();
        writer.send(&head, &ResponseBody::Empty).await.unwrap();

        let mut received = String::new();
        client.read_to_string(&mut received).await.unwrap();
        assert!(received.starts_with("HTTP/1.1 500 Internal Server Error\r\n"));
    }
}

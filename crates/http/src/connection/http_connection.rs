use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use http::{Request, Response, StatusCode};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};
use tokio_util::codec::Decoder;
use tracing::{debug, error, info, warn};

use crate::codec::RequestDecoder;
use crate::connection::{ConnectionConfig, ResponseWriter};
use crate::handler::Handler;
use crate::protocol::{HttpError, ParseError, RemoteAddr, ResponseBody, SendError};

/// Drives a single HTTP exchange on one connection.
///
/// `HttpConnection` handles the full lifecycle of the connection:
/// - Reading bytes until a whole request (head and declared body) is buffered
/// - Answering `400 Bad Request` to bytes that aren't a request
/// - Invoking the [`Handler`] once with the request and the [`ResponseWriter`]
/// - Answering `500 Internal Server Error` when the handler fails before sending
///
/// One message is served per connection, the writer closes the write half once the
/// response is out.
///
/// # Type Parameters
///
/// * `R`: The async readable stream type
pub struct HttpConnection<R> {
    reader: R,
    writer: ResponseWriter,
    decoder: RequestDecoder,
    buffer: BytesMut,
    remote_addr: SocketAddr,
    read_buffer_size: usize,
    read_timeout: Duration,
}

impl<R> std::fmt::Debug for HttpConnection<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpConnection")
            .field("remote_addr", &self.remote_addr)
            .field("buffered", &self.buffer.len())
            .field("read_timeout", &self.read_timeout)
            .finish_non_exhaustive()
    }
}

impl<R> HttpConnection<R>
where
    R: AsyncRead + Unpin,
{
    pub fn new<W>(reader: R, writer: W, remote_addr: SocketAddr, config: &ConnectionConfig) -> Self
    where
        W: AsyncWrite + Send + Unpin + 'static,
    {
        Self {
            reader,
            writer: ResponseWriter::new(writer),
            decoder: RequestDecoder::new(),
            buffer: BytesMut::with_capacity(config.read_buffer_size),
            remote_addr,
            read_buffer_size: config.read_buffer_size,
            read_timeout: config.read_timeout,
        }
    }

    pub async fn process<H>(mut self, handler: Arc<H>) -> Result<(), HttpError>
    where
        H: Handler + ?Sized,
    {
        let mut request = match self.read_request().await {
            Ok(Some(request)) => request,
            Ok(None) => return Ok(()),
            Err(e @ ParseError::Io { .. }) => return Err(e.into()),
            Err(e) => {
                warn!(remote_addr = %self.remote_addr, cause = %e, "can't parse request");
                self.send_status(StatusCode::BAD_REQUEST).await?;
                return Err(e.into());
            }
        };

        request.extensions_mut().insert(RemoteAddr(self.remote_addr));

        match handler.call(request, &mut self.writer).await {
            Ok(()) if !self.writer.is_sent() => {
                debug!(remote_addr = %self.remote_addr, "handler returned without a response");
            }
            Ok(()) => {}
            Err(e) => {
                error!(remote_addr = %self.remote_addr, cause = %e, "handle request error");
                if !self.writer.is_sent() {
                    self.send_status(StatusCode::INTERNAL_SERVER_ERROR).await?;
                }
            }
        }

        Ok(())
    }

    /// Reads until a request is decoded.
    ///
    /// Returns `Ok(None)` when the peer closes the connection or stays silent past the
    /// read timeout before a whole request arrived.
    async fn read_request(&mut self) -> Result<Option<Request<Bytes>>, ParseError> {
        loop {
            if let Some(request) = self.decoder.decode(&mut self.buffer)? {
                return Ok(Some(request));
            }

            self.buffer.reserve(self.read_buffer_size);
            let read = tokio::time::timeout(self.read_timeout, self.read_chunk()).await;

            match read {
                Ok(Ok(0)) => {
                    info!(remote_addr = %self.remote_addr, buffered = self.buffer.len(), "peer closed before a full request");
                    return Ok(None);
                }
                Ok(Ok(_)) => {}
                Ok(Err(e)) => return Err(ParseError::io(e)),
                Err(_) => {
                    info!(remote_addr = %self.remote_addr, timeout = ?self.read_timeout, "read timed out, dropping connection");
                    return Ok(None);
                }
            }
        }
    }

    /// One read of at most `read_buffer_size` bytes.
    async fn read_chunk(&mut self) -> std::io::Result<usize> {
        let limit = u64::try_from(self.read_buffer_size).unwrap_or(u64::MAX);
        (&mut self.reader).take(limit).read_buf(&mut self.buffer).await
    }

    async fn send_status(&mut self, status: StatusCode) -> Result<(), SendError> {
        let head = Response::builder().status(status).body(()).map_err(SendError::invalid_body)?;
        self.writer.send(&head, &ResponseBody::Empty).await
    }
}

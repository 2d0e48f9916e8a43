//! The seam between the connection driver and the application.
//!
//! A [`Handler`] receives each complete request together with the [`ResponseWriter`]
//! of its connection. It is expected to send exactly one response; the connection is
//! closed once it returns.

use std::error::Error;

use async_trait::async_trait;
use bytes::Bytes;
use futures::future::BoxFuture;
use http::Request;

use crate::connection::ResponseWriter;

/// Error type handlers may fail with.
pub type BoxError = Box<dyn Error + Send + Sync>;

#[async_trait]
pub trait Handler: Send + Sync {
    /// Processes one request.
    ///
    /// When an error is returned and nothing was sent yet, the connection answers with
    /// `500 Internal Server Error`.
    async fn call(&self, req: Request<Bytes>, writer: &mut ResponseWriter) -> Result<(), BoxError>;
}

#[derive(Debug)]
pub struct HandlerFn<F> {
    f: F,
}

#[async_trait]
impl<F> Handler for HandlerFn<F>
where
    F: for<'w> Fn(Request<Bytes>, &'w mut ResponseWriter) -> BoxFuture<'w, Result<(), BoxError>> + Send + Sync,
{
    async fn call(&self, req: Request<Bytes>, writer: &mut ResponseWriter) -> Result<(), BoxError> {
        (self.f)(req, writer).await
    }
}

/// Wraps a closure returning a boxed future into a [`Handler`].
///
/// ```
/// use futures::FutureExt;
/// use http::Response;
/// use strand_http::handler::make_handler;
///
/// let handler = make_handler(|req, writer| {
///     async move {
///         let head = Response::builder().status(200).body(())?;
///         writer.send(&head, &req.uri().path().to_string().into()).await?;
///         Ok(())
///     }
///     .boxed()
/// });
/// # let _ = handler;
/// ```
pub fn make_handler<F>(f: F) -> HandlerFn<F>
where
    F: for<'w> Fn(Request<Bytes>, &'w mut ResponseWriter) -> BoxFuture<'w, Result<(), BoxError>> + Send + Sync,
{
    HandlerFn { f }
}

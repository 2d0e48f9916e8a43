use async_trait::async_trait;
use futures::future::BoxFuture;

use crate::router::Next;
use crate::{Request, Response};

pub use strand_http::handler::BoxError;

/// What every handler returns. An error ends the chain, the server answers `500`
/// when nothing was sent yet.
pub type HandlerResult = Result<(), BoxError>;

pub type BoxHandler = Box<dyn Handler>;

/// A unit of request processing.
///
/// A handler receives the request, the response and the continuation `next`. Calling
/// `next.run(req, res)` resumes the walk at the following route; not calling it ends the
/// walk once the other handlers of the current route have run.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn call(&self, req: &mut Request, res: &mut Response<'_>, next: Next<'_>) -> HandlerResult;
}

#[async_trait]
impl<H: Handler + ?Sized> Handler for Box<H> {
    async fn call(&self, req: &mut Request, res: &mut Response<'_>, next: Next<'_>) -> HandlerResult {
        (**self).call(req, res, next).await
    }
}

/// A closure holder, see [`handler_fn`].
pub struct FnHandler<F> {
    f: F,
}

impl<F> std::fmt::Debug for FnHandler<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnHandler").finish_non_exhaustive()
    }
}

#[async_trait]
impl<F> Handler for FnHandler<F>
where
    F: for<'r, 'w> Fn(&'r mut Request, &'r mut Response<'w>, Next<'r>) -> BoxFuture<'r, HandlerResult> + Send + Sync,
{
    async fn call(&self, req: &mut Request, res: &mut Response<'_>, next: Next<'_>) -> HandlerResult {
        (self.f)(req, res, next).await
    }
}

/// Turns a closure returning a boxed future into a [`Handler`].
///
/// ```
/// use futures::FutureExt;
/// use strand_web::handler_fn;
///
/// let hello = handler_fn(|_req, res, _next| async move { Ok(res.send("hello").await?) }.boxed());
/// let pass = handler_fn(|req, res, next| next.run(req, res));
/// # let _ = (hello, pass);
/// ```
pub fn handler_fn<F>(f: F) -> FnHandler<F>
where
    F: for<'r, 'w> Fn(&'r mut Request, &'r mut Response<'w>, Next<'r>) -> BoxFuture<'r, HandlerResult> + Send + Sync,
{
    FnHandler { f }
}

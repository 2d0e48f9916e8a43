//! An express-style application layer on top of strand-http.
//!
//! Routes are kept in registration order and every matching one gets a chance to
//! handle the request; handlers pass control along with [`Next::run`].
//!
//! ```no_run
//! use futures::FutureExt;
//! use strand_web::{Router, Server, handler_fn, middleware};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut router = Router::new();
//!     router
//!         .use_middleware(middleware::logger())?
//!         .get("/", handler_fn(|_req, res, _next| async move { Ok(res.send("hello world").await?) }.boxed()))?;
//!
//!     Server::builder().router(router).address("127.0.0.1:3000").build()?.start().await?;
//!     Ok(())
//! }
//! ```

mod date;
mod handler;
mod request;
mod response;
mod server;

pub mod middleware;
pub mod router;

pub use handler::BoxError;
pub use handler::BoxHandler;
pub use handler::FnHandler;
pub use handler::Handler;
pub use handler::HandlerResult;
pub use handler::handler_fn;
pub use request::Body;
pub use request::PathParams;
pub use request::Request;
pub use response::Response;
pub use response::ResponseError;
pub use router::Next;
pub use router::Router;
pub use server::Server;
pub use server::ServerBuildError;
pub use server::ServerBuilder;

//! The protocol layer of strand: HTTP/1.1 messages on raw TCP.
//!
//! This crate knows nothing about routing. It parses request bytes, serializes
//! responses, and runs the listener that hands each complete request to a
//! [`handler::Handler`].
//!
//! # Features
//!
//! - Request parsing with `httparse`, buffered across reads until the declared
//!   `Content-Length` has arrived
//! - Whole-body responses with an exact `Content-Length`, JSON bodies via `serde_json`
//! - One task per connection, an optional bound on concurrent connections
//! - A read timeout per connection
//! - `400 Bad Request` for unparseable input, `500 Internal Server Error` for failing handlers
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use futures::FutureExt;
//! use http::Response;
//! use strand_http::connection::{ConnectionConfig, Multiplexer};
//! use strand_http::handler::make_handler;
//!
//! #[tokio::main]
//! async fn main() -> std::io::Result<()> {
//!     let handler = make_handler(|req, writer| {
//!         async move {
//!             let head = Response::builder().status(200).body(())?;
//!             let body = format!("hello from {}", req.uri().path());
//!             writer.send(&head, &body.into()).await?;
//!             Ok(())
//!         }
//!         .boxed()
//!     });
//!
//!     let multiplexer = Multiplexer::bind("127.0.0.1:8080".parse().unwrap(), ConnectionConfig::default())?;
//!     multiplexer.run(Arc::new(handler)).await;
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - [`protocol`]: request/response types, status and MIME tables, errors
//! - [`codec`]: parsing and serialization
//! - [`connection`]: listener, per-connection driver and response writer
//! - [`handler`]: the application seam
//!
//! # Limitations
//!
//! - HTTP/1.x only, one request per connection
//! - No TLS, no chunked transfer-encoding
//! - Maximum header size: 8KB
//! - Maximum number of headers: 64
//! - Maximum body size: 8MB

pub mod codec;
pub mod connection;
pub mod handler;
pub mod protocol;

mod utils;
pub(crate) use utils::ensure;

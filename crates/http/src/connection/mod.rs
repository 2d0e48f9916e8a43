//! HTTP connection handling module
//!
//! # Components
//!
//! - [`Multiplexer`]: owns the listening socket, accepts connections and keeps the
//!   working set of connection tasks, optionally bounded
//! - [`HttpConnection`]: drives one connection: read with a timeout, decode, invoke the
//!   handler, answer `400`/`500` on failures, close
//! - [`ResponseWriter`]: the write half of a connection, sends exactly one response
//! - [`ConnectionConfig`]: buffer size, timeout, backlog and connection bound

mod config;
mod http_connection;
mod multiplexer;
mod response_writer;

pub use config::ConnectionConfig;
pub use http_connection::HttpConnection;
pub use multiplexer::Multiplexer;
pub use response_writer::ResponseWriter;

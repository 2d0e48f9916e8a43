//! Ready-made middlewares.
//!
//! Every middleware is a [`Handler`](crate::Handler) that does its work, then passes the
//! request on with [`Next::run`](crate::router::Next::run):
//!
//! - [`logger`]: logs each request and its outcome
//! - [`body_parser`]: decodes urlencoded and multipart form bodies into fields
//! - [`cookie_parser`]: exposes the request cookies, [`Cookie`] builds `Set-Cookie` values
//! - [`session`]: in-memory sessions tracked with the `sid` cookie
//! - [`serve_static`]: a router serving the files of a directory

mod body_parser;
pub use body_parser::BodyParseError;
pub use body_parser::BodyParser;
pub use body_parser::body_parser;

mod cookie;
pub use cookie::Cookie;
pub use cookie::CookieParser;
pub use cookie::Cookies;
pub use cookie::cookie_parser;

mod logger;
pub use logger::Logger;
pub use logger::logger;

mod session;
pub use session::SESSION_COOKIE;
pub use session::Session;
pub use session::SessionMiddleware;
pub use session::SessionStore;
pub use session::session;
pub use session::session_with_store;

mod static_files;
pub use static_files::StaticError;
pub use static_files::StaticFile;
pub use static_files::serve_static;

//! Ordered routes and the middleware chain.
//!
//! A [`Router`] is a list of routes walked in registration order for every request.
//! A route is either a method/path route, entered when both match, or a middleware
//! entry, entered unconditionally. Every entered route calls all of its handlers in
//! order, each given a [`Next`] that resumes the walk at the following route. The walk
//! ends when no handler calls `next`, when the response has been sent, or when the list
//! runs out. In the last case a request that matched no method/path route gets
//! `404 Cannot {METHOD} {URI}`.
//!
//! # Example
//!
//! ```
//! use futures::FutureExt;
//! use strand_web::{Router, handler_fn};
//!
//! # fn main() -> Result<(), strand_web::router::RouteError> {
//! let mut api = Router::new();
//! api.get("/users/:id", handler_fn(|req, res, _next| {
//!     async move {
//!         let id = req.param("id").unwrap_or_default().to_string();
//!         res.json(&serde_json::json!({ "id": id })).await?;
//!         Ok(())
//!     }
//!     .boxed()
//! }))?;
//!
//! let mut app = Router::new();
//! app.use_middleware(strand_web::middleware::logger())?.mount("/api", api)?;
//! # Ok(())
//! # }
//! ```

mod into_handlers;
mod method;
mod next;
mod pattern;

use std::fmt;

use http::Method;
use thiserror::Error;
use tracing::debug;

use crate::handler::{BoxHandler, HandlerResult};
use crate::{PathParams, Request, Response};

pub use into_handlers::IntoHandlers;
pub use method::MethodFilter;
pub use next::Next;
pub use pattern::PathPattern;

#[derive(Error, Debug)]
pub enum RouteError {
    #[error("invalid route '{path}': {reason}")]
    InvalidRoute { path: String, reason: String },

    #[error("invalid middleware: {reason}")]
    InvalidMiddleware { reason: String },
}

impl RouteError {
    pub fn invalid_route<S: ToString>(path: &str, reason: S) -> Self {
        Self::InvalidRoute { path: path.to_string(), reason: reason.to_string() }
    }

    pub fn invalid_middleware<S: ToString>(reason: S) -> Self {
        Self::InvalidMiddleware { reason: reason.to_string() }
    }
}

/// Outcome of testing one route against a request.
#[derive(Debug)]
pub(crate) enum MatchResult {
    NoMatch,
    /// A middleware entry, entered without touching the path parameters
    Middleware,
    Matched(PathParams),
}

#[derive(Debug)]
enum RouteKind {
    Middleware,
    Endpoint { method: MethodFilter, pattern: PathPattern },
}

/// One registered entry of a [`Router`].
pub struct Route {
    kind: RouteKind,
    handlers: Vec<BoxHandler>,
}

impl Route {
    fn endpoint(method: MethodFilter, pattern: PathPattern, handlers: Vec<BoxHandler>) -> Self {
        Self { kind: RouteKind::Endpoint { method, pattern }, handlers }
    }

    fn middleware(handlers: Vec<BoxHandler>) -> Self {
        Self { kind: RouteKind::Middleware, handlers }
    }

    /// Returns the method filter and the template, `None` for a middleware entry.
    pub fn endpoint_info(&self) -> Option<(&MethodFilter, &str)> {
        match &self.kind {
            RouteKind::Middleware => None,
            RouteKind::Endpoint { method, pattern } => Some((method, pattern.template())),
        }
    }

    pub(crate) fn handlers(&self) -> &[BoxHandler] {
        &self.handlers
    }

    pub(crate) fn match_request(&self, req: &Request) -> MatchResult {
        match &self.kind {
            RouteKind::Middleware => MatchResult::Middleware,
            RouteKind::Endpoint { method, pattern } => {
                if method.matches(req.method()) && pattern.is_match(req.uri()) {
                    MatchResult::Matched(pattern.params(req.uri()))
                } else {
                    MatchResult::NoMatch
                }
            }
        }
    }

    fn with_prefix(self, prefix: &str) -> Result<Self, RouteError> {
        let kind = match self.kind {
            RouteKind::Middleware => RouteKind::Middleware,
            RouteKind::Endpoint { method, pattern } => RouteKind::Endpoint { method, pattern: pattern.with_prefix(prefix)? },
        };
        Ok(Self { kind, handlers: self.handlers })
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route").field("kind", &self.kind).field("handlers", &self.handlers.len()).finish()
    }
}

/// Main router structure that handles request routing
#[derive(Debug, Default)]
pub struct Router {
    routes: Vec<Route>,
}

macro_rules! method_route {
    ($fn_name:ident, $method:expr) => {
        #[doc = concat!("Registers `handlers` for `", stringify!($fn_name), "` requests to `path`.")]
        ///
        /// # Errors
        ///
        /// See [`Router::route`].
        pub fn $fn_name(&mut self, path: &str, handlers: impl IntoHandlers) -> Result<&mut Self, RouteError> {
            self.route($method, path, handlers)
        }
    };
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Registers `handlers` for requests whose method passes `method` and whose path
    /// matches the template `path`.
    ///
    /// # Errors
    ///
    /// - [`RouteError::InvalidRoute`] if `path` doesn't start with `/`
    /// - [`RouteError::InvalidMiddleware`] if `handlers` is empty
    pub fn route(&mut self, method: impl Into<MethodFilter>, path: &str, handlers: impl IntoHandlers) -> Result<&mut Self, RouteError> {
        let method = method.into();
        let pattern = PathPattern::new(path)?;
        let handlers = non_empty(handlers)?;

        debug!(method = %method, path = path, handlers = handlers.len(), "route registered");
        self.routes.push(Route::endpoint(method, pattern, handlers));
        Ok(self)
    }

    method_route!(get, Method::GET);
    method_route!(post, Method::POST);
    method_route!(put, Method::PUT);
    method_route!(patch, Method::PATCH);
    method_route!(delete, Method::DELETE);
    method_route!(head, Method::HEAD);
    method_route!(options, Method::OPTIONS);
    method_route!(all, MethodFilter::All);

    /// Registers handlers entered by every request reaching this point of the list.
    ///
    /// The `next` of every handler in `handlers` resumes after this entry, so
    /// middlewares that must run one before the other go in separate calls.
    ///
    /// # Errors
    ///
    /// [`RouteError::InvalidMiddleware`] if `handlers` is empty.
    pub fn use_middleware(&mut self, handlers: impl IntoHandlers) -> Result<&mut Self, RouteError> {
        let handlers = non_empty(handlers)?;
        self.routes.push(Route::middleware(handlers));
        Ok(self)
    }

    /// Appends the routes of `router`, in their order, with their paths under `prefix`.
    ///
    /// Mounting under `/` keeps the paths as they are.
    ///
    /// # Errors
    ///
    /// [`RouteError::InvalidRoute`] if `prefix` doesn't start with `/`.
    pub fn mount(&mut self, prefix: &str, router: Router) -> Result<&mut Self, RouteError> {
        if !prefix.starts_with('/') {
            return Err(RouteError::invalid_route(prefix, "mount prefix must start with '/'"));
        }

        let routes = router.routes.into_iter().map(|route| route.with_prefix(prefix)).collect::<Result<Vec<_>, _>>()?;
        debug!(prefix = prefix, routes = routes.len(), "router mounted");
        self.routes.extend(routes);
        Ok(self)
    }

    /// Walks the routes for one request, starting at the first one.
    ///
    /// # Errors
    ///
    /// Returns the error of the first handler that fails.
    pub async fn handle(&self, req: &mut Request, res: &mut Response<'_>) -> HandlerResult {
        Next::start(&self.routes).run(req, res).await
    }
}

fn non_empty(handlers: impl IntoHandlers) -> Result<Vec<BoxHandler>, RouteError> {
    let handlers = handlers.into_handlers();
    if handlers.is_empty() {
        return Err(RouteError::invalid_middleware("at least one handler is required"));
    }
    Ok(handlers)
}

//! The `next` continuation and the walk over the route list.

use futures::FutureExt;
use futures::future::BoxFuture;
use http::StatusCode;
use tracing::{debug, trace};

use crate::handler::HandlerResult;
use crate::router::{MatchResult, Route};
use crate::{Request, Response};

/// Resumes the processing of a request at the route after the one currently running.
///
/// Every handler of an entered route is called in order, each with its own `Next`
/// pointing at the following route. Once the response is sent, the remaining handlers
/// and routes are skipped. A `Next` is consumed by [`run`](Self::run), so a handler can
/// hand the request over at most once.
#[derive(Debug)]
pub struct Next<'a> {
    routes: &'a [Route],
    route: usize,
    /// Whether a method/path route matched so far
    matched: bool,
}

impl<'a> Next<'a> {
    /// A continuation starting at the first route.
    pub(crate) fn start(routes: &'a [Route]) -> Self {
        Self { routes, route: 0, matched: false }
    }

    /// Hands the request to whatever comes next.
    ///
    /// When the route list runs out and no method/path route matched, the response is
    /// `404` with the body `Cannot {METHOD} {URI}`. A response already sent stops the
    /// walk. The walk goes on past an entered route only through the `next` given to its
    /// handlers.
    pub fn run<'b>(self, req: &'b mut Request, res: &'b mut Response<'_>) -> BoxFuture<'b, HandlerResult>
    where
        'a: 'b,
    {
        async move {
            let Next { routes, mut route, mut matched } = self;

            loop {
                if res.is_sent() {
                    trace!("response sent, stop walking routes");
                    return Ok(());
                }

                let Some(entry) = routes.get(route) else {
                    if !matched {
                        debug!(method = %req.method(), uri = req.uri(), "no route matched");
                        let body = format!("Cannot {} {}", req.method(), req.uri());
                        res.set_status(StatusCode::NOT_FOUND.as_u16())?;
                        res.send(body).await?;
                    }
                    return Ok(());
                };

                match entry.match_request(req) {
                    MatchResult::NoMatch => {
                        route += 1;
                        continue;
                    }
                    MatchResult::Middleware => {}
                    MatchResult::Matched(params) => {
                        trace!(route = route, params = ?params, "route matched");
                        matched = true;
                        req.set_params(params);
                    }
                }

                for handler in entry.handlers() {
                    if res.is_sent() {
                        break;
                    }
                    handler.call(req, res, Next { routes, route: route + 1, matched }).await?;
                }
                return Ok(());
            }
        }
        .boxed()
    }
}

use std::time::Instant;

use async_trait::async_trait;
use tracing::info;

use crate::handler::{Handler, HandlerResult};
use crate::router::Next;
use crate::{Request, Response};

/// Returns the request logging middleware.
///
/// Logs the method, the target and the peer of every request it sees, then the status
/// once the rest of the chain has run.
pub fn logger() -> Logger {
    Logger
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Logger;

#[async_trait]
impl Handler for Logger {
    async fn call(&self, req: &mut Request, res: &mut Response<'_>, next: Next<'_>) -> HandlerResult {
        let started = Instant::now();
        let method = req.method().clone();
        let target = req.raw_uri().to_string();
        let peer = req.remote_addr();

        info!(%method, uri = %target, ?peer, "request");
        let result = next.run(req, res).await;
        info!(%method, uri = %target, status = res.status().as_u16(), sent = res.is_sent(), elapsed = ?started.elapsed(), "request done");

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Router;
    use crate::request::tests::request;
    use crate::response::tests::{received, writer};
    use http::Method;

    #[tokio::test]
    async fn passes_the_request_on() {
        let mut router = Router::new();
        router.use_middleware(logger()).unwrap();

        let (client, mut writer) = writer();
        let mut req = request(Method::GET, "/missing?x=1", "");
        let mut res = Response::new(&mut writer);
        router.handle(&mut req, &mut res).await.unwrap();

        assert!(received(client).await.ends_with("Cannot GET /missing"));
    }
}

//! Wires a [`Router`] to the connection layer.
//!
//! The [`Server`] is the strand-http [`Handler`](HttpHandler) of every connection: each
//! request becomes a [`Request`] and a [`Response`] bound to the connection, and the
//! router walks its routes from the first one.

use std::future::Future;
use std::io;
use std::net::{SocketAddr, ToSocketAddrs};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use strand_http::connection::{ConnectionConfig, Multiplexer, ResponseWriter};
use strand_http::handler::{BoxError, Handler as HttpHandler};
use thiserror::Error;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::router::Router;
use crate::{Request, Response};

const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug)]
pub struct ServerBuilder {
    router: Option<Router>,
    address: Option<io::Result<Vec<SocketAddr>>>,
    views: Option<PathBuf>,
    config: ConnectionConfig,
}

impl ServerBuilder {
    fn new() -> Self {
        Self { router: None, address: None, views: None, config: ConnectionConfig::default() }
    }

    /// Sets the listen address. Resolution errors are reported by [`build`](Self::build).
    #[must_use]
    pub fn address<A: ToSocketAddrs>(mut self, address: A) -> Self {
        self.address = Some(address.to_socket_addrs().map(Iterator::collect));
        self
    }

    #[must_use]
    pub fn router(mut self, router: Router) -> Self {
        self.router = Some(router);
        self
    }

    /// Sets the directory [`Response::render`] reads files from.
    #[must_use]
    pub fn views(mut self, views: impl Into<PathBuf>) -> Self {
        self.views = Some(views.into());
        self
    }

    #[must_use]
    pub fn read_timeout(mut self, read_timeout: Duration) -> Self {
        self.config = self.config.read_timeout(read_timeout);
        self
    }

    #[must_use]
    pub fn read_buffer_size(mut self, read_buffer_size: usize) -> Self {
        self.config = self.config.read_buffer_size(read_buffer_size);
        self
    }

    #[must_use]
    pub fn backlog(mut self, backlog: u32) -> Self {
        self.config = self.config.backlog(backlog);
        self
    }

    #[must_use]
    pub fn max_connections(mut self, max_connections: usize) -> Self {
        self.config = self.config.max_connections(max_connections);
        self
    }

    /// # Errors
    ///
    /// [`ServerBuildError`] when the router or the address is missing, or when the
    /// address can't be resolved.
    pub fn build(self) -> Result<Server, ServerBuildError> {
        let router = self.router.ok_or(ServerBuildError::MissingRouter)?;
        let address = self.address.ok_or(ServerBuildError::MissingAddress)?.map_err(|source| ServerBuildError::InvalidAddress { source })?;
        if address.is_empty() {
            return Err(ServerBuildError::NoAddressResolved);
        }

        Ok(Server { router, address, views: self.views.map(Arc::from), config: self.config })
    }
}

#[derive(Error, Debug)]
pub enum ServerBuildError {
    #[error("router must be set")]
    MissingRouter,
    #[error("address must be set")]
    MissingAddress,
    #[error("can't resolve address: {source}")]
    InvalidAddress { source: io::Error },
    #[error("address resolved to nothing")]
    NoAddressResolved,
}

#[derive(Debug)]
pub struct Server {
    router: Router,
    address: Vec<SocketAddr>,
    views: Option<Arc<Path>>,
    config: ConnectionConfig,
}

impl Server {
    pub fn builder() -> ServerBuilder {
        ServerBuilder::new()
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Installs the log subscriber and serves connections until the process ends.
    ///
    /// # Errors
    ///
    /// Returns the io error of the last address that failed to bind.
    pub async fn start(self) -> io::Result<()> {
        self.listen_until(|_| {}, std::future::pending()).await
    }

    /// Like [`start`](Self::start), calling `on_ready` with the bound address first.
    ///
    /// # Errors
    ///
    /// See [`start`](Self::start).
    pub async fn listen<R: FnOnce(SocketAddr)>(self, on_ready: R) -> io::Result<()> {
        self.listen_until(on_ready, std::future::pending()).await
    }

    /// Serves connections until `shutdown` resolves, then lets in-flight ones finish.
    ///
    /// # Errors
    ///
    /// See [`start`](Self::start).
    pub async fn start_until<S: Future<Output = ()>>(self, shutdown: S) -> io::Result<()> {
        self.listen_until(|_| {}, shutdown).await
    }

    /// Binds, calls `on_ready` with the bound address, then serves until `shutdown`
    /// resolves.
    ///
    /// # Errors
    ///
    /// See [`start`](Self::start).
    pub async fn listen_until<R, S>(self, on_ready: R, shutdown: S) -> io::Result<()>
    where
        R: FnOnce(SocketAddr),
        S: Future<Output = ()>,
    {
        init_logging();

        let multiplexer = self.bind()?;
        let local_addr = multiplexer.local_addr()?;
        info!(address = %local_addr, routes = self.router.len(), "server listening");
        on_ready(local_addr);

        multiplexer.run_until(Arc::new(self), shutdown).await;
        info!(address = %local_addr, "server stopped");
        Ok(())
    }

    fn bind(&self) -> io::Result<Multiplexer> {
        let mut last_error = None;
        for address in &self.address {
            match Multiplexer::bind(*address, self.config.clone()) {
                Ok(multiplexer) => return Ok(multiplexer),
                Err(e) => {
                    warn!(address = %address, cause = %e, "bind failed");
                    last_error = Some(e);
                }
            }
        }
        Err(last_error.unwrap_or_else(|| io::Error::new(io::ErrorKind::AddrNotAvailable, "no address to bind")))
    }
}

/// Installs a fmt subscriber filtered by `RUST_LOG`, keeping one already installed.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        debug!("global subscriber already installed");
    }
}

#[async_trait]
impl HttpHandler for Server {
    async fn call(&self, req: http::Request<Bytes>, writer: &mut ResponseWriter) -> Result<(), BoxError> {
        let mut req = Request::from(req);
        let mut res = Response::new(writer).with_views(self.views.clone());

        if let Err(e) = self.router.handle(&mut req, &mut res).await {
            if res.is_sent() {
                warn!(method = %req.method(), uri = req.raw_uri(), cause = %e, "handler failed after sending");
            } else {
                error!(method = %req.method(), uri = req.raw_uri(), cause = %e, "handler failed");
                res.set_status(500)?.end(()).await?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::handler_fn;
    use crate::response::tests::received;
    use futures::FutureExt;

    fn router() -> Router {
        let mut router = Router::new();
        router
            .get(
                "/hello/:name",
                handler_fn(|req, res, _next| {
                    async move {
                        let name = req.param("name").unwrap_or("?").to_string();
                        res.send(format!("hello {name}")).await?;
                        Ok(())
                    }
                    .boxed()
                }),
            )
            .unwrap()
            .get("/boom", handler_fn(|_req, _res, _next| async move { Err("boom".into()) }.boxed()))
            .unwrap();
        router
    }

    fn server() -> Server {
        Server::builder().router(router()).address("127.0.0.1:0").build().unwrap()
    }

    async fn call(server: &Server, target: &str) -> String {
        let (client, socket) = tokio::io::duplex(64 * 1024);
        let mut writer = ResponseWriter::new(socket);
        let req = http::Request::builder().uri(target).body(Bytes::new()).unwrap();
        server.call(req, &mut writer).await.unwrap();
        drop(writer);
        received(client).await
    }

    #[test]
    fn build_errors() {
        assert!(matches!(Server::builder().address("127.0.0.1:0").build(), Err(ServerBuildError::MissingRouter)));
        assert!(matches!(Server::builder().router(Router::new()).build(), Err(ServerBuildError::MissingAddress)));
        assert!(matches!(
            Server::builder().router(Router::new()).address("not an address").build(),
            Err(ServerBuildError::InvalidAddress { .. })
        ));
    }

    #[test]
    fn builder_configures_connections() {
        let server = Server::builder()
            .router(Router::new())
            .address(("127.0.0.1", 0))
            .read_timeout(Duration::from_secs(5))
            .read_buffer_size(512)
            .backlog(16)
            .max_connections(8)
            .build()
            .unwrap();

        assert_eq!(server.config().read_timeout, Duration::from_secs(5));
        assert_eq!(server.config().read_buffer_size, 512);
        assert_eq!(server.config().backlog, 16);
        assert_eq!(server.config().max_connections, Some(8));
    }

    #[tokio::test]
    async fn routes_requests() {
        let output = call(&server(), "/hello/neo").await;
        assert!(output.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(output.ends_with("hello neo"));
    }

    #[tokio::test]
    async fn handler_error_becomes_500() {
        let output = call(&server(), "/boom").await;
        assert!(output.starts_with("HTTP/1.1 500 Internal Server Error\r\n"));
        assert!(output.ends_with("content-length: 0\r\n\r\n"));
    }

    #[tokio::test]
    async fn unmatched_request_gets_404() {
        let output = call(&server(), "/nowhere").await;
        assert!(output.starts_with("HTTP/1.1 404 Not Found\r\n"));
        assert!(output.ends_with("Cannot GET /nowhere"));
    }

    #[tokio::test]
    async fn render_reads_from_views() {
        let views = tempfile::tempdir().unwrap();
        std::fs::write(views.path().join("page.html"), "<p>page</p>").unwrap();

        let mut router = Router::new();
        router
            .get("/page", handler_fn(|_req, res, _next| async move { Ok(res.render("page.html").await?) }.boxed()))
            .unwrap();
        let server = Server::builder().router(router).address("127.0.0.1:0").views(views.path()).build().unwrap();

        let output = call(&server, "/page").await;
        assert!(output.contains("content-type: text/html\r\n"));
        assert!(output.ends_with("<p>page</p>"));
    }
}

//! Listening socket and the working set of live connections.

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::{TcpListener, TcpSocket};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::connection::{ConnectionConfig, HttpConnection};
use crate::handler::Handler;

/// Accepts connections and serves each one on its own task.
///
/// Spawned connection tasks form the working set. With `max_connections` configured,
/// accepting waits while the working set is full.
#[derive(Debug)]
pub struct Multiplexer {
    listener: TcpListener,
    config: Arc<ConnectionConfig>,
}

impl Multiplexer {
    /// Creates the listening socket: `SO_REUSEADDR`, bind, then listen with the
    /// configured backlog.
    ///
    /// # Errors
    ///
    /// Returns the io error of the first socket operation that fails.
    pub fn bind(addr: SocketAddr, config: ConnectionConfig) -> io::Result<Self> {
        let socket = if addr.is_ipv4() { TcpSocket::new_v4()? } else { TcpSocket::new_v6()? };
        socket.set_reuseaddr(true)?;
        socket.bind(addr)?;
        let listener = socket.listen(config.backlog)?;

        info!(
            address = %listener.local_addr()?,
            backlog = config.backlog,
            max_connections = ?config.max_connections,
            "listener bound"
        );

        Ok(Self { listener, config: Arc::new(config) })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Serves connections forever.
    pub async fn run<H>(self, handler: Arc<H>)
    where
        H: Handler + ?Sized + 'static,
    {
        self.run_until(handler, std::future::pending()).await;
    }

    /// Serves connections until `shutdown` resolves, then waits for the connections
    /// still in flight.
    pub async fn run_until<H, F>(self, handler: Arc<H>, shutdown: F)
    where
        H: Handler + ?Sized + 'static,
        F: Future<Output = ()>,
    {
        let limit = self.config.max_connections.map(|max| Arc::new(Semaphore::new(max)));
        let mut connections = JoinSet::new();
        tokio::pin!(shutdown);

        loop {
            // a connection slot comes first, so a full working set stops accepting
            let permit = match &limit {
                Some(limit) => tokio::select! {
                    () = &mut shutdown => break,
                    permit = Arc::clone(limit).acquire_owned() => match permit {
                        Ok(permit) => Some(permit),
                        Err(_) => break,
                    },
                },
                None => None,
            };

            tokio::select! {
                () = &mut shutdown => break,

                Some(joined) = connections.join_next(), if !connections.is_empty() => {
                    if let Err(e) = joined {
                        error!(cause = %e, "connection task failed");
                    }
                }

                accepted = self.listener.accept() => match accepted {
                    Ok((stream, remote_addr)) => {
                        if let Err(e) = stream.set_nodelay(true) {
                            warn!(remote_addr = %remote_addr, cause = %e, "can't disable nagle");
                        }
                        debug!(remote_addr = %remote_addr, working_set = connections.len() + 1, "accepted connection");

                        let handler = Arc::clone(&handler);
                        let config = Arc::clone(&self.config);
                        connections.spawn(serve(stream, remote_addr, handler, config, permit));
                    }
                    Err(e) => {
                        warn!(cause = %e, "failed to accept");
                    }
                },
            }
        }

        info!(in_flight = connections.len(), "stop accepting, waiting for connections");
        while let Some(joined) = connections.join_next().await {
            if let Err(e) = joined {
                error!(cause = %e, "connection task failed");
            }
        }
    }
}

async fn serve<H>(
    stream: tokio::net::TcpStream,
    remote_addr: SocketAddr,
    handler: Arc<H>,
    config: Arc<ConnectionConfig>,
    _permit: Option<OwnedSemaphorePermit>,
) where
    H: Handler + ?Sized,
{
    let (reader, writer) = stream.into_split();
    let connection = HttpConnection::new(reader, writer, remote_addr, &config);
    match connection.process(handler).await {
        Ok(()) => debug!(remote_addr = %remote_addr, "finished process, connection shutdown"),
        Err(e) => warn!(remote_addr = %remote_addr, cause = %e, "service has error, connection shutdown"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::make_handler;
    use futures::FutureExt;
    use http::Response;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;
    use tokio::sync::oneshot;

    fn hello() -> impl Handler {
        make_handler(|req, writer| {
            async move {
                let head = Response::builder().body(())?;
                writer.send(&head, &format!("hello {}", req.uri().path()).into()).await?;
                Ok(())
            }
            .boxed()
        })
    }

    async fn get(addr: SocketAddr, path: &str) -> String {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream.write_all(format!("GET {path} HTTP/1.1\r\nHost: test\r\n\r\n").as_bytes()).await.unwrap();
        let mut output = String::new();
        stream.read_to_string(&mut output).await.unwrap();
        output
    }

    #[tokio::test]
    async fn serves_concurrent_clients() {
        let multiplexer = Multiplexer::bind("127.0.0.1:0".parse().unwrap(), ConnectionConfig::default()).unwrap();
        let addr = multiplexer.local_addr().unwrap();
        let (stop, stopped) = oneshot::channel::<()>();

        let server = tokio::spawn(multiplexer.run_until(Arc::new(hello()), async move {
            let _ = stopped.await;
        }));

        let (a, b) = tokio::join!(get(addr, "/a"), get(addr, "/b"));
        assert!(a.ends_with("hello /a"));
        assert!(b.ends_with("hello /b"));

        stop.send(()).unwrap();
        server.await.unwrap();
    }

    #[tokio::test]
    async fn bounded_working_set_still_serves_everyone() {
        let config = ConnectionConfig::new().max_connections(1);
        let multiplexer = Multiplexer::bind("127.0.0.1:0".parse().unwrap(), config).unwrap();
        let addr = multiplexer.local_addr().unwrap();
        let (stop, stopped) = oneshot::channel::<()>();

        let server = tokio::spawn(multiplexer.run_until(Arc::new(hello()), async move {
            let _ = stopped.await;
        }));

        for path in ["/1", "/2", "/3"] {
            assert!(get(addr, path).await.ends_with(&format!("hello {path}")));
        }

        stop.send(()).unwrap();
        server.await.unwrap();
    }
}

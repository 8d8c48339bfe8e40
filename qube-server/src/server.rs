use std::{future::Future, net::SocketAddr, sync::Arc};

use qube::{QubeController, Session};
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    net::{TcpListener, TcpStream},
    select,
};

use crate::{error::ServerError, request::handle_line};

/// A server that runs the requests of each connection in its own [`Session`].
pub struct QubeServer {
    qube: Arc<QubeController>,
    port: u16,
    shutdown: Option<Box<dyn Future<Output = ()> + Send + Unpin>>,
}

impl QubeServer {
    /// Create a new [`QubeServer`].
    ///
    /// # Arguments
    ///
    /// * `port` - The port to listen on
    /// * `qube` - The engine that runs the requests
    pub const fn new(port: u16, qube: Arc<QubeController>) -> Self {
        Self {
            qube,
            port,
            shutdown: None,
        }
    }

    /// Configure graceful shutdown with a custom shutdown signal.
    ///
    /// # Arguments
    ///
    /// * `signal` - A future that completes when the server should shut down
    pub fn with_graceful_shutdown<F>(mut self, signal: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.shutdown = Some(Box::new(Box::pin(signal)));
        self
    }

    /// Run the server on `0.0.0.0:<port>`.
    ///
    /// # Errors
    ///
    /// Returns an error if binding to the port or accepting a connection fails.
    pub async fn run(self) -> Result<(), ServerError> {
        let listener = TcpListener::bind(("0.0.0.0", self.port)).await?;
        self.serve(listener).await
    }

    /// Run the server on a bound listener.
    ///
    /// Each connection is served by its own task. If a shutdown signal is configured via
    /// [`with_graceful_shutdown`](Self::with_graceful_shutdown), the server stops accepting
    /// connections when the signal completes.
    pub async fn serve(mut self, listener: TcpListener) -> Result<(), ServerError> {
        tracing::info!("Listening on {}", listener.local_addr()?);
        let res = if let Some(shutdown) = self.shutdown.take() {
            select! {
                result = Self::accept_loop(&self.qube, &listener) => result,
                _ = shutdown => Ok(()),
            }
        } else {
            Self::accept_loop(&self.qube, &listener).await
        };
        tracing::info!("Server stopped");
        res
    }

    async fn accept_loop(
        qube: &Arc<QubeController>,
        listener: &TcpListener,
    ) -> Result<(), ServerError> {
        loop {
            let (stream, addr) = listener.accept().await?;
            let qube = qube.clone();
            tokio::spawn(async move {
                if let Err(e) = handle_client(&qube, stream, addr).await {
                    tracing::warn!("{}: {}", addr, e);
                }
            });
        }
    }
}

async fn handle_client(
    qube: &QubeController,
    stream: TcpStream,
    addr: SocketAddr,
) -> Result<(), ServerError> {
    tracing::info!("{} connected", addr);
    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();
    let mut session = Session::new();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let response = handle_line(qube, &mut session, &line).await;
        let mut buf = serde_json::to_vec(&response)?;
        buf.push(b'\n');
        writer.write_all(&buf).await?;
    }

    tracing::info!("{} disconnected", addr);
    Ok(())
}

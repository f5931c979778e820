//! `GoFourServer` builder and accept loop.
//!
//! Ties the layers together: transport → protocol → registry → engine.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use gofour_protocol::{Codec, JsonCodec};

use crate::handler::handle_connection;
use crate::transport::{PendingConnection, WebSocketListener};
use crate::{GameRegistry, ServerError, TransportError};

/// Default address the server listens on.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";

/// How long a connection may stay silent before it is closed.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(60);

/// Runtime settings for a server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: String,
    /// Applies between requests. Attached observers are exempt while the
    /// game is streaming.
    pub idle_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
        }
    }
}

/// Shared state handed to every connection task.
pub(crate) struct ServerState<C: Codec> {
    pub(crate) registry: Arc<GameRegistry>,
    pub(crate) codec: C,
    pub(crate) config: ServerConfig,
}

/// Builder for configuring and starting a server.
///
/// # Example
///
/// ```rust,no_run
/// use gofour_server::GoFourServer;
///
/// # async fn run() -> Result<(), gofour_server::ServerError> {
/// let server = GoFourServer::builder()
///     .bind("0.0.0.0:8080")
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
#[derive(Default)]
pub struct GoFourServerBuilder {
    config: ServerConfig,
    registry: Option<Arc<GameRegistry>>,
}

impl GoFourServerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the address to bind to. Port 0 picks a free port.
    pub fn bind(mut self, addr: &str) -> Self {
        self.config.bind_addr = addr.to_string();
        self
    }

    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.config.idle_timeout = timeout;
        self
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Hosts games in an existing registry instead of a fresh one.
    pub fn registry(mut self, registry: Arc<GameRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Binds the listener. Uses [`JsonCodec`] on the wire.
    pub async fn build(self) -> Result<GoFourServer<JsonCodec>, ServerError> {
        let listener = WebSocketListener::bind(&self.config.bind_addr).await?;
        let state = Arc::new(ServerState {
            registry: self.registry.unwrap_or_default(),
            codec: JsonCodec,
            config: self.config,
        });
        Ok(GoFourServer { listener, state })
    }
}

/// A bound server. Call [`run()`](Self::run) to start accepting clients.
pub struct GoFourServer<C: Codec> {
    listener: WebSocketListener,
    state: Arc<ServerState<C>>,
}

impl GoFourServer<JsonCodec> {
    pub fn builder() -> GoFourServerBuilder {
        GoFourServerBuilder::new()
    }
}

impl<C: Codec> GoFourServer<C> {
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// The games this server hosts.
    pub fn registry(&self) -> Arc<GameRegistry> {
        Arc::clone(&self.state.registry)
    }

    pub fn config(&self) -> &ServerConfig {
        &self.state.config
    }

    /// Accepts connections forever, one task per client.
    ///
    /// The loop itself only accepts TCP connections. The WebSocket
    /// handshake happens on the client's task, bounded by the idle timeout,
    /// so a client that connects and stays silent cannot hold up anyone
    /// else. A failed accept or handshake is logged and skipped; it never
    /// stops the loop.
    pub async fn run(self) -> Result<(), ServerError> {
        tracing::info!(addr = %self.state.config.bind_addr, "gofour server running");

        loop {
            match self.listener.accept().await {
                Ok(pending) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        let conn_id = pending.id();
                        if let Err(e) = serve_client(pending, state).await {
                            tracing::debug!(%conn_id, error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::warn!(error = %e, "accept failed");
                }
            }
        }
    }
}

/// Completes the handshake, then hands the connection to the handler.
async fn serve_client<C: Codec>(
    pending: PendingConnection,
    state: Arc<ServerState<C>>,
) -> Result<(), ServerError> {
    let timeout = state.config.idle_timeout;
    let conn = tokio::time::timeout(timeout, pending.upgrade())
        .await
        .map_err(|_| TransportError::HandshakeTimeout(timeout))??;
    handle_connection(conn, state).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr, "127.0.0.1:8080");
        assert_eq!(config.idle_timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_builder_overrides() {
        let builder = GoFourServerBuilder::new()
            .bind("0.0.0.0:9000")
            .idle_timeout(Duration::from_secs(5));
        assert_eq!(builder.config.bind_addr, "0.0.0.0:9000");
        assert_eq!(builder.config.idle_timeout, Duration::from_secs(5));
        assert!(builder.registry.is_none());
    }

    #[tokio::test]
    async fn test_build_on_ephemeral_port() {
        let registry = Arc::new(GameRegistry::new());
        let server = GoFourServer::builder()
            .bind("127.0.0.1:0")
            .registry(Arc::clone(&registry))
            .build()
            .await
            .unwrap();
        assert_ne!(server.local_addr().unwrap().port(), 0);
        assert!(Arc::ptr_eq(&server.registry(), &registry));
    }
}

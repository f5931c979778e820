//! # gofour-server
//!
//! Hosts many GoFour games for remote players over WebSocket.
//!
//! Clients send [`Request`](gofour_protocol::Request)s wrapped in
//! [`Envelope`](gofour_protocol::Envelope)s and get one
//! [`Response`](gofour_protocol::Response) back per request. Attaching to a
//! game is the exception: the server pushes a snapshot right away and after
//! every state change, then a final `Detached` once the game is over.
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use gofour_server::GoFourServer;
//!
//! # async fn run() -> Result<(), gofour_server::ServerError> {
//! GoFourServer::builder()
//!     .bind("0.0.0.0:8080")
//!     .idle_timeout(Duration::from_secs(120))
//!     .build()
//!     .await?
//!     .run()
//!     .await
//! # }
//! ```

mod error;
mod handler;
mod registry;
mod server;
mod transport;

pub use error::{RegistryError, ServerError, TransportError};
pub use registry::{summarize, GameHandle, GameRegistry};
pub use server::{
    GoFourServer, GoFourServerBuilder, ServerConfig, DEFAULT_BIND_ADDR, DEFAULT_IDLE_TIMEOUT,
};
pub use transport::{ConnectionId, PendingConnection, WebSocketConnection, WebSocketListener};

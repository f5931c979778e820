//! Wire protocol for the GoFour game server.
//!
//! - **Types** ([`Envelope`], [`Request`], [`Response`], [`GameId`], ...):
//!   the messages that travel between a client and the server.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how those messages are
//!   turned into bytes and back.
//! - **Errors** ([`ProtocolError`]): what can go wrong doing so.
//!
//! The protocol layer knows nothing about connections or the game registry.
//! It reuses the engine's serializable types ([`State`](gofour_engine::State),
//! [`GameSnapshot`](gofour_engine::GameSnapshot)) so that a snapshot looks
//! the same on the wire as in memory.

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{Envelope, GameId, GameSummary, Payload, Request, Response};

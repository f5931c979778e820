//! Per-connection handler: decode requests, run them, send responses.
//!
//! Each accepted connection gets its own Tokio task running
//! [`handle_connection`]. The flow is:
//!   1. Wait (with an idle timeout) for the next envelope
//!   2. `AttachGame` → stream snapshots until the game ends, still answering
//!      other requests in between
//!   3. `Disconnect` → close
//!   4. Anything else → [`dispatch`] against the registry, send the answer

use std::sync::Arc;
use std::time::Instant;

use gofour_engine::GameConfig;
use gofour_protocol::{Codec, Envelope, GameId, Payload, Request, Response};

use crate::server::ServerState;
use crate::transport::WebSocketConnection;
use crate::{GameRegistry, ServerError};

/// Numbers and timestamps outgoing envelopes for one connection.
struct Outbox<'a, C: Codec> {
    conn: &'a WebSocketConnection,
    codec: &'a C,
    seq: u64,
    start: Instant,
}

impl<C: Codec> Outbox<'_, C> {
    async fn send(&mut self, response: Response) -> Result<(), ServerError> {
        let envelope = Envelope::new(
            self.seq,
            self.start.elapsed().as_millis() as u64,
            Payload::Response(response),
        );
        self.seq += 1;
        let bytes = self.codec.encode(&envelope)?;
        self.conn.send(bytes).await?;
        Ok(())
    }

    async fn send_error(&mut self, code: u16, message: String) -> Result<(), ServerError> {
        self.send(Response::Error { code, message }).await
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C: Codec>(
    conn: WebSocketConnection,
    state: Arc<ServerState<C>>,
) -> Result<(), ServerError> {
    let conn_id = conn.id();
    tracing::debug!(%conn_id, peer = %conn.peer(), "handling new connection");

    let mut outbox = Outbox {
        conn: &conn,
        codec: &state.codec,
        seq: 1,
        start: Instant::now(),
    };

    loop {
        let data = match tokio::time::timeout(state.config.idle_timeout, conn.recv()).await {
            Ok(Ok(Some(data))) => data,
            Ok(Ok(None)) => {
                tracing::debug!(%conn_id, "connection closed cleanly");
                break;
            }
            Ok(Err(e)) => {
                tracing::debug!(%conn_id, error = %e, "recv error");
                break;
            }
            Err(_) => {
                tracing::info!(%conn_id, "connection idle, closing");
                break;
            }
        };

        let request = match parse_request(&state.codec, &data) {
            Ok(request) => request,
            Err(message) => {
                tracing::debug!(%conn_id, %message, "rejected frame");
                outbox.send_error(400, message).await?;
                continue;
            }
        };

        match request {
            Request::Disconnect { reason } => {
                tracing::debug!(%conn_id, %reason, "client disconnected");
                break;
            }
            Request::AttachGame { game_id } => {
                let keep_open = attach(&conn, &state.registry, &mut outbox, game_id).await?;
                if !keep_open {
                    break;
                }
            }
            request => {
                let response = dispatch(&state.registry, request).await;
                outbox.send(response).await?;
            }
        }
    }

    let _ = conn.close().await;
    Ok(())
}

/// Decodes one frame into a request. The error is the message for a 400.
fn parse_request<C: Codec>(codec: &C, data: &[u8]) -> Result<Request, String> {
    let envelope: Envelope = codec.decode(data).map_err(|e| e.to_string())?;
    match envelope.payload {
        Payload::Request(request) => Ok(request),
        Payload::Response(_) => Err("expected a request".to_string()),
    }
}

/// Runs one non-streaming request against the registry.
pub(crate) async fn dispatch(registry: &GameRegistry, request: Request) -> Response {
    let result = match request {
        Request::CreateGame {
            columns,
            rows,
            n_players,
            n_win,
        } => {
            let defaults = GameConfig::default();
            let config = GameConfig::new(
                columns.unwrap_or(defaults.columns),
                rows.unwrap_or(defaults.rows),
                n_players.unwrap_or(defaults.n_players),
                n_win.unwrap_or(defaults.n_win),
            );
            registry
                .create(config)
                .await
                .map(|game_id| Response::GameCreated { game_id })
        }
        Request::ListGames => Ok(Response::GameList {
            games: registry.list().await,
        }),
        Request::JoinGame {
            game_id,
            player_name,
        } => registry
            .join(&game_id, &player_name)
            .await
            .map(|color| Response::Joined { game_id, color }),
        Request::PlayMove {
            game_id,
            player_name,
            column,
        } => registry
            .play(&game_id, &player_name, column)
            .await
            .map(|result| Response::MovePlayed { game_id, result }),
        Request::RemoveGame { game_id } => registry
            .remove(&game_id)
            .await
            .map(|final_state| Response::GameRemoved {
                game_id,
                final_state,
            }),
        Request::AttachGame { .. } | Request::Disconnect { .. } => {
            return Response::Error {
                code: 400,
                message: "request cannot be dispatched".to_string(),
            };
        }
    };

    result.unwrap_or_else(|e| {
        if e.code() >= 500 {
            tracing::error!(error = %e, "request failed");
        } else {
            tracing::debug!(error = %e, "request rejected");
        }
        Response::Error {
            code: e.code(),
            message: e.to_string(),
        }
    })
}

/// Streams snapshots of `game_id` until it finishes.
///
/// The connection stays fully usable while attached: requests that arrive
/// in the meantime are answered between snapshots, since responses and
/// snapshots are distinct message types a client can tell apart. Two
/// requests are special:
///
/// - `Disconnect` ends the attachment and the connection.
/// - A second `AttachGame` is refused with 409; one connection follows one
///   game at a time.
///
/// Returns `false` when the client left while attached, so the caller stops
/// reading from the connection.
async fn attach<C: Codec>(
    conn: &WebSocketConnection,
    registry: &GameRegistry,
    outbox: &mut Outbox<'_, C>,
    game_id: GameId,
) -> Result<bool, ServerError> {
    let (snapshot, mut activity) = match registry.attach(&game_id).await {
        Ok(attached) => attached,
        Err(e) => {
            outbox.send_error(e.code(), e.to_string()).await?;
            return Ok(true);
        }
    };
    tracing::debug!(conn_id = %conn.id(), %game_id, "observer attached");

    let mut final_state = snapshot.grid_state;
    outbox
        .send(Response::Snapshot {
            game_id: game_id.clone(),
            game: snapshot,
        })
        .await?;

    loop {
        tokio::select! {
            event = activity.recv() => {
                if event.is_none() {
                    break;
                }
                // Re-read the whole game rather than trusting the event;
                // dropped events are harmless this way.
                let Ok(snapshot) = registry.snapshot(&game_id).await else {
                    break;
                };
                final_state = snapshot.grid_state;
                outbox
                    .send(Response::Snapshot {
                        game_id: game_id.clone(),
                        game: snapshot,
                    })
                    .await?;
            }
            incoming = conn.recv() => {
                let data = match incoming {
                    Ok(Some(data)) => data,
                    Ok(None) | Err(_) => {
                        tracing::debug!(conn_id = %conn.id(), %game_id, "observer left");
                        return Ok(false);
                    }
                };
                match parse_request(outbox.codec, &data) {
                    Err(message) => outbox.send_error(400, message).await?,
                    Ok(Request::Disconnect { reason }) => {
                        tracing::debug!(conn_id = %conn.id(), %game_id, %reason, "observer disconnected");
                        return Ok(false);
                    }
                    Ok(Request::AttachGame { .. }) => {
                        outbox
                            .send_error(409, format!("already attached to game '{game_id}'"))
                            .await?;
                    }
                    Ok(request) => {
                        let response = dispatch(registry, request).await;
                        outbox.send(response).await?;
                    }
                }
            }
        }
    }

    outbox
        .send(Response::Detached {
            game_id,
            final_state,
        })
        .await?;
    Ok(true)
}

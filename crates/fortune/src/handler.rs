//! Per-connection handler: registration, line routing, and cleanup.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Register the connection with the match actor → get an outbound channel
//!   2. Spawn a writer task that drains the channel onto the socket
//!   3. Loop: receive lines → decode → forward to the match actor
//!   4. On EOF, error, idle timeout or QUIT → report the disconnect

use std::sync::Arc;
use std::time::Duration;

use fortune_game::{MatchHandle, MatchOutbound};
use fortune_protocol::{Codec, GameCommand, PlayerId};
use fortune_transport::{Connection, TcpLineConnection, TransportError};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::server::ServerState;
use crate::FortuneError;

/// How long the writer gets to flush queued lines after the reader stops.
const FLUSH_TIMEOUT: Duration = Duration::from_secs(2);

/// Drop guard that reports the player's disconnect when the handler exits.
///
/// This ensures cleanup happens even if the handler panics. Since `Drop`
/// is synchronous, we spawn a fire-and-forget task for the channel send.
struct DisconnectGuard {
    player_id: PlayerId,
    game: MatchHandle,
}

impl Drop for DisconnectGuard {
    fn drop(&mut self) {
        let player_id = self.player_id;
        let game = self.game.clone();
        tokio::spawn(async move {
            let _ = game.disconnect(player_id).await;
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection(
    conn: TcpLineConnection,
    state: Arc<ServerState>,
) -> Result<(), FortuneError> {
    let conn_id = conn.id();
    let player_id = PlayerId(conn_id.into_inner());
    let conn = Arc::new(conn);

    // --- Step 1: Register ---
    let (tx, rx) = mpsc::unbounded_channel();
    state.game.connect(player_id, tx).await?;
    let guard = DisconnectGuard {
        player_id,
        game: state.game.clone(),
    };
    tracing::info!(%conn_id, %player_id, "player connected");

    // --- Step 2: Writer ---
    let writer = spawn_writer(Arc::clone(&conn), Arc::clone(&state), rx);

    // --- Step 3: Read loop ---
    let result = read_loop(&conn, &state, player_id).await;

    // --- Step 4: Cleanup ---
    // The actor drops our sender once it has processed the disconnect,
    // which lets the writer drain what is left and stop.
    drop(guard);
    if tokio::time::timeout(FLUSH_TIMEOUT, writer).await.is_err() {
        tracing::debug!(%player_id, "writer did not finish in time");
    }
    let _ = conn.close().await;
    tracing::info!(%player_id, "player disconnected");

    result
}

/// Reads lines until the peer leaves. Returns `Ok` for every ordinary
/// way a connection ends.
async fn read_loop(
    conn: &TcpLineConnection,
    state: &ServerState,
    player_id: PlayerId,
) -> Result<(), FortuneError> {
    loop {
        let line = match tokio::time::timeout(state.idle_timeout, conn.recv_line()).await {
            Ok(Ok(Some(line))) => line,
            Ok(Ok(None)) => {
                tracing::info!(%player_id, "connection closed cleanly");
                return Ok(());
            }
            Ok(Err(TransportError::LineTooLong(max))) => {
                tracing::debug!(%player_id, max, "line too long");
                send_help(conn, state, &format!("line longer than {max} bytes")).await?;
                continue;
            }
            Ok(Err(e)) => {
                tracing::debug!(%player_id, error = %e, "recv error");
                return Ok(());
            }
            Err(_) => {
                tracing::info!(%player_id, "connection timed out");
                return Ok(());
            }
        };

        if line.is_empty() {
            continue;
        }

        let command = match state.codec.decode(&line) {
            Ok(command) => command,
            Err(e) => {
                tracing::debug!(%player_id, error = %e, "failed to decode line");
                send_help(conn, state, &e.to_string()).await?;
                continue;
            }
        };

        let quitting = matches!(command, GameCommand::Quit { .. });
        state.game.send_command(player_id, command).await?;
        if quitting {
            tracing::info!(%player_id, "player quit");
            return Ok(());
        }
    }
}

/// Spawns the task that writes the actor's outbound commands to the socket.
fn spawn_writer(
    conn: Arc<TcpLineConnection>,
    state: Arc<ServerState>,
    mut rx: mpsc::UnboundedReceiver<MatchOutbound>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            match msg {
                MatchOutbound::Command(command) => {
                    let line = state.codec.encode(&command);
                    if let Err(e) = conn.send_line(&line).await {
                        tracing::debug!(conn_id = %conn.id(), error = %e, "send failed");
                        break;
                    }
                }
                MatchOutbound::Close => break,
            }
        }
    })
}

/// Answers a line that never reached the match with a `HELP` message.
async fn send_help(
    conn: &TcpLineConnection,
    state: &ServerState,
    text: &str,
) -> Result<(), FortuneError> {
    let help = GameCommand::help(text);
    conn.send_line(&state.codec.encode(&help)).await?;
    Ok(())
}

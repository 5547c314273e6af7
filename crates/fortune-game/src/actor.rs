//! Match actor: an isolated Tokio task that owns the [`Game`].
//!
//! Connection handlers never touch the game directly. They send
//! [`MatchCommand`]s through a channel, and the actor applies them one at
//! a time, so every state change happens on one sequential path. This is
//! the "actor model": no shared mutable state, just message passing.

use std::collections::HashMap;

use fortune_protocol::{GameCommand, PlayerId, Recipient, RoundNumber};
use tokio::sync::{mpsc, oneshot};

use crate::game::Outbox;
use crate::{Game, GameConfig, GameError, MatchState};

/// An outbound message from the match actor to a connection handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutbound {
    /// A command to write to the player's connection.
    Command(GameCommand),
    /// The player quit: flush and close the connection.
    Close,
}

/// Channel sender for delivering outbound messages to a player.
pub type PlayerSender = mpsc::UnboundedSender<MatchOutbound>;

/// Commands sent to the match actor through its channel.
///
/// The `oneshot::Sender` in some variants is a "reply channel": the
/// caller sends a command and waits for the response on it.
enum MatchCommand {
    /// Register a new connection and its outbound channel.
    Connect {
        player_id: PlayerId,
        sender: PlayerSender,
        reply: oneshot::Sender<Result<(), GameError>>,
    },

    /// Apply a decoded command from a player.
    Command {
        player_id: PlayerId,
        command: GameCommand,
    },

    /// The connection is gone.
    Disconnect { player_id: PlayerId },

    /// Request a snapshot of the match.
    GetInfo { reply: oneshot::Sender<MatchInfo> },

    /// Stop the actor.
    Shutdown,
}

/// A snapshot of match metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchInfo {
    /// Current lifecycle state.
    pub state: MatchState,
    /// Open connections, joined or not.
    pub connections: usize,
    /// Players that have joined (lobby and match).
    pub joined: usize,
    /// The running round, if any.
    pub round: Option<RoundNumber>,
}

/// Handle to a running match actor. Used to send commands to it.
///
/// This is cheap to clone: it's just an `mpsc::Sender` wrapper. Every
/// connection handler holds one.
#[derive(Clone)]
pub struct MatchHandle {
    sender: mpsc::Sender<MatchCommand>,
}

impl MatchHandle {
    /// Registers a connection. Commands for it are delivered to `sender`.
    pub async fn connect(
        &self,
        player_id: PlayerId,
        sender: PlayerSender,
    ) -> Result<(), GameError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(MatchCommand::Connect {
                player_id,
                sender,
                reply: reply_tx,
            })
            .await
            .map_err(|_| GameError::Unavailable)?;
        reply_rx.await.map_err(|_| GameError::Unavailable)?
    }

    /// Forwards a player's command (fire-and-forget).
    ///
    /// Rejections come back to the player as `HELP` on its outbound channel.
    pub async fn send_command(
        &self,
        player_id: PlayerId,
        command: GameCommand,
    ) -> Result<(), GameError> {
        self.sender
            .send(MatchCommand::Command { player_id, command })
            .await
            .map_err(|_| GameError::Unavailable)
    }

    /// Reports a closed connection.
    pub async fn disconnect(&self, player_id: PlayerId) -> Result<(), GameError> {
        self.sender
            .send(MatchCommand::Disconnect { player_id })
            .await
            .map_err(|_| GameError::Unavailable)
    }

    /// Requests the current match info.
    pub async fn info(&self) -> Result<MatchInfo, GameError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(MatchCommand::GetInfo { reply: reply_tx })
            .await
            .map_err(|_| GameError::Unavailable)?;
        reply_rx.await.map_err(|_| GameError::Unavailable)
    }

    /// Tells the actor to stop.
    pub async fn shutdown(&self) -> Result<(), GameError> {
        self.sender
            .send(MatchCommand::Shutdown)
            .await
            .map_err(|_| GameError::Unavailable)
    }
}

/// The internal actor state. Runs inside a Tokio task.
struct MatchActor {
    game: Game,
    /// Per-connection outbound channels.
    senders: HashMap<PlayerId, PlayerSender>,
    receiver: mpsc::Receiver<MatchCommand>,
}

impl MatchActor {
    /// Runs the actor loop, processing commands until shutdown.
    async fn run(mut self) {
        tracing::info!("match actor started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                MatchCommand::Connect {
                    player_id,
                    sender,
                    reply,
                } => {
                    let result = self.handle_connect(player_id, sender);
                    let _ = reply.send(result);
                }
                MatchCommand::Command { player_id, command } => {
                    self.handle_command(player_id, command);
                }
                MatchCommand::Disconnect { player_id } => {
                    self.handle_disconnect(player_id);
                }
                MatchCommand::GetInfo { reply } => {
                    let _ = reply.send(self.info());
                }
                MatchCommand::Shutdown => {
                    tracing::info!("match shutting down");
                    break;
                }
            }
        }

        tracing::info!("match actor stopped");
    }

    fn handle_connect(
        &mut self,
        player_id: PlayerId,
        sender: PlayerSender,
    ) -> Result<(), GameError> {
        self.game.connect(player_id)?;
        self.senders.insert(player_id, sender);
        tracing::debug!(%player_id, connections = self.senders.len(), "connection registered");
        Ok(())
    }

    fn handle_command(&mut self, player_id: PlayerId, command: GameCommand) {
        if !self.senders.contains_key(&player_id) {
            tracing::warn!(%player_id, "command from unknown player, ignoring");
            return;
        }

        let verb = command.verb();
        let quitting = matches!(command, GameCommand::Quit { .. });
        match self.game.handle(player_id, command) {
            Ok(outbox) => {
                self.dispatch(outbox);
                if quitting {
                    self.send_to(player_id, MatchOutbound::Close);
                    self.senders.remove(&player_id);
                }
            }
            Err(e) => {
                tracing::debug!(%player_id, %verb, error = %e, "command rejected");
                self.send_to(player_id, MatchOutbound::Command(GameCommand::help(e.to_string())));
            }
        }
    }

    fn handle_disconnect(&mut self, player_id: PlayerId) {
        if self.senders.remove(&player_id).is_none() {
            return;
        }
        let outbox = self.game.disconnect(player_id);
        self.dispatch(outbox);
        tracing::debug!(%player_id, connections = self.senders.len(), "connection dropped");
    }

    /// Delivers outbound commands to the correct recipients.
    fn dispatch(&self, outbox: Outbox) {
        for (recipient, command) in outbox {
            match recipient {
                Recipient::All => {
                    for pid in self.game.audience() {
                        self.send_to(pid, MatchOutbound::Command(command.clone()));
                    }
                }
                Recipient::Player(pid) => {
                    self.send_to(pid, MatchOutbound::Command(command));
                }
                Recipient::AllExcept(excluded) => {
                    for pid in self.game.audience() {
                        if pid != excluded {
                            self.send_to(pid, MatchOutbound::Command(command.clone()));
                        }
                    }
                }
            }
        }
    }

    /// Sends an outbound message to a single player. Silently drops it
    /// if the receiver is gone (player disconnected).
    fn send_to(&self, player_id: PlayerId, msg: MatchOutbound) {
        if let Some(sender) = self.senders.get(&player_id) {
            let _ = sender.send(msg);
        }
    }

    fn info(&self) -> MatchInfo {
        MatchInfo {
            state: self.game.state(),
            connections: self.senders.len(),
            joined: self.game.sessions().joined_count(),
            round: self.game.round(),
        }
    }
}

/// Spawns a match actor task and returns a handle to communicate with it.
///
/// `channel_size` controls backpressure: if the channel fills up,
/// senders wait (bounded channel).
///
/// # Errors
/// [`GameError::InvalidConfig`] if `config` is unusable or `channel_size`
/// is zero.
pub fn spawn_match(config: GameConfig, channel_size: usize) -> Result<MatchHandle, GameError> {
    if channel_size == 0 {
        return Err(GameError::InvalidConfig(
            "channel_size must be at least 1".to_string(),
        ));
    }
    let (tx, rx) = mpsc::channel(channel_size);

    let actor = MatchActor {
        game: Game::new(config)?,
        senders: HashMap::new(),
        receiver: rx,
    };

    tokio::spawn(actor.run());

    Ok(MatchHandle { sender: tx })
}

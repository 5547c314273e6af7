//! `FortuneServer` builder and server loop.
//!
//! This is the entry point for running a Fortune server. It ties together
//! all the layers: transport → protocol → session → game.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use fortune_game::{spawn_match, GameConfig, MatchHandle};
use fortune_protocol::{registry, LineCodec};
use fortune_transport::{TcpLineTransport, Transport};

use crate::handler::handle_connection;
use crate::{FortuneError, ServerConfig};

/// Shared server state passed to each connection handler task.
///
/// Wrapped in `Arc` so it can be cheaply cloned across tasks. The match
/// actor owns all mutable game state, so nothing here needs a lock.
pub(crate) struct ServerState {
    pub(crate) game: MatchHandle,
    pub(crate) codec: LineCodec,
    pub(crate) idle_timeout: Duration,
}

/// Builder for configuring and starting a Fortune server.
///
/// # Example
///
/// ```rust,no_run
/// use fortune::prelude::*;
///
/// # async fn start() -> Result<(), FortuneError> {
/// let server = FortuneServerBuilder::new()
///     .bind("0.0.0.0:1234")
///     .game_config(GameConfig { rounds: 5, ..GameConfig::default() })
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct FortuneServerBuilder {
    config: ServerConfig,
}

impl FortuneServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
        }
    }

    /// Starts from a loaded configuration.
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.config.bind = addr.to_string();
        self
    }

    /// Sets the match rules.
    pub fn game_config(mut self, game: GameConfig) -> Self {
        self.config.game = game;
        self
    }

    /// Sets how long a silent connection is kept open.
    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.config.idle_timeout_secs = timeout.as_secs().max(1);
        self
    }

    /// Binds the listener and starts the match actor.
    ///
    /// # Errors
    /// [`FortuneError::Transport`] if binding fails, or
    /// [`FortuneError::Game`] if the match configuration is invalid.
    pub async fn build(self) -> Result<FortuneServer, FortuneError> {
        let ServerConfig {
            bind,
            max_line_length,
            channel_size,
            game,
            ..
        } = self.config.clone();

        let game = spawn_match(game, channel_size)?;
        let transport = TcpLineTransport::bind(bind.as_str(), max_line_length).await?;

        let state = Arc::new(ServerState {
            game,
            codec: LineCodec::default(),
            idle_timeout: self.config.idle_timeout(),
        });

        Ok(FortuneServer { transport, state })
    }
}

impl Default for FortuneServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running Fortune server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct FortuneServer {
    transport: TcpLineTransport,
    state: Arc<ServerState>,
}

impl FortuneServer {
    /// Creates a new builder.
    pub fn builder() -> FortuneServerBuilder {
        FortuneServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, FortuneError> {
        Ok(self.transport.local_addr()?)
    }

    /// Runs the server accept loop.
    ///
    /// Checks the command registry first, so a verb without a decoder
    /// stops the server before the first client connects. Then accepts
    /// connections and spawns a handler task for each. Runs until the
    /// process is terminated.
    pub async fn run(mut self) -> Result<(), FortuneError> {
        registry::init()?;
        tracing::info!(addr = ?self.transport.local_addr().ok(), "Fortune server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}

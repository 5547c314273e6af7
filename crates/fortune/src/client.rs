//! `FortuneClient`: the network side of a player's session.
//!
//! The client owns one TCP connection and one [`ClientSession`]. It waits
//! on two sources at once, the console and the server, and feeds each
//! line through the session's state machine:
//!
//! ```text
//! console line → ClientSession::handle_input    → GameCommand → server
//! server line  → decode → ClientSession::handle_response → console
//! ```

use fortune_protocol::{Codec, LineCodec};
use fortune_session::{ClientSession, ClientState, Console};
use fortune_transport::{Connection, TcpLineConnection, TransportError};
use tokio::sync::mpsc;

use crate::FortuneError;

/// A connected player.
pub struct FortuneClient {
    conn: TcpLineConnection,
    codec: LineCodec,
    session: ClientSession,
}

impl FortuneClient {
    /// Connects to a server.
    ///
    /// # Errors
    /// [`FortuneError::Transport`] if the server cannot be reached.
    pub async fn connect(addr: &str, max_line_length: usize) -> Result<Self, FortuneError> {
        let conn = TcpLineConnection::connect(addr, max_line_length).await?;
        tracing::debug!(%addr, conn_id = %conn.id(), "connected to server");
        Ok(Self {
            conn,
            codec: LineCodec::default(),
            session: ClientSession::new(),
        })
    }

    pub fn session(&self) -> &ClientSession {
        &self.session
    }

    /// Runs the session until the player quits or the server goes away.
    ///
    /// `console_lines` carries what the player types, one line per
    /// message. When it closes the client quits on the player's behalf.
    /// Returns the final session, which is always
    /// [`ClientState::Disconnected`] on `Ok`.
    pub async fn run(
        mut self,
        mut console_lines: mpsc::Receiver<String>,
        console: &mut impl Console,
    ) -> Result<ClientSession, FortuneError> {
        console.info("Welcome to Wheel of Fortune! Enter your username to join:");

        while self.session.state() != ClientState::Disconnected {
            tokio::select! {
                input = console_lines.recv() => match input {
                    Some(line) => self.on_console_line(&line, console).await?,
                    None => self.on_console_closed(console).await?,
                },
                received = self.conn.recv_line() => match received {
                    Ok(Some(line)) => self.on_server_line(&line, console),
                    Ok(None) => {
                        console.error("The server closed the connection.");
                        self.session.disconnect();
                    }
                    Err(TransportError::LineTooLong(max)) => {
                        tracing::warn!(max, "server sent an oversized line");
                    }
                    Err(e) => {
                        self.session.disconnect();
                        return Err(e.into());
                    }
                },
            }
        }

        let _ = self.conn.close().await;
        Ok(self.session)
    }

    async fn on_console_line(
        &mut self,
        line: &str,
        console: &mut impl Console,
    ) -> Result<(), FortuneError> {
        // Rejected input has already been explained on the console.
        if let Ok(Some(command)) = self.session.handle_input(line, console) {
            tracing::debug!(verb = %command.verb(), "sending command");
            self.conn.send_line(&self.codec.encode(&command)).await?;
        }
        Ok(())
    }

    async fn on_console_closed(&mut self, console: &mut impl Console) -> Result<(), FortuneError> {
        tracing::debug!("console closed, quitting");
        match self.session.handle_input("quit", console) {
            Ok(Some(command)) => self.conn.send_line(&self.codec.encode(&command)).await?,
            _ => self.session.disconnect(),
        }
        Ok(())
    }

    fn on_server_line(&mut self, line: &str, console: &mut impl Console) {
        if line.is_empty() {
            return;
        }
        match self.codec.decode(line) {
            Ok(command) => {
                if !self.session.handle_response(&command, console).is_handled() {
                    tracing::debug!(
                        verb = %command.verb(),
                        state = %self.session.state(),
                        "ignored server command"
                    );
                }
            }
            Err(e) => {
                tracing::debug!(error = %e, %line, "failed to decode server line");
            }
        }
    }
}

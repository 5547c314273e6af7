//! The two state enums: one per client, one per connected player on the
//! server.

use std::fmt;

use fortune_protocol::Verb;

// ---------------------------------------------------------------------------
// ClientState
// ---------------------------------------------------------------------------

/// Where a client is in its conversation with the server.
///
/// ```text
///   AwaitingJoin ──LOBBY──→ Lobby ──START──→ WaitForTurn ⇄ MyTurn
///                             ↑                   │
///                             └──END/LOBBY── GameOver ←─WINNER─┘
///
///   any state ──quit / server gone──→ Disconnected
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClientState {
    /// Connected, username not confirmed yet.
    AwaitingJoin,
    /// In the lobby, waiting for the match to start.
    Lobby,
    /// In a match, someone else is playing.
    WaitForTurn,
    /// In a match, it is this client's turn.
    MyTurn,
    /// The winner was announced; waiting to return to the lobby.
    GameOver,
    /// Terminal. Nothing is sent or handled anymore.
    Disconnected,
}

impl ClientState {
    /// Returns `true` once the session is over.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Disconnected)
    }
}

impl fmt::Display for ClientState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::AwaitingJoin => "AWAITING_JOIN",
            Self::Lobby => "LOBBY",
            Self::WaitForTurn => "WAIT_FOR_TURN",
            Self::MyTurn => "MY_TURN",
            Self::GameOver => "GAME_OVER",
            Self::Disconnected => "DISCONNECTED",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// PlayerState
// ---------------------------------------------------------------------------

/// Where a connected player is, as seen by the server.
///
/// ```text
///   Connected ──JOIN──→ InLobby ──match starts──→ Playing
///                          ↑                         │
///                          └──────match ends─────────┘
///   any state ──QUIT / connection lost──→ Disconnected
/// ```
///
/// The state decides which verbs the server accepts from the player.
/// Whether the match itself allows the command (right turn, right phase)
/// is checked afterwards by the match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerState {
    /// Connection open, no JOIN yet.
    Connected,
    /// Joined, waiting in the lobby.
    InLobby,
    /// Taking part in the running match.
    Playing,
    /// Gone. Accepts nothing.
    Disconnected,
}

impl PlayerState {
    /// Returns `true` if a player in this state may send `verb`.
    ///
    /// Server-to-client verbs (START, ROUND, FILL, ...) are never accepted.
    pub fn accepts(self, verb: Verb) -> bool {
        match self {
            Self::Connected => matches!(verb, Verb::Join | Verb::Help | Verb::Quit),
            Self::InLobby => matches!(verb, Verb::Go | Verb::Help | Verb::Quit),
            Self::Playing => matches!(
                verb,
                Verb::Guess
                    | Verb::Vowel
                    | Verb::Skip
                    | Verb::Status
                    | Verb::Help
                    | Verb::Quit
            ),
            Self::Disconnected => false,
        }
    }

    /// Returns `true` once the player has sent a valid JOIN.
    pub fn has_joined(self) -> bool {
        matches!(self, Self::InLobby | Self::Playing)
    }
}

impl fmt::Display for PlayerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connected => write!(f, "connected"),
            Self::InLobby => write!(f, "in the lobby"),
            Self::Playing => write!(f, "playing"),
            Self::Disconnected => write!(f, "disconnected"),
        }
    }
}

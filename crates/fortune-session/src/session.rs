//! The server's record of one connected player.
//!
//! A "session" tracks:
//! - WHO the player is (`PlayerId`, and the `Username` once joined)
//! - WHERE they are (`PlayerState`), which decides what they may send

use fortune_protocol::{PlayerId, Username, Verb};

use crate::{PlayerState, SessionError};

/// A single player's session on the server.
///
/// Created when the connection is accepted, before any JOIN. Lives until
/// the player quits or the connection drops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerSession {
    /// Which connection this session belongs to.
    pub player_id: PlayerId,

    /// The name chosen with JOIN. `None` while `Connected`.
    pub username: Option<Username>,

    /// Current lifecycle state.
    pub state: PlayerState,
}

impl PlayerSession {
    /// A session for a connection that has not joined yet.
    pub fn new(player_id: PlayerId) -> Self {
        Self {
            player_id,
            username: None,
            state: PlayerState::Connected,
        }
    }

    /// Checks that this player may send `verb` right now.
    ///
    /// # Errors
    /// [`SessionError::NotAllowed`] if the state does not accept the verb.
    pub fn check(&self, verb: Verb) -> Result<(), SessionError> {
        if self.state.accepts(verb) {
            Ok(())
        } else {
            Err(SessionError::NotAllowed {
                verb,
                state: self.state,
            })
        }
    }

    /// The joined name.
    ///
    /// # Errors
    /// [`SessionError::NotJoined`] before a successful JOIN.
    pub fn joined_name(&self) -> Result<&Username, SessionError> {
        self.username
            .as_ref()
            .ok_or(SessionError::NotJoined(self.player_id))
    }
}

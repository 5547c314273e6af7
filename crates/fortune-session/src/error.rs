//! Error types for the session layer.

use fortune_protocol::{PlayerId, Username, Verb};

use crate::PlayerState;

/// Errors that can occur in either session state machine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// Local console input was not recognized in the current client state.
    /// Nothing is sent and the state does not change.
    #[error("invalid input: {0}")]
    InputRejected(String),

    /// No session exists for the given player.
    #[error("session not found for player {0}")]
    NotFound(PlayerId),

    /// The player already has a session, or already joined.
    #[error("player {0} has already joined")]
    AlreadyJoined(PlayerId),

    /// Another player already uses this name.
    #[error("username {0} is already taken")]
    UsernameTaken(Username),

    /// The player has not sent JOIN yet.
    #[error("player {0} has not joined")]
    NotJoined(PlayerId),

    /// The verb is not accepted from a player in this state.
    #[error("{verb} is not allowed while {state}")]
    NotAllowed { verb: Verb, state: PlayerState },
}

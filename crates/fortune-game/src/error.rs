//! Error types for the match layer.
//!
//! Every variant except `Unavailable` and `InvalidConfig` is a rejection
//! that goes back to the player who sent the command, as a `HELP` line.
//! The wording is written for that player.

use fortune_protocol::{Letter, Verb};
use fortune_session::SessionError;

use crate::MatchState;

/// Errors that can occur during match operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    /// The player's session does not allow the command.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The command is valid but the match is in the wrong phase.
    #[error("{verb} is not allowed while the match is {state}")]
    InvalidState { verb: Verb, state: MatchState },

    /// Only the turn holder may guess, buy a vowel or skip.
    #[error("it is not your turn")]
    NotYourTurn,

    /// Only the host may start the match.
    #[error("only the host can start the match")]
    NotHost,

    /// GO was sent with too few players in the lobby.
    #[error("need at least {needed} players to start, have {joined}")]
    NotEnoughPlayers { needed: usize, joined: usize },

    /// No more players may join.
    #[error("the match is full ({0} players)")]
    MatchFull(usize),

    /// The letter was already called this round.
    #[error("{0} has already been called")]
    AlreadyCalled(Letter),

    /// Vowels are bought with VOWEL, not guessed.
    #[error("{0} is a vowel, buy it with VOWEL")]
    NotAConsonant(Letter),

    /// The player's score does not cover the vowel.
    #[error("a vowel costs {cost} points and you have {score}")]
    CannotAffordVowel { cost: u32, score: u32 },

    /// The match configuration is unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The match actor is gone.
    #[error("the match is unavailable")]
    Unavailable,
}

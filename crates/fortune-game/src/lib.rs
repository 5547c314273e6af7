//! Match rules and the match actor for Fortune.
//!
//! The match runs as an isolated Tokio task (actor model) that owns the
//! player sessions, the lobby, and the running game.
//!
//! # Key types
//!
//! - [`Game`]: the rules, as a pure state machine
//! - [`MatchHandle`]: send commands to the running match actor
//! - [`MatchState`]: lifecycle state machine
//! - [`GameConfig`]: match settings (player limits, rounds, phrases, ...)
//! - [`Puzzle`]: one round's phrase and the letters called against it

mod actor;
mod config;
mod error;
mod game;
mod puzzle;

pub use actor::{spawn_match, MatchHandle, MatchInfo, MatchOutbound, PlayerSender};
pub use config::{GameConfig, MatchState};
pub use error::GameError;
pub use game::{Game, Outbox};
pub use puzzle::{PhraseDeck, Puzzle};

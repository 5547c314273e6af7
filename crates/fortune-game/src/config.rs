//! Match configuration and state machine.

use fortune_protocol::{Phrase, MAX_ROUNDS};
use serde::{Deserialize, Serialize};

use crate::GameError;

// ---------------------------------------------------------------------------
// GameConfig
// ---------------------------------------------------------------------------

/// Built-in puzzles used when the configuration names none.
const DEFAULT_PHRASES: &[&str] = &[
    "A PENNY FOR YOUR THOUGHTS",
    "BREAK THE ICE",
    "EVERY CLOUD HAS A SILVER LINING",
    "HIT THE NAIL ON THE HEAD",
    "ONCE IN A BLUE MOON",
    "SPILL THE BEANS",
    "THE BALL IS IN YOUR COURT",
    "UNDER THE WEATHER",
];

/// Configuration for a match.
///
/// Every field has a default, so a TOML `[game]` table only needs the
/// settings it changes:
///
/// ```toml
/// [game]
/// rounds = 5
/// phrases = ["LUCKY DAY", "FORTUNE FAVORS THE BOLD"]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Minimum joined players before the host may start.
    pub min_players: usize,

    /// Maximum joined players (lobby and match together).
    pub max_players: usize,

    /// Rounds per match, `1..=99`.
    pub rounds: u8,

    /// Puzzle pool. Shuffled at the start of each match.
    pub phrases: Vec<String>,

    /// Points for solving the whole phrase.
    pub phrase_bonus: u32,

    /// Points a vowel costs.
    pub vowel_cost: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            min_players: 2,
            max_players: 6,
            rounds: 3,
            phrases: DEFAULT_PHRASES.iter().map(|p| p.to_string()).collect(),
            phrase_bonus: 10,
            vowel_cost: 1,
        }
    }
}

impl GameConfig {
    /// Checks the limits and parses the phrase pool.
    ///
    /// # Errors
    /// [`GameError::InvalidConfig`] naming the first bad setting.
    pub fn validate(&self) -> Result<Vec<Phrase>, GameError> {
        if self.min_players == 0 {
            return Err(GameError::InvalidConfig("min_players must be at least 1".into()));
        }
        if self.max_players < self.min_players {
            return Err(GameError::InvalidConfig(format!(
                "max_players ({}) is below min_players ({})",
                self.max_players, self.min_players
            )));
        }
        if !(1..=MAX_ROUNDS).contains(&self.rounds) {
            return Err(GameError::InvalidConfig(format!(
                "rounds must be within 1..={MAX_ROUNDS}, got {}",
                self.rounds
            )));
        }
        if self.phrases.is_empty() {
            return Err(GameError::InvalidConfig("phrases is empty".into()));
        }
        self.phrases
            .iter()
            .map(|text| {
                Phrase::new(text)
                    .map_err(|e| GameError::InvalidConfig(format!("phrase {text:?}: {e}")))
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// MatchState
// ---------------------------------------------------------------------------

/// The lifecycle state of the match.
///
/// ```text
/// WaitingForPlayers → InRound ⇄ BetweenRounds
///         ↑              │
///         └── Finished ←─┘ (last round solved, or too few players left)
/// ```
///
/// - **WaitingForPlayers**: players gather in the lobby; the host may GO.
/// - **InRound**: a puzzle is on the board and one player holds the turn.
/// - **BetweenRounds**: the solution was shown; the next puzzle is coming.
/// - **Finished**: the winner was announced; players return to the lobby.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchState {
    WaitingForPlayers,
    InRound,
    BetweenRounds,
    Finished,
}

impl MatchState {
    /// Returns `true` if players may still JOIN without waiting.
    pub fn is_joinable(&self) -> bool {
        matches!(self, Self::WaitingForPlayers)
    }

    /// Returns `true` if moving to `target` is a valid step.
    pub fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::WaitingForPlayers, Self::InRound)
                | (Self::InRound, Self::BetweenRounds)
                | (Self::InRound, Self::Finished)
                | (Self::BetweenRounds, Self::InRound)
                | (Self::BetweenRounds, Self::Finished)
                | (Self::Finished, Self::WaitingForPlayers)
        )
    }
}

impl std::fmt::Display for MatchState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WaitingForPlayers => write!(f, "waiting for players"),
            Self::InRound => write!(f, "in a round"),
            Self::BetweenRounds => write!(f, "between rounds"),
            Self::Finished => write!(f, "finished"),
        }
    }
}

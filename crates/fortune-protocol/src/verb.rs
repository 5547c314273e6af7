//! The closed set of verbs.

use std::fmt;
use std::str::FromStr;

use crate::ProtocolError;

/// The identifier at the start of every protocol line.
///
/// The set is closed: a line whose first token is not one of these fails
/// with [`ProtocolError::UnknownVerb`]. Verbs are matched
/// case-insensitively on the way in and always written uppercase on the
/// way out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Verb {
    End,
    Fill,
    Go,
    Guess,
    Help,
    Host,
    Info,
    Join,
    Last,
    Letters,
    Lobby,
    Quit,
    Round,
    Skip,
    Start,
    Status,
    Turn,
    Vowel,
    Winner,
}

impl Verb {
    /// Every verb, in alphabetical order.
    pub const ALL: [Verb; 19] = [
        Verb::End,
        Verb::Fill,
        Verb::Go,
        Verb::Guess,
        Verb::Help,
        Verb::Host,
        Verb::Info,
        Verb::Join,
        Verb::Last,
        Verb::Letters,
        Verb::Lobby,
        Verb::Quit,
        Verb::Round,
        Verb::Skip,
        Verb::Start,
        Verb::Status,
        Verb::Turn,
        Verb::Vowel,
        Verb::Winner,
    ];

    /// The wire spelling of this verb.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::End => "END",
            Self::Fill => "FILL",
            Self::Go => "GO",
            Self::Guess => "GUESS",
            Self::Help => "HELP",
            Self::Host => "HOST",
            Self::Info => "INFO",
            Self::Join => "JOIN",
            Self::Last => "LAST",
            Self::Letters => "LETTERS",
            Self::Lobby => "LOBBY",
            Self::Quit => "QUIT",
            Self::Round => "ROUND",
            Self::Skip => "SKIP",
            Self::Start => "START",
            Self::Status => "STATUS",
            Self::Turn => "TURN",
            Self::Vowel => "VOWEL",
            Self::Winner => "WINNER",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Verb {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|verb| verb.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ProtocolError::UnknownVerb(s.to_string()))
    }
}

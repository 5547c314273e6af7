//! Value types carried by commands.
//!
//! Every type here validates on construction, so a command built from
//! them is valid by construction too. The decoders in `command.rs` call
//! the same constructors, which is how "wrong shape" on the wire becomes
//! [`ProtocolError::MalformedArguments`](crate::ProtocolError).

use std::fmt;
use std::str::FromStr;

use crate::InvalidValue;

/// The argument that stands for "nobody" (no winner, no current turn).
///
/// It can never be used as a username.
pub const ABSENT: &str = "-";

/// The highest round number the protocol can carry.
pub const MAX_ROUNDS: u8 = 99;

/// The vowels that can be bought with `VOWEL`.
///
/// Y is a consonant here, as in the television game.
pub const VOWELS: &str = "AEIOU";

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a connected player, assigned by the server.
///
/// Never sent on the wire; players are named by [`Username`] there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// Specifies who should receive a server command.
///
/// Game flow produces `(Recipient, GameCommand)` pairs and the server
/// delivers each one to the matching connections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recipient {
    /// Every player in the match.
    All,

    /// One specific player.
    Player(PlayerId),

    /// Everyone except the given player.
    AllExcept(PlayerId),
}

/// A player's chosen name.
///
/// Non-empty, no whitespace, no quote characters, and never the
/// [`ABSENT`] sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Username(String);

impl Username {
    /// Validates and wraps a username.
    pub fn new(name: impl Into<String>) -> Result<Self, InvalidValue> {
        let name = name.into();
        if name.is_empty() {
            return Err(InvalidValue::new("username is empty"));
        }
        if name == ABSENT {
            return Err(InvalidValue::new(format!(
                "{ABSENT:?} is reserved and cannot be a username"
            )));
        }
        if name.chars().any(|c| c.is_whitespace() || c == '"') {
            return Err(InvalidValue::new(format!(
                "username {name:?} contains whitespace or quotes"
            )));
        }
        Ok(Self(name))
    }

    /// Parses an optional username where [`ABSENT`] means `None`.
    pub fn parse_optional(token: &str) -> Result<Option<Self>, InvalidValue> {
        if token == ABSENT {
            Ok(None)
        } else {
            Self::new(token).map(Some)
        }
    }

    /// Writes an optional username, using [`ABSENT`] for `None`.
    pub fn format_optional(name: Option<&Self>) -> String {
        name.map_or_else(|| ABSENT.to_string(), |n| n.0.clone())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Username {
    type Err = InvalidValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

// ---------------------------------------------------------------------------
// Letters and guesses
// ---------------------------------------------------------------------------

/// A single Latin letter, stored uppercase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Letter(char);

impl Letter {
    /// Accepts any ASCII letter, in either case.
    pub fn new(c: char) -> Result<Self, InvalidValue> {
        if c.is_ascii_alphabetic() {
            Ok(Self(c.to_ascii_uppercase()))
        } else {
            Err(InvalidValue::new(format!("{c:?} is not a letter")))
        }
    }

    /// Parses a token that must be exactly one letter.
    pub fn parse(token: &str) -> Result<Self, InvalidValue> {
        let mut chars = token.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::new(c),
            _ => Err(InvalidValue::new(format!(
                "expected a single letter, got {token:?}"
            ))),
        }
    }

    pub fn as_char(self) -> char {
        self.0
    }

    pub fn is_vowel(self) -> bool {
        VOWELS.contains(self.0)
    }
}

impl fmt::Display for Letter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A letter that is one of [`VOWELS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Vowel(Letter);

impl Vowel {
    pub fn new(letter: Letter) -> Result<Self, InvalidValue> {
        if letter.is_vowel() {
            Ok(Self(letter))
        } else {
            Err(InvalidValue::new(format!(
                "{letter} is not one of {VOWELS}"
            )))
        }
    }

    /// Parses a token that must be exactly one vowel.
    pub fn parse(token: &str) -> Result<Self, InvalidValue> {
        Letter::parse(token).and_then(Self::new)
    }

    pub fn letter(self) -> Letter {
        self.0
    }
}

impl fmt::Display for Vowel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A whole-phrase guess, stored uppercase with single spaces.
///
/// Must hold at least two characters: a one-character guess is always a
/// [`Letter`], which keeps [`Guess`] unambiguous on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Phrase(String);

impl Phrase {
    pub fn new(text: &str) -> Result<Self, InvalidValue> {
        let words: Vec<&str> = text.split_whitespace().collect();
        let normalized = words.join(" ").to_ascii_uppercase();

        if let Some(bad) = normalized
            .chars()
            .find(|c| !c.is_ascii_alphabetic() && *c != ' ')
        {
            return Err(InvalidValue::new(format!(
                "phrase may only contain letters and spaces, found {bad:?}"
            )));
        }
        if normalized.chars().count() < 2 {
            return Err(InvalidValue::new(format!(
                "phrase {text:?} is too short"
            )));
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The letters of the phrase in order, spaces skipped.
    pub fn letters(&self) -> impl Iterator<Item = Letter> + '_ {
        self.0
            .chars()
            .filter(|c| *c != ' ')
            .map(|c| Letter(c.to_ascii_uppercase()))
    }
}

impl fmt::Display for Phrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What a player puts forward with `GUESS`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Guess {
    /// A single letter (consonant or vowel).
    Letter(Letter),
    /// An attempt at the whole solution.
    Phrase(Phrase),
}

impl Guess {
    /// A one-character token is a letter guess, anything longer a phrase.
    pub fn parse(token: &str) -> Result<Self, InvalidValue> {
        if token.chars().count() == 1 {
            Letter::parse(token).map(Self::Letter)
        } else {
            Phrase::new(token).map(Self::Phrase)
        }
    }
}

impl fmt::Display for Guess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Letter(letter) => letter.fmt(f),
            Self::Phrase(phrase) => phrase.fmt(f),
        }
    }
}

// ---------------------------------------------------------------------------
// Round numbers and free text
// ---------------------------------------------------------------------------

/// A round number in `1..=MAX_ROUNDS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoundNumber(u8);

impl RoundNumber {
    pub fn new(n: u8) -> Result<Self, InvalidValue> {
        if (1..=MAX_ROUNDS).contains(&n) {
            Ok(Self(n))
        } else {
            Err(InvalidValue::new(format!(
                "round {n} is outside 1..={MAX_ROUNDS}"
            )))
        }
    }

    pub fn parse(token: &str) -> Result<Self, InvalidValue> {
        let n: u8 = token.parse().map_err(|_| {
            InvalidValue::new(format!("{token:?} is not a round number"))
        })?;
        Self::new(n)
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl fmt::Display for RoundNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Free text for `HELP` replies.
///
/// Single line, no quote characters, not empty after trimming. Quotes are
/// refused because the wire format has no escaping. Tabs and other
/// whitespace become plain spaces, the only separator the quoting rule
/// knows about.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Message(String);

impl Message {
    pub fn new(text: impl Into<String>) -> Result<Self, InvalidValue> {
        let text = text.into();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(InvalidValue::new("message is empty"));
        }
        if trimmed.contains(['"', '\n', '\r']) {
            return Err(InvalidValue::new("message may not contain quotes or line breaks"));
        }
        let spaced = trimmed
            .chars()
            .map(|c| if c.is_whitespace() { ' ' } else { c })
            .collect();
        Ok(Self(spaced))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Board
// ---------------------------------------------------------------------------

/// One position of the puzzle board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cell {
    /// A letter that has been uncovered.
    Revealed(Letter),
    /// A letter still hidden. Written `_`.
    Hidden,
    /// The gap between two words. Written `/`.
    Gap,
}

impl Cell {
    pub fn parse(token: &str) -> Result<Self, InvalidValue> {
        match token {
            "_" => Ok(Self::Hidden),
            "/" => Ok(Self::Gap),
            other => Letter::parse(other).map(Self::Revealed).map_err(|_| {
                InvalidValue::new(format!("{other:?} is not a board cell"))
            }),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Revealed(letter) => letter.fmt(f),
            Self::Hidden => f.write_str("_"),
            Self::Gap => f.write_str("/"),
        }
    }
}

/// The puzzle board: the cells of the phrase, in order.
///
/// On the wire each cell is its own argument. When decoding, a token may
/// also hold several cells separated by spaces, so
/// `FILL "h e l l o" _ _ _ _ _` reads as ten cells.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Board {
    cells: Vec<Cell>,
}

impl Board {
    pub fn new(cells: Vec<Cell>) -> Self {
        Self { cells }
    }

    /// Rebuilds a board from argument tokens.
    pub fn from_tokens<S: AsRef<str>>(tokens: &[S]) -> Result<Self, InvalidValue> {
        let cells = tokens
            .iter()
            .flat_map(|token| token.as_ref().split_whitespace())
            .map(Cell::parse)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { cells })
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// `true` once no hidden cell is left.
    pub fn is_solved(&self) -> bool {
        !self.cells.contains(&Cell::Hidden)
    }

    /// One wire argument per cell.
    pub fn to_tokens(&self) -> Vec<String> {
        self.cells.iter().map(Cell::to_string).collect()
    }
}

/// Console rendering: words separated by wide gaps.
///
/// `H _ L L O / W _ R L D` renders as `H _ L L O   W _ R L D`.
impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for cell in &self.cells {
            if !first {
                f.write_str(" ")?;
            }
            first = false;
            match cell {
                Cell::Gap => f.write_str(" ")?,
                other => other.fmt(f)?,
            }
        }
        Ok(())
    }
}

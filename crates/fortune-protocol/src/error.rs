//! Error types for the protocol layer.
//!
//! Each crate in Fortune defines its own error enum. When you see a
//! `ProtocolError`, the problem is in the text of a line, not in the
//! network or in the game.

use crate::Verb;

/// Errors that can occur while turning a line into a [`GameCommand`].
///
/// None of these are fatal: the per-connection loop decides whether to
/// drop the line, reply with an error, or close the session.
///
/// [`GameCommand`]: crate::GameCommand
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    /// The first token of the line is not a known verb.
    ///
    /// An empty line lands here too, with an empty string.
    #[error("unknown verb: {0:?}")]
    UnknownVerb(String),

    /// The verb is known but no decode function is registered for it.
    ///
    /// This is a registry-initialization bug, not a peer error.
    /// [`registry::init`](crate::registry::init) checks for it once at
    /// startup so it never shows up per message.
    #[error("no handler registered for {0}")]
    NoHandler(Verb),

    /// Wrong argument count, or an argument failed its own validation
    /// (reserved username, a guess that is not a letter, a round number
    /// out of range, ...).
    #[error("malformed arguments for {verb}: {reason}")]
    MalformedArguments { verb: Verb, reason: String },
}

impl ProtocolError {
    pub(crate) fn malformed(verb: Verb, reason: impl ToString) -> Self {
        Self::MalformedArguments {
            verb,
            reason: reason.to_string(),
        }
    }
}

/// A single value failed validation.
///
/// Returned by the constructors of the value types ([`Username`],
/// [`Letter`], [`Board`], ...). Decoders fold it into
/// [`ProtocolError::MalformedArguments`] together with the verb.
///
/// [`Username`]: crate::Username
/// [`Letter`]: crate::Letter
/// [`Board`]: crate::Board
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct InvalidValue(pub(crate) String);

impl InvalidValue {
    pub(crate) fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }

    /// The human-readable reason.
    pub fn reason(&self) -> &str {
        &self.0
    }
}

//! Verb registry: maps each verb to the function that decodes it.
//!
//! The process-wide registry is built once, on first use, from the
//! decoder table in `command.rs`, and is never mutated afterwards. Servers
//! call [`init`] before accepting connections so that a missing decoder
//! fails at startup instead of on the first message that needs it.
//!
//! Custom registries (for tests, or a trimmed-down client) are built with
//! [`Registry::empty`] and [`Registry::with`]. Once a registry is shared,
//! it is read-only.

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::command::DECODERS;
use crate::{wire, GameCommand, ProtocolError, Verb};

/// Rebuilds a command from its argument tokens.
///
/// Decode functions are pure: the same tokens always give the same result.
pub type DecodeFn = fn(&[String]) -> Result<GameCommand, ProtocolError>;

static GLOBAL: LazyLock<Registry> = LazyLock::new(Registry::standard);

/// An immutable verb → decoder table.
#[derive(Debug, Clone)]
pub struct Registry {
    handlers: HashMap<Verb, DecodeFn>,
}

impl Registry {
    /// A registry with no decoders at all.
    pub fn empty() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// A registry with a decoder for every verb.
    pub fn standard() -> Self {
        DECODERS
            .into_iter()
            .fold(Self::empty(), |registry, (verb, decode)| {
                registry.with(verb, decode)
            })
    }

    /// Adds (or replaces) the decoder for `verb`.
    ///
    /// Takes `self` by value: a registry can only be extended while it is
    /// still being built.
    pub fn with(mut self, verb: Verb, decode: DecodeFn) -> Self {
        self.handlers.insert(verb, decode);
        self
    }

    /// Returns `true` if `verb` has a decoder.
    pub fn contains(&self, verb: Verb) -> bool {
        self.handlers.contains_key(&verb)
    }

    /// Checks that every verb has a decoder.
    ///
    /// # Errors
    /// [`ProtocolError::NoHandler`] naming the first verb without one.
    pub fn verify(&self) -> Result<(), ProtocolError> {
        match Verb::ALL.into_iter().find(|verb| !self.contains(*verb)) {
            Some(missing) => Err(ProtocolError::NoHandler(missing)),
            None => Ok(()),
        }
    }

    /// Decodes one full line.
    ///
    /// # Errors
    /// - [`ProtocolError::UnknownVerb`]: the first token is not a verb
    /// - [`ProtocolError::NoHandler`]: the verb has no decoder here
    /// - [`ProtocolError::MalformedArguments`]: the decoder refused the
    ///   arguments
    pub fn decode(&self, line: &str) -> Result<GameCommand, ProtocolError> {
        let (verb_token, body) = wire::split_verb(line);
        let verb: Verb = verb_token.parse()?;
        let decode = self
            .handlers
            .get(&verb)
            .ok_or(ProtocolError::NoHandler(verb))?;
        decode(&wire::tokenize(body))
    }
}

/// The process-wide registry.
pub fn global() -> &'static Registry {
    &GLOBAL
}

/// Builds the process-wide registry and checks that it is complete.
///
/// Call once before the first connection is accepted. Calling it again is
/// harmless; the registry is only ever built once.
///
/// # Errors
/// [`ProtocolError::NoHandler`] if any verb lacks a decoder.
pub fn init() -> Result<&'static Registry, ProtocolError> {
    let registry = global();
    registry.verify()?;
    Ok(registry)
}

/// Decodes a line with the process-wide registry.
pub fn decode(line: &str) -> Result<GameCommand, ProtocolError> {
    global().decode(line)
}

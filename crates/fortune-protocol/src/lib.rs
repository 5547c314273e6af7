//! Wire protocol for Fortune.
//!
//! This crate defines the "language" that the game client and server
//! speak: one command per line, a verb followed by positional arguments.
//!
//! - **Verbs** ([`Verb`]): the closed set of command identifiers.
//! - **Wire format** ([`wire`]): splitting a line into tokens and
//!   quoting arguments on the way out.
//! - **Commands** ([`GameCommand`]): one strongly typed variant per verb.
//! - **Registry** ([`Registry`], [`registry::init`]): maps each verb to
//!   the function that rebuilds its command from tokens.
//! - **Codec** ([`Codec`] trait, [`LineCodec`]): whole-line encode/decode.
//! - **Errors** ([`ProtocolError`]): what can go wrong while decoding.
//!
//! # Architecture
//!
//! The protocol layer sits between transport (raw lines) and session
//! (state machines). It never performs I/O and never blocks.
//!
//! ```text
//! Transport (lines) → Protocol (GameCommand) → Session (state machine)
//! ```

mod codec;
mod command;
mod error;
pub mod registry;
mod types;
mod verb;
pub mod wire;

pub use codec::{Codec, LineCodec};
pub use command::GameCommand;
pub use error::{InvalidValue, ProtocolError};
pub use registry::{DecodeFn, Registry};
pub use types::{
    Board, Cell, Guess, Letter, Message, Phrase, PlayerId, Recipient,
    RoundNumber, Username, Vowel, ABSENT, MAX_ROUNDS, VOWELS,
};
pub use verb::Verb;

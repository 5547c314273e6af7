//! Unified error type for Fortune.

use fortune_game::GameError;
use fortune_protocol::ProtocolError;
use fortune_session::SessionError;
use fortune_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `fortune` crate, you deal with this single error type
/// instead of importing errors from each sub-crate. The `#[from]`
/// attribute on each variant generates the `From` impls, so `?` converts
/// sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum FortuneError {
    /// A transport-level error (bind, connect, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (unknown verb, missing decoder, bad arguments).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A session-level error (rejected input, unknown player).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A match-level error (bad configuration, actor gone).
    #[error(transparent)]
    Game(#[from] GameError),

    /// The configuration file could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// Reading the configuration file or the console failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

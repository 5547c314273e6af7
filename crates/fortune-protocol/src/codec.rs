//! Codec trait and the line codec.
//!
//! A "codec" (coder/decoder) converts between commands and wire lines.
//! The server and client don't care HOW a command becomes text: they
//! just need something that implements [`Codec`]. The line terminator is
//! not part of the codec; the transport adds and strips it.

use crate::registry::{self, Registry};
use crate::{GameCommand, ProtocolError};

/// Converts commands to lines and lines back to commands.
///
/// ## Trait bounds explained
///
/// - `Send + Sync` → safe to share between connection tasks.
/// - `'static` → the codec doesn't borrow temporary data, so it can live
///   inside long-running server state.
pub trait Codec: Send + Sync + 'static {
    /// Writes a command as a single line (no terminator).
    fn encode(&self, command: &GameCommand) -> String;

    /// Parses a single line (no terminator) into a command.
    ///
    /// # Errors
    /// Any [`ProtocolError`]: unknown verb, missing decoder, or malformed
    /// arguments.
    fn decode(&self, line: &str) -> Result<GameCommand, ProtocolError>;
}

// ---------------------------------------------------------------------------
// LineCodec
// ---------------------------------------------------------------------------

/// The text line [`Codec`]: `VERB arg "quoted arg" ...`.
///
/// Decodes through a [`Registry`], the process-wide one by default.
///
/// ## Example
///
/// ```rust
/// use fortune_protocol::{Codec, GameCommand, LineCodec, Username};
///
/// let codec = LineCodec::default();
/// let join = GameCommand::Join { username: Username::new("pedro").unwrap() };
///
/// let line = codec.encode(&join);
/// assert_eq!(line, "JOIN pedro");
/// assert_eq!(codec.decode(&line).unwrap(), join);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct LineCodec {
    registry: &'static Registry,
}

impl LineCodec {
    /// A codec that decodes with the given registry.
    pub fn with_registry(registry: &'static Registry) -> Self {
        Self { registry }
    }
}

impl Default for LineCodec {
    fn default() -> Self {
        Self::with_registry(registry::global())
    }
}

impl Codec for LineCodec {
    fn encode(&self, command: &GameCommand) -> String {
        command.encode()
    }

    fn decode(&self, line: &str) -> Result<GameCommand, ProtocolError> {
        self.registry.decode(line)
    }
}

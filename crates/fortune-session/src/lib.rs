//! Session state machines for Fortune.
//!
//! This crate holds the two per-connection state machines:
//!
//! 1. **Client side**: [`ClientSession`] turns console input into
//!    commands and server commands into console output, gated by
//!    [`ClientState`]. Output goes through the [`Console`] trait.
//! 2. **Server side**: [`SessionManager`] tracks every connected player
//!    and their [`PlayerState`], which gates the verbs the server accepts
//!    from them.
//!
//! Neither side does I/O. Callers feed decoded commands in and send the
//! commands that come out.
//!
//! # How it fits in the stack
//!
//! ```text
//! Game Layer (above)      ← owns a SessionManager inside the match actor
//!     ↕
//! Session Layer (this crate)
//!     ↕
//! Protocol Layer (below)  ← provides GameCommand, Verb, Username, PlayerId
//! ```

mod client;
mod console;
mod error;
mod manager;
mod session;
mod state;

pub use client::{ClientSession, Reaction};
pub use console::{BufferConsole, Console};
pub use error::SessionError;
pub use manager::SessionManager;
pub use session::PlayerSession;
pub use state::{ClientState, PlayerState};

//! # Fortune
//!
//! Wheel of Fortune over a line-based TCP protocol.
//!
//! Fortune is built in layers, one crate each:
//!
//! - `fortune-transport`: newline-framed TCP connections
//! - `fortune-protocol`: verbs, tokenizer, typed commands, registry
//! - `fortune-session`: the client state machine and server-side player states
//! - `fortune-game`: the match rules, run as an actor task
//!
//! This crate ties them together into a [`FortuneServer`] and a
//! [`FortuneClient`], and re-exports what a binary needs.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use fortune::prelude::*;
//!
//! # async fn start() -> Result<(), FortuneError> {
//! let server = FortuneServer::builder()
//!     .bind("0.0.0.0:1234")
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod client;
mod config;
mod error;
mod handler;
mod logging;
mod server;

pub use client::FortuneClient;
pub use config::ServerConfig;
pub use error::FortuneError;
pub use logging::init_tracing;
pub use server::{FortuneServer, FortuneServerBuilder};

pub use fortune_game as game;
pub use fortune_protocol as protocol;
pub use fortune_session as session;
pub use fortune_transport as transport;

/// Everything needed to run a server or a client.
pub mod prelude {
    pub use crate::{
        init_tracing, FortuneClient, FortuneError, FortuneServer, FortuneServerBuilder,
        ServerConfig,
    };
    pub use fortune_game::GameConfig;
    pub use fortune_protocol::{GameCommand, Verb};
    pub use fortune_session::{ClientSession, ClientState, Console};
}

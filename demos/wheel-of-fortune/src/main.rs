use std::path::PathBuf;

use clap::{Parser, Subcommand};
use fortune::prelude::*;
use fortune::transport::DEFAULT_MAX_LINE_LENGTH;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

// ---------------------------------------------------------------------------
// Command line
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(author, version, about = "Wheel of Fortune over TCP", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Host a match and wait for players.
    Server {
        /// TOML configuration file. Defaults are used when omitted.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Listen address, overriding the configuration file.
        #[arg(long)]
        bind: Option<String>,
    },
    /// Join a match hosted by a server.
    Client {
        #[arg(long, default_value = "127.0.0.1:1234")]
        addr: String,
    },
}

/// Loads the configuration file (if any) and applies command line overrides.
fn server_config(
    path: Option<PathBuf>,
    bind: Option<String>,
) -> Result<ServerConfig, FortuneError> {
    let mut config = match path {
        Some(path) => ServerConfig::from_file(path)?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = bind {
        config.bind = bind;
    }
    Ok(config)
}

// ---------------------------------------------------------------------------
// Terminal
// ---------------------------------------------------------------------------

/// Prints session output to the terminal.
struct TerminalConsole;

impl Console for TerminalConsole {
    fn info(&mut self, line: &str) {
        println!("{line}");
    }

    fn error(&mut self, line: &str) {
        eprintln!("{line}");
    }
}

/// Forwards stdin lines to the client until stdin closes or the client stops.
fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(16);
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if tx.send(line).await.is_err() {
                break;
            }
        }
    });
    rx
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Server { config, bind } => {
            let config = server_config(config, bind)?;
            eprintln!("starting Wheel of Fortune server on {}", config.bind);

            let server = FortuneServerBuilder::new().config(config).build().await?;
            server.run().await?;
        }
        Command::Client { addr } => {
            let client = FortuneClient::connect(&addr, DEFAULT_MAX_LINE_LENGTH).await?;
            let session = client.run(spawn_stdin_reader(), &mut TerminalConsole).await?;
            tracing::debug!(state = %session.state(), "client finished");
        }
    }

    Ok(())
}

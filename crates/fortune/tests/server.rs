//! Integration tests for the Fortune server, handler, and client over real TCP.

use std::time::Duration;

use fortune::prelude::*;
use fortune::session::BufferConsole;
use fortune::transport::{Connection, TcpLineConnection};
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;

// =========================================================================
// Helpers
// =========================================================================

fn one_round(phrase: &str) -> GameConfig {
    GameConfig {
        phrases: vec![phrase.to_string()],
        rounds: 1,
        ..GameConfig::default()
    }
}

/// Starts a server on a random port and returns the address.
async fn start_server(config: ServerConfig) -> String {
    let server = FortuneServerBuilder::new()
        .config(config)
        .bind("127.0.0.1:0")
        .build()
        .await
        .expect("server should build");

    let addr = server
        .local_addr()
        .expect("should have local addr")
        .to_string();

    tokio::spawn(async move {
        let _ = server.run().await;
    });

    // Give the accept loop a moment to start.
    tokio::time::sleep(Duration::from_millis(10)).await;
    addr
}

async fn connect(addr: &str) -> TcpLineConnection {
    TcpLineConnection::connect(addr, 1024)
        .await
        .expect("should connect")
}

async fn send(conn: &TcpLineConnection, line: &str) {
    conn.send_line(line).await.expect("send");
}

/// Waits for the next line; `None` means the server closed the connection.
async fn recv(conn: &TcpLineConnection) -> Option<String> {
    tokio::time::timeout(Duration::from_secs(2), conn.recv_line())
        .await
        .expect("timed out waiting for a line")
        .expect("recv failed")
}

async fn next_line(conn: &TcpLineConnection) -> String {
    recv(conn).await.expect("connection closed")
}

/// Collects lines until (and including) the first one starting with `until`.
async fn lines_until(conn: &TcpLineConnection, until: &str) -> Vec<String> {
    let mut lines = Vec::new();
    loop {
        let line = next_line(conn).await;
        let done = line.starts_with(until);
        lines.push(line);
        if done {
            return lines;
        }
    }
}

/// Joins two players, `pedro` (host) then `ana`, and drains the lobby chatter.
async fn lobby_of_two(addr: &str) -> (TcpLineConnection, TcpLineConnection) {
    let pedro = connect(addr).await;
    send(&pedro, "JOIN pedro").await;
    lines_until(&pedro, "HOST").await;

    let ana = connect(addr).await;
    send(&ana, "JOIN ana").await;
    lines_until(&ana, "HOST").await;
    assert_eq!(next_line(&pedro).await, "JOIN ana");

    (pedro, ana)
}

// =========================================================================
// Server
// =========================================================================

#[tokio::test]
async fn test_join_receives_lobby_and_host() {
    let addr = start_server(ServerConfig::default()).await;
    let conn = connect(&addr).await;

    send(&conn, "JOIN pedro").await;
    assert_eq!(next_line(&conn).await, "LOBBY pedro");
    assert_eq!(next_line(&conn).await, "HOST pedro");
}

#[tokio::test]
async fn test_unknown_verb_gets_help_and_connection_survives() {
    let addr = start_server(ServerConfig::default()).await;
    let conn = connect(&addr).await;

    send(&conn, "DANCE now").await;
    let reply = next_line(&conn).await;
    assert!(reply.starts_with("HELP "), "got {reply}");
    assert!(reply.contains("unknown verb"), "got {reply}");

    send(&conn, "JOIN pedro").await;
    assert_eq!(next_line(&conn).await, "LOBBY pedro");
}

#[tokio::test]
async fn test_malformed_arguments_get_help() {
    let addr = start_server(ServerConfig::default()).await;
    let conn = connect(&addr).await;

    send(&conn, "JOIN").await;
    let reply = next_line(&conn).await;
    assert!(reply.starts_with("HELP "), "got {reply}");
}

#[tokio::test]
async fn test_blank_lines_are_skipped() {
    let addr = start_server(ServerConfig::default()).await;
    let conn = connect(&addr).await;

    send(&conn, "").await;
    send(&conn, "   ").await;
    send(&conn, "JOIN pedro").await;
    assert_eq!(next_line(&conn).await, "LOBBY pedro");
}

#[tokio::test]
async fn test_line_too_long_gets_help_and_next_line_works() {
    let config = ServerConfig {
        max_line_length: 16,
        ..ServerConfig::default()
    };
    let addr = start_server(config).await;
    let conn = connect(&addr).await;

    send(&conn, &format!("JOIN {}", "x".repeat(40))).await;
    let reply = next_line(&conn).await;
    assert!(reply.contains("line longer than 16 bytes"), "got {reply}");

    send(&conn, "JOIN pedro").await;
    assert_eq!(next_line(&conn).await, "LOBBY pedro");
}

#[tokio::test]
async fn test_go_from_non_host_is_rejected() {
    let addr = start_server(ServerConfig::default()).await;
    let (_pedro, ana) = lobby_of_two(&addr).await;

    send(&ana, "GO").await;
    let reply = next_line(&ana).await;
    assert!(reply.starts_with("HELP "), "got {reply}");
}

#[tokio::test]
async fn test_full_match_over_tcp() {
    let config = ServerConfig {
        game: one_round("on it"),
        ..ServerConfig::default()
    };
    let addr = start_server(config).await;
    let (pedro, ana) = lobby_of_two(&addr).await;

    send(&pedro, "GO").await;
    assert_eq!(
        lines_until(&ana, "TURN").await,
        vec!["START", "LAST", "ROUND 1", "FILL _ _ / _ _", "LETTERS", "TURN pedro"]
    );
    lines_until(&pedro, "TURN").await;

    send(&pedro, "GUESS t").await;
    assert_eq!(
        lines_until(&ana, "TURN").await,
        vec!["FILL _ _ / _ T", "LETTERS T", "TURN pedro"]
    );

    send(&pedro, "GUESS \"on it\"").await;
    assert_eq!(
        lines_until(&ana, "LOBBY").await,
        vec!["INFO O N / I T", "TURN -", "WINNER pedro", "END", "LOBBY ana"]
    );
}

#[tokio::test]
async fn test_quit_closes_connection_and_notifies_others() {
    let addr = start_server(ServerConfig::default()).await;
    let (pedro, ana) = lobby_of_two(&addr).await;

    send(&pedro, "QUIT").await;
    assert_eq!(recv(&pedro).await, None);
    assert_eq!(next_line(&ana).await, "QUIT pedro");
    assert_eq!(next_line(&ana).await, "HOST ana");
}

#[tokio::test]
async fn test_dropped_connection_is_reported_as_quit() {
    let addr = start_server(ServerConfig::default()).await;
    let (pedro, ana) = lobby_of_two(&addr).await;

    drop(ana);
    assert_eq!(next_line(&pedro).await, "QUIT ana");
}

#[tokio::test]
async fn test_idle_connection_times_out() {
    let addr = {
        let server = FortuneServer::builder()
            .bind("127.0.0.1:0")
            .idle_timeout(Duration::from_secs(1))
            .build()
            .await
            .expect("server should build");
        let addr = server.local_addr().unwrap().to_string();
        tokio::spawn(async move {
            let _ = server.run().await;
        });
        addr
    };
    let conn = connect(&addr).await;

    let closed = tokio::time::timeout(Duration::from_secs(3), conn.recv_line())
        .await
        .expect("server should close the idle connection");
    assert!(matches!(closed, Ok(None)), "got {closed:?}");
}

#[tokio::test]
async fn test_build_with_invalid_game_config_fails() {
    let result = FortuneServerBuilder::new()
        .bind("127.0.0.1:0")
        .game_config(GameConfig {
            phrases: Vec::new(),
            ..GameConfig::default()
        })
        .build()
        .await;
    assert!(matches!(result, Err(FortuneError::Game(_))));
}

#[tokio::test]
async fn test_build_with_zero_channel_size_fails() {
    let config = ServerConfig::from_toml_str(
        r#"
        bind = "127.0.0.1:0"
        channel_size = 0
        "#,
    )
    .unwrap();
    let result = FortuneServerBuilder::new().config(config).build().await;
    assert!(matches!(result, Err(FortuneError::Game(_))));
}

// =========================================================================
// Client
// =========================================================================

#[tokio::test]
async fn test_client_joins_and_quits() {
    let addr = start_server(ServerConfig::default()).await;
    let host = connect(&addr).await;
    send(&host, "JOIN ana").await;
    lines_until(&host, "HOST").await;

    let client = FortuneClient::connect(&addr, 1024).await.expect("connect");
    let (lines_tx, lines_rx) = mpsc::channel(8);
    let task = tokio::spawn(async move {
        let mut console = BufferConsole::new();
        let session = client.run(lines_rx, &mut console).await;
        (session, console)
    });

    lines_tx.send("pedro".to_string()).await.unwrap();
    assert_eq!(next_line(&host).await, "JOIN pedro");

    lines_tx.send("quit".to_string()).await.unwrap();
    assert_eq!(next_line(&host).await, "QUIT pedro");

    let (session, console) = tokio::time::timeout(Duration::from_secs(2), task)
        .await
        .expect("client should stop")
        .expect("client task panicked");
    assert_eq!(session.expect("clean run").state(), ClientState::Disconnected);
    assert!(console.saw("Welcome"));
}

#[tokio::test]
async fn test_client_stops_when_server_closes() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        stream.write_all(b"LOBBY pedro\n").await.unwrap();
        stream.shutdown().await.unwrap();
    });

    let client = FortuneClient::connect(&addr, 1024).await.expect("connect");
    let (_lines_tx, lines_rx) = mpsc::channel::<String>(8);
    let mut console = BufferConsole::new();

    let session = tokio::time::timeout(Duration::from_secs(2), client.run(lines_rx, &mut console))
        .await
        .expect("client should stop")
        .expect("clean run");

    assert_eq!(session.state(), ClientState::Disconnected);
    assert_eq!(session.username().map(|u| u.as_str()), Some("pedro"));
    assert!(console.errors.iter().any(|line| line.contains("closed")));
}

#[tokio::test]
async fn test_client_quits_when_console_closes() {
    let addr = start_server(ServerConfig::default()).await;
    let client = FortuneClient::connect(&addr, 1024).await.expect("connect");
    let (lines_tx, lines_rx) = mpsc::channel::<String>(8);
    drop(lines_tx);

    let mut console = BufferConsole::new();
    let session = tokio::time::timeout(Duration::from_secs(2), client.run(lines_rx, &mut console))
        .await
        .expect("client should stop")
        .expect("clean run");
    assert_eq!(session.state(), ClientState::Disconnected);
}

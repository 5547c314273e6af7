//! The session manager: tracks every connected player on the server.
//!
//! It is responsible for:
//! - Creating a session when a connection is accepted
//! - Validating JOIN (one join per connection, unique usernames)
//! - Moving players between the lobby and the running match
//! - Dropping sessions when players leave
//!
//! # Concurrency note
//!
//! `SessionManager` is NOT thread-safe by itself: it uses a plain
//! `HashMap`. It is owned by the match actor, so every mutation happens
//! on that one task.

use std::collections::HashMap;

use fortune_protocol::{PlayerId, Username, Verb};

use crate::{PlayerSession, PlayerState, SessionError};

/// Manages all player sessions on the server.
///
/// ## Lifecycle
///
/// ```text
/// connect() ──→ join() ──→ start_match() ──→ end_match()
///     │            │             │                │
///     ▼            ▼             ▼                ▼
/// [Connected]  [InLobby]     [Playing]        [InLobby]
///
/// remove() from any state ──→ session gone (returned as Disconnected)
/// ```
#[derive(Debug, Default)]
pub struct SessionManager {
    /// All sessions, keyed by player ID.
    sessions: HashMap<PlayerId, PlayerSession>,
}

impl SessionManager {
    /// Creates an empty manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a session for a freshly accepted connection.
    ///
    /// # Errors
    /// [`SessionError::AlreadyJoined`] if the ID already has a session.
    pub fn connect(&mut self, player_id: PlayerId) -> Result<&PlayerSession, SessionError> {
        if self.sessions.contains_key(&player_id) {
            return Err(SessionError::AlreadyJoined(player_id));
        }
        self.sessions.insert(player_id, PlayerSession::new(player_id));
        tracing::debug!(%player_id, "session created");

        // `expect` is fine here: the entry was inserted on the line above.
        Ok(self.sessions.get(&player_id).expect("just inserted"))
    }

    /// Records a JOIN: the player picks a name and enters the lobby.
    ///
    /// # Errors
    /// - [`SessionError::NotFound`]: no session for this player
    /// - [`SessionError::AlreadyJoined`]: the player already has a name
    /// - [`SessionError::UsernameTaken`]: another player has this name
    pub fn join(
        &mut self,
        player_id: PlayerId,
        username: Username,
    ) -> Result<&PlayerSession, SessionError> {
        let state = self.get(player_id)?.state;
        if state != PlayerState::Connected {
            return Err(SessionError::AlreadyJoined(player_id));
        }
        if self.find_by_name(&username).is_some() {
            return Err(SessionError::UsernameTaken(username));
        }

        let session = self
            .sessions
            .get_mut(&player_id)
            .ok_or(SessionError::NotFound(player_id))?;
        tracing::info!(%player_id, %username, "player joined the lobby");
        session.username = Some(username);
        session.state = PlayerState::InLobby;
        Ok(session)
    }

    /// Checks that `player_id` may send `verb` in its current state.
    ///
    /// # Errors
    /// [`SessionError::NotFound`] or [`SessionError::NotAllowed`].
    pub fn check(&self, player_id: PlayerId, verb: Verb) -> Result<(), SessionError> {
        self.get(player_id)?.check(verb)
    }

    /// Moves every player in the lobby into the match.
    ///
    /// Returns the moved players in join order (lowest ID first).
    pub fn start_match(&mut self) -> Vec<PlayerId> {
        self.move_all(PlayerState::InLobby, PlayerState::Playing)
    }

    /// Moves every playing player back to the lobby.
    pub fn end_match(&mut self) -> Vec<PlayerId> {
        self.move_all(PlayerState::Playing, PlayerState::InLobby)
    }

    fn move_all(&mut self, from: PlayerState, to: PlayerState) -> Vec<PlayerId> {
        let mut moved: Vec<PlayerId> = self
            .sessions
            .values_mut()
            .filter(|s| s.state == from)
            .map(|s| {
                s.state = to;
                s.player_id
            })
            .collect();
        moved.sort();
        moved
    }

    /// Removes a player's session. The returned copy is `Disconnected`.
    ///
    /// # Errors
    /// [`SessionError::NotFound`] if no session exists.
    pub fn remove(&mut self, player_id: PlayerId) -> Result<PlayerSession, SessionError> {
        let mut session = self
            .sessions
            .remove(&player_id)
            .ok_or(SessionError::NotFound(player_id))?;
        session.state = PlayerState::Disconnected;
        tracing::debug!(%player_id, "session removed");
        Ok(session)
    }

    /// Looks up a session.
    ///
    /// # Errors
    /// [`SessionError::NotFound`] if no session exists.
    pub fn get(&self, player_id: PlayerId) -> Result<&PlayerSession, SessionError> {
        self.sessions
            .get(&player_id)
            .ok_or(SessionError::NotFound(player_id))
    }

    /// Finds the player using `username`.
    pub fn find_by_name(&self, username: &Username) -> Option<PlayerId> {
        self.sessions
            .values()
            .find(|s| s.username.as_ref() == Some(username))
            .map(|s| s.player_id)
    }

    /// Players in the given state, lowest ID first.
    pub fn in_state(&self, state: PlayerState) -> Vec<PlayerId> {
        let mut ids: Vec<PlayerId> = self
            .sessions
            .values()
            .filter(|s| s.state == state)
            .map(|s| s.player_id)
            .collect();
        ids.sort();
        ids
    }

    /// Number of players that have joined (lobby or match).
    pub fn joined_count(&self) -> usize {
        self.sessions
            .values()
            .filter(|s| s.state.has_joined())
            .count()
    }

    /// Number of sessions in any state.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Returns `true` if there are no sessions.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! Unit tests for `SessionManager`, named
    //! `test_{function}_{scenario}_{expected}`.

    use super::*;

    fn pid(id: u64) -> PlayerId {
        PlayerId(id)
    }

    fn name(s: &str) -> Username {
        Username::new(s).unwrap()
    }

    /// A manager with players 1..=n connected and joined as p1, p2, ...
    fn joined(n: u64) -> SessionManager {
        let mut mgr = SessionManager::new();
        for id in 1..=n {
            mgr.connect(pid(id)).unwrap();
            mgr.join(pid(id), name(&format!("p{id}"))).unwrap();
        }
        mgr
    }

    // =====================================================================
    // connect()
    // =====================================================================

    #[test]
    fn test_connect_new_player_is_connected() {
        let mut mgr = SessionManager::new();
        let session = mgr.connect(pid(1)).expect("should succeed");
        assert_eq!(session.state, PlayerState::Connected);
        assert_eq!(session.username, None);
        assert_eq!(mgr.len(), 1);
    }

    #[test]
    fn test_connect_twice_returns_error() {
        let mut mgr = SessionManager::new();
        mgr.connect(pid(1)).unwrap();
        assert_eq!(mgr.connect(pid(1)).unwrap_err(), SessionError::AlreadyJoined(pid(1)));
    }

    // =====================================================================
    // join()
    // =====================================================================

    #[test]
    fn test_join_moves_player_to_lobby() {
        let mut mgr = SessionManager::new();
        mgr.connect(pid(1)).unwrap();
        let session = mgr.join(pid(1), name("pedro")).expect("should join");
        assert_eq!(session.state, PlayerState::InLobby);
        assert_eq!(session.username, Some(name("pedro")));
        assert_eq!(mgr.find_by_name(&name("pedro")), Some(pid(1)));
    }

    #[test]
    fn test_join_duplicate_username_returns_taken() {
        let mut mgr = joined(1);
        mgr.connect(pid(2)).unwrap();
        assert_eq!(
            mgr.join(pid(2), name("p1")).unwrap_err(),
            SessionError::UsernameTaken(name("p1"))
        );
        assert_eq!(mgr.get(pid(2)).unwrap().state, PlayerState::Connected);
    }

    #[test]
    fn test_join_twice_returns_already_joined() {
        let mut mgr = joined(1);
        assert_eq!(
            mgr.join(pid(1), name("other")).unwrap_err(),
            SessionError::AlreadyJoined(pid(1))
        );
    }

    #[test]
    fn test_join_unknown_player_returns_not_found() {
        let mut mgr = SessionManager::new();
        assert_eq!(
            mgr.join(pid(9), name("ghost")).unwrap_err(),
            SessionError::NotFound(pid(9))
        );
    }

    // =====================================================================
    // check()
    // =====================================================================

    #[test]
    fn test_check_gates_by_state() {
        let mut mgr = joined(1);
        mgr.connect(pid(2)).unwrap();

        assert!(mgr.check(pid(1), Verb::Go).is_ok());
        assert!(mgr.check(pid(1), Verb::Guess).is_err());
        assert!(mgr.check(pid(2), Verb::Join).is_ok());
        assert!(mgr.check(pid(2), Verb::Go).is_err());
        assert_eq!(
            mgr.check(pid(3), Verb::Help).unwrap_err(),
            SessionError::NotFound(pid(3))
        );
    }

    // =====================================================================
    // start_match() / end_match()
    // =====================================================================

    #[test]
    fn test_start_match_moves_only_lobby_players() {
        let mut mgr = joined(3);
        mgr.connect(pid(4)).unwrap();

        assert_eq!(mgr.start_match(), vec![pid(1), pid(2), pid(3)]);
        assert_eq!(mgr.get(pid(4)).unwrap().state, PlayerState::Connected);
        assert_eq!(mgr.in_state(PlayerState::Playing).len(), 3);
        assert_eq!(mgr.joined_count(), 3);
    }

    #[test]
    fn test_end_match_returns_players_to_lobby() {
        let mut mgr = joined(2);
        mgr.start_match();
        assert_eq!(mgr.end_match(), vec![pid(1), pid(2)]);
        assert!(mgr.in_state(PlayerState::Playing).is_empty());
        assert!(mgr.check(pid(1), Verb::Go).is_ok());
    }

    // =====================================================================
    // remove()
    // =====================================================================

    #[test]
    fn test_remove_returns_disconnected_copy_and_frees_name() {
        let mut mgr = joined(2);
        let gone = mgr.remove(pid(1)).unwrap();
        assert_eq!(gone.state, PlayerState::Disconnected);
        assert_eq!(gone.username, Some(name("p1")));
        assert_eq!(mgr.len(), 1);

        // The name can be reused by someone else.
        mgr.connect(pid(3)).unwrap();
        assert!(mgr.join(pid(3), name("p1")).is_ok());
    }

    #[test]
    fn test_remove_unknown_player_returns_not_found() {
        let mut mgr = SessionManager::new();
        assert_eq!(mgr.remove(pid(1)).unwrap_err(), SessionError::NotFound(pid(1)));
        assert!(mgr.is_empty());
    }
}

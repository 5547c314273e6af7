//! Match rules: who may do what, and what everyone is told about it.
//!
//! [`Game`] is a plain state machine with no I/O. Each call returns an
//! [`Outbox`] of `(Recipient, GameCommand)` pairs; the match actor
//! delivers them. A rejected command returns a [`GameError`] and leaves
//! the game untouched.
//!
//! Commands are checked twice: first against the sender's
//! [`PlayerState`] (what a player in the lobby or in a match may send at
//! all), then against the [`MatchState`] and the turn order.

use std::collections::HashMap;

use fortune_protocol::{
    Board, GameCommand, Guess, Letter, Phrase, PlayerId, Recipient, RoundNumber, Username,
    Verb,
};
use fortune_session::{PlayerState, SessionManager};

use crate::puzzle::{PhraseDeck, Puzzle};
use crate::{GameConfig, GameError, MatchState};

/// Commands to deliver, in order.
pub type Outbox = Vec<(Recipient, GameCommand)>;

/// The whole server-side game: sessions, lobby, and the running match.
#[derive(Debug)]
pub struct Game {
    config: GameConfig,
    sessions: SessionManager,
    state: MatchState,
    deck: PhraseDeck,
    /// Player allowed to send GO.
    host: Option<PlayerId>,
    /// Players in the running match, in turn order.
    seats: Vec<PlayerId>,
    scores: HashMap<PlayerId, u32>,
    /// Index into `seats` of the turn holder.
    turn: usize,
    round: u8,
    puzzle: Option<Puzzle>,
}

impl Game {
    /// Creates a game waiting for players.
    ///
    /// # Errors
    /// [`GameError::InvalidConfig`] if the configuration is unusable.
    pub fn new(config: GameConfig) -> Result<Self, GameError> {
        let phrases = config.validate()?;
        Ok(Self {
            config,
            sessions: SessionManager::new(),
            state: MatchState::WaitingForPlayers,
            deck: PhraseDeck::new(phrases),
            host: None,
            seats: Vec::new(),
            scores: HashMap::new(),
            turn: 0,
            round: 0,
            puzzle: None,
        })
    }

    pub fn state(&self) -> MatchState {
        self.state
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    pub fn host(&self) -> Option<PlayerId> {
        self.host
    }

    /// The current round, if a match is running.
    pub fn round(&self) -> Option<RoundNumber> {
        RoundNumber::new(self.round).ok()
    }

    /// Score of a seated player.
    pub fn score(&self, player_id: PlayerId) -> Option<u32> {
        self.scores.get(&player_id).copied()
    }

    /// The turn holder, while a round is running.
    pub fn turn_holder(&self) -> Option<PlayerId> {
        match self.state {
            MatchState::InRound => self.seats.get(self.turn).copied(),
            _ => None,
        }
    }

    /// The board of the running round.
    pub fn board(&self) -> Option<Board> {
        self.puzzle.as_ref().map(Puzzle::board)
    }

    /// Who [`Recipient::All`] reaches: every joined player.
    pub fn audience(&self) -> Vec<PlayerId> {
        let mut ids = self.sessions.in_state(PlayerState::InLobby);
        ids.extend(self.sessions.in_state(PlayerState::Playing));
        ids.sort();
        ids
    }

    // ---- connections ----

    /// Registers a new connection. It must JOIN before doing anything else.
    ///
    /// # Errors
    /// [`GameError::Session`] if the ID is already known.
    pub fn connect(&mut self, player_id: PlayerId) -> Result<(), GameError> {
        self.sessions.connect(player_id)?;
        Ok(())
    }

    /// Handles a lost connection the same way as a QUIT.
    pub fn disconnect(&mut self, player_id: PlayerId) -> Outbox {
        self.leave(player_id).unwrap_or_default()
    }

    // ---- commands ----

    /// Applies one command from a player.
    ///
    /// # Errors
    /// A [`GameError`] describing why the command was refused. Nothing
    /// has changed in that case.
    pub fn handle(
        &mut self,
        player_id: PlayerId,
        command: GameCommand,
    ) -> Result<Outbox, GameError> {
        self.sessions.check(player_id, command.verb())?;

        match command {
            GameCommand::Join { username } => self.join(player_id, username),
            GameCommand::Go => self.go(player_id),
            GameCommand::Guess {
                guess: Guess::Letter(letter),
            } => self.guess_letter(player_id, letter),
            GameCommand::Guess {
                guess: Guess::Phrase(phrase),
            } => self.guess_phrase(player_id, &phrase),
            GameCommand::Vowel { vowel } => self.buy_vowel(player_id, vowel.letter()),
            GameCommand::Skip { .. } => self.skip(player_id),
            GameCommand::Status { .. } => self.status(player_id),
            GameCommand::Help { .. } => Ok(self.help(player_id)),
            GameCommand::Quit { .. } => self.leave(player_id),
            // Server-to-client verbs never pass the session check.
            other => Err(GameError::InvalidState {
                verb: other.verb(),
                state: self.state,
            }),
        }
    }

    fn join(&mut self, player_id: PlayerId, username: Username) -> Result<Outbox, GameError> {
        if self.sessions.joined_count() >= self.config.max_players {
            return Err(GameError::MatchFull(self.config.max_players));
        }
        self.sessions.join(player_id, username.clone())?;

        let mut out: Outbox = vec![
            (
                Recipient::Player(player_id),
                GameCommand::Lobby {
                    username: username.clone(),
                },
            ),
            (
                Recipient::AllExcept(player_id),
                GameCommand::Join {
                    username: username.clone(),
                },
            ),
        ];

        match self.host {
            None => {
                self.host = Some(player_id);
                tracing::info!(%player_id, %username, "new host");
                out.push((Recipient::All, GameCommand::Host { username }));
            }
            Some(host) => {
                if let Some(host_name) = self.name_of(host) {
                    out.push((
                        Recipient::Player(player_id),
                        GameCommand::Host {
                            username: host_name,
                        },
                    ));
                }
            }
        }
        Ok(out)
    }

    fn go(&mut self, player_id: PlayerId) -> Result<Outbox, GameError> {
        if !self.state.is_joinable() {
            return Err(self.wrong_state(Verb::Go));
        }
        if self.host != Some(player_id) {
            return Err(GameError::NotHost);
        }
        let joined = self.sessions.in_state(PlayerState::InLobby).len();
        if joined < self.config.min_players {
            return Err(GameError::NotEnoughPlayers {
                needed: self.config.min_players,
                joined,
            });
        }

        self.seats = self.sessions.start_match();
        self.scores = self.seats.iter().map(|id| (*id, 0)).collect();
        self.round = 0;
        tracing::info!(players = self.seats.len(), rounds = self.config.rounds, "match started");

        let mut out = vec![(Recipient::All, GameCommand::Start)];
        self.start_next_round(&mut out);
        Ok(out)
    }

    fn guess_letter(&mut self, player_id: PlayerId, letter: Letter) -> Result<Outbox, GameError> {
        self.require_turn(player_id, Verb::Guess)?;
        if letter.is_vowel() {
            return Err(GameError::NotAConsonant(letter));
        }
        self.call_letter(player_id, letter)
    }

    fn buy_vowel(&mut self, player_id: PlayerId, letter: Letter) -> Result<Outbox, GameError> {
        self.require_turn(player_id, Verb::Vowel)?;
        self.require_uncalled(letter)?;

        let cost = self.config.vowel_cost;
        let score = self.score(player_id).unwrap_or(0);
        if score < cost {
            return Err(GameError::CannotAffordVowel { cost, score });
        }
        self.scores.insert(player_id, score - cost);
        self.call_letter(player_id, letter)
    }

    /// Reveals a letter. A hit keeps the turn, a miss passes it.
    /// Consonants score one point per occurrence; vowels score nothing.
    fn call_letter(&mut self, player_id: PlayerId, letter: Letter) -> Result<Outbox, GameError> {
        self.require_uncalled(letter)?;
        let Some(puzzle) = self.puzzle.as_mut() else {
            return Err(self.wrong_state(Verb::Guess));
        };

        let hits = puzzle.reveal(letter);
        let board = puzzle.board();
        let letters = puzzle.called().to_vec();
        let solved = puzzle.is_solved();
        tracing::debug!(%player_id, %letter, hits, "letter called");

        let mut out = Vec::new();
        if hits > 0 {
            if !letter.is_vowel() {
                *self.scores.entry(player_id).or_insert(0) += hits as u32;
            }
            out.push((Recipient::All, GameCommand::Fill { board }));
        }
        out.push((Recipient::All, GameCommand::Letters { letters }));

        if solved {
            self.end_round(&mut out);
        } else {
            if hits == 0 {
                self.advance_turn();
            }
            out.push(self.turn_announcement());
        }
        Ok(out)
    }

    fn guess_phrase(&mut self, player_id: PlayerId, phrase: &Phrase) -> Result<Outbox, GameError> {
        self.require_turn(player_id, Verb::Guess)?;
        let correct = self
            .puzzle
            .as_ref()
            .is_some_and(|puzzle| puzzle.is_solution(phrase));

        let mut out = Vec::new();
        if correct {
            *self.scores.entry(player_id).or_insert(0) += self.config.phrase_bonus;
            tracing::info!(%player_id, round = self.round, "phrase solved");
            self.end_round(&mut out);
        } else {
            tracing::debug!(%player_id, %phrase, "wrong phrase guess");
            self.advance_turn();
            out.push(self.turn_announcement());
        }
        Ok(out)
    }

    fn skip(&mut self, player_id: PlayerId) -> Result<Outbox, GameError> {
        self.require_turn(player_id, Verb::Skip)?;
        let mut out = vec![(
            Recipient::All,
            GameCommand::Skip {
                username: self.name_of(player_id),
            },
        )];
        self.advance_turn();
        out.push(self.turn_announcement());
        Ok(out)
    }

    fn status(&self, player_id: PlayerId) -> Result<Outbox, GameError> {
        match (&self.puzzle, self.state) {
            (Some(puzzle), MatchState::InRound) => Ok(vec![(
                Recipient::Player(player_id),
                GameCommand::Status {
                    board: puzzle.board(),
                },
            )]),
            _ => Err(self.wrong_state(Verb::Status)),
        }
    }

    fn help(&self, player_id: PlayerId) -> Outbox {
        let state = self
            .sessions
            .get(player_id)
            .map_or(PlayerState::Disconnected, |s| s.state);
        let text = match state {
            PlayerState::Connected => "send JOIN and a username to enter the lobby",
            PlayerState::InLobby if self.host == Some(player_id) && self.state.is_joinable() => {
                "you are the host, send GO to start the match"
            }
            PlayerState::InLobby => "wait for the host to start the match",
            PlayerState::Playing => concat!(
                "on your turn send GUESS with a consonant or the phrase, ",
                "VOWEL to buy a vowel, or SKIP. STATUS shows the board"
            ),
            PlayerState::Disconnected => "you are not connected",
        };
        vec![(Recipient::Player(player_id), GameCommand::help(text))]
    }

    /// Removes a player: QUIT or a dropped connection.
    fn leave(&mut self, player_id: PlayerId) -> Result<Outbox, GameError> {
        let session = self.sessions.remove(player_id)?;
        let mut out = Vec::new();
        let Some(username) = session.username else {
            return Ok(out);
        };
        tracing::info!(%player_id, %username, "player left");
        out.push((
            Recipient::All,
            GameCommand::Quit {
                username: Some(username),
            },
        ));

        if let Some(seat) = self.seats.iter().position(|id| *id == player_id) {
            self.unseat(seat, &mut out);
        }

        if self.host == Some(player_id) {
            self.host = self.audience().first().copied();
            if let Some(host) = self.host {
                if let Some(username) = self.name_of(host) {
                    tracing::info!(player_id = %host, %username, "host reassigned");
                    out.push((Recipient::All, GameCommand::Host { username }));
                }
            }
        }
        Ok(out)
    }

    fn unseat(&mut self, seat: usize, out: &mut Outbox) {
        let had_turn = self.state == MatchState::InRound && seat == self.turn;
        self.seats.remove(seat);
        if seat < self.turn {
            self.turn -= 1;
        }

        if self.seats.len() < self.config.min_players.max(1) {
            tracing::info!(players = self.seats.len(), "too few players left, ending match");
            self.finish_match(out);
            return;
        }
        if self.turn >= self.seats.len() {
            self.turn = 0;
        }
        if had_turn {
            out.push(self.turn_announcement());
        }
    }

    // ---- round flow ----

    fn start_next_round(&mut self, out: &mut Outbox) {
        let Some(puzzle) = self.deck.deal() else {
            self.finish_match(out);
            return;
        };
        self.round += 1;
        let Ok(number) = RoundNumber::new(self.round) else {
            self.finish_match(out);
            return;
        };

        self.transition(MatchState::InRound);
        self.turn = (usize::from(self.round) - 1) % self.seats.len().max(1);
        tracing::info!(round = self.round, "round started");

        if self.round == self.config.rounds {
            out.push((Recipient::All, GameCommand::Last));
        }
        out.push((Recipient::All, GameCommand::Round { number }));
        out.push((
            Recipient::All,
            GameCommand::Fill {
                board: puzzle.board(),
            },
        ));
        out.push((Recipient::All, GameCommand::Letters { letters: Vec::new() }));
        self.puzzle = Some(puzzle);
        out.push(self.turn_announcement());
    }

    fn end_round(&mut self, out: &mut Outbox) {
        if let Some(puzzle) = self.puzzle.take() {
            out.push((
                Recipient::All,
                GameCommand::Info {
                    board: puzzle.solution(),
                },
            ));
        }
        out.push((Recipient::All, GameCommand::Turn { username: None }));
        self.transition(MatchState::BetweenRounds);

        if self.round >= self.config.rounds {
            self.finish_match(out);
        } else {
            self.start_next_round(out);
        }
    }

    fn finish_match(&mut self, out: &mut Outbox) {
        // Ending mid-round: release the turn first so no client is left in MY_TURN.
        if self.state == MatchState::InRound {
            out.push((Recipient::All, GameCommand::Turn { username: None }));
        }
        let winner = self.winner();
        tracing::info!(winner = ?winner.as_ref().map(Username::as_str), "match finished");
        out.push((Recipient::All, GameCommand::Winner { username: winner }));
        out.push((Recipient::All, GameCommand::End));
        self.transition(MatchState::Finished);

        for player_id in self.sessions.end_match() {
            if let Some(username) = self.name_of(player_id) {
                out.push((Recipient::Player(player_id), GameCommand::Lobby { username }));
            }
        }

        self.seats.clear();
        self.scores.clear();
        self.puzzle = None;
        self.round = 0;
        self.turn = 0;
        self.transition(MatchState::WaitingForPlayers);
    }

    /// The single highest scorer still seated, or `None` on a tie.
    fn winner(&self) -> Option<Username> {
        let best = self.seats.iter().filter_map(|id| self.score(*id)).max()?;
        let mut leaders = self
            .seats
            .iter()
            .filter(|id| self.score(**id) == Some(best));
        match (leaders.next(), leaders.next()) {
            (Some(id), None) => self.name_of(*id),
            _ => None,
        }
    }

    // ---- helpers ----

    fn require_turn(&self, player_id: PlayerId, verb: Verb) -> Result<(), GameError> {
        if self.state != MatchState::InRound {
            return Err(self.wrong_state(verb));
        }
        if self.turn_holder() != Some(player_id) {
            return Err(GameError::NotYourTurn);
        }
        Ok(())
    }

    fn require_uncalled(&self, letter: Letter) -> Result<(), GameError> {
        match &self.puzzle {
            Some(puzzle) if puzzle.is_called(letter) => Err(GameError::AlreadyCalled(letter)),
            _ => Ok(()),
        }
    }

    fn wrong_state(&self, verb: Verb) -> GameError {
        GameError::InvalidState {
            verb,
            state: self.state,
        }
    }

    fn advance_turn(&mut self) {
        if !self.seats.is_empty() {
            self.turn = (self.turn + 1) % self.seats.len();
        }
    }

    fn turn_announcement(&self) -> (Recipient, GameCommand) {
        let username = self.turn_holder().and_then(|id| self.name_of(id));
        (Recipient::All, GameCommand::Turn { username })
    }

    fn name_of(&self, player_id: PlayerId) -> Option<Username> {
        self.sessions
            .get(player_id)
            .ok()
            .and_then(|s| s.username.clone())
    }

    fn transition(&mut self, to: MatchState) {
        debug_assert!(
            self.state.can_transition_to(to),
            "bad match transition {} -> {}",
            self.state,
            to
        );
        self.state = to;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fortune_protocol::Vowel;
    use fortune_session::{BufferConsole, ClientSession, ClientState};

    fn pid(id: u64) -> PlayerId {
        PlayerId(id)
    }

    fn name(s: &str) -> Username {
        Username::new(s).unwrap()
    }

    fn letter(c: char) -> GameCommand {
        GameCommand::Guess {
            guess: Guess::Letter(Letter::new(c).unwrap()),
        }
    }

    fn one_phrase(text: &str, rounds: u8) -> GameConfig {
        GameConfig {
            phrases: vec![text.to_string()],
            rounds,
            ..GameConfig::default()
        }
    }

    /// A game with players 1..=n joined as p1, p2, ...
    fn lobby(config: GameConfig, n: u64) -> Game {
        let mut game = Game::new(config).unwrap();
        for id in 1..=n {
            game.connect(pid(id)).unwrap();
            game.handle(pid(id), GameCommand::Join { username: name(&format!("p{id}")) })
                .unwrap();
        }
        game
    }

    fn verbs(out: &Outbox) -> Vec<Verb> {
        out.iter().map(|(_, cmd)| cmd.verb()).collect()
    }

    #[test]
    fn test_join_first_player_becomes_host() {
        let game = lobby(GameConfig::default(), 1);
        assert_eq!(game.host(), Some(pid(1)));
    }

    #[test]
    fn test_join_second_player_is_told_the_host() {
        let mut game = lobby(GameConfig::default(), 1);
        game.connect(pid(2)).unwrap();
        let out = game.handle(pid(2), GameCommand::Join { username: name("ana") }).unwrap();
        assert_eq!(verbs(&out), vec![Verb::Lobby, Verb::Join, Verb::Host]);
        assert_eq!(
            out[2],
            (Recipient::Player(pid(2)), GameCommand::Host { username: name("p1") })
        );
    }

    #[test]
    fn test_join_when_full_is_rejected() {
        let config = GameConfig {
            max_players: 2,
            ..GameConfig::default()
        };
        let mut game = lobby(config, 2);
        game.connect(pid(3)).unwrap();
        assert_eq!(
            game.handle(pid(3), GameCommand::Join { username: name("late") }),
            Err(GameError::MatchFull(2))
        );
    }

    #[test]
    fn test_go_from_non_host_is_rejected() {
        let mut game = lobby(GameConfig::default(), 2);
        assert_eq!(game.handle(pid(2), GameCommand::Go), Err(GameError::NotHost));
        assert_eq!(game.state(), MatchState::WaitingForPlayers);
    }

    #[test]
    fn test_go_with_too_few_players_is_rejected() {
        let mut game = lobby(GameConfig::default(), 1);
        assert_eq!(
            game.handle(pid(1), GameCommand::Go),
            Err(GameError::NotEnoughPlayers { needed: 2, joined: 1 })
        );
    }

    #[test]
    fn test_go_starts_first_round() {
        let mut game = lobby(one_phrase("on it", 2), 2);
        let out = game.handle(pid(1), GameCommand::Go).unwrap();
        assert_eq!(
            verbs(&out),
            vec![Verb::Start, Verb::Round, Verb::Fill, Verb::Letters, Verb::Turn]
        );
        assert_eq!(game.state(), MatchState::InRound);
        assert_eq!(game.turn_holder(), Some(pid(1)));
    }

    #[test]
    fn test_go_single_round_announces_last() {
        let mut game = lobby(one_phrase("on it", 1), 2);
        let out = game.handle(pid(1), GameCommand::Go).unwrap();
        assert_eq!(verbs(&out)[..3], [Verb::Start, Verb::Last, Verb::Round]);
    }

    #[test]
    fn test_guess_out_of_turn_is_rejected() {
        let mut game = lobby(one_phrase("on it", 1), 2);
        game.handle(pid(1), GameCommand::Go).unwrap();
        assert_eq!(game.handle(pid(2), letter('n')), Err(GameError::NotYourTurn));
    }

    #[test]
    fn test_guess_before_match_is_rejected_by_session() {
        let mut game = lobby(one_phrase("on it", 1), 2);
        assert!(matches!(
            game.handle(pid(1), letter('n')),
            Err(GameError::Session(_))
        ));
    }

    #[test]
    fn test_guess_hit_scores_and_keeps_turn() {
        let mut game = lobby(one_phrase("tent", 1), 2);
        game.handle(pid(1), GameCommand::Go).unwrap();

        let out = game.handle(pid(1), letter('t')).unwrap();
        assert_eq!(verbs(&out), vec![Verb::Fill, Verb::Letters, Verb::Turn]);
        assert_eq!(game.score(pid(1)), Some(2));
        assert_eq!(game.turn_holder(), Some(pid(1)));
    }

    #[test]
    fn test_guess_miss_passes_turn() {
        let mut game = lobby(one_phrase("tent", 1), 2);
        game.handle(pid(1), GameCommand::Go).unwrap();

        let out = game.handle(pid(1), letter('z')).unwrap();
        assert_eq!(verbs(&out), vec![Verb::Letters, Verb::Turn]);
        assert_eq!(game.turn_holder(), Some(pid(2)));
    }

    #[test]
    fn test_guess_repeated_letter_is_rejected() {
        let mut game = lobby(one_phrase("tent", 1), 2);
        game.handle(pid(1), GameCommand::Go).unwrap();
        game.handle(pid(1), letter('t')).unwrap();
        let t = Letter::new('t').unwrap();
        assert_eq!(game.handle(pid(1), letter('t')), Err(GameError::AlreadyCalled(t)));
    }

    #[test]
    fn test_guess_vowel_letter_is_rejected() {
        let mut game = lobby(one_phrase("tent", 1), 2);
        game.handle(pid(1), GameCommand::Go).unwrap();
        assert!(matches!(
            game.handle(pid(1), letter('e')),
            Err(GameError::NotAConsonant(_))
        ));
    }

    #[test]
    fn test_vowel_requires_points() {
        let mut game = lobby(one_phrase("tent", 1), 2);
        game.handle(pid(1), GameCommand::Go).unwrap();
        let vowel = GameCommand::Vowel {
            vowel: Vowel::parse("e").unwrap(),
        };
        assert_eq!(
            game.handle(pid(1), vowel.clone()),
            Err(GameError::CannotAffordVowel { cost: 1, score: 0 })
        );

        game.handle(pid(1), letter('t')).unwrap();
        let out = game.handle(pid(1), vowel).unwrap();
        assert_eq!(verbs(&out), vec![Verb::Fill, Verb::Letters, Verb::Turn]);
        assert_eq!(game.score(pid(1)), Some(1));
    }

    #[test]
    fn test_phrase_solved_ends_match_after_last_round() {
        let mut game = lobby(one_phrase("on it", 1), 2);
        game.handle(pid(1), GameCommand::Go).unwrap();

        let guess = GameCommand::Guess {
            guess: Guess::parse("on it").unwrap(),
        };
        let out = game.handle(pid(1), guess).unwrap();
        assert_eq!(
            verbs(&out),
            vec![Verb::Info, Verb::Turn, Verb::Winner, Verb::End, Verb::Lobby, Verb::Lobby]
        );
        assert_eq!(
            out[2].1,
            GameCommand::Winner {
                username: Some(name("p1"))
            }
        );
        assert_eq!(game.state(), MatchState::WaitingForPlayers);
        assert_eq!(game.sessions().in_state(PlayerState::InLobby).len(), 2);
    }

    #[test]
    fn test_wrong_phrase_passes_turn() {
        let mut game = lobby(one_phrase("on it", 1), 2);
        game.handle(pid(1), GameCommand::Go).unwrap();
        let guess = GameCommand::Guess {
            guess: Guess::parse("no way").unwrap(),
        };
        let out = game.handle(pid(1), guess).unwrap();
        assert_eq!(
            out,
            vec![(Recipient::All, GameCommand::Turn { username: Some(name("p2")) })]
        );
    }

    #[test]
    fn test_revealing_last_letter_ends_round() {
        let mut game = lobby(one_phrase("tt", 2), 2);
        game.handle(pid(1), GameCommand::Go).unwrap();

        let out = game.handle(pid(1), letter('t')).unwrap();
        let v = verbs(&out);
        assert_eq!(&v[..4], &[Verb::Fill, Verb::Letters, Verb::Info, Verb::Turn]);
        // Round two starts right away, with the last-round notice.
        assert_eq!(&v[4..6], &[Verb::Last, Verb::Round]);
        assert_eq!(game.round().map(RoundNumber::get), Some(2));
        assert_eq!(game.turn_holder(), Some(pid(2)));
    }

    #[test]
    fn test_tie_has_no_winner() {
        let mut game = lobby(one_phrase("tt", 1), 2);
        game.handle(pid(1), GameCommand::Go).unwrap();
        game.handle(pid(1), GameCommand::Skip { username: None }).unwrap();
        // p2 solves with a letter: 2 points, p1 has 0, so p2 wins.
        let out = game.handle(pid(2), letter('t')).unwrap();
        assert!(out.contains(&(
            Recipient::All,
            GameCommand::Winner {
                username: Some(name("p2"))
            }
        )));

        let mut game = lobby(one_phrase("ab", 1), 2);
        game.handle(pid(1), GameCommand::Go).unwrap();
        let out = game.handle(pid(1), letter('b')).unwrap();
        assert!(!out.iter().any(|(_, c)| c.verb() == Verb::Winner));
        // p1 now has 1 point; buying A costs 1 and solves the puzzle at 0-0.
        let out = game
            .handle(pid(1), GameCommand::Vowel { vowel: Vowel::parse("a").unwrap() })
            .unwrap();
        assert!(out.contains(&(Recipient::All, GameCommand::Winner { username: None })));
    }

    #[test]
    fn test_skip_announces_and_passes_turn() {
        let mut game = lobby(one_phrase("on it", 1), 3);
        game.handle(pid(1), GameCommand::Go).unwrap();
        let out = game.handle(pid(1), GameCommand::Skip { username: None }).unwrap();
        assert_eq!(
            out,
            vec![
                (Recipient::All, GameCommand::Skip { username: Some(name("p1")) }),
                (Recipient::All, GameCommand::Turn { username: Some(name("p2")) }),
            ]
        );
    }

    #[test]
    fn test_status_replies_to_sender_only() {
        let mut game = lobby(one_phrase("on it", 1), 2);
        assert!(game.handle(pid(2), GameCommand::Status { board: Board::default() }).is_err());

        game.handle(pid(1), GameCommand::Go).unwrap();
        let out = game
            .handle(pid(2), GameCommand::Status { board: Board::default() })
            .unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].0, Recipient::Player(pid(2)));
    }

    #[test]
    fn test_quit_of_turn_holder_passes_turn() {
        let mut game = lobby(one_phrase("on it", 1), 3);
        game.handle(pid(1), GameCommand::Go).unwrap();
        let out = game.handle(pid(1), GameCommand::Quit { username: None }).unwrap();
        assert_eq!(
            verbs(&out),
            vec![Verb::Quit, Verb::Turn, Verb::Host]
        );
        assert_eq!(game.turn_holder(), Some(pid(2)));
        assert_eq!(game.host(), Some(pid(2)));
    }

    #[test]
    fn test_disconnect_leaving_one_player_ends_match() {
        let mut game = lobby(one_phrase("on it", 1), 2);
        game.handle(pid(1), GameCommand::Go).unwrap();
        let out = game.disconnect(pid(2));
        assert_eq!(
            verbs(&out),
            vec![Verb::Quit, Verb::Turn, Verb::Winner, Verb::End, Verb::Lobby]
        );
        assert_eq!(out[1], (Recipient::All, GameCommand::Turn { username: None }));
        assert_eq!(game.state(), MatchState::WaitingForPlayers);
    }

    /// Feeds what `to` would receive from `out` into a client session.
    fn deliver(
        out: &Outbox,
        to: PlayerId,
        client: &mut ClientSession,
        console: &mut BufferConsole,
    ) {
        for (recipient, command) in out {
            let reaches = match recipient {
                Recipient::All => true,
                Recipient::Player(id) => *id == to,
                Recipient::AllExcept(id) => *id != to,
            };
            if reaches {
                client.handle_response(command, console);
            }
        }
    }

    #[test]
    fn test_disconnect_mid_round_returns_turn_holder_client_to_lobby() {
        let mut game = Game::new(one_phrase("on it", 1)).unwrap();
        let mut client = ClientSession::new();
        let mut console = BufferConsole::new();

        game.connect(pid(1)).unwrap();
        let out = game.handle(pid(1), GameCommand::Join { username: name("p1") }).unwrap();
        deliver(&out, pid(1), &mut client, &mut console);
        game.connect(pid(2)).unwrap();
        let out = game.handle(pid(2), GameCommand::Join { username: name("p2") }).unwrap();
        deliver(&out, pid(1), &mut client, &mut console);

        let out = game.handle(pid(1), GameCommand::Go).unwrap();
        deliver(&out, pid(1), &mut client, &mut console);
        assert_eq!(client.state(), ClientState::MyTurn);

        let out = game.disconnect(pid(2));
        deliver(&out, pid(1), &mut client, &mut console);
        assert_eq!(client.state(), ClientState::Lobby);
        assert_eq!(
            game.sessions().get(pid(1)).map(|s| s.state),
            Ok(PlayerState::InLobby)
        );
        assert!(console.saw("p1 !"));
    }

    #[test]
    fn test_disconnect_before_join_is_silent() {
        let mut game = Game::new(GameConfig::default()).unwrap();
        game.connect(pid(7)).unwrap();
        assert!(game.disconnect(pid(7)).is_empty());
        assert!(game.sessions().is_empty());
    }

    #[test]
    fn test_server_verb_from_client_is_rejected() {
        let mut game = lobby(GameConfig::default(), 2);
        assert!(matches!(
            game.handle(pid(1), GameCommand::Start),
            Err(GameError::Session(_))
        ));
    }

    #[test]
    fn test_help_tells_host_to_start() {
        let mut game = lobby(GameConfig::default(), 2);
        let out = game.handle(pid(1), GameCommand::Help { message: None }).unwrap();
        assert_eq!(
            out,
            vec![(
                Recipient::Player(pid(1)),
                GameCommand::help("you are the host, send GO to start the match")
            )]
        );
    }
}

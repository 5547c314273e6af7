//! The client session: turns console input into commands and server
//! commands into console output, gated by [`ClientState`].
//!
//! Both directions are a `match` on the state with an inner `match` on
//! the verb. Every (state, input) pair is either turned into a command or
//! rejected; every (state, server command) pair is either handled or
//! ignored. Ignoring is not an error: a command that arrives in the wrong
//! state simply has no effect.

use fortune_protocol::{Board, GameCommand, Guess, Letter, Username, Vowel};

use crate::{ClientState, Console, SessionError};

/// Shown when input does not fit the current state.
const INVALID_INPUT: &str = "Invalid input!";

/// What [`ClientSession::handle_response`] did with a server command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reaction {
    /// The command was acted on. `from == to` when only output happened.
    Handled { from: ClientState, to: ClientState },
    /// The command does not apply in the current state.
    Ignored,
}

impl Reaction {
    pub fn is_handled(self) -> bool {
        matches!(self, Self::Handled { .. })
    }
}

/// One client's view of the game.
///
/// Owned by a single task; the caller feeds it console lines and decoded
/// server commands one at a time.
///
/// ```rust
/// use fortune_session::{BufferConsole, ClientSession, ClientState};
///
/// let mut console = BufferConsole::new();
/// let mut session = ClientSession::new();
///
/// let join = session.handle_input("pedro", &mut console).unwrap();
/// assert_eq!(join.unwrap().encode(), "JOIN pedro");
/// assert_eq!(session.state(), ClientState::AwaitingJoin);
/// ```
#[derive(Debug, Clone)]
pub struct ClientSession {
    state: ClientState,
    username: Option<Username>,
}

impl Default for ClientSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientSession {
    /// A fresh session, waiting for the user to pick a name.
    pub fn new() -> Self {
        Self {
            state: ClientState::AwaitingJoin,
            username: None,
        }
    }

    pub fn state(&self) -> ClientState {
        self.state
    }

    /// The name the server confirmed with `LOBBY`, if any.
    pub fn username(&self) -> Option<&Username> {
        self.username.as_ref()
    }

    /// Ends the session without sending anything (the server went away).
    pub fn disconnect(&mut self) {
        if self.state != ClientState::Disconnected {
            tracing::debug!(from = %self.state, "session disconnected");
            self.state = ClientState::Disconnected;
        }
    }

    // ---- console input ----

    /// Interprets one line typed by the user.
    ///
    /// Returns the command to send, or `Ok(None)` for a blank line.
    /// Keywords are case-insensitive.
    ///
    /// # Errors
    /// [`SessionError::InputRejected`] when the line means nothing in the
    /// current state. The reason is also written to the console; no
    /// command is produced and the state is unchanged.
    pub fn handle_input(
        &mut self,
        line: &str,
        console: &mut impl Console,
    ) -> Result<Option<GameCommand>, SessionError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let (keyword, rest) = match line.split_once(char::is_whitespace) {
            Some((keyword, rest)) => (keyword, rest.trim()),
            None => (line, ""),
        };
        let keyword = keyword.to_ascii_lowercase();

        let result = match self.state {
            ClientState::AwaitingJoin => self.input_awaiting_join(line, &keyword, rest),
            ClientState::Lobby => self.input_lobby(&keyword, rest),
            ClientState::WaitForTurn => self.input_wait_for_turn(&keyword, rest),
            ClientState::MyTurn => self.input_my_turn(&keyword, rest),
            ClientState::GameOver => self.input_game_over(&keyword, rest),
            ClientState::Disconnected => Err("the session is closed".to_string()),
        };

        match result {
            Ok(command) => {
                if let GameCommand::Quit { .. } = command {
                    self.state = ClientState::Disconnected;
                }
                Ok(Some(command))
            }
            Err(reason) => {
                console.error(&format!("{INVALID_INPUT} {reason}"));
                Err(SessionError::InputRejected(reason))
            }
        }
    }

    fn input_awaiting_join(
        &self,
        line: &str,
        keyword: &str,
        rest: &str,
    ) -> Result<GameCommand, String> {
        if keyword == "quit" && rest.is_empty() {
            return Ok(quit());
        }
        Username::new(line)
            .map(|username| GameCommand::Join { username })
            .map_err(|e| format!("{e}. Type a username without spaces, or quit."))
    }

    fn input_lobby(&self, keyword: &str, rest: &str) -> Result<GameCommand, String> {
        match (keyword, rest) {
            ("go", "") => Ok(GameCommand::Go),
            ("quit", "") => Ok(quit()),
            _ => Err("Type go to start the game, or quit.".to_string()),
        }
    }

    fn input_wait_for_turn(&self, keyword: &str, rest: &str) -> Result<GameCommand, String> {
        match (keyword, rest) {
            ("status", "") => Ok(status_request()),
            ("help", "") => Ok(GameCommand::Help { message: None }),
            ("quit", "") => Ok(quit()),
            _ => Err("It is not your turn. Type status, help or quit.".to_string()),
        }
    }

    fn input_my_turn(&self, keyword: &str, rest: &str) -> Result<GameCommand, String> {
        match keyword {
            "guess" if !rest.is_empty() => Guess::parse(rest)
                .map(|guess| GameCommand::Guess { guess })
                .map_err(|e| e.to_string()),
            "vowel" if !rest.is_empty() => Vowel::parse(rest)
                .map(|vowel| GameCommand::Vowel { vowel })
                .map_err(|e| e.to_string()),
            "skip" if rest.is_empty() => Ok(GameCommand::Skip { username: None }),
            "status" if rest.is_empty() => Ok(status_request()),
            "help" if rest.is_empty() => Ok(GameCommand::Help { message: None }),
            "quit" if rest.is_empty() => Ok(quit()),
            _ => Err(
                "Type guess <letter or phrase>, vowel <letter>, skip, status, help or quit."
                    .to_string(),
            ),
        }
    }

    fn input_game_over(&self, keyword: &str, rest: &str) -> Result<GameCommand, String> {
        match (keyword, rest) {
            ("quit", "") => Ok(quit()),
            _ => Err("The game is over. Type quit to leave.".to_string()),
        }
    }

    // ---- server commands ----

    /// Reacts to one command received from the server.
    pub fn handle_response(
        &mut self,
        command: &GameCommand,
        console: &mut impl Console,
    ) -> Reaction {
        let from = self.state;
        let to = match from {
            ClientState::AwaitingJoin => self.respond_awaiting_join(command, console),
            ClientState::Lobby => self.respond_lobby(command, console),
            ClientState::WaitForTurn => self.respond_wait_for_turn(command, console),
            ClientState::MyTurn => self.respond_my_turn(command, console),
            ClientState::GameOver => self.respond_game_over(command, console),
            ClientState::Disconnected => None,
        };

        match to {
            Some(to) => {
                if to != from {
                    tracing::debug!(%from, %to, verb = %command.verb(), "client state changed");
                }
                self.state = to;
                Reaction::Handled { from, to }
            }
            None => {
                tracing::debug!(state = %from, verb = %command.verb(), "ignored server command");
                Reaction::Ignored
            }
        }
    }

    fn respond_awaiting_join(
        &mut self,
        command: &GameCommand,
        console: &mut impl Console,
    ) -> Option<ClientState> {
        match command {
            GameCommand::Lobby { username } => {
                console.info(&format!("Welcome to the lobby, {username}!"));
                self.username = Some(username.clone());
                Some(ClientState::Lobby)
            }
            GameCommand::Help { .. } => {
                show_help(command, console);
                Some(self.state)
            }
            _ => None,
        }
    }

    fn respond_lobby(
        &mut self,
        command: &GameCommand,
        console: &mut impl Console,
    ) -> Option<ClientState> {
        match command {
            GameCommand::Start => {
                console.info("The game is starting!");
                Some(ClientState::WaitForTurn)
            }
            GameCommand::Join { username } => {
                console.info(&format!("{username} joined the lobby."));
                Some(self.state)
            }
            GameCommand::Host { username } => {
                if self.is_me(username) {
                    console.info("You are the host. Type go to start the game.");
                } else {
                    console.info(&format!("{username} is the host."));
                }
                Some(self.state)
            }
            GameCommand::Quit {
                username: Some(username),
            } => {
                console.info(&format!("{username} left."));
                Some(self.state)
            }
            GameCommand::Help { .. } => {
                show_help(command, console);
                Some(self.state)
            }
            _ => None,
        }
    }

    fn respond_wait_for_turn(
        &mut self,
        command: &GameCommand,
        console: &mut impl Console,
    ) -> Option<ClientState> {
        match command {
            GameCommand::Turn {
                username: Some(username),
            } if self.is_me(username) => {
                console.info(
                    "It's your turn! Type guess <letter or phrase>, vowel <letter> or skip.",
                );
                Some(ClientState::MyTurn)
            }
            GameCommand::Turn { username } => {
                announce_turn(username.as_ref(), console);
                Some(self.state)
            }
            GameCommand::Winner { username } => {
                announce_winner(username.as_ref(), console);
                Some(ClientState::GameOver)
            }
            other => show_match_update(other, console).then_some(self.state),
        }
    }

    fn respond_my_turn(
        &mut self,
        command: &GameCommand,
        console: &mut impl Console,
    ) -> Option<ClientState> {
        match command {
            GameCommand::Turn {
                username: Some(username),
            } if self.is_me(username) => {
                console.info("It's still your turn.");
                Some(self.state)
            }
            GameCommand::Turn { username } => {
                announce_turn(username.as_ref(), console);
                Some(ClientState::WaitForTurn)
            }
            other => show_match_update(other, console).then_some(self.state),
        }
    }

    fn respond_game_over(
        &mut self,
        command: &GameCommand,
        console: &mut impl Console,
    ) -> Option<ClientState> {
        match command {
            GameCommand::End => {
                console.info("The game has ended. Back to the lobby.");
                Some(ClientState::Lobby)
            }
            GameCommand::Lobby { .. } => Some(ClientState::Lobby),
            _ => None,
        }
    }

    fn is_me(&self, username: &Username) -> bool {
        self.username.as_ref() == Some(username)
    }
}

fn quit() -> GameCommand {
    GameCommand::Quit { username: None }
}

fn status_request() -> GameCommand {
    GameCommand::Status {
        board: Board::default(),
    }
}

fn show_help(command: &GameCommand, console: &mut impl Console) {
    if let GameCommand::Help {
        message: Some(message),
    } = command
    {
        console.error(message.as_str());
    }
}

fn announce_turn(username: Option<&Username>, console: &mut impl Console) {
    match username {
        Some(username) => console.info(&format!("It's {username}'s turn.")),
        None => console.info("The round is over."),
    }
}

fn announce_winner(username: Option<&Username>, console: &mut impl Console) {
    console.info("Thank you to all the participants for playing!");
    match username {
        Some(username) => {
            console.info("We've now reached the last round. And the player to play it is...");
            console.info(&format!("{username} !"));
        }
        None => console.info("Nobody came out on top: the game is a tie."),
    }
}

fn letters_line(letters: &[Letter]) -> String {
    letters
        .iter()
        .map(Letter::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Output shared by both in-match states. Returns `false` for commands
/// that do not belong to a running match.
fn show_match_update(command: &GameCommand, console: &mut impl Console) -> bool {
    match command {
        GameCommand::Round { number } => console.info(&format!("Round {number}!")),
        GameCommand::Last => console.info("Here comes the last round!"),
        GameCommand::Fill { board } | GameCommand::Status { board } => {
            console.info(&format!("Board: {board}"));
        }
        GameCommand::Info { board } => console.info(&format!("The solution was: {board}")),
        GameCommand::Letters { letters } if letters.is_empty() => {
            console.info("No letters called yet.");
        }
        GameCommand::Letters { letters } => {
            console.info(&format!("Letters called: {}", letters_line(letters)));
        }
        GameCommand::Skip {
            username: Some(username),
        } => console.info(&format!("{username} skipped their turn.")),
        GameCommand::Quit {
            username: Some(username),
        } => console.info(&format!("{username} left the game.")),
        GameCommand::Help { .. } => show_help(command, console),
        _ => return false,
    }
    true
}

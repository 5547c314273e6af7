//! The command model: one strongly typed variant per verb.
//!
//! Each variant owns its argument rules. Encoding goes through
//! [`GameCommand::arguments`], decoding through the per-verb functions in
//! [`DECODERS`], which the [`Registry`](crate::Registry) is built from.

use std::fmt;

use crate::types::{
    Board, Guess, Letter, Message, RoundNumber, Username, Vowel,
};
use crate::{wire, ProtocolError, Verb};

/// A decoded, validated protocol command.
///
/// Direction is noted per variant: C = client → server, S = server →
/// client. A variant carrying an `Option<Username>` sends the name when
/// the server broadcasts it and nothing when a client sends it, except
/// `Turn` and `Winner`, which always carry one argument and use
/// [`ABSENT`](crate::ABSENT) for `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameCommand {
    /// C: join the lobby under a username. S: another player joined.
    Join { username: Username },
    /// S: the join was accepted (also sent after a match ends).
    Lobby { username: Username },
    /// S: the named player may start the match.
    Host { username: Username },
    /// C: ask the server to start the match.
    Go,
    /// S: the match has started.
    Start,
    /// S: a round begins.
    Round { number: RoundNumber },
    /// S: the next round is the last one.
    Last,
    /// S: whose turn it is; `None` when nobody may play.
    Turn { username: Option<Username> },
    /// C: guess a letter or the whole phrase.
    Guess { guess: Guess },
    /// C: buy a vowel.
    Vowel { vowel: Vowel },
    /// C: pass the turn. S: the named player passed.
    Skip { username: Option<Username> },
    /// S: the board after a reveal.
    Fill { board: Board },
    /// C: ask for the board (empty). S: the current board.
    Status { board: Board },
    /// S: the solved board at the end of a round.
    Info { board: Board },
    /// S: letters already called this round.
    Letters { letters: Vec<Letter> },
    /// S: the match winner; `None` on a tie.
    Winner { username: Option<Username> },
    /// S: the match is over.
    End,
    /// C: leave. S: the named player left.
    Quit { username: Option<Username> },
    /// C: ask for usage (no text). S: usage text or a rejection reason.
    Help { message: Option<Message> },
}

impl GameCommand {
    /// The verb this command travels under.
    pub fn verb(&self) -> Verb {
        match self {
            Self::Join { .. } => Verb::Join,
            Self::Lobby { .. } => Verb::Lobby,
            Self::Host { .. } => Verb::Host,
            Self::Go => Verb::Go,
            Self::Start => Verb::Start,
            Self::Round { .. } => Verb::Round,
            Self::Last => Verb::Last,
            Self::Turn { .. } => Verb::Turn,
            Self::Guess { .. } => Verb::Guess,
            Self::Vowel { .. } => Verb::Vowel,
            Self::Skip { .. } => Verb::Skip,
            Self::Fill { .. } => Verb::Fill,
            Self::Status { .. } => Verb::Status,
            Self::Info { .. } => Verb::Info,
            Self::Letters { .. } => Verb::Letters,
            Self::Winner { .. } => Verb::Winner,
            Self::End => Verb::End,
            Self::Quit { .. } => Verb::Quit,
            Self::Help { .. } => Verb::Help,
        }
    }

    /// The positional arguments, flattened and unquoted.
    pub fn arguments(&self) -> Vec<String> {
        match self {
            Self::Join { username }
            | Self::Lobby { username }
            | Self::Host { username } => vec![username.to_string()],
            Self::Go | Self::Start | Self::Last | Self::End => Vec::new(),
            Self::Round { number } => vec![number.to_string()],
            Self::Turn { username } | Self::Winner { username } => {
                vec![Username::format_optional(username.as_ref())]
            }
            Self::Skip { username } | Self::Quit { username } => {
                username.iter().map(Username::to_string).collect()
            }
            Self::Guess { guess } => vec![guess.to_string()],
            Self::Vowel { vowel } => vec![vowel.to_string()],
            Self::Fill { board }
            | Self::Status { board }
            | Self::Info { board } => board.to_tokens(),
            Self::Letters { letters } => {
                letters.iter().map(Letter::to_string).collect()
            }
            Self::Help { message } => {
                message.iter().map(Message::to_string).collect()
            }
        }
    }

    /// The full wire line, without terminator.
    pub fn encode(&self) -> String {
        wire::encode_line(self.verb(), &self.arguments())
    }

    /// Shorthand for a `HELP` reply carrying `text`.
    ///
    /// Double quotes become single quotes and line breaks become spaces,
    /// so error text can be sent as is. Text that is still not a valid
    /// [`Message`] (blank) is replaced by a generic one.
    pub fn help(text: impl Into<String>) -> Self {
        let text: String = text
            .into()
            .chars()
            .map(|c| match c {
                '"' => '\'',
                '\n' | '\r' => ' ',
                other => other,
            })
            .collect();
        let message = Message::new(text)
            .or_else(|_| Message::new("request rejected"))
            .ok();
        Self::Help { message }
    }
}

impl fmt::Display for GameCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

// ---------------------------------------------------------------------------
// Decoders
// ---------------------------------------------------------------------------

/// Every verb paired with its decode function.
pub(crate) const DECODERS: [(Verb, crate::DecodeFn); 19] = [
    (Verb::End, decode_end),
    (Verb::Fill, decode_fill),
    (Verb::Go, decode_go),
    (Verb::Guess, decode_guess),
    (Verb::Help, decode_help),
    (Verb::Host, decode_host),
    (Verb::Info, decode_info),
    (Verb::Join, decode_join),
    (Verb::Last, decode_last),
    (Verb::Letters, decode_letters),
    (Verb::Lobby, decode_lobby),
    (Verb::Quit, decode_quit),
    (Verb::Round, decode_round),
    (Verb::Skip, decode_skip),
    (Verb::Start, decode_start),
    (Verb::Status, decode_status),
    (Verb::Turn, decode_turn),
    (Verb::Vowel, decode_vowel),
    (Verb::Winner, decode_winner),
];

fn no_args(verb: Verb, args: &[String]) -> Result<(), ProtocolError> {
    if args.is_empty() {
        Ok(())
    } else {
        Err(ProtocolError::malformed(
            verb,
            format!("expected no arguments, got {}", args.len()),
        ))
    }
}

fn one_arg(verb: Verb, args: &[String]) -> Result<&str, ProtocolError> {
    match args {
        [only] => Ok(only.as_str()),
        _ => Err(ProtocolError::malformed(
            verb,
            format!("expected 1 argument, got {}", args.len()),
        )),
    }
}

fn optional_arg(
    verb: Verb,
    args: &[String],
) -> Result<Option<&str>, ProtocolError> {
    match args {
        [] => Ok(None),
        [only] => Ok(Some(only.as_str())),
        _ => Err(ProtocolError::malformed(
            verb,
            format!("expected at most 1 argument, got {}", args.len()),
        )),
    }
}

fn username(verb: Verb, args: &[String]) -> Result<Username, ProtocolError> {
    Username::new(one_arg(verb, args)?)
        .map_err(|e| ProtocolError::malformed(verb, e))
}

fn sentinel_username(
    verb: Verb,
    args: &[String],
) -> Result<Option<Username>, ProtocolError> {
    Username::parse_optional(one_arg(verb, args)?)
        .map_err(|e| ProtocolError::malformed(verb, e))
}

fn optional_username(
    verb: Verb,
    args: &[String],
) -> Result<Option<Username>, ProtocolError> {
    optional_arg(verb, args)?
        .map(Username::new)
        .transpose()
        .map_err(|e| ProtocolError::malformed(verb, e))
}

fn board(verb: Verb, args: &[String]) -> Result<Board, ProtocolError> {
    Board::from_tokens(args).map_err(|e| ProtocolError::malformed(verb, e))
}

fn decode_join(args: &[String]) -> Result<GameCommand, ProtocolError> {
    Ok(GameCommand::Join {
        username: username(Verb::Join, args)?,
    })
}

fn decode_lobby(args: &[String]) -> Result<GameCommand, ProtocolError> {
    Ok(GameCommand::Lobby {
        username: username(Verb::Lobby, args)?,
    })
}

fn decode_host(args: &[String]) -> Result<GameCommand, ProtocolError> {
    Ok(GameCommand::Host {
        username: username(Verb::Host, args)?,
    })
}

fn decode_go(args: &[String]) -> Result<GameCommand, ProtocolError> {
    no_args(Verb::Go, args).map(|()| GameCommand::Go)
}

fn decode_start(args: &[String]) -> Result<GameCommand, ProtocolError> {
    no_args(Verb::Start, args).map(|()| GameCommand::Start)
}

fn decode_last(args: &[String]) -> Result<GameCommand, ProtocolError> {
    no_args(Verb::Last, args).map(|()| GameCommand::Last)
}

fn decode_end(args: &[String]) -> Result<GameCommand, ProtocolError> {
    no_args(Verb::End, args).map(|()| GameCommand::End)
}

fn decode_round(args: &[String]) -> Result<GameCommand, ProtocolError> {
    let number = RoundNumber::parse(one_arg(Verb::Round, args)?)
        .map_err(|e| ProtocolError::malformed(Verb::Round, e))?;
    Ok(GameCommand::Round { number })
}

fn decode_turn(args: &[String]) -> Result<GameCommand, ProtocolError> {
    Ok(GameCommand::Turn {
        username: sentinel_username(Verb::Turn, args)?,
    })
}

fn decode_winner(args: &[String]) -> Result<GameCommand, ProtocolError> {
    Ok(GameCommand::Winner {
        username: sentinel_username(Verb::Winner, args)?,
    })
}

fn decode_guess(args: &[String]) -> Result<GameCommand, ProtocolError> {
    let guess = Guess::parse(one_arg(Verb::Guess, args)?)
        .map_err(|e| ProtocolError::malformed(Verb::Guess, e))?;
    Ok(GameCommand::Guess { guess })
}

fn decode_vowel(args: &[String]) -> Result<GameCommand, ProtocolError> {
    let vowel = Vowel::parse(one_arg(Verb::Vowel, args)?)
        .map_err(|e| ProtocolError::malformed(Verb::Vowel, e))?;
    Ok(GameCommand::Vowel { vowel })
}

fn decode_skip(args: &[String]) -> Result<GameCommand, ProtocolError> {
    Ok(GameCommand::Skip {
        username: optional_username(Verb::Skip, args)?,
    })
}

fn decode_quit(args: &[String]) -> Result<GameCommand, ProtocolError> {
    Ok(GameCommand::Quit {
        username: optional_username(Verb::Quit, args)?,
    })
}

fn decode_fill(args: &[String]) -> Result<GameCommand, ProtocolError> {
    Ok(GameCommand::Fill {
        board: board(Verb::Fill, args)?,
    })
}

fn decode_status(args: &[String]) -> Result<GameCommand, ProtocolError> {
    Ok(GameCommand::Status {
        board: board(Verb::Status, args)?,
    })
}

fn decode_info(args: &[String]) -> Result<GameCommand, ProtocolError> {
    let board = board(Verb::Info, args)?;
    if !board.is_solved() {
        return Err(ProtocolError::malformed(
            Verb::Info,
            "solution board has hidden cells",
        ));
    }
    Ok(GameCommand::Info { board })
}

fn decode_letters(args: &[String]) -> Result<GameCommand, ProtocolError> {
    let letters = args
        .iter()
        .flat_map(|token| token.split_whitespace())
        .map(Letter::parse)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| ProtocolError::malformed(Verb::Letters, e))?;
    Ok(GameCommand::Letters { letters })
}

fn decode_help(args: &[String]) -> Result<GameCommand, ProtocolError> {
    let message = optional_arg(Verb::Help, args)?
        .map(Message::new)
        .transpose()
        .map_err(|e| ProtocolError::malformed(Verb::Help, e))?;
    Ok(GameCommand::Help { message })
}

//! Integration tests for the line format: tokenizer, quoting, registry
//! decode, and encode/decode agreement across every verb.

use fortune_protocol::wire::{quote, tokenize};
use fortune_protocol::{
    registry, Board, Codec, GameCommand, Guess, Letter, LineCodec, Message,
    ProtocolError, RoundNumber, Username, Verb, Vowel,
};
use proptest::prelude::*;

fn name(s: &str) -> Username {
    Username::new(s).expect("valid username")
}

/// One command per verb, with arguments that exercise quoting and the
/// absent sentinel.
fn one_of_each() -> Vec<GameCommand> {
    vec![
        GameCommand::Join { username: name("pedro") },
        GameCommand::Lobby { username: name("pedro") },
        GameCommand::Host { username: name("ana") },
        GameCommand::Go,
        GameCommand::Start,
        GameCommand::Round { number: RoundNumber::new(3).unwrap() },
        GameCommand::Last,
        GameCommand::Turn { username: None },
        GameCommand::Turn { username: Some(name("ana")) },
        GameCommand::Guess { guess: Guess::parse("t").unwrap() },
        GameCommand::Guess { guess: Guess::parse("a new day").unwrap() },
        GameCommand::Vowel { vowel: Vowel::parse("o").unwrap() },
        GameCommand::Skip { username: None },
        GameCommand::Skip { username: Some(name("ana")) },
        GameCommand::Fill {
            board: Board::from_tokens(&["A", "_", "/", "D", "_", "Y"]).unwrap(),
        },
        GameCommand::Status { board: Board::default() },
        GameCommand::Info {
            board: Board::from_tokens(&["O", "K"]).unwrap(),
        },
        GameCommand::Letters {
            letters: vec![Letter::new('a').unwrap(), Letter::new('z').unwrap()],
        },
        GameCommand::Winner { username: None },
        GameCommand::Winner { username: Some(name("pedro")) },
        GameCommand::End,
        GameCommand::Quit { username: None },
        GameCommand::Quit { username: Some(name("ana")) },
        GameCommand::Help { message: None },
        GameCommand::Help {
            message: Some(Message::new("it is not your turn").unwrap()),
        },
    ]
}

#[test]
fn test_decode_encode_agrees_for_every_verb() {
    let codec = LineCodec::default();
    let commands = one_of_each();

    let mut seen: Vec<Verb> = commands.iter().map(GameCommand::verb).collect();
    seen.sort();
    seen.dedup();
    assert_eq!(seen, Verb::ALL.to_vec(), "every verb is covered");

    for cmd in commands {
        let line = codec.encode(&cmd);
        assert_eq!(codec.decode(&line), Ok(cmd), "line: {line}");
    }
}

#[test]
fn test_join_pedro_tokens() {
    assert_eq!(tokenize("pedro"), vec!["pedro"]);
    let cmd = registry::decode("JOIN pedro").unwrap();
    assert_eq!(cmd.arguments(), vec!["pedro"]);
}

#[test]
fn test_fill_mixed_quoted_and_bare_tokens() {
    let tokens = tokenize("\"h e l l o\" _ _ _ _ _");
    assert_eq!(tokens.len(), 6);
    assert_eq!(tokens[0], "h e l l o");
    assert!(tokens[1..].iter().all(|t| t == "_"));

    let cmd = registry::decode("FILL \"h e l l o\" _ _ _ _ _").unwrap();
    assert_eq!(cmd.verb(), Verb::Fill);
    assert_eq!(cmd.arguments().len(), 10);
}

#[test]
fn test_join_sentinel_is_malformed() {
    assert!(matches!(
        registry::decode("JOIN -"),
        Err(ProtocolError::MalformedArguments { verb: Verb::Join, .. })
    ));
}

#[test]
fn test_join_empty_or_missing_username_is_malformed() {
    for line in ["JOIN \"\"", "JOIN", "JOIN   "] {
        assert!(
            matches!(
                registry::decode(line),
                Err(ProtocolError::MalformedArguments { verb: Verb::Join, .. })
            ),
            "line: {line:?}"
        );
    }
}

#[test]
fn test_join_bob_succeeds() {
    match registry::decode("JOIN bob") {
        Ok(GameCommand::Join { username }) => assert_eq!(username.as_str(), "bob"),
        other => panic!("expected Join, got {other:?}"),
    }
}

#[test]
fn test_decoding_same_line_twice_is_equal() {
    let line = "GUESS \"good luck\"";
    let first = registry::decode(line).unwrap();
    let second = registry::decode(line).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_unknown_verb_is_surfaced() {
    assert_eq!(
        registry::decode("SPIN 500"),
        Err(ProtocolError::UnknownVerb("SPIN".into()))
    );
}

#[test]
fn test_vowel_with_consonant_is_malformed() {
    assert!(matches!(
        registry::decode("VOWEL y"),
        Err(ProtocolError::MalformedArguments { verb: Verb::Vowel, .. })
    ));
}

#[test]
fn test_round_out_of_range_is_malformed() {
    assert!(registry::decode("ROUND 0").is_err());
    assert!(registry::decode("ROUND 250").is_err());
    assert!(registry::decode("ROUND 12").is_ok());
}

proptest! {
    #[test]
    fn prop_quote_iff_space(arg in "[a-z _]{1,12}") {
        let quoted = quote(&arg);
        if arg.contains(' ') {
            prop_assert!(quoted.starts_with('"') && quoted.ends_with('"'));
        } else {
            prop_assert_eq!(&*quoted, arg.as_str());
        }
    }

    #[test]
    fn prop_username_round_trips(raw in "[A-Za-z0-9_]{1,16}") {
        let cmd = GameCommand::Join { username: Username::new(raw.clone()).unwrap() };
        let decoded = registry::decode(&cmd.encode()).unwrap();
        prop_assert_eq!(decoded, cmd);
    }

    #[test]
    fn prop_phrase_guess_round_trips(words in prop::collection::vec("[a-z]{1,8}", 1..5)) {
        let text = words.join(" ");
        prop_assume!(text.len() >= 2);
        let cmd = GameCommand::Guess { guess: Guess::parse(&text).unwrap() };
        let decoded = registry::decode(&cmd.encode()).unwrap();
        prop_assert_eq!(decoded, cmd);
    }

    #[test]
    fn prop_help_message_round_trips(text in "[a-z][a-z \t]{0,16}[a-z]") {
        let cmd = GameCommand::Help { message: Some(Message::new(text).unwrap()) };
        let decoded = registry::decode(&cmd.encode()).unwrap();
        prop_assert_eq!(decoded, cmd);
    }

    #[test]
    fn prop_tokenize_never_panics(body in ".{0,64}") {
        let _ = tokenize(&body);
    }
}

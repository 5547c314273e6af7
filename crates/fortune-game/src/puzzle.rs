//! Puzzles: the hidden phrase of a round, and the deck they are drawn from.

use fortune_protocol::{Board, Cell, Letter, Phrase};
use rand::seq::SliceRandom;

/// One round's phrase and the letters called against it.
#[derive(Debug, Clone)]
pub struct Puzzle {
    phrase: Phrase,
    /// One slot per character of the phrase; `None` marks a word gap.
    layout: Vec<Option<Letter>>,
    called: Vec<Letter>,
}

impl Puzzle {
    pub fn new(phrase: Phrase) -> Self {
        let layout = phrase
            .as_str()
            .chars()
            .map(|c| Letter::new(c).ok())
            .collect();
        Self {
            phrase,
            layout,
            called: Vec::new(),
        }
    }

    pub fn phrase(&self) -> &Phrase {
        &self.phrase
    }

    /// Letters called this round, in call order.
    pub fn called(&self) -> &[Letter] {
        &self.called
    }

    pub fn is_called(&self, letter: Letter) -> bool {
        self.called.contains(&letter)
    }

    /// Calls `letter` and returns how many times it occurs in the phrase.
    ///
    /// Calling the same letter twice is the caller's bug: the second call
    /// reveals nothing new but still counts occurrences.
    pub fn reveal(&mut self, letter: Letter) -> usize {
        if !self.is_called(letter) {
            self.called.push(letter);
        }
        self.layout
            .iter()
            .filter(|slot| **slot == Some(letter))
            .count()
    }

    /// `true` once every letter of the phrase has been called.
    pub fn is_solved(&self) -> bool {
        self.layout
            .iter()
            .flatten()
            .all(|letter| self.is_called(*letter))
    }

    /// `true` if `guess` is the phrase.
    pub fn is_solution(&self, guess: &Phrase) -> bool {
        *guess == self.phrase
    }

    /// The board as players currently see it.
    pub fn board(&self) -> Board {
        self.render(|letter| self.is_called(letter))
    }

    /// The fully revealed board.
    pub fn solution(&self) -> Board {
        self.render(|_| true)
    }

    fn render(&self, shown: impl Fn(Letter) -> bool) -> Board {
        Board::new(
            self.layout
                .iter()
                .map(|slot| match slot {
                    None => Cell::Gap,
                    Some(letter) if shown(*letter) => Cell::Revealed(*letter),
                    Some(_) => Cell::Hidden,
                })
                .collect(),
        )
    }
}

/// A shuffled pool of phrases, dealt one per round.
///
/// When every phrase has been dealt the pool is reshuffled, so a match
/// with more rounds than phrases repeats them.
#[derive(Debug)]
pub struct PhraseDeck {
    phrases: Vec<Phrase>,
    deck_idx: usize,
}

impl PhraseDeck {
    /// Creates a deck, already shuffled. `phrases` must not be empty.
    pub fn new(phrases: Vec<Phrase>) -> Self {
        let mut deck = Self {
            phrases,
            deck_idx: 0,
        };
        deck.shuffle();
        deck
    }

    pub fn shuffle(&mut self) {
        self.phrases.shuffle(&mut rand::rng());
        self.deck_idx = 0;
    }

    /// Deals the next puzzle, or `None` for an empty deck.
    pub fn deal(&mut self) -> Option<Puzzle> {
        if self.phrases.is_empty() {
            return None;
        }
        if self.deck_idx >= self.phrases.len() {
            self.shuffle();
        }
        let phrase = self.phrases[self.deck_idx].clone();
        self.deck_idx += 1;
        Some(Puzzle::new(phrase))
    }

    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }
}

//! This module defines the core data structures and types used throughout the Turing Machine
//! VM, including symbols, alphabets, transitions, states, and error types.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

use crate::Rule;

/// The symbol denoting an empty tape cell.
pub const BLANK_SYMBOL: char = '_';
/// Matches any trigger character, or leaves the cell untouched when written.
pub const WILDCARD: char = '*';
/// Name of the mandatory state every run begins in.
pub const START_STATE: &str = "S";
/// Halting sentinel: the run stops and accepts.
pub const ACCEPT_STATE: &str = "ha";
/// Halting sentinel: the run stops and rejects.
pub const REJECT_STATE: &str = "hr";
/// Tape length used when the caller does not specify one.
pub const DEFAULT_TAPE_SIZE: usize = 1024;
/// The maximum allowed size for a program source in bytes.
pub const MAX_PROGRAM_SIZE: usize = 65536; // 64KB

/// Returns true for the two reserved target names that end a run.
pub fn is_halting(name: &str) -> bool {
    name == ACCEPT_STATE || name == REJECT_STATE
}

/// A trigger or write cell of a rule: either a literal character or the wildcard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Symbol {
    /// A concrete tape character.
    Literal(char),
    /// `*`: any character when read, "unchanged" when written.
    Any,
}

impl From<char> for Symbol {
    fn from(c: char) -> Self {
        if c == WILDCARD {
            Symbol::Any
        } else {
            Symbol::Literal(c)
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::Literal(c) => write!(f, "{c}"),
            Symbol::Any => write!(f, "{WILDCARD}"),
        }
    }
}

/// The set of characters a machine may read or write.
///
/// The blank symbol is always a member and always comes first; the remaining
/// characters keep the order they were supplied in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alphabet {
    symbols: Vec<char>,
}

impl Alphabet {
    /// Builds an alphabet from the given characters, adding the blank symbol.
    /// Duplicates and the wildcard character are dropped.
    pub fn new(chars: impl IntoIterator<Item = char>) -> Self {
        let mut symbols = vec![BLANK_SYMBOL];
        for c in chars {
            if c != WILDCARD && !symbols.contains(&c) {
                symbols.push(c);
            }
        }

        Self { symbols }
    }

    pub fn contains(&self, c: char) -> bool {
        self.symbols.contains(&c)
    }

    /// Returns true if the symbol may appear in a rule: the wildcard always may.
    pub fn admits(&self, symbol: Symbol) -> bool {
        match symbol {
            Symbol::Literal(c) => self.contains(c),
            Symbol::Any => true,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = char> + '_ {
        self.symbols.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Always false for alphabets built by `new`, which insert the blank.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

impl From<&str> for Alphabet {
    fn from(chars: &str) -> Self {
        Self::new(chars.chars())
    }
}

/// Represents the possible directions the head can move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Move the head one position to the left.
    Left,
    /// Move the head one position to the right.
    Right,
    /// Keep the head in the same position.
    Stay,
}

impl Direction {
    /// Parses a movement token of the rule language (`l`, `r`, `s`).
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "l" => Some(Direction::Left),
            "r" => Some(Direction::Right),
            "s" => Some(Direction::Stay),
            _ => None,
        }
    }

    pub fn token(self) -> &'static str {
        match self {
            Direction::Left => "l",
            Direction::Right => "r",
            Direction::Stay => "s",
        }
    }

    /// Head offset applied by this movement.
    pub fn delta(self) -> isize {
        match self {
            Direction::Left => -1,
            Direction::Right => 1,
            Direction::Stay => 0,
        }
    }

    /// Moves `head` on a tape of `len` cells, or `None` if it would leave the tape.
    pub fn apply(self, head: usize, len: usize) -> Option<usize> {
        head.checked_add_signed(self.delta())
            .filter(|&moved| moved < len)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// The right-hand side of a rule: what happens once a trigger matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    /// The state to continue in, or one of the halting sentinels.
    pub next_state: String,
    /// The symbol to write; `Symbol::Any` leaves the cell unchanged.
    pub write: Symbol,
    /// Where the head goes after writing.
    pub direction: Direction,
    /// 1-based line of the rule in the program source.
    pub line: usize,
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}, {}", self.next_state, self.write, self.direction)
    }
}

/// A named state and its outgoing rules.
///
/// Exact trigger characters live in a map and the wildcard rule sits in its own
/// slot, so dispatch is a map probe followed by a fallback probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    pub name: String,
    transitions: HashMap<char, Transition>,
    wildcard: Option<Transition>,
}

impl State {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transitions: HashMap::new(),
            wildcard: None,
        }
    }

    /// Registers the rule for `trigger`.
    ///
    /// A trigger can only be defined once per state; on conflict nothing changes
    /// and a copy of the rule already present is returned.
    pub fn insert(&mut self, trigger: Symbol, transition: Transition) -> Result<(), Transition> {
        if let Some(existing) = self.get(trigger) {
            return Err(existing.clone());
        }

        match trigger {
            Symbol::Literal(c) => {
                self.transitions.insert(c, transition);
            }
            Symbol::Any => self.wildcard = Some(transition),
        }

        Ok(())
    }

    /// Finds the rule for `c`: the exact trigger first, then the wildcard.
    pub fn lookup(&self, c: char) -> Option<&Transition> {
        self.transitions.get(&c).or(self.wildcard.as_ref())
    }

    /// Returns the rule registered for exactly this trigger, without fallback.
    pub fn get(&self, trigger: Symbol) -> Option<&Transition> {
        match trigger {
            Symbol::Literal(c) => self.transitions.get(&c),
            Symbol::Any => self.wildcard.as_ref(),
        }
    }

    pub fn has_wildcard(&self) -> bool {
        self.wildcard.is_some()
    }

    /// Returns every rule of this state ordered by source line.
    pub fn transitions(&self) -> Vec<(Symbol, &Transition)> {
        let mut rules: Vec<(Symbol, &Transition)> = self
            .transitions
            .iter()
            .map(|(&c, t)| (Symbol::Literal(c), t))
            .chain(self.wildcard.iter().map(|t| (Symbol::Any, t)))
            .collect();
        rules.sort_by_key(|(_, t)| t.line);
        rules
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty() && self.wildcard.is_none()
    }
}

impl fmt::Display for State {
    /// Writes the state back as source, one rule per line.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (trigger, transition) in self.transitions() {
            writeln!(f, "{}, {} -> {}", self.name, trigger, transition)?;
        }
        Ok(())
    }
}

/// The broad class of a [`TuringMachineError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed rule syntax.
    Parse,
    /// A well-formed program that cannot be a sound machine.
    Semantic,
    /// A failure while executing a run.
    Runtime,
    /// A failure reading program sources.
    File,
}

/// Represents various errors that can occur during Turing Machine operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TuringMachineError {
    /// Indicates an error during the parsing of a program's rules.
    #[error("Program parsing error: {0}")]
    ParseError(#[from] Box<pest::error::Error<Rule>>),
    /// Indicates a program that parses but fails static validation.
    #[error("Program validation error{}: {message}", line_suffix(.line))]
    SemanticError {
        line: Option<usize>,
        message: String,
    },
    /// Indicates an attempt to transition to an invalid or undefined state.
    #[error("Invalid state: {0}")]
    InvalidState(String),
    /// Indicates that the current state has no rule for the symbol under the head.
    #[error("No transition in state {state} for '{symbol}'")]
    UndefinedTransition { state: String, symbol: char },
    /// Indicates that the head was moved beyond the tape boundaries.
    #[error("Tape boundary exceeded: state {state} moved {direction} from cell {head}")]
    TapeBoundary {
        state: String,
        head: usize,
        direction: Direction,
    },
    /// Indicates an execution state whose head does not address a tape cell.
    #[error("Head position {head} is outside a tape of {size} cells")]
    HeadOutOfBounds { head: usize, size: usize },
    /// Indicates an initial tape too small to hold its contents.
    #[error("Tape of {size} cells cannot hold {required} cells of initial contents")]
    TapeTooSmall { required: usize, size: usize },
    /// Indicates a run that did not halt within the configured step budget.
    #[error("Step limit of {0} exceeded")]
    StepLimitExceeded(usize),
    /// Indicates an error related to reading program files.
    #[error("File error: {0}")]
    FileError(String),
}

fn line_suffix(line: &Option<usize>) -> String {
    line.map(|line| format!(" @ Ln {line}")).unwrap_or_default()
}

impl TuringMachineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TuringMachineError::ParseError(_) => ErrorKind::Parse,
            TuringMachineError::SemanticError { .. } => ErrorKind::Semantic,
            TuringMachineError::FileError(_) => ErrorKind::File,
            _ => ErrorKind::Runtime,
        }
    }

    /// The 1-based source line the error refers to, if any.
    pub fn line(&self) -> Option<usize> {
        match self {
            TuringMachineError::ParseError(e) => Some(match e.line_col {
                pest::error::LineColLocation::Pos((line, _)) => line,
                pest::error::LineColLocation::Span((line, _), _) => line,
            }),
            TuringMachineError::SemanticError { line, .. } => *line,
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transition(next: &str, write: Symbol, line: usize) -> Transition {
        Transition {
            next_state: next.to_string(),
            write,
            direction: Direction::Right,
            line,
        }
    }

    #[test]
    fn test_direction_serialization() {
        let left_json = serde_json::to_string(&Direction::Left).unwrap();
        assert_eq!(left_json, "\"Left\"");

        let left: Direction = serde_json::from_str(&left_json).unwrap();
        assert_eq!(left, Direction::Left);
    }

    #[test]
    fn test_direction_tokens() {
        assert_eq!(Direction::from_token("l"), Some(Direction::Left));
        assert_eq!(Direction::from_token("r"), Some(Direction::Right));
        assert_eq!(Direction::from_token("s"), Some(Direction::Stay));
        assert_eq!(Direction::from_token("L"), None);
        assert_eq!(Direction::from_token("q"), None);
        assert_eq!(Direction::Left.to_string(), "l");
    }

    #[test]
    fn test_direction_apply_bounds() {
        assert_eq!(Direction::Left.apply(0, 4), None);
        assert_eq!(Direction::Left.apply(2, 4), Some(1));
        assert_eq!(Direction::Right.apply(3, 4), None);
        assert_eq!(Direction::Right.apply(2, 4), Some(3));
        assert_eq!(Direction::Stay.apply(0, 1), Some(0));
    }

    #[test]
    fn test_alphabet_always_contains_blank() {
        let alphabet = Alphabet::new("".chars());
        assert!(alphabet.contains(BLANK_SYMBOL));
        assert_eq!(alphabet.len(), 1);
        assert!(!alphabet.is_empty());

        let alphabet = Alphabet::from("ba_b*");
        assert_eq!(alphabet.iter().collect::<String>(), "_ba");
        assert!(!alphabet.contains(WILDCARD));
        assert!(alphabet.admits(Symbol::Any));
        assert!(!alphabet.admits(Symbol::Literal('c')));
    }

    #[test]
    fn test_state_lookup_prefers_exact_trigger() {
        let mut state = State::new("S");
        state
            .insert(Symbol::Any, transition("A", Symbol::Any, 1))
            .unwrap();
        state
            .insert(Symbol::Literal('a'), transition("B", Symbol::Any, 2))
            .unwrap();

        assert_eq!(state.lookup('a').unwrap().next_state, "B");
        assert_eq!(state.lookup('z').unwrap().next_state, "A");
        assert!(state.has_wildcard());
    }

    #[test]
    fn test_state_lookup_without_wildcard() {
        let mut state = State::new("S");
        state
            .insert(Symbol::Literal('a'), transition("B", Symbol::Any, 1))
            .unwrap();

        assert!(state.lookup('b').is_none());
        assert!(state.get(Symbol::Any).is_none());
    }

    #[test]
    fn test_state_rejects_duplicate_trigger() {
        let mut state = State::new("S");
        state
            .insert(Symbol::Literal('a'), transition("A", Symbol::Any, 1))
            .unwrap();

        let existing = state
            .insert(Symbol::Literal('a'), transition("B", Symbol::Any, 2))
            .unwrap_err();
        assert_eq!(existing.line, 1);
        assert_eq!(state.lookup('a').unwrap().next_state, "A");
    }

    #[test]
    fn test_state_display_orders_by_line() {
        let mut state = State::new("S");
        state
            .insert(Symbol::Any, transition("ha", Symbol::Any, 3))
            .unwrap();
        state
            .insert(Symbol::Literal('a'), transition("S", Symbol::Literal('b'), 1))
            .unwrap();

        assert_eq!(state.to_string(), "S, a -> S, b, r\nS, * -> ha, *, r\n");
    }

    #[test]
    fn test_error_display() {
        let error = TuringMachineError::SemanticError {
            line: Some(3),
            message: "State A does not exist".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Program validation error @ Ln 3: State A does not exist"
        );
        assert_eq!(error.kind(), ErrorKind::Semantic);
        assert_eq!(error.line(), Some(3));

        let error = TuringMachineError::InvalidState("q0".to_string());
        assert!(error.to_string().contains("q0"));
        assert_eq!(error.kind(), ErrorKind::Runtime);
        assert_eq!(error.line(), None);
    }
}

//! This module provides the static checks a parsed program must pass before it can run:
//! every symbol it reads or writes belongs to the alphabet, the start state exists, every
//! reachable state covers the whole alphabet, and every referenced state is defined.

use crate::types::{is_halting, Alphabet, State, Symbol, TuringMachineError, START_STATE};
use std::collections::{HashMap, HashSet};

/// Represents the problems that can be found during the analysis of a program.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum AnalysisError {
    /// A state has a rule triggered by a character outside the alphabet.
    TriggerNotInAlphabet {
        state: String,
        symbol: char,
        line: usize,
    },
    /// A rule writes a character outside the alphabet.
    WriteNotInAlphabet {
        state: String,
        symbol: char,
        line: usize,
    },
    /// No state named `S` was defined.
    MissingStartState,
    /// A reachable state without a wildcard rule misses a letter of the alphabet.
    IncompleteState { state: String, symbol: char },
    /// A rule moves to a state that was never defined.
    UndefinedState { state: String, line: usize },
}

impl From<AnalysisError> for TuringMachineError {
    /// Converts an `AnalysisError` into a `TuringMachineError::SemanticError`.
    fn from(error: AnalysisError) -> Self {
        let (line, message) = match error {
            AnalysisError::TriggerNotInAlphabet {
                state,
                symbol,
                line,
            } => (
                Some(line),
                format!(
                    "State {state} has a transition for letter {symbol} which is not in the alphabet"
                ),
            ),
            AnalysisError::WriteNotInAlphabet {
                state,
                symbol,
                line,
            } => (
                Some(line),
                format!("State {state} writes {symbol} which is not in the alphabet"),
            ),
            AnalysisError::MissingStartState => (
                None,
                format!("Program does not contain a start state '{START_STATE}'"),
            ),
            AnalysisError::IncompleteState { state, symbol } => (
                None,
                format!("State {state} does not have a transition for letter {symbol}"),
            ),
            AnalysisError::UndefinedState { state, line } => {
                (Some(line), format!("State {state} does not exist"))
            }
        };

        TuringMachineError::SemanticError { line, message }
    }
}

/// Validates parsed states against an alphabet and returns the start state.
///
/// The alphabet check runs first and covers every state, reachable or not. The
/// coverage check then walks the states reachable from `S`.
///
/// # Arguments
///
/// * `states` - The states produced by the parser.
/// * `alphabet` - The symbols the machine may read or write.
///
/// # Returns
///
/// * `Ok(&State)` - the state named `S`.
/// * `Err(TuringMachineError::SemanticError)` describing the first problem found.
pub fn validate<'a>(
    states: &'a HashMap<String, State>,
    alphabet: &Alphabet,
) -> Result<&'a State, TuringMachineError> {
    check_alphabet(states, alphabet)?;
    let initial = check_states(states, alphabet)?;

    log::debug!(
        "Validated {} states over alphabet {:?}",
        states.len(),
        alphabet.iter().collect::<String>()
    );

    Ok(initial)
}

/// Checks that no rule triggers on or writes a character outside the alphabet.
///
/// Rules are examined in source order so the reported violation is the one
/// closest to the top of the program.
fn check_alphabet(
    states: &HashMap<String, State>,
    alphabet: &Alphabet,
) -> Result<(), AnalysisError> {
    let mut rules: Vec<_> = states
        .values()
        .flat_map(|state| {
            state
                .transitions()
                .into_iter()
                .map(move |(trigger, transition)| (state, trigger, transition))
        })
        .collect();
    rules.sort_by_key(|(_, _, transition)| transition.line);

    for (state, trigger, transition) in rules {
        if let Symbol::Literal(symbol) = trigger {
            if !alphabet.contains(symbol) {
                return Err(AnalysisError::TriggerNotInAlphabet {
                    state: state.name.clone(),
                    symbol,
                    line: transition.line,
                });
            }
        }

        if let Symbol::Literal(symbol) = transition.write {
            if !alphabet.contains(symbol) {
                return Err(AnalysisError::WriteNotInAlphabet {
                    state: state.name.clone(),
                    symbol,
                    line: transition.line,
                });
            }
        }
    }

    Ok(())
}

/// Walks every state reachable from `S` with an explicit stack, checking
/// that each one covers the alphabet and only moves to defined states.
///
/// Each state is checked exactly once, so cycles terminate.
fn check_states<'a>(
    states: &'a HashMap<String, State>,
    alphabet: &Alphabet,
) -> Result<&'a State, AnalysisError> {
    let initial = states
        .get(START_STATE)
        .ok_or(AnalysisError::MissingStartState)?;

    let mut visited = HashSet::new();
    let mut stack = vec![initial];

    while let Some(state) = stack.pop() {
        if !visited.insert(state.name.as_str()) {
            continue;
        }

        check_coverage(state, alphabet)?;

        // Push in reverse so rules are explored in source order
        for (_, transition) in state.transitions().into_iter().rev() {
            if is_halting(&transition.next_state) {
                continue;
            }

            let next = states.get(&transition.next_state).ok_or_else(|| {
                AnalysisError::UndefinedState {
                    state: transition.next_state.clone(),
                    line: transition.line,
                }
            })?;

            if !visited.contains(next.name.as_str()) {
                stack.push(next);
            }
        }
    }

    Ok(initial)
}

/// Checks that a state without a wildcard rule handles every letter of the alphabet.
fn check_coverage(state: &State, alphabet: &Alphabet) -> Result<(), AnalysisError> {
    if state.has_wildcard() {
        return Ok(());
    }

    match alphabet
        .iter()
        .find(|&symbol| state.get(Symbol::Literal(symbol)).is_none())
    {
        Some(symbol) => Err(AnalysisError::IncompleteState {
            state: state.name.clone(),
            symbol,
        }),
        None => Ok(()),
    }
}

/// Returns the states that can never be entered from `S`, sorted by name.
///
/// Such states are legal but usually point at a typo in a target name.
pub fn unreachable_states(states: &HashMap<String, State>) -> Vec<String> {
    let mut visited = HashSet::new();
    let mut queue = vec![START_STATE];

    while let Some(name) = queue.pop() {
        if !visited.insert(name) {
            continue;
        }

        if let Some(state) = states.get(name) {
            for (_, transition) in state.transitions() {
                if !visited.contains(transition.next_state.as_str()) {
                    queue.push(transition.next_state.as_str());
                }
            }
        }
    }

    let mut unreachable: Vec<String> = states
        .keys()
        .filter(|name| !visited.contains(name.as_str()))
        .cloned()
        .collect();
    unreachable.sort(); // Sort for deterministic output
    unreachable
}

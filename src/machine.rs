//! This module defines the `Machine` struct: a compiled, validated program that executes
//! runs one transition at a time on a bounded tape.

use crate::analyzer::{unreachable_states, validate};
use crate::execution::{ExecutionResult, ExecutionState, RunOptions, Step};
use crate::parser::parse;
use crate::types::{
    is_halting, Alphabet, State, Symbol, TuringMachineError, ACCEPT_STATE, DEFAULT_TAPE_SIZE,
    START_STATE,
};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// A validated single-tape Turing machine.
///
/// A `Machine` is immutable once compiled. Every run owns its own
/// `ExecutionState`, so a machine can be shared freely between threads.
#[derive(Debug, Clone, PartialEq)]
pub struct Machine {
    states: HashMap<String, State>,
    alphabet: Alphabet,
}

impl Machine {
    /// Parses and validates a program.
    ///
    /// # Arguments
    ///
    /// * `source` - The transition table, one rule per line.
    /// * `alphabet` - The characters the machine may read or write. The blank is implied.
    ///
    /// # Returns
    ///
    /// * `Ok(Machine)` if the program parses and passes validation.
    /// * `Err(TuringMachineError::ParseError)` for malformed rules.
    /// * `Err(TuringMachineError::SemanticError)` for programs that fail validation.
    pub fn compile(
        source: &str,
        alphabet: impl IntoIterator<Item = char>,
    ) -> Result<Self, TuringMachineError> {
        let states = parse(source)?;
        let alphabet = Alphabet::new(alphabet);

        validate(&states, &alphabet)?;

        let unreachable = unreachable_states(&states);
        if !unreachable.is_empty() {
            log::warn!("States never reachable from {START_STATE}: {unreachable:?}");
        }

        Ok(Self { states, alphabet })
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    pub fn states(&self) -> &HashMap<String, State> {
        &self.states
    }

    /// Looks up a state by name.
    pub fn state(&self, name: &str) -> Result<&State, TuringMachineError> {
        self.states
            .get(name)
            .ok_or_else(|| TuringMachineError::InvalidState(name.to_string()))
    }

    /// Returns the state every run begins in.
    pub fn initial_state(&self) -> Result<&State, TuringMachineError> {
        self.state(START_STATE)
    }

    /// Creates a fresh execution state; see [`ExecutionState::begin`].
    pub fn begin(
        &self,
        prefix: &str,
        tape_size: usize,
        head: usize,
    ) -> Result<ExecutionState<'_>, TuringMachineError> {
        ExecutionState::begin(self, tape_size, prefix, head)
    }

    /// Runs on an empty tape of the default size. Not guaranteed to terminate!
    pub fn run_empty(&self) -> Result<ExecutionResult, TuringMachineError> {
        self.run("", DEFAULT_TAPE_SIZE)
    }

    /// Runs on a tape of `tape_size` cells holding `tape` after a leading blank,
    /// with the head on cell 0. Not guaranteed to terminate!
    pub fn run(&self, tape: &str, tape_size: usize) -> Result<ExecutionResult, TuringMachineError> {
        self.run_from(self.begin(tape, tape_size, 0)?)
    }

    /// Runs from the given execution state until the machine halts.
    pub fn run_from<'m>(
        &'m self,
        exec: ExecutionState<'m>,
    ) -> Result<ExecutionResult, TuringMachineError> {
        self.run_with(exec, &RunOptions::default())
    }

    /// Runs from the given execution state with explicit options.
    ///
    /// Without a step limit this does not return for machines that loop.
    pub fn run_with<'m>(
        &'m self,
        mut exec: ExecutionState<'m>,
        options: &RunOptions,
    ) -> Result<ExecutionResult, TuringMachineError> {
        loop {
            if let Some(limit) = options.step_limit {
                if exec.steps() >= limit {
                    return Err(TuringMachineError::StepLimitExceeded(limit));
                }
            }

            if let Step::Halt(result) = self.step_with(&mut exec, options)? {
                return Ok(result);
            }
        }
    }

    /// Executes a single transition.
    ///
    /// # Returns
    ///
    /// * `Ok(Step::Continue)` if the machine moved to another real state.
    /// * `Ok(Step::Halt(_))` if the transition targeted `ha` or `hr`.
    /// * `Err(_)` if no rule matches or the head leaves the tape.
    pub fn step<'m>(&'m self, exec: &mut ExecutionState<'m>) -> Result<Step, TuringMachineError> {
        self.step_with(exec, &RunOptions::default())
    }

    /// Executes a single transition with explicit options.
    pub fn step_with<'m>(
        &'m self,
        exec: &mut ExecutionState<'m>,
        options: &RunOptions,
    ) -> Result<Step, TuringMachineError> {
        let symbol = exec.symbol()?;
        let state = exec.state();

        let transition = state
            .lookup(symbol)
            .ok_or_else(|| TuringMachineError::UndefinedTransition {
                state: state.name.clone(),
                symbol,
            })?;

        if options.trace {
            log::info!(
                target: "tmvm::trace",
                "{}\n{}. {}, {} -> {}",
                exec.render(),
                transition.line,
                state.name,
                symbol,
                transition
            );
        }

        // Wildcard writes leave the cell untouched
        if let Symbol::Literal(write) = transition.write {
            exec.write(write);
        }

        let head = transition
            .direction
            .apply(exec.head(), exec.tape().len())
            .ok_or_else(|| TuringMachineError::TapeBoundary {
                state: state.name.clone(),
                head: exec.head(),
                direction: transition.direction,
            })?;

        exec.move_head(head);
        exec.count_step();

        if is_halting(&transition.next_state) {
            return Ok(Step::Halt(
                exec.finish(transition.next_state == ACCEPT_STATE),
            ));
        }

        exec.transition(self.state(&transition.next_state)?);

        Ok(Step::Continue)
    }

    /// Returns the names of states that can never be entered from `S`.
    pub fn unreachable_states(&self) -> Vec<String> {
        unreachable_states(&self.states)
    }
}

impl fmt::Display for Machine {
    /// Dumps every state reachable from `S` as program source, depth-first.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut visited = HashSet::new();
        let mut stack = vec![START_STATE];

        while let Some(name) = stack.pop() {
            if !visited.insert(name) {
                continue;
            }

            let Some(state) = self.states.get(name) else {
                continue;
            };

            write!(f, "{state}")?;

            for (_, transition) in state.transitions().into_iter().rev() {
                let next = transition.next_state.as_str();
                if !is_halting(next) && !visited.contains(next) {
                    stack.push(next);
                }
            }
        }

        Ok(())
    }
}

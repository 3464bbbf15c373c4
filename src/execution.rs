//! This module defines the runtime side of a machine: the mutable `ExecutionState` of a
//! single run, the per-run `RunOptions`, and the `ExecutionResult` a halting run produces.

use crate::machine::Machine;
use crate::tape::{create_tape, render};
use crate::types::{State, TuringMachineError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Settings threaded through a single run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Log one line per step to the `tmvm::trace` target.
    pub trace: bool,
    /// Abort with `StepLimitExceeded` after this many steps without halting.
    /// `None` runs until the machine halts, possibly forever.
    pub step_limit: Option<usize>,
}

impl RunOptions {
    pub fn traced() -> Self {
        Self {
            trace: true,
            ..Self::default()
        }
    }

    pub fn with_step_limit(self, limit: usize) -> Self {
        Self {
            step_limit: Some(limit),
            ..self
        }
    }
}

/// The tape, head, and current state of one run.
///
/// The current state is borrowed from the machine, so one compiled `Machine`
/// can drive any number of independent runs.
#[derive(Debug, Clone)]
pub struct ExecutionState<'m> {
    tape: Vec<char>,
    head: usize,
    state: &'m State,
    steps: usize,
}

impl<'m> ExecutionState<'m> {
    /// Creates an execution state from its parts.
    ///
    /// No checks are made here: a head outside the tape is reported by the
    /// first step as `HeadOutOfBounds`.
    pub fn new(tape: Vec<char>, head: usize, state: &'m State) -> Self {
        Self {
            tape,
            head,
            state,
            steps: 0,
        }
    }

    /// Creates the state a run begins in: a fresh tape of `tape_size` cells holding
    /// `prefix` after a leading blank, the head at `head`, and the machine's `S` state.
    pub fn begin(
        machine: &'m Machine,
        tape_size: usize,
        prefix: &str,
        head: usize,
    ) -> Result<Self, TuringMachineError> {
        let tape = create_tape(prefix, tape_size)?;
        Ok(Self::new(tape, head, machine.initial_state()?))
    }

    pub fn tape(&self) -> &[char] {
        &self.tape
    }

    pub fn head(&self) -> usize {
        self.head
    }

    pub fn state(&self) -> &'m State {
        self.state
    }

    /// Returns the number of steps executed so far.
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Renders the tape with a caret under the head.
    pub fn render(&self) -> String {
        render(&self.tape, self.head)
    }

    pub(crate) fn symbol(&self) -> Result<char, TuringMachineError> {
        self.tape
            .get(self.head)
            .copied()
            .ok_or(TuringMachineError::HeadOutOfBounds {
                head: self.head,
                size: self.tape.len(),
            })
    }

    pub(crate) fn write(&mut self, symbol: char) {
        if let Some(cell) = self.tape.get_mut(self.head) {
            *cell = symbol;
        }
    }

    pub(crate) fn move_head(&mut self, head: usize) {
        self.head = head;
    }

    pub(crate) fn transition(&mut self, state: &'m State) {
        self.state = state;
    }

    pub(crate) fn count_step(&mut self) {
        self.steps += 1;
    }

    pub(crate) fn finish(&self, accepted: bool) -> ExecutionResult {
        ExecutionResult {
            tape: self.tape.clone(),
            head: self.head,
            accepted,
            steps: self.steps,
        }
    }
}

/// Represents the outcome of a single step.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// The machine moved to a real state and can keep going.
    Continue,
    /// The machine reached a halting sentinel.
    Halt(ExecutionResult),
}

/// The final tape and verdict of a halted run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub tape: Vec<char>,
    pub head: usize,
    pub accepted: bool,
    pub steps: usize,
}

impl ExecutionResult {
    /// Returns every tape cell, blanks included.
    pub fn dump_tape(&self) -> String {
        self.tape.iter().collect()
    }

    /// Returns the rendered tape followed by `Accepted` or `Rejected`.
    pub fn describe(&self) -> String {
        format!(
            "{}\n{}",
            render(&self.tape, self.head),
            if self.accepted { "Accepted" } else { "Rejected" }
        )
    }
}

impl fmt::Display for ExecutionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(tape: &str, head: usize, accepted: bool) -> ExecutionResult {
        ExecutionResult {
            tape: tape.chars().collect(),
            head,
            accepted,
            steps: 1,
        }
    }

    #[test]
    fn test_dump_tape_keeps_blanks() {
        assert_eq!(result("_ab___", 0, true).dump_tape(), "_ab___");
    }

    #[test]
    fn test_describe() {
        assert_eq!(result("_ab___", 2, true).describe(), "_ab\n  ^ [2]\nAccepted");
        assert_eq!(result("______", 1, false).to_string(), "__\n ^ [1]\nRejected");
    }

    #[test]
    fn test_result_serialization() {
        let json = serde_json::to_value(result("_a", 1, true)).unwrap();
        assert_eq!(json["tape"], serde_json::json!(["_", "a"]));
        assert_eq!(json["accepted"], serde_json::json!(true));
    }

    #[test]
    fn test_head_out_of_bounds() {
        let state = State::new("S");
        let exec = ExecutionState::new(vec!['_'; 2], 5, &state);

        assert_eq!(
            exec.symbol(),
            Err(TuringMachineError::HeadOutOfBounds { head: 5, size: 2 })
        );
    }

    #[test]
    fn test_run_options() {
        let options = RunOptions::traced().with_step_limit(10);
        assert!(options.trace);
        assert_eq!(options.step_limit, Some(10));
        assert_eq!(RunOptions::default().step_limit, None);
    }
}

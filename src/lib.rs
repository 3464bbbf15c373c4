//! This crate provides the core logic for a single-tape Turing Machine VM.
//! It includes modules for parsing transition-table programs, validating them against an
//! alphabet, and executing them step by step on a bounded tape.

pub mod analyzer;
pub mod execution;
pub mod loader;
pub mod machine;
pub mod parser;
pub mod programs;
pub mod tape;
pub mod types;

/// Re-exports the `Rule` enum from the parser module, used by the `pest` grammar.
pub use crate::parser::Rule;
/// Re-exports the validation entry points and `AnalysisError` from the analyzer module.
pub use analyzer::{unreachable_states, validate, AnalysisError};
/// Re-exports the runtime types from the execution module.
pub use execution::{ExecutionResult, ExecutionState, RunOptions, Step};
/// Re-exports the `ProgramLoader` struct from the loader module.
pub use loader::ProgramLoader;
/// Re-exports the `Machine` struct from the machine module.
pub use machine::Machine;
/// Re-exports the `parse` function from the parser module.
pub use parser::parse;
/// Re-exports `ProgramInfo`, `ProgramManager`, and `PROGRAMS` from the programs module.
pub use programs::{ProgramInfo, ProgramManager, PROGRAMS};
/// Re-exports the definition and error types from the types module.
pub use types::{
    Alphabet, Direction, ErrorKind, State, Symbol, Transition, TuringMachineError, ACCEPT_STATE,
    BLANK_SYMBOL, DEFAULT_TAPE_SIZE, MAX_PROGRAM_SIZE, REJECT_STATE, START_STATE, WILDCARD,
};

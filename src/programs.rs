//! Built-in sample programs, compiled on first use.

use crate::machine::Machine;
use crate::types::TuringMachineError;

/// Source, alphabet, and description of each embedded program.
const PROGRAM_SOURCES: [(&str, &str, &str, &str); 4] = [
    (
        "even-length",
        "a",
        "Accepts inputs of even length",
        include_str!("../programs/even-length.tm"),
    ),
    (
        "insert-blanks",
        "ab",
        "Inserts a blank between every character of the input",
        include_str!("../programs/insert-blanks.tm"),
    ),
    (
        "binary-increment",
        "01",
        "Adds one to a binary number",
        include_str!("../programs/binary-increment.tm"),
    ),
    (
        "instant-accept",
        "",
        "Accepts any input without moving",
        include_str!("../programs/instant-accept.tm"),
    ),
];

/// A compiled built-in program.
#[derive(Debug, Clone)]
pub struct ProgramInfo {
    pub name: &'static str,
    pub alphabet: &'static str,
    pub description: &'static str,
    pub source: &'static str,
    pub machine: Machine,
}

lazy_static::lazy_static! {
    pub static ref PROGRAMS: Vec<ProgramInfo> = PROGRAM_SOURCES
        .iter()
        .filter_map(|&(name, alphabet, description, source)| {
            match Machine::compile(source, alphabet.chars()) {
                Ok(machine) => Some(ProgramInfo {
                    name,
                    alphabet,
                    description,
                    source,
                    machine,
                }),
                Err(e) => {
                    log::error!("Failed to compile built-in program {name}: {e}");
                    None
                }
            }
        })
        .collect();
}

pub struct ProgramManager;

impl ProgramManager {
    /// Get the number of available programs
    pub fn get_program_count() -> usize {
        PROGRAMS.len()
    }

    /// Get a program by its index
    pub fn get_program_by_index(index: usize) -> Result<&'static ProgramInfo, TuringMachineError> {
        PROGRAMS.get(index).ok_or_else(|| {
            TuringMachineError::FileError(format!("Program index {} out of range", index))
        })
    }

    /// Get a program by its name
    pub fn get_program_by_name(name: &str) -> Result<&'static ProgramInfo, TuringMachineError> {
        PROGRAMS
            .iter()
            .find(|program| program.name == name)
            .ok_or_else(|| TuringMachineError::FileError(format!("Program '{}' not found", name)))
    }

    /// List the names of all available programs
    pub fn list_program_names() -> Vec<&'static str> {
        PROGRAMS.iter().map(|program| program.name).collect()
    }
}

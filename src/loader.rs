//! This module provides the `ProgramLoader` struct, responsible for reading program sources
//! from files and compiling them into machines.

use crate::machine::Machine;
use crate::types::{TuringMachineError, MAX_PROGRAM_SIZE};
use std::fs;
use std::path::Path;

/// `ProgramLoader` is a utility struct for loading programs from disk.
pub struct ProgramLoader;

impl ProgramLoader {
    /// Reads a program source file, refusing files larger than `MAX_PROGRAM_SIZE`.
    ///
    /// # Returns
    ///
    /// * `Ok(String)` with the file contents.
    /// * `Err(TuringMachineError::FileError)` if the file cannot be read or is too large.
    pub fn read_source(path: &Path) -> Result<String, TuringMachineError> {
        let metadata = fs::metadata(path).map_err(|e| {
            TuringMachineError::FileError(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        if metadata.len() > MAX_PROGRAM_SIZE as u64 {
            return Err(TuringMachineError::FileError(format!(
                "File {} exceeds the maximum program size of {} bytes",
                path.display(),
                MAX_PROGRAM_SIZE
            )));
        }

        fs::read_to_string(path).map_err(|e| {
            TuringMachineError::FileError(format!("Failed to read file {}: {}", path.display(), e))
        })
    }

    /// Loads and compiles a program from the specified file path.
    ///
    /// # Arguments
    ///
    /// * `path` - The program source file.
    /// * `alphabet` - The characters the machine may read or write.
    ///
    /// # Returns
    ///
    /// * `Ok(Machine)` if the file is read and the program compiles.
    /// * `Err(TuringMachineError::FileError)` if the file cannot be read.
    /// * Any parse or semantic error raised while compiling.
    pub fn load_program(path: &Path, alphabet: &str) -> Result<Machine, TuringMachineError> {
        let source = Self::read_source(path)?;
        let machine = Machine::compile(&source, alphabet.chars())?;

        log::debug!(
            "Loaded {} states from {}",
            machine.states().len(),
            path.display()
        );

        Ok(machine)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ErrorKind;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    fn write_file(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_valid_program() {
        let dir = tempdir().unwrap();
        let path = write_file(dir.path(), "even.tm", include_str!("../programs/even-length.tm"));

        let machine = ProgramLoader::load_program(&path, "a").unwrap();
        assert!(machine.run("aa", 16).unwrap().accepted);
    }

    #[test]
    fn test_load_invalid_program() {
        let dir = tempdir().unwrap();
        let path = write_file(dir.path(), "invalid.tm", "This is not a valid program");

        let error = ProgramLoader::load_program(&path, "").unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Parse);
    }

    #[test]
    fn test_load_program_checks_alphabet() {
        let dir = tempdir().unwrap();
        let path = write_file(dir.path(), "writes.tm", "S,* -> ha,a,s");

        let error = ProgramLoader::load_program(&path, "b").unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Semantic);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let error = ProgramLoader::load_program(&dir.path().join("missing.tm"), "").unwrap_err();

        assert_eq!(error.kind(), ErrorKind::File);
        assert!(error.to_string().contains("missing.tm"));
    }

    #[test]
    fn test_load_oversized_file() {
        let dir = tempdir().unwrap();
        let rule = "S,* -> ha,*,s\n";
        let path = write_file(
            dir.path(),
            "huge.tm",
            &rule.repeat(MAX_PROGRAM_SIZE / rule.len() + 1),
        );

        let error = ProgramLoader::read_source(&path).unwrap_err();
        assert!(error.to_string().contains("maximum program size"));
    }
}

//! Fixed-length tapes: building the initial tape and rendering a tape with its head.

use crate::types::{TuringMachineError, BLANK_SYMBOL};
use std::iter;

/// Creates a tape of `size` blank cells with `prefix` written from cell 1.
///
/// Cell 0 is always blank, so the prefix plus one leading blank must fit.
///
/// # Returns
///
/// * `Ok(Vec<char>)` holding exactly `size` cells.
/// * `Err(TuringMachineError::TapeTooSmall)` if the contents do not fit.
pub fn create_tape(prefix: &str, size: usize) -> Result<Vec<char>, TuringMachineError> {
    let mut tape: Vec<char> = iter::once(BLANK_SYMBOL).chain(prefix.chars()).collect();

    if tape.len() > size {
        return Err(TuringMachineError::TapeTooSmall {
            required: tape.len(),
            size,
        });
    }

    tape.resize(size, BLANK_SYMBOL);
    Ok(tape)
}

/// Renders the tape with a caret under the head.
///
/// Trailing blanks are cut after the last written cell, but never before the head:
///
/// ```text
/// _ab_
///    ^ [3]
/// ```
pub fn render(tape: &[char], head: usize) -> String {
    let end = tape
        .iter()
        .rposition(|&c| c != BLANK_SYMBOL)
        .map_or(head, |last| last.max(head));

    let cells: String = tape.iter().take(end + 1).collect();

    format!("{cells}\n{}^ [{head}]", " ".repeat(head))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_empty_tape() {
        let tape = create_tape("", 4).unwrap();
        assert_eq!(tape, vec!['_'; 4]);
    }

    #[test]
    fn test_create_tape_with_prefix() {
        let tape = create_tape("ab", 5).unwrap();
        assert_eq!(tape.iter().collect::<String>(), "_ab__");
    }

    #[test]
    fn test_create_tape_exact_fit() {
        let tape = create_tape("abc", 4).unwrap();
        assert_eq!(tape.iter().collect::<String>(), "_abc");
    }

    #[test]
    fn test_create_tape_too_small() {
        let error = create_tape("abc", 3).unwrap_err();
        assert_eq!(
            error,
            TuringMachineError::TapeTooSmall {
                required: 4,
                size: 3
            }
        );

        assert!(create_tape("", 0).is_err());
    }

    #[test]
    fn test_render_trims_trailing_blanks() {
        let tape = create_tape("ab", 8).unwrap();
        assert_eq!(render(&tape, 1), "_ab\n ^ [1]");
    }

    #[test]
    fn test_render_extends_to_head() {
        let tape = create_tape("a", 8).unwrap();
        assert_eq!(render(&tape, 4), "_a___\n    ^ [4]");
    }

    #[test]
    fn test_render_blank_tape() {
        let tape = create_tape("", 8).unwrap();
        assert_eq!(render(&tape, 0), "_\n^ [0]");
    }
}

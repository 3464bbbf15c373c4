//! This module provides the parser for transition-table programs, utilizing the `pest` crate.
//! The grammar in `grammar.pest` splits the source into rules and fields; the functions here
//! turn each rule into a `Transition` registered on its `State`.

use crate::types::{is_halting, Direction, State, Symbol, Transition, TuringMachineError};
use pest::{
    error::{Error, ErrorVariant},
    iterators::Pair,
    Parser as PestParser, Span,
};
use pest_derive::Parser as PestParser;
use std::collections::HashMap;

/// Derives a `PestParser` for the transition-table grammar defined in `grammar.pest`.
#[derive(PestParser)]
#[grammar = "grammar.pest"]
pub struct TuringMachineParser;

/// Parses program source into a map from state name to `State`.
///
/// Every non-blank line must be a rule of the form
/// `<state>, <trigger> -> <next state>, <write>, <movement>`. States are created
/// on their first mention on the left-hand side of a rule. The alphabet is not
/// consulted here; symbol membership is checked by the analyzer.
///
/// # Arguments
///
/// * `input` - The program source. Line numbers in errors count every physical line.
///
/// # Returns
///
/// * `Ok(HashMap<String, State>)` with one entry per state named on a left-hand side.
/// * `Err(TuringMachineError::ParseError)` for the first malformed rule.
pub fn parse(input: &str) -> Result<HashMap<String, State>, TuringMachineError> {
    let root = TuringMachineParser::parse(Rule::program, input)
        .map_err(|e| TuringMachineError::ParseError(Box::new(e.renamed_rules(rename_rule))))?;

    let mut states = HashMap::new();
    let mut rules = 0;

    for pair in root
        .flat_map(|program| program.into_inner())
        .filter(|pair| pair.as_rule() == Rule::transition)
    {
        parse_transition(pair, &mut states)?;
        rules += 1;
    }

    log::debug!("Parsed {} rules into {} states", rules, states.len());

    Ok(states)
}

/// Parses a single rule and registers it on its source state.
fn parse_transition(
    pair: Pair<Rule>,
    states: &mut HashMap<String, State>,
) -> Result<(), TuringMachineError> {
    let span = pair.as_span();
    let rule = pair.as_str().trim();
    let line = span.start_pos().line_col().0;

    let mut source = Vec::new();
    let mut target = Vec::new();
    let mut target_span = span;

    for part in pair.into_inner() {
        match part.as_rule() {
            Rule::source => source = part.into_inner().collect::<Vec<_>>(),
            Rule::target => {
                target_span = part.as_span();
                target = part.into_inner().collect::<Vec<_>>();
            }
            _ => {} // Skip the arrow
        }
    }

    let [state_name, trigger] = source.as_slice() else {
        return Err(parse_error(
            &format!(
                "Invalid rule format: {rule}. Expected format <state>, <character> -> <next state>, <write>, <movement>"
            ),
            span,
        ));
    };

    let [next_state, write, movement] = target.as_slice() else {
        return Err(parse_error(
            &format!(
                "Invalid transition format: {}. Expected format <next state>, <write>, <movement>",
                target_span.as_str().trim()
            ),
            target_span,
        ));
    };

    let state_span = state_name.as_span();
    let state_name = parse_name(state_name)?;
    if is_halting(&state_name) {
        return Err(parse_error(
            &format!("State name {state_name} is reserved for halting"),
            state_span,
        ));
    }
    let next_state = parse_name(next_state)?;

    let trigger = parse_symbol(trigger).ok_or_else(|| {
        parse_error(
            &format!("Invalid rule format: {rule}. Trigger must be a single character"),
            trigger.as_span(),
        )
    })?;

    let write = parse_symbol(write).ok_or_else(|| {
        parse_error(
            &format!("Invalid transition format: {rule}. Write must be a single character"),
            write.as_span(),
        )
    })?;

    let direction = Direction::from_token(movement.as_str().trim()).ok_or_else(|| {
        parse_error(
            &format!("Invalid transition format: {rule}. Movement must be one of: 'l', 'r', 's'"),
            movement.as_span(),
        )
    })?;

    let transition = Transition {
        next_state,
        write,
        direction,
        line,
    };

    states
        .entry(state_name.clone())
        .or_insert_with(|| State::new(state_name.clone()))
        .insert(trigger, transition)
        .map_err(|existing| {
            parse_error(
                &format!(
                    "Duplicate trigger '{trigger}' for state {state_name} (first defined on line {})",
                    existing.line
                ),
                span,
            )
        })
}

/// Extracts a trimmed, non-empty state name from a field.
fn parse_name(pair: &Pair<Rule>) -> Result<String, TuringMachineError> {
    let name = pair.as_str().trim();
    if name.is_empty() {
        return Err(parse_error("State name cannot be empty", pair.as_span()));
    }

    Ok(name.to_string())
}

/// Parses a field holding exactly one character, or the wildcard.
fn parse_symbol(pair: &Pair<Rule>) -> Option<Symbol> {
    let mut chars = pair.as_str().trim().chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(Symbol::from(c)),
        _ => None,
    }
}

/// Creates a `TuringMachineError::ParseError` from a message and a `Span`.
fn parse_error(msg: &str, span: Span) -> TuringMachineError {
    TuringMachineError::ParseError(Box::new(Error::new_from_span(
        ErrorVariant::CustomError {
            message: msg.to_string(),
        },
        span,
    )))
}

/// Names grammar rules the way they read in the source language.
fn rename_rule(rule: &Rule) -> String {
    match rule {
        Rule::arrow => "`->`".to_string(),
        Rule::field => "a field".to_string(),
        Rule::transition => {
            "a rule <state>, <character> -> <next state>, <write>, <movement>".to_string()
        }
        Rule::EOI => "end of input".to_string(),
        other => format!("{other:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ErrorKind;

    fn parse_err(input: &str) -> TuringMachineError {
        let result = parse(input);
        assert!(result.is_err(), "expected {input:?} to fail");
        result.unwrap_err()
    }

    #[test]
    fn test_parse_simple_program() {
        let states = parse("S,* -> ha,*,s").unwrap();
        assert_eq!(states.len(), 1);

        let transition = states["S"].get(Symbol::Any).unwrap();
        assert_eq!(transition.next_state, "ha");
        assert_eq!(transition.write, Symbol::Any);
        assert_eq!(transition.direction, Direction::Stay);
        assert_eq!(transition.line, 1);
    }

    #[test]
    fn test_parse_groups_rules_by_state() {
        let input = r#"
            S,* -> E,*,r
            E,_ -> ha,*,s
            E,* -> O,*,r
            O,_ -> hr,*,s
            O,* -> E,*,r
        "#;
        let states = parse(input).unwrap();

        assert_eq!(states.len(), 3);
        assert_eq!(states["E"].get(Symbol::Literal('_')).unwrap().next_state, "ha");
        assert_eq!(states["E"].get(Symbol::Any).unwrap().next_state, "O");
        // Line numbers count the leading empty line
        assert_eq!(states["O"].get(Symbol::Literal('_')).unwrap().line, 5);
    }

    #[test]
    fn test_parse_trims_fields() {
        let states = parse("  S ,  a   ->   A ,  b ,  l  ").unwrap();
        let transition = states["S"].get(Symbol::Literal('a')).unwrap();

        assert_eq!(transition.next_state, "A");
        assert_eq!(transition.write, Symbol::Literal('b'));
        assert_eq!(transition.direction, Direction::Left);
    }

    #[test]
    fn test_parse_empty_source() {
        assert!(parse("").unwrap().is_empty());
        assert!(parse("\n   \n\t\n").unwrap().is_empty());
    }

    #[test]
    fn test_parse_crlf_line_endings() {
        let states = parse("S,a -> S,*,r\r\nS,_ -> ha,*,s\r\n").unwrap();
        assert_eq!(states["S"].get(Symbol::Literal('_')).unwrap().line, 2);
    }

    #[test]
    fn test_parse_missing_arrow() {
        let error = parse_err("a");
        assert_eq!(error.kind(), ErrorKind::Parse);
        assert_eq!(error.line(), Some(1));
    }

    #[test]
    fn test_parse_too_many_source_fields() {
        let error = parse_err("S,*,a -> ha,*,s");
        assert!(error.to_string().contains("Invalid rule format"));
        assert_eq!(error.line(), Some(1));
    }

    #[test]
    fn test_parse_too_many_target_fields() {
        let error = parse_err("S,* -> ha,*,s,o");
        assert!(error.to_string().contains("Invalid transition format"));
    }

    #[test]
    fn test_parse_single_field_sides() {
        let error = parse_err("a -> b");
        assert!(error.to_string().contains("Invalid rule format"));
    }

    #[test]
    fn test_parse_second_arrow() {
        let error = parse_err("S,* -> ha,*,s -> hr,*,s");
        assert_eq!(error.kind(), ErrorKind::Parse);
        assert_eq!(error.line(), Some(1));
    }

    #[test]
    fn test_parse_unsupported_movement() {
        let error = parse_err("S,* -> ha,*,q");
        assert!(error
            .to_string()
            .contains("Movement must be one of: 'l', 'r', 's'"));
    }

    #[test]
    fn test_parse_multi_character_trigger() {
        let error = parse_err("S,ab -> ha,*,s");
        assert!(error.to_string().contains("Trigger must be a single character"));
    }

    #[test]
    fn test_parse_multi_character_write() {
        let error = parse_err("S,a -> ha,xy,s");
        assert!(error.to_string().contains("Write must be a single character"));

        let error = parse_err("S,a -> ha,,s");
        assert!(error.to_string().contains("Write must be a single character"));
    }

    #[test]
    fn test_parse_empty_state_name() {
        let error = parse_err(" ,a -> ha,*,s");
        assert!(error.to_string().contains("State name cannot be empty"));
    }

    #[test]
    fn test_parse_rejects_halting_state_rules() {
        let error = parse_err("S,* -> ha,*,s\nha,* -> hr,*,s");
        assert_eq!(error.kind(), ErrorKind::Parse);
        assert_eq!(error.line(), Some(2));
        assert!(error
            .to_string()
            .contains("State name ha is reserved for halting"));

        let error = parse_err("S,* -> hr,*,s\n hr ,a -> S,*,r");
        assert!(error
            .to_string()
            .contains("State name hr is reserved for halting"));
    }

    #[test]
    fn test_parse_error_reports_physical_line() {
        let input = "S,a -> A,*,r\n\n   \nA,* -> ha,*,x\n";
        let error = parse_err(input);
        assert_eq!(error.line(), Some(4));
    }

    #[test]
    fn test_parse_duplicate_trigger() {
        let input = "S,a -> ha,*,s\nS,b -> ha,*,s\nS,a -> hr,*,s";
        let error = parse_err(input);

        assert_eq!(error.line(), Some(3));
        assert!(error
            .to_string()
            .contains("Duplicate trigger 'a' for state S (first defined on line 1)"));
    }

    #[test]
    fn test_parse_duplicate_wildcard() {
        let error = parse_err("S,* -> ha,*,s\nS,* -> hr,*,s");
        assert!(error.to_string().contains("Duplicate trigger '*'"));
    }

    #[test]
    fn test_parse_does_not_check_alphabet() {
        let states = parse("S,z -> Q,y,r").unwrap();
        assert_eq!(states["S"].get(Symbol::Literal('z')).unwrap().next_state, "Q");
        assert!(!states.contains_key("Q"));
    }
}

//! Shell commands: the line tokenizer, the command table, and dispatch.

use crate::session::Session;

/// Runs a command with its already-checked arguments.
///
/// `Ok` holds text to print (possibly empty), `Err` an error message.
pub type Action = fn(&mut Session, &[String]) -> Result<String, String>;

/// A command that can be run in the shell.
pub struct Command {
    pub name: &'static str,
    pub min_args: usize,
    pub max_args: usize,
    pub usage: &'static str,
    pub description: &'static str,
    pub action: Action,
}

impl Command {
    /// Runs the command, or returns its usage line if the arity is wrong.
    pub fn run(&self, session: &mut Session, args: &[String]) -> String {
        if args.len() < self.min_args || args.len() > self.max_args {
            return format!("Usage: {}", self.usage);
        }

        match (self.action)(session, args) {
            Ok(output) => output,
            Err(message) => message,
        }
    }
}

/// Splits a shell line into tokens.
///
/// Whitespace separates tokens and double quotes group text containing
/// whitespace. A closing quote always ends a token, even an empty one.
pub fn parse_line(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut token = String::new();
    let mut quoted = false;

    for c in line.chars() {
        if quoted {
            if c == '"' {
                quoted = false;
                tokens.push(std::mem::take(&mut token));
            } else {
                token.push(c);
            }
        } else if c == '"' {
            quoted = true;
        } else if c.is_whitespace() {
            if !token.is_empty() {
                tokens.push(std::mem::take(&mut token));
            }
        } else {
            token.push(c);
        }
    }

    if !token.is_empty() {
        tokens.push(token);
    }

    tokens
}

/// Tokenizes a line and runs the matching command.
///
/// Returns `None` for a blank line, otherwise the text to print.
pub fn dispatch(line: &str, commands: &[Command], session: &mut Session) -> Option<String> {
    let tokens = parse_line(line);
    let (name, args) = tokens.split_first()?;

    Some(match commands.iter().find(|command| command.name == name) {
        Some(command) => command.run(session, args),
        None => format!("Unknown command: {name}"),
    })
}

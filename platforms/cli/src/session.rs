//! Shell state and the commands that act on it.

use crate::command::Command;
use std::path::Path;
use tmvm::{
    ExecutionResult, Machine, ProgramLoader, ProgramManager, RunOptions, DEFAULT_TAPE_SIZE,
};

/// Everything the shell remembers between commands.
#[derive(Debug)]
pub struct Session {
    pub machine: Option<Machine>,
    pub options: RunOptions,
    pub tape_size: usize,
    pub json: bool,
    pub running: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            machine: None,
            options: RunOptions::default(),
            tape_size: DEFAULT_TAPE_SIZE,
            json: false,
            running: true,
        }
    }
}

impl Session {
    pub fn new(tape_size: usize, options: RunOptions, json: bool) -> Self {
        Self {
            tape_size,
            options,
            json,
            ..Self::default()
        }
    }

    fn format_result(&self, result: &ExecutionResult) -> Result<String, String> {
        if self.json {
            serde_json::to_string_pretty(result)
                .map_err(|e| format!("Error encoding result: {e}"))
        } else {
            Ok(result.describe())
        }
    }
}

pub static COMMANDS: &[Command] = &[
    Command {
        name: "load",
        min_args: 2,
        max_args: 2,
        usage: "load <filename> <alphabet>",
        description: "Loads a program to later be run or debugged",
        action: load,
    },
    Command {
        name: "run",
        min_args: 0,
        max_args: 2,
        usage: "run [tape contents] [memory size]",
        description: "Runs the currently loaded program",
        action: run,
    },
    Command {
        name: "debug",
        min_args: 1,
        max_args: 1,
        usage: "debug <on|off>",
        description: "Toggles debug mode",
        action: debug,
    },
    Command {
        name: "dump",
        min_args: 0,
        max_args: 0,
        usage: "dump",
        description: "Outputs the current program to a string",
        action: dump,
    },
    Command {
        name: "examples",
        min_args: 0,
        max_args: 0,
        usage: "examples",
        description: "Lists the built-in programs",
        action: examples,
    },
    Command {
        name: "example",
        min_args: 1,
        max_args: 1,
        usage: "example <name|index>",
        description: "Loads a built-in program",
        action: example,
    },
    Command {
        name: "help",
        min_args: 0,
        max_args: 0,
        usage: "help",
        description: "Displays all the available commands",
        action: help,
    },
    Command {
        name: "exit",
        min_args: 0,
        max_args: 0,
        usage: "exit",
        description: "Exits the REPL",
        action: exit,
    },
];

fn load(session: &mut Session, args: &[String]) -> Result<String, String> {
    let path = Path::new(&args[0]);
    if !path.is_file() {
        return Err(format!(
            "Error in argument `filename` - File not found: {}",
            args[0]
        ));
    }

    let machine = ProgramLoader::load_program(path, &args[1])
        .map_err(|e| format!("Error instantiating Turing Machine: {e}"))?;

    session.machine = Some(machine);
    Ok(String::new())
}

fn run(session: &mut Session, args: &[String]) -> Result<String, String> {
    let machine = session
        .machine
        .as_ref()
        .ok_or_else(|| "No Turing machine loaded".to_string())?;

    let tape = args.first().map(String::as_str).unwrap_or("");
    let tape_size = match args.get(1) {
        Some(arg) => arg
            .parse::<usize>()
            .map_err(|_| format!("Error in argument `memory size` - Not an integer: {arg}"))?,
        None => session.tape_size,
    };

    let result = machine
        .begin(tape, tape_size, 0)
        .and_then(|exec| machine.run_with(exec, &session.options))
        .map_err(|e| format!("Execution error: {e}"))?;

    session.format_result(&result)
}

fn debug(session: &mut Session, args: &[String]) -> Result<String, String> {
    match args[0].as_str() {
        "on" => session.options.trace = true,
        "off" => session.options.trace = false,
        _ => return Err("Usage: debug <on|off>".to_string()),
    }
    Ok(String::new())
}

fn dump(session: &mut Session, _: &[String]) -> Result<String, String> {
    session
        .machine
        .as_ref()
        .map(|machine| machine.to_string().trim_end().to_string())
        .ok_or_else(|| "No program to dump".to_string())
}

fn examples(_: &mut Session, _: &[String]) -> Result<String, String> {
    let listing = (0..ProgramManager::get_program_count())
        .map(|index| {
            ProgramManager::get_program_by_index(index).map(|program| {
                format!(
                    "{index}. {} [{}]\n  {}",
                    program.name, program.alphabet, program.description
                )
            })
        })
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| e.to_string())?;

    Ok(listing.join("\n"))
}

/// Loads a built-in program by name or by its index in `examples`.
fn example(session: &mut Session, args: &[String]) -> Result<String, String> {
    let program = match args[0].parse::<usize>() {
        Ok(index) => ProgramManager::get_program_by_index(index),
        Err(_) => ProgramManager::get_program_by_name(&args[0]),
    }
    .map_err(|e| {
        format!(
            "{e}. Available: {}",
            ProgramManager::list_program_names().join(", ")
        )
    })?;

    session.machine = Some(program.machine.clone());
    Ok(format!(
        "Loaded {} with alphabet \"{}\"",
        program.name, program.alphabet
    ))
}

fn help(_: &mut Session, _: &[String]) -> Result<String, String> {
    Ok(COMMANDS
        .iter()
        .map(|command| format!("{}\n  {}", command.usage, command.description))
        .collect::<Vec<_>>()
        .join("\n"))
}

fn exit(session: &mut Session, _: &[String]) -> Result<String, String> {
    session.running = false;
    Ok(String::new())
}

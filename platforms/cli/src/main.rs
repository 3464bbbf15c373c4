mod command;
mod session;

use atty::Stream;
use clap::Parser;
use command::dispatch;
use session::{Session, COMMANDS};
use std::io::{self, BufRead, Write};
use tmvm::{RunOptions, DEFAULT_TAPE_SIZE};

const TRACE_TARGET: &str = "tmvm::trace";

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    /// Commands to run instead of starting the interactive shell
    #[clap(short = 'c', long = "command")]
    commands: Vec<String>,

    /// Number of tape cells used when `run` is given no memory size
    #[clap(long, env = "TMVM_TAPE_SIZE", default_value_t = DEFAULT_TAPE_SIZE)]
    tape_size: usize,

    /// Print each step of the execution
    #[clap(short = 'd', long)]
    debug: bool,

    /// Print run results as JSON
    #[clap(long)]
    json: bool,

    /// Abort runs that take more than this many steps
    #[clap(long)]
    max_steps: Option<usize>,
}

fn init_logger() {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(format!("warn,{TRACE_TARGET}=info")),
    )
    .format(|buf, record| {
        if record.target() == TRACE_TARGET {
            writeln!(buf, "{}", record.args())
        } else {
            writeln!(buf, "[{}] {}", record.level(), record.args())
        }
    })
    .init();
}

fn execute(line: &str, session: &mut Session) {
    if let Some(output) = dispatch(line, COMMANDS, session) {
        if !output.is_empty() {
            println!("{output}");
        }
    }
}

fn repl(session: &mut Session, input: impl BufRead, interactive: bool) -> io::Result<()> {
    let mut lines = input.lines();

    while session.running {
        if interactive {
            print!(">>> ");
            io::stdout().flush()?;
        }

        let Some(line) = lines.next() else {
            break;
        };
        execute(line?.trim(), session);
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_logger();

    let mut options = RunOptions {
        trace: cli.debug,
        ..RunOptions::default()
    };
    if let Some(limit) = cli.max_steps {
        options = options.with_step_limit(limit);
    }
    let mut session = Session::new(cli.tape_size, options, cli.json);

    println!("Turing Machine VM");

    if !cli.commands.is_empty() {
        for line in &cli.commands {
            println!(">>> {line}");
            execute(line, &mut session);
            if !session.running {
                break;
            }
        }
        return;
    }

    let interactive = atty::is(Stream::Stdin);
    if let Err(e) = repl(&mut session, io::stdin().lock(), interactive) {
        log::error!("Error reading input: {e}");
        std::process::exit(1);
    }
}

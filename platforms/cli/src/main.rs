use clap::Parser;
use serde::Serialize;
use std::error::Error;
use std::io::{self, Read};
use std::path::Path;
use tmsim::{
    Configuration, Outcome, Program, ProgramLoader, ProgramManager, Run, Snapshot, State, Step,
    Summary, Tape, DEFAULT_MAX_STEPS,
};
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
#[clap(after_help = "EXAMPLES:
  tmsim-cli programs/even-as.tm
  tmsim-cli --name eraser --input aabaa# --trace
  cat programs/park-head.tm | tmsim-cli --json")]
struct Cli {
    /// The machine definition file (.tm) to execute.
    /// Can also pipe the definition via stdin.
    program: Option<String>,

    /// Run an embedded program by name instead of a file
    #[clap(short, long, conflicts_with = "program")]
    name: Option<String>,

    /// Input tapes to run instead of the runs listed in the program
    #[clap(short, long)]
    input: Vec<String>,

    /// Starting head position for --input tapes
    #[clap(long, default_value_t = 0, allow_negative_numbers = true)]
    head: isize,

    /// Print the machine configuration before running
    #[clap(short, long)]
    config: bool,

    /// Print the state, tape and head after every step
    #[clap(short, long)]
    trace: bool,

    /// Give up on a run once it has made this many moves without halting (0 means no limit)
    #[clap(long, default_value_t = DEFAULT_MAX_STEPS)]
    max_steps: usize,

    /// Print results as JSON
    #[clap(long)]
    json: bool,

    /// List the embedded programs and exit
    #[clap(short, long)]
    list: bool,

    /// Increase log verbosity (-v info, -vv debug); RUST_LOG overrides it
    #[clap(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// The result of running one input.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum RunResult {
    /// The machine halted on its own.
    Halted { outcome: Outcome },
    /// The step budget ran out first; the machine is presumed to hang.
    StepLimit {
        state: State,
        tape: Tape,
        head: isize,
        steps: usize,
    },
}

#[derive(Debug, Serialize)]
struct RunReport {
    input: Tape,
    head: isize,
    #[serde(flatten)]
    result: RunResult,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    if cli.list {
        for (index, name) in ProgramManager::list_program_names().iter().enumerate() {
            println!("{index}: {name}");
        }
        return Ok(());
    }

    let program = load_program(&cli)?;
    info!(program = %program.name, "loaded program");

    let runs = if cli.input.is_empty() {
        program.runs.clone()
    } else {
        cli.input
            .iter()
            .map(|input| {
                Ok(Run {
                    tape: input.parse()?,
                    head: cli.head,
                })
            })
            .collect::<Result<Vec<_>, tmsim::TuringMachineError>>()?
    };

    if cli.config && !cli.json {
        println!("{}", Configuration(&program.machine));
    }

    let mut reports = Vec::new();
    for run in &runs {
        if !cli.json {
            println!("\n[EXECUTING TM INPUT: {} ]", run.tape);
        }

        let result = execute(&program, run, cli.max_steps, |snapshot| {
            if cli.trace && !cli.json {
                println!("{snapshot}");
            }
        });

        if !cli.json {
            print_result(&result);
        }

        reports.push(RunReport {
            input: run.tape.clone(),
            head: run.head,
            result,
        });
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    }

    Ok(())
}

/// Installs a stderr subscriber whose default level follows the verbosity flags.
fn init_logging(verbosity: u8) {
    let filter = EnvFilter::builder()
        .with_default_directive(level_from_verbosity(verbosity).into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn level_from_verbosity(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        _ => LevelFilter::DEBUG,
    }
}

/// Loads the program named on the command line, from a file, from stdin, or by name.
fn load_program(cli: &Cli) -> Result<Program, Box<dyn Error>> {
    if let Some(name) = &cli.name {
        return Ok(ProgramManager::get_program_by_name(name)?);
    }

    if let Some(path) = &cli.program {
        return Ok(ProgramLoader::load_program(Path::new(path))?);
    }

    if atty::isnt(atty::Stream::Stdin) {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        return Ok(ProgramLoader::load_program_from_string(&buffer)?);
    }

    Err("no program given: pass a .tm file, --name, or pipe a definition via stdin".into())
}

/// Runs one input, calling `on_step` with a snapshot after every move.
///
/// The run is abandoned once it has made `max_steps` moves; zero means no limit.
fn execute(
    program: &Program,
    run: &Run,
    max_steps: usize,
    mut on_step: impl FnMut(Snapshot),
) -> RunResult {
    let machine = &program.machine;
    let mut execution = machine.start(run.tape.clone(), run.head);

    loop {
        // A run on its budget is still stepped if the next step halts without moving.
        if max_steps != 0
            && execution.step_count() >= max_steps
            && machine.moves_next(&execution)
        {
            break;
        }

        match machine.step(&mut execution) {
            Step::Continue => on_step(Snapshot(&execution)),
            Step::Halt(_) => break,
        }
    }

    match execution.into_outcome() {
        Ok(outcome) => RunResult::Halted { outcome },
        Err(execution) => RunResult::StepLimit {
            state: execution.state(),
            tape: execution.tape().clone(),
            head: execution.head(),
            steps: execution.step_count(),
        },
    }
}

fn print_result(result: &RunResult) {
    match result {
        RunResult::Halted { outcome } => println!("{}", Summary(outcome)),
        RunResult::StepLimit {
            state,
            tape,
            head,
            steps,
        } => println!(
            "[HANG >> No halt after {steps} steps] State: {state}, Tape: {tape}, Head Position: {head}"
        ),
    }
}

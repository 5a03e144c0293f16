//! This crate provides the core logic for a single-tape Turing machine interpreter.
//! It includes the transition table and execution engine, a parser and loader for machine
//! definition files, a static analyzer, human-readable reports, and a set of embedded
//! demo programs.

pub mod analyzer;
pub mod loader;
pub mod machine;
pub mod parser;
pub mod programs;
pub mod report;
pub mod table;
pub mod types;

/// Re-exports the `Rule` enum from the parser module, used by the `pest` grammar.
pub use crate::parser::Rule;
/// Re-exports the analysis entry points and the `AnalysisError` enum.
pub use analyzer::{analyze, validate, AnalysisError};
/// Re-exports the `ProgramLoader` struct from the loader module.
pub use loader::ProgramLoader;
/// Re-exports the machine and its per-run execution state.
pub use machine::{Execution, TuringMachine};
/// Re-exports the `parse` function from the parser module.
pub use parser::parse;
/// Re-exports `ProgramInfo`, `ProgramManager`, and `PROGRAMS` from the programs module.
pub use programs::{ProgramInfo, ProgramManager, PROGRAMS};
/// Re-exports the report views.
pub use report::{Configuration, Snapshot, Summary};
/// Re-exports the `TransitionTable` struct from the table module.
pub use table::TransitionTable;
/// Re-exports the value types used to define and run machines.
pub use types::{
    Action, Halt, Mode, Outcome, Program, Run, State, Step, Symbol, Tape, Transition,
    TuringMachineError, DEFAULT_MAX_STEPS, MAX_PROGRAM_SIZE,
};

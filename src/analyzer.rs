//! This module provides functions for analyzing programs to detect common mistakes before
//! execution: start or target states outside the declared range, symbols missing from the
//! alphabet, inputs that start off the tape, and rules that can never fire.
//!
//! The engine itself is permissive about all of these. Findings only become errors for
//! programs loaded in strict mode.

use crate::types::{Action, Mode, Program, State, Symbol, TuringMachineError};
use std::collections::{BTreeSet, VecDeque};
use thiserror::Error;
use tracing::warn;

/// Represents the problems that can be found during the analysis of a program.
#[derive(Debug, PartialEq, Eq, Clone, Error)]
pub enum AnalysisError {
    /// The start state is not below the number of states.
    #[error("Invalid start state: {state} (machine has {num_states} states)")]
    InvalidStartState { state: State, num_states: usize },
    /// Rules mention states that are not below the number of states.
    #[error("States out of range: {}", join(.0))]
    StatesOutOfRange(Vec<State>),
    /// Rules read or write symbols that are not in the declared alphabet.
    #[error("Symbols not in the alphabet: {}", join(.0))]
    UndeclaredSymbols(Vec<Symbol>),
    /// An input tape contains symbols that are not in the declared alphabet.
    #[error("Run {run} contains symbols not in the alphabet: {}", join(.symbols))]
    InvalidTapeSymbols { run: usize, symbols: Vec<Symbol> },
    /// An input starts with the head off the tape.
    #[error("Run {run} starts at head {head}, outside a tape of length {len}")]
    InvalidHead { run: usize, head: isize, len: usize },
    /// States that have rules but can never be entered from the start state.
    #[error("Unreachable states detected: {}", join(.0))]
    UnreachableStates(Vec<State>),
}

impl From<AnalysisError> for TuringMachineError {
    /// Converts an `AnalysisError` into a `TuringMachineError::ValidationError`.
    fn from(error: AnalysisError) -> Self {
        TuringMachineError::ValidationError(error.to_string())
    }
}

fn join<T: std::fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(|item| item.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Analyzes a `Program` and returns every finding, in check order.
pub fn analyze(program: &Program) -> Vec<AnalysisError> {
    [
        check_start_state,
        check_state_range,
        check_rule_symbols,
        check_unreachable_states,
    ]
    .iter()
    .filter_map(|check| check(program).err())
    .chain(check_runs(program))
    .collect()
}

/// Validates a program according to its mode.
///
/// In strict mode the first finding is returned as an error. In normal mode every finding
/// is logged as a warning and the program is accepted.
pub fn validate(program: &Program) -> Result<(), TuringMachineError> {
    let findings = analyze(program);

    if program.mode == Mode::Strict {
        if let Some(first) = findings.into_iter().next() {
            return Err(first.into());
        }
        return Ok(());
    }

    for finding in &findings {
        warn!(program = %program.name, "{}", finding);
    }

    Ok(())
}

/// Checks that the start state lies in `[0, num_states)`.
fn check_start_state(program: &Program) -> Result<(), AnalysisError> {
    let machine = &program.machine;

    if machine.start_state().index() >= machine.num_states() {
        return Err(AnalysisError::InvalidStartState {
            state: machine.start_state(),
            num_states: machine.num_states(),
        });
    }

    Ok(())
}

/// Checks that every source and target state of the rules lies in `[0, num_states)`.
fn check_state_range(program: &Program) -> Result<(), AnalysisError> {
    let num_states = program.machine.num_states();
    let out_of_range: BTreeSet<State> = program
        .machine
        .transitions()
        .iter()
        .flat_map(|(state, _, transition)| [state, transition.next_state])
        .filter(|state| state.index() >= num_states)
        .collect();

    if !out_of_range.is_empty() {
        return Err(AnalysisError::StatesOutOfRange(
            out_of_range.into_iter().collect(),
        ));
    }

    Ok(())
}

/// Checks that the rules only read and write declared symbols.
fn check_rule_symbols(program: &Program) -> Result<(), AnalysisError> {
    let alphabet = program.machine.alphabet();
    let undeclared: BTreeSet<Symbol> = program
        .machine
        .transitions()
        .iter()
        .flat_map(|(_, symbol, transition)| [symbol, transition.write])
        .filter(|symbol| !alphabet.contains(symbol))
        .collect();

    if !undeclared.is_empty() {
        return Err(AnalysisError::UndeclaredSymbols(
            undeclared.into_iter().collect(),
        ));
    }

    Ok(())
}

/// Checks every listed input: declared symbols only, and a head that starts on the tape.
fn check_runs(program: &Program) -> Vec<AnalysisError> {
    let alphabet = program.machine.alphabet();
    let mut findings = Vec::new();

    for (index, run) in program.runs.iter().enumerate() {
        let symbols: BTreeSet<Symbol> = run
            .tape
            .iter()
            .filter(|symbol| !alphabet.contains(symbol))
            .collect();

        if !symbols.is_empty() {
            findings.push(AnalysisError::InvalidTapeSymbols {
                run: index,
                symbols: symbols.into_iter().collect(),
            });
        }

        if run.tape.index(run.head).is_none() {
            findings.push(AnalysisError::InvalidHead {
                run: index,
                head: run.head,
                len: run.tape.len(),
            });
        }
    }

    findings
}

/// Checks that every state with rules can be entered from the start state.
///
/// A state is entered only through a moving rule; accepting and rejecting rules stop the
/// machine before their target state is reached.
fn check_unreachable_states(program: &Program) -> Result<(), AnalysisError> {
    let table = program.machine.transitions();
    let start = program.machine.start_state();

    let mut reachable = BTreeSet::from([start]);
    let mut queue = VecDeque::from([start]);

    while let Some(state) = queue.pop_front() {
        for (_, transition) in table.rules_from(state) {
            if matches!(transition.action, Action::Accept | Action::Reject) {
                continue;
            }
            if reachable.insert(transition.next_state) {
                queue.push_back(transition.next_state);
            }
        }
    }

    let unreachable: BTreeSet<State> = table
        .iter()
        .map(|(state, _, _)| state)
        .filter(|state| !reachable.contains(state))
        .collect();

    if !unreachable.is_empty() {
        return Err(AnalysisError::UnreachableStates(
            unreachable.into_iter().collect(),
        ));
    }

    Ok(())
}

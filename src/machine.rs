//! This module defines the `TuringMachine` struct and its execution engine. A machine owns a
//! transition table, a start state and a declared alphabet; each run of the machine works on
//! its own `Execution`, so one machine can serve any number of independent runs.

use crate::table::TransitionTable;
use crate::types::{Action, Halt, Outcome, State, Step, Symbol, Tape, Transition};
use std::collections::BTreeSet;
use tracing::{debug, trace};

/// A single-tape, deterministic Turing machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TuringMachine {
    num_states: usize,
    start_state: State,
    alphabet: BTreeSet<Symbol>,
    table: TransitionTable,
}

impl TuringMachine {
    /// Creates a machine with `num_states` states that starts in `start_state`.
    ///
    /// Neither value is validated here; see [`crate::analyzer`] for consistency checks.
    pub fn new(num_states: usize, start_state: State) -> Self {
        Self {
            num_states,
            start_state,
            alphabet: BTreeSet::new(),
            table: TransitionTable::new(),
        }
    }

    /// Adds a symbol to the declared alphabet. Adding a symbol twice is a no-op.
    pub fn add_symbol(&mut self, symbol: Symbol) {
        self.alphabet.insert(symbol);
    }

    /// Defines the rule for `(state, symbol)`, replacing any earlier rule for the same pair.
    pub fn define_transition(
        &mut self,
        state: State,
        symbol: Symbol,
        next_state: State,
        write: Symbol,
        action: Action,
    ) -> Option<Transition> {
        self.table.define(state, symbol, next_state, write, action)
    }

    pub fn num_states(&self) -> usize {
        self.num_states
    }

    pub fn start_state(&self) -> State {
        self.start_state
    }

    /// Returns the declared alphabet in sorted order.
    pub fn alphabet(&self) -> &BTreeSet<Symbol> {
        &self.alphabet
    }

    pub fn transitions(&self) -> &TransitionTable {
        &self.table
    }

    /// Runs the machine on `tape` from `head` until it halts.
    ///
    /// The tape is the run's private copy. There is no step limit: a table that loops
    /// forever without leaving the tape makes this call never return. Use [`Self::start`]
    /// with [`Self::run_bounded`] to cap the number of steps.
    pub fn run(&self, tape: Tape, head: isize) -> Outcome {
        let mut execution = self.start(tape, head);
        loop {
            if let Step::Halt(halt) = self.step(&mut execution) {
                return execution.finish(halt);
            }
        }
    }

    /// Prepares a run of this machine without taking any step.
    pub fn start(&self, tape: Tape, head: isize) -> Execution {
        Execution {
            state: self.start_state,
            tape,
            head,
            steps: 0,
            halt: None,
        }
    }

    /// Executes a single step of `execution`.
    ///
    /// The head is bounds-checked before the tape is read, including on the very first
    /// step. An accepting or rejecting rule writes its symbol but neither moves the head
    /// nor changes the state. Stepping a halted execution returns the same halt again.
    pub fn step(&self, execution: &mut Execution) -> Step {
        if let Some(halt) = &execution.halt {
            return Step::Halt(halt.clone());
        }

        let Some(index) = execution.tape.index(execution.head) else {
            return execution.stop(Halt::OutOfBounds {
                position: execution.head,
            });
        };

        let symbol = execution.tape.symbols()[index];
        let Some(transition) = self.table.lookup(execution.state, symbol).copied() else {
            return execution.stop(Halt::Undefined {
                state: execution.state,
                symbol,
            });
        };

        execution.tape.write(index, transition.write);

        let next_head = match transition.action {
            Action::MoveRight => execution.head + 1,
            Action::MoveLeft => execution.head - 1,
            Action::Accept => return execution.stop(Halt::Accepted),
            Action::Reject => return execution.stop(Halt::Rejected),
        };

        execution.state = transition.next_state;
        execution.steps += 1;

        trace!(
            state = %execution.state,
            head = next_head,
            tape = %execution.tape,
            steps = execution.steps,
            "step"
        );

        if execution.tape.index(next_head).is_none() {
            // Reported head stays on the last cell that was on the tape.
            return execution.stop(Halt::OutOfBounds {
                position: next_head,
            });
        }

        execution.head = next_head;
        Step::Continue
    }

    /// Steps `execution` until it halts or `max_steps` more moves have been made.
    ///
    /// Only moves count against the budget. A run that has used it up is still stepped
    /// once more if that step would halt without moving, so a machine that halts right on
    /// the budget reports its halt. Returns `Step::Continue` when the budget runs out first.
    pub fn run_bounded(&self, execution: &mut Execution, max_steps: usize) -> Step {
        let limit = execution.steps.saturating_add(max_steps);

        loop {
            if execution.steps >= limit && self.moves_next(execution) {
                return Step::Continue;
            }

            if let Step::Halt(halt) = self.step(execution) {
                return Step::Halt(halt);
            }
        }
    }

    /// Returns true if the next step of `execution` would move the head.
    ///
    /// A halted run, a head off the tape, a missing rule and an accepting or rejecting
    /// rule all halt on the next step without moving.
    pub fn moves_next(&self, execution: &Execution) -> bool {
        if execution.is_halted() {
            return false;
        }

        execution
            .symbol()
            .and_then(|symbol| self.table.lookup(execution.state, symbol))
            .is_some_and(|transition| !transition.action.is_halting())
    }
}

/// The in-flight state of one run: current state, the run's tape, the head and a step counter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Execution {
    state: State,
    tape: Tape,
    head: isize,
    steps: usize,
    halt: Option<Halt>,
}

impl Execution {
    fn stop(&mut self, halt: Halt) -> Step {
        debug!(
            state = %self.state,
            head = self.head,
            steps = self.steps,
            "halted: {}",
            halt
        );
        self.halt = Some(halt.clone());
        Step::Halt(halt)
    }

    /// Returns the current state of the run.
    pub fn state(&self) -> State {
        self.state
    }

    pub fn tape(&self) -> &Tape {
        &self.tape
    }

    pub fn head(&self) -> isize {
        self.head
    }

    /// Returns the total number of moves made so far.
    pub fn step_count(&self) -> usize {
        self.steps
    }

    /// Returns the symbol under the head, or `None` if the head is off the tape.
    pub fn symbol(&self) -> Option<Symbol> {
        self.tape.get(self.head)
    }

    pub fn halt(&self) -> Option<&Halt> {
        self.halt.as_ref()
    }

    pub fn is_halted(&self) -> bool {
        self.halt.is_some()
    }

    /// Converts the execution into its outcome, handing it back unchanged if it is still running.
    pub fn into_outcome(mut self) -> Result<Outcome, Execution> {
        match self.halt.take() {
            Some(halt) => Ok(self.finish(halt)),
            None => Err(self),
        }
    }

    fn finish(self, halt: Halt) -> Outcome {
        Outcome {
            halt,
            state: self.state,
            tape: self.tape,
            head: self.head,
            steps: self.steps,
        }
    }
}

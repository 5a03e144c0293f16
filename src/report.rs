//! Human-readable views of machines and runs: the configuration dump and the per-step trace.
//!
//! These are plain `Display` wrappers so front-ends can print, log or render them as they like.

use crate::machine::{Execution, TuringMachine};
use crate::types::Outcome;
use std::fmt;

const RULE: &str = "-------------------------------------------------";

/// Displays a machine's states, start state, alphabet and transition function.
pub struct Configuration<'a>(pub &'a TuringMachine);

impl fmt::Display for Configuration<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let machine = self.0;

        writeln!(f, "{RULE}")?;
        writeln!(f, "Turing Machine Configuration")?;
        writeln!(f, "{RULE}")?;
        writeln!(f, "Number of States: {}", machine.num_states())?;

        write!(f, "The States:")?;
        for i in 0..machine.num_states() {
            write!(f, " q{i}")?;
        }
        writeln!(f)?;

        writeln!(f, "Start State: {}", machine.start_state())?;

        write!(f, "Alphabet:")?;
        for symbol in machine.alphabet() {
            write!(f, " {symbol}")?;
        }
        writeln!(f)?;

        writeln!(f, "Transition Function:")?;
        for (state, symbol, transition) in machine.transitions().iter() {
            writeln!(f, "({state} , {symbol}) , {transition}")?;
        }

        write!(f, "{RULE}")
    }
}

/// Displays the current state, tape and head of a run.
pub struct Snapshot<'a>(pub &'a Execution);

impl fmt::Display for Snapshot<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let execution = self.0;

        write!(
            f,
            "Current State: {}, Tape: {}, Head Position: {}",
            execution.state(),
            execution.tape(),
            execution.head()
        )
    }
}

/// Displays the final classification of a run together with where it stopped.
pub struct Summary<'a>(pub &'a Outcome);

impl fmt::Display for Summary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let outcome = self.0;

        write!(
            f,
            "[{}] State: {}, Tape: {}, Head Position: {}, Steps: {}",
            outcome.halt, outcome.state, outcome.tape, outcome.head, outcome.steps
        )
    }
}

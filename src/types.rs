//! This module defines the core data structures and types used throughout the Turing Machine
//! interpreter, including symbols, states, actions, tapes, execution results, and error types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::machine::TuringMachine;
use crate::Rule;

/// The maximum allowed size for a definition file in bytes.
pub const MAX_PROGRAM_SIZE: usize = 65536; // 64KB
/// Step budget used by the front-ends when the caller does not pick one.
///
/// The engine itself never stops a run on its own.
pub const DEFAULT_MAX_STEPS: usize = 10000;

/// A single tape character.
///
/// Whitespace and control characters are not valid symbols: they cannot be written
/// unambiguously on a tape or inside a definition file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "char", into = "char")]
pub struct Symbol(char);

impl Symbol {
    /// Creates a symbol, rejecting whitespace and control characters.
    pub fn new(c: char) -> Result<Self, TuringMachineError> {
        if c.is_whitespace() || c.is_control() {
            return Err(TuringMachineError::InvalidSymbol(c));
        }

        Ok(Self(c))
    }

    pub fn as_char(self) -> char {
        self.0
    }
}

impl TryFrom<char> for Symbol {
    type Error = TuringMachineError;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        Symbol::new(c)
    }
}

impl From<Symbol> for char {
    fn from(symbol: Symbol) -> Self {
        symbol.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A machine state, identified by a non-negative integer and displayed as `q<n>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct State(pub usize);

impl State {
    pub fn index(self) -> usize {
        self.0
    }
}

impl From<usize> for State {
    fn from(index: usize) -> Self {
        State(index)
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q{}", self.0)
    }
}

/// What the machine does after writing its symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Move the head one cell to the right.
    MoveRight,
    /// Move the head one cell to the left.
    MoveLeft,
    /// Halt and accept the input.
    Accept,
    /// Halt and reject the input.
    Reject,
}

impl Action {
    /// Returns the one-letter code used in definition files and reports.
    pub fn code(self) -> char {
        match self {
            Action::MoveRight => 'R',
            Action::MoveLeft => 'L',
            Action::Accept => 'Y',
            Action::Reject => 'N',
        }
    }

    /// Returns `true` for the two actions that stop the machine.
    pub fn is_halting(self) -> bool {
        matches!(self, Action::Accept | Action::Reject)
    }
}

impl TryFrom<char> for Action {
    type Error = TuringMachineError;

    fn try_from(code: char) -> Result<Self, Self::Error> {
        match code {
            'R' => Ok(Action::MoveRight),
            'L' => Ok(Action::MoveLeft),
            'Y' => Ok(Action::Accept),
            'N' => Ok(Action::Reject),
            other => Err(TuringMachineError::InvalidAction(other)),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// The result of applying one rule: where to go, what to write and what to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    /// The state the machine enters after a move.
    pub next_state: State,
    /// The symbol written under the head.
    pub write: Symbol,
    /// The action taken after writing.
    pub action: Action,
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} , {} , {})", self.next_state, self.write, self.action)
    }
}

/// A finite, pre-sized tape. Runs write into it but never grow or shrink it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Tape(Vec<Symbol>);

impl Tape {
    pub fn new(symbols: Vec<Symbol>) -> Self {
        Self(symbols)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Converts a signed head position into an index, if it lies on the tape.
    pub fn index(&self, head: isize) -> Option<usize> {
        usize::try_from(head).ok().filter(|&i| i < self.0.len())
    }

    /// Returns the symbol under a signed head position, or `None` off the tape.
    pub fn get(&self, head: isize) -> Option<Symbol> {
        self.index(head).map(|i| self.0[i])
    }

    pub(crate) fn write(&mut self, index: usize, symbol: Symbol) {
        self.0[index] = symbol;
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.0.iter().copied()
    }
}

impl FromStr for Tape {
    type Err = TuringMachineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.chars()
            .map(Symbol::new)
            .collect::<Result<Vec<_>, _>>()
            .map(Tape)
    }
}

impl TryFrom<String> for Tape {
    type Error = TuringMachineError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Tape> for String {
    fn from(tape: Tape) -> Self {
        tape.to_string()
    }
}

impl fmt::Display for Tape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.iter().try_for_each(|symbol| write!(f, "{}", symbol))
    }
}

/// Why a run stopped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Halt {
    /// A rule with the accept action fired.
    Accepted,
    /// A rule with the reject action fired.
    Rejected,
    /// No rule exists for the current state and symbol.
    Undefined { state: State, symbol: Symbol },
    /// The head left the tape; `position` is where it tried to go.
    OutOfBounds { position: isize },
}

impl fmt::Display for Halt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Halt::Accepted => write!(f, "Input accepted."),
            Halt::Rejected => write!(f, "Input rejected."),
            Halt::Undefined { state, symbol } => {
                write!(f, "No transition defined for ({} , {})", state, symbol)
            }
            Halt::OutOfBounds { position } => {
                write!(f, "HANG >> Head moved out of tape bounds (position {})", position)
            }
        }
    }
}

/// Represents the outcome of a single execution step.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// The machine moved and can keep going.
    Continue,
    /// The machine has halted.
    Halt(Halt),
}

/// The terminal result of one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub halt: Halt,
    /// The state the machine was in when it halted. For `OutOfBounds` after a move this is
    /// the state the move entered, paired with `head` on the last cell before the move.
    pub state: State,
    pub tape: Tape,
    /// The last head position on the tape. For a run that never touched the tape this
    /// is the starting position.
    pub head: isize,
    /// The number of moves made. The halting rule itself is not counted.
    pub steps: usize,
}

impl Outcome {
    pub fn is_accepted(&self) -> bool {
        self.halt == Halt::Accepted
    }

    pub fn is_rejected(&self) -> bool {
        self.halt == Halt::Rejected
    }
}

/// How strictly a definition file is checked when it is loaded.
///
/// - `Normal` (default): analyzer findings are logged and the machine runs anyway.
/// - `Strict`: any analyzer finding makes loading fail.
#[derive(Debug, Default, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Normal,
    Strict,
}

/// One input listed in a definition file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Run {
    pub tape: Tape,
    pub head: isize,
}

/// A named machine together with the inputs it ships with.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    /// The name of the program.
    pub name: String,
    /// How findings of the analyzer are treated.
    pub mode: Mode,
    /// The machine itself.
    pub machine: TuringMachine,
    /// Inputs to run the machine on, in file order.
    pub runs: Vec<Run>,
}

/// Represents various errors that can occur while building, loading or validating machines.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TuringMachineError {
    /// A character that cannot be used as a tape symbol.
    #[error("Invalid symbol: {0:?}")]
    InvalidSymbol(char),
    /// An action code other than R, L, Y or N.
    #[error("Invalid action: {0:?} (expected R, L, Y or N)")]
    InvalidAction(char),
    /// Indicates an error during the parsing of a definition file.
    #[error("Program parsing error: {0}")]
    ParseError(#[from] Box<pest::error::Error<Rule>>),
    /// Indicates an error during the validation of a program's structure or logic.
    #[error("Program validation error: {0}")]
    ValidationError(String),
    /// Indicates an error related to file system operations.
    #[error("File error: {0}")]
    FileError(String),
}

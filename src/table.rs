//! The transition table: the rule set of a single-tape machine.

use crate::types::{Action, State, Symbol, Transition};
use std::collections::BTreeMap;

/// Maps `(state, symbol)` pairs to the transition that fires on them.
///
/// Entries are kept ordered by state, then symbol, which is the order reports list them in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransitionTable {
    entries: BTreeMap<(State, Symbol), Transition>,
}

impl TransitionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defines the rule for `(state, symbol)`.
    ///
    /// Defining the same pair again replaces the earlier rule. Returns the replaced rule, if any.
    pub fn define(
        &mut self,
        state: State,
        symbol: Symbol,
        next_state: State,
        write: Symbol,
        action: Action,
    ) -> Option<Transition> {
        self.entries.insert(
            (state, symbol),
            Transition {
                next_state,
                write,
                action,
            },
        )
    }

    /// Returns the rule for `(state, symbol)`, or `None` if the machine has no move there.
    pub fn lookup(&self, state: State, symbol: Symbol) -> Option<&Transition> {
        self.entries.get(&(state, symbol))
    }

    /// Iterates over all rules in `(state, symbol)` order.
    pub fn iter(&self) -> impl Iterator<Item = (State, Symbol, &Transition)> + '_ {
        self.entries
            .iter()
            .map(|(&(state, symbol), transition)| (state, symbol, transition))
    }

    /// Returns the rules whose source state is `state`.
    pub fn rules_from(&self, state: State) -> impl Iterator<Item = (Symbol, &Transition)> + '_ {
        self.iter()
            .filter(move |(source, _, _)| *source == state)
            .map(|(_, symbol, transition)| (symbol, transition))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

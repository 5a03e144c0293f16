//! Property-based tests for the execution engine.
//!
//! These tests use proptest to check that the halting rules hold across
//! many randomly generated machines, tapes and head positions.

use proptest::prelude::*;
use tmsim::{Action, Execution, Halt, State, Step, Symbol, Tape, TuringMachine};

const SYMBOLS: [char; 3] = ['a', 'b', '#'];
const BUDGET: usize = 500;

fn arbitrary_action() -> impl Strategy<Value = Action> {
    prop_oneof![
        3 => Just(Action::MoveRight),
        3 => Just(Action::MoveLeft),
        1 => Just(Action::Accept),
        1 => Just(Action::Reject),
    ]
}

prop_compose! {
    fn arbitrary_rule(num_states: usize)(
        next in 0..num_states,
        write in 0..SYMBOLS.len(),
        action in arbitrary_action(),
    ) -> (usize, usize, Action) {
        (next, write, action)
    }
}

prop_compose! {
    fn arbitrary_machine()(num_states in 1..4usize)(
        rules in prop::collection::vec(
            prop::option::weighted(0.85, arbitrary_rule(num_states)),
            num_states * SYMBOLS.len(),
        ),
        num_states in Just(num_states),
    ) -> TuringMachine {
        let mut machine = TuringMachine::new(num_states, State(0));
        for c in SYMBOLS {
            machine.add_symbol(Symbol::new(c).unwrap());
        }

        for (i, rule) in rules.into_iter().enumerate() {
            if let Some((next, write, action)) = rule {
                machine.define_transition(
                    State(i / SYMBOLS.len()),
                    Symbol::new(SYMBOLS[i % SYMBOLS.len()]).unwrap(),
                    State(next),
                    Symbol::new(SYMBOLS[write]).unwrap(),
                    action,
                );
            }
        }

        machine
    }
}

prop_compose! {
    fn arbitrary_tape()(cells in prop::collection::vec(0..SYMBOLS.len(), 0..12)) -> Tape {
        Tape::new(
            cells
                .into_iter()
                .map(|i| Symbol::new(SYMBOLS[i]).unwrap())
                .collect(),
        )
    }
}

/// Steps an execution up to the budget, keeping every intermediate execution.
fn trace(machine: &TuringMachine, tape: Tape, head: isize) -> Vec<Execution> {
    let mut execution = machine.start(tape, head);
    let mut history = vec![execution.clone()];

    for _ in 0..BUDGET {
        let step = machine.step(&mut execution);
        history.push(execution.clone());
        if let Step::Halt(_) = step {
            break;
        }
    }

    history
}

proptest! {
    #[test]
    fn tape_length_is_preserved(
        machine in arbitrary_machine(),
        tape in arbitrary_tape(),
        head in -2..14isize,
    ) {
        let len = tape.len();
        for execution in trace(&machine, tape, head) {
            prop_assert_eq!(execution.tape().len(), len);
        }
    }

    #[test]
    fn runs_are_deterministic(
        machine in arbitrary_machine(),
        tape in arbitrary_tape(),
        head in -2..14isize,
    ) {
        let first = trace(&machine, tape.clone(), head);
        let second = trace(&machine, tape, head);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn halting_step_follows_the_rules(
        machine in arbitrary_machine(),
        tape in arbitrary_tape(),
        head in -2..14isize,
    ) {
        let history = trace(&machine, tape, head);
        let last = &history[history.len() - 1];

        // Every run either halts within the budget or is still going; only the former is checked.
        if let Some(halt) = last.halt() {
            let before = &history[history.len() - 2];

            match halt {
                Halt::Accepted | Halt::Rejected => {
                    let rule = machine
                        .transitions()
                        .lookup(before.state(), before.symbol().unwrap())
                        .unwrap();
                    let index = usize::try_from(before.head()).unwrap();

                    prop_assert_eq!(last.state(), before.state());
                    prop_assert_eq!(last.head(), before.head());
                    prop_assert_eq!(last.step_count(), before.step_count());
                    prop_assert_eq!(last.tape().symbols()[index], rule.write);
                }
                Halt::Undefined { state, symbol } => {
                    prop_assert_eq!(*state, before.state());
                    prop_assert_eq!(Some(*symbol), before.symbol());
                    prop_assert!(machine.transitions().lookup(*state, *symbol).is_none());
                    prop_assert_eq!(last.tape(), before.tape());
                    prop_assert_eq!(last.head(), before.head());
                    prop_assert_eq!(last.step_count(), before.step_count());
                }
                Halt::OutOfBounds { position } => {
                    prop_assert!(last.tape().index(*position).is_none());
                    prop_assert_eq!(last.head(), before.head());

                    if before.symbol().is_some() {
                        // The head left the tape with the last move.
                        prop_assert_eq!(last.step_count(), before.step_count() + 1);
                        prop_assert!(last.symbol().is_some());
                    } else {
                        // It never was on the tape.
                        prop_assert_eq!(*position, before.head());
                        prop_assert_eq!(last.step_count(), 0);
                    }
                }
            }
        }
    }

    #[test]
    fn run_matches_stepping(
        machine in arbitrary_machine(),
        tape in arbitrary_tape(),
        head in -2..14isize,
    ) {
        let mut execution = machine.start(tape.clone(), head);

        if let Step::Halt(_) = machine.run_bounded(&mut execution, BUDGET) {
            let stepped = execution.into_outcome().unwrap();
            let outcome = machine.run(tape, head);
            prop_assert_eq!(outcome, stepped);
        }
    }

    #[test]
    fn moves_next_predicts_the_step(
        machine in arbitrary_machine(),
        tape in arbitrary_tape(),
        head in -2..14isize,
    ) {
        let history = trace(&machine, tape, head);

        for pair in history.windows(2) {
            let moved = pair[1].step_count() == pair[0].step_count() + 1;
            prop_assert_eq!(machine.moves_next(&pair[0]), moved);
        }
    }
}

//! End-to-end runs of the embedded demo machines on their documented inputs.

use std::thread;
use tmsim::{Halt, Outcome, ProgramManager, State, Symbol, Tape, TuringMachine};

fn machine(name: &str) -> TuringMachine {
    ProgramManager::get_program_by_name(name).unwrap().machine
}

fn run(machine: &TuringMachine, tape: &str, head: isize) -> Outcome {
    machine.run(tape.parse::<Tape>().unwrap(), head)
}

#[test]
fn even_number_of_as() {
    let machine = machine("Even number of a's");

    assert_eq!(run(&machine, "ab#", 0).halt, Halt::Rejected);
    assert_eq!(run(&machine, "aabaa#", 0).halt, Halt::Accepted);
    assert_eq!(run(&machine, "#", 0).halt, Halt::Accepted);
    assert_eq!(run(&machine, "bbbbbb#", 0).halt, Halt::Accepted);
    assert_eq!(run(&machine, "aaabaaaabbbb#", 0).halt, Halt::Rejected);
}

#[test]
fn eraser_parks_on_first_mark() {
    let machine = machine("Eraser");
    let outcome = run(&machine, "aabaa#", 0);

    assert_eq!(outcome.halt, Halt::Accepted);
    assert_eq!(outcome.tape.to_string(), "######");
    assert_eq!(outcome.head, 5);
    assert_eq!(outcome.steps, 5);
    assert_eq!(outcome.state, State(0));
}

#[test]
fn eraser_stops_on_undeclared_symbol() {
    let machine = machine("Eraser");
    let outcome = run(&machine, "abcc#", 0);

    assert_eq!(
        outcome.halt,
        Halt::Undefined {
            state: State(0),
            symbol: Symbol::new('c').unwrap(),
        }
    );
    assert_eq!(outcome.head, 2);
    assert_eq!(outcome.steps, 2);
    assert_eq!(outcome.tape.to_string(), "##cc#");
}

#[test]
fn park_head_after_left_mark() {
    let machine = machine("Park head");

    let outcome = run(&machine, "<ababab#", 4);
    assert_eq!(outcome.halt, Halt::Accepted);
    assert_eq!(outcome.head, 1);
    assert_eq!(outcome.state, State(1));

    let outcome = run(&machine, "aa<ababab#", 6);
    assert_eq!(outcome.halt, Halt::Accepted);
    assert_eq!(outcome.head, 3);
}

#[test]
fn park_head_without_mark_runs_off_the_tape() {
    let machine = machine("Park head");
    let outcome = run(&machine, "bbbbababab#", 8);

    assert_eq!(outcome.halt, Halt::OutOfBounds { position: -1 });
    assert_eq!(outcome.head, 0);
    assert_eq!(outcome.state, State(0));
    assert_eq!(outcome.steps, 9);
    assert_eq!(outcome.tape.to_string(), "bbbbababab#");
}

#[test]
fn declared_runs_match_direct_runs() {
    let program = ProgramManager::get_program_by_name("Even number of a's").unwrap();
    let halts: Vec<Halt> = program
        .runs
        .iter()
        .map(|r| program.machine.run(r.tape.clone(), r.head).halt)
        .collect();

    assert_eq!(
        halts,
        vec![
            Halt::Rejected,
            Halt::Accepted,
            Halt::Accepted,
            Halt::Accepted,
            Halt::Rejected,
        ]
    );
}

#[test]
fn machine_is_shared_across_threads() {
    let machine = machine("Even number of a's");
    let inputs = ["ab#", "aabaa#", "#", "aaabaaaabbbb#"];

    let shared = &machine;
    let outcomes: Vec<Outcome> = thread::scope(|scope| {
        let handles: Vec<_> = inputs
            .iter()
            .map(|&input| scope.spawn(move || run(shared, input, 0)))
            .collect();

        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    for (input, outcome) in inputs.iter().zip(&outcomes) {
        assert_eq!(outcome, &run(&machine, input, 0));
    }
}

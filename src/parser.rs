//! This module provides the parser for machine definition files, utilizing the `pest` crate.
//! It defines the grammar for `.tm` files and functions to parse the input into a `Program`.
//!
//! A definition file looks like this:
//!
//! ```text
//! name: Even number of a's
//! states: 2
//! start: q0
//! alphabet: a, b, #
//! transitions:
//!   (q0, a) -> (q1, a, R)
//!   (q0, b) -> (q0, b, R)
//!   (q0, #) -> (q0, #, Y)
//!   (q1, a) -> (q0, a, R)
//!   (q1, b) -> (q1, b, R)
//!   (q1, #) -> (q1, #, N)
//! runs:
//!   "aabaa#" @ 0
//! ```

use crate::{
    analyzer::validate,
    machine::TuringMachine,
    types::{Action, Mode, Program, Run, State, Symbol, Tape, TuringMachineError},
};
use pest::{
    error::{Error, ErrorVariant},
    iterators::Pair,
    Parser as PestParser, Span,
};
use pest_derive::Parser as PestParser;
use std::collections::HashSet;
use tracing::warn;

/// Derives a `PestParser` for the definition grammar in `grammar.pest`.
#[derive(PestParser)]
#[grammar = "grammar.pest"]
pub struct MachineParser;

/// Parses the given input string into a `Program`.
///
/// This is the main entry point for reading definition files. The parsed program is
/// validated before being returned: in strict mode any analyzer finding is an error,
/// otherwise findings are logged.
///
/// # Returns
///
/// * `Ok(Program)` if the input is successfully parsed and validated.
/// * `Err(TuringMachineError::ParseError)` if there are any syntax errors.
/// * `Err(TuringMachineError::ValidationError)` if the program fails validation.
pub fn parse(input: &str) -> Result<Program, TuringMachineError> {
    let root = MachineParser::parse(Rule::program, input.trim())
        .map_err(|e| TuringMachineError::ParseError(Box::new(e)))?
        .next()
        .ok_or_else(|| TuringMachineError::ValidationError("Empty program".to_string()))?;

    let program = parse_program(root)?;

    validate(&program)?;

    Ok(program)
}

/// Parses the top-level sections of a definition file.
fn parse_program(pair: Pair<Rule>) -> Result<Program, TuringMachineError> {
    let mut name: Option<String> = None;
    let mut mode: Option<Mode> = None;
    let mut num_states: Option<usize> = None;
    let mut start: Option<State> = None;
    let mut alphabet: Option<Vec<Symbol>> = None;
    let mut rules: Option<Vec<ParsedRule>> = None;
    let mut runs: Option<Vec<Run>> = None;
    let mut seen = HashSet::new();

    for p in pair.into_inner() {
        let span = p.as_span();
        let rule = p.as_rule();

        check_unique_rule(rule, span, &mut seen)?;

        match rule {
            Rule::name => name = Some(inner(p)?.as_str().trim().to_string()),
            Rule::mode => mode = Some(parse_mode(inner(p)?)),
            Rule::states => num_states = Some(parse_count(inner(p)?)?),
            Rule::start => start = Some(parse_state(inner(p)?)?),
            Rule::alphabet => {
                alphabet = Some(p.into_inner().map(parse_symbol).collect::<Result<_, _>>()?)
            }
            Rule::transitions => {
                rules = Some(p.into_inner().map(parse_rule).collect::<Result<_, _>>()?)
            }
            Rule::runs => runs = Some(p.into_inner().map(parse_run).collect::<Result<_, _>>()?),
            _ => {} // EOI
        }
    }

    let name = check_required_rule(name, "name")?;
    let num_states = check_required_rule(num_states, "states")?;
    let rules = check_required_rule(rules, "transitions")?;
    let mode = mode.unwrap_or_default();

    let mut machine = TuringMachine::new(num_states, start.unwrap_or(State(0)));

    match alphabet {
        Some(symbols) => symbols.into_iter().for_each(|s| machine.add_symbol(s)),
        // Without a declaration, the alphabet is every symbol the rules read or write.
        None => rules.iter().for_each(|r| {
            machine.add_symbol(r.symbol);
            machine.add_symbol(r.write);
        }),
    }

    for rule in rules {
        let replaced = machine.define_transition(
            rule.state,
            rule.symbol,
            rule.next_state,
            rule.write,
            rule.action,
        );

        if replaced.is_some() {
            if mode == Mode::Strict {
                return Err(parse_error(
                    &format!("Duplicate transition rule: ({}, {})", rule.state, rule.symbol),
                    rule.span,
                ));
            }

            warn!(
                program = %name,
                state = %rule.state,
                symbol = %rule.symbol,
                "transition redefined, keeping the last definition"
            );
        }
    }

    Ok(Program {
        name,
        mode,
        machine,
        runs: runs.unwrap_or_default(),
    })
}

/// Parses `(q0, a) -> (q1, b, R)`.
fn parse_rule(pair: Pair<Rule>) -> Result<ParsedRule, TuringMachineError> {
    let span = pair.as_span();
    let mut pairs = pair.into_inner();

    let state = parse_state(next(&mut pairs, span)?)?;
    let symbol = parse_symbol(next(&mut pairs, span)?)?;
    let next_state = parse_state(next(&mut pairs, span)?)?;
    let write = parse_symbol(next(&mut pairs, span)?)?;
    let action = parse_action(next(&mut pairs, span)?)?;

    Ok(ParsedRule {
        state,
        symbol,
        next_state,
        write,
        action,
        span,
    })
}

/// Parses `"tape" @ head`.
fn parse_run(pair: Pair<Rule>) -> Result<Run, TuringMachineError> {
    let span = pair.as_span();
    let mut pairs = pair.into_inner();

    let tape_pair = inner(next(&mut pairs, span)?)?;
    let tape_span = tape_pair.as_span();
    let tape = tape_pair
        .as_str()
        .parse::<Tape>()
        .map_err(|e| parse_error(&e.to_string(), tape_span))?;

    let position = next(&mut pairs, span)?;
    let head = position
        .as_str()
        .parse::<isize>()
        .map_err(|e| parse_error(&format!("Invalid head position: {e}"), position.as_span()))?;

    Ok(Run { tape, head })
}

/// Parses a state written as `q3` or `3`.
fn parse_state(pair: Pair<Rule>) -> Result<State, TuringMachineError> {
    parse_count(inner(pair)?).map(State)
}

fn parse_count(pair: Pair<Rule>) -> Result<usize, TuringMachineError> {
    pair.as_str()
        .parse::<usize>()
        .map_err(|e| parse_error(&format!("Invalid number: {e}"), pair.as_span()))
}

/// Parses a bare (`a`) or quoted (`'a'`) symbol.
fn parse_symbol(pair: Pair<Rule>) -> Result<Symbol, TuringMachineError> {
    let span = pair.as_span();
    let symbol = inner(pair)?;

    let text = match symbol.as_rule() {
        Rule::quoted_symbol => inner(symbol)?.as_str(),
        _ => symbol.as_str(),
    };

    text.chars()
        .next()
        .ok_or_else(|| parse_error("Empty symbol", span))
        .and_then(|c| Symbol::new(c).map_err(|e| parse_error(&e.to_string(), span)))
}

/// Parses one of the action codes `R`, `L`, `Y` or `N`.
fn parse_action(pair: Pair<Rule>) -> Result<Action, TuringMachineError> {
    let span = pair.as_span();

    pair.as_str()
        .chars()
        .next()
        .ok_or_else(|| parse_error("Missing action", span))
        .and_then(|c| Action::try_from(c).map_err(|e| parse_error(&e.to_string(), span)))
}

fn parse_mode(pair: Pair<Rule>) -> Mode {
    match pair.as_str() {
        "strict" => Mode::Strict,
        _ => Mode::Normal,
    }
}

/// Returns the first inner pair of `pair`.
fn inner(pair: Pair<Rule>) -> Result<Pair<Rule>, TuringMachineError> {
    let span = pair.as_span();
    pair.into_inner()
        .next()
        .ok_or_else(|| parse_error("Unexpected end of rule", span))
}

/// Returns the next pair from an iterator, reporting `span` if there is none.
fn next<'i>(
    pairs: &mut pest::iterators::Pairs<'i, Rule>,
    span: Span<'i>,
) -> Result<Pair<'i, Rule>, TuringMachineError> {
    pairs
        .next()
        .ok_or_else(|| parse_error("Unexpected end of rule", span))
}

/// Creates a `TuringMachineError::ParseError` from a message and a `Span`.
fn parse_error(msg: &str, span: Span) -> TuringMachineError {
    TuringMachineError::ParseError(Box::new(Error::new_from_span(
        ErrorVariant::CustomError {
            message: msg.to_string(),
        },
        span,
    )))
}

/// Checks if a section has already been declared. Every section may appear at most once.
fn check_unique_rule(
    rule: Rule,
    span: Span,
    seen: &mut HashSet<Rule>,
) -> Result<(), TuringMachineError> {
    if rule == Rule::EOI {
        return Ok(());
    }

    if !seen.insert(rule) {
        return Err(parse_error(
            &format!("Duplicate \"{rule:?}:\" declaration"),
            span,
        ));
    }

    Ok(())
}

/// Checks if a required section is present, returning an `Err` if it's missing.
fn check_required_rule<T>(value: Option<T>, name: &str) -> Result<T, TuringMachineError> {
    value.ok_or_else(|| TuringMachineError::ValidationError(format!("Missing '{name}' section")))
}

/// A transition as written in the file, kept with its span for error reporting.
struct ParsedRule<'i> {
    state: State,
    symbol: Symbol,
    next_state: State,
    write: Symbol,
    action: Action,
    span: Span<'i>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Halt;

    const EVEN_AS: &str = r#"
name: Even number of a's
states: 2
start: q0
alphabet: a, b, #
transitions:
  (q0, a) -> (q1, a, R)
  (q0, b) -> (q0, b, R)
  (q0, #) -> (q0, #, Y)
  (q1, a) -> (q0, a, R)
  (q1, b) -> (q1, b, R)
  (q1, #) -> (q1, #, N)
runs:
  "ab#" @ 0
  "aabaa#" @ 0
"#;

    fn sym(c: char) -> Symbol {
        Symbol::new(c).unwrap()
    }

    #[test]
    fn test_parse_simple_program() {
        let program = parse(EVEN_AS).unwrap();

        assert_eq!(program.name, "Even number of a's");
        assert_eq!(program.mode, Mode::Normal);
        assert_eq!(program.machine.num_states(), 2);
        assert_eq!(program.machine.start_state(), State(0));
        assert_eq!(program.machine.alphabet().len(), 3);
        assert_eq!(program.machine.transitions().len(), 6);
        assert_eq!(program.runs.len(), 2);
        assert_eq!(program.runs[1].tape.to_string(), "aabaa#");
        assert_eq!(program.runs[1].head, 0);

        let transition = program
            .machine
            .transitions()
            .lookup(State(1), sym('#'))
            .unwrap();
        assert_eq!(transition.action, Action::Reject);
    }

    #[test]
    fn test_parsed_program_runs() {
        let program = parse(EVEN_AS).unwrap();
        let outcomes: Vec<_> = program
            .runs
            .iter()
            .map(|run| program.machine.run(run.tape.clone(), run.head).halt)
            .collect();

        assert_eq!(outcomes, vec![Halt::Rejected, Halt::Accepted]);
    }

    #[test]
    fn test_parse_with_comments_and_quoted_symbols() {
        let input = r#"
// Rewrites commas to dots, then accepts on '.'
name: Quoted
states: 1
transitions:
  (0, ',') -> (0, '.', R)   // bare numbers work for states too
  (0, '.') -> (0, '.', Y)
"#;
        let program = parse(input).unwrap();

        assert_eq!(program.machine.start_state(), State(0));
        assert!(program.runs.is_empty());

        let outcome = program.machine.run(",,.".parse().unwrap(), 0);
        assert!(outcome.is_accepted());
        assert_eq!(outcome.tape.to_string(), "...");
    }

    #[test]
    fn test_parse_name_drops_trailing_comment() {
        let input = r#"
name: Trailing // not part of the name
states: 1
transitions:
  (q0, a) -> (q0, a, Y)
"#;
        let program = parse(input).unwrap();

        assert_eq!(program.name, "Trailing");
    }

    #[test]
    fn test_parse_infers_alphabet() {
        let input = r#"
name: Inferred
states: 1
transitions:
  (q0, a) -> (q0, x, R)
  (q0, #) -> (q0, #, Y)
"#;
        let program = parse(input).unwrap();
        let alphabet: Vec<char> = program
            .machine
            .alphabet()
            .iter()
            .map(|s| s.as_char())
            .collect();

        assert_eq!(alphabet, vec!['#', 'a', 'x']);
    }

    #[test]
    fn test_parse_negative_head() {
        let input = r#"
name: Negative
states: 1
transitions:
  (q0, a) -> (q0, a, R)
runs:
  "a" @ -1
"#;
        let program = parse(input).unwrap();
        assert_eq!(program.runs[0].head, -1);
    }

    #[test]
    fn test_parse_duplicate_section() {
        let input = r#"
name: First Name
name: Second Name
states: 1
transitions:
  (q0, a) -> (q0, a, Y)
"#;
        let error = parse(input).unwrap_err();

        assert!(matches!(error, TuringMachineError::ParseError(_)));
        assert!(error
            .to_string()
            .contains("Duplicate \"name:\" declaration"));
    }

    #[test]
    fn test_parse_missing_name() {
        let input = r#"
states: 1
transitions:
  (q0, a) -> (q0, a, Y)
"#;
        let error = parse(input).unwrap_err();

        assert_eq!(
            error.to_string(),
            "Program validation error: Missing 'name' section"
        );
    }

    #[test]
    fn test_parse_missing_states() {
        let input = r#"
name: Missing States
transitions:
  (q0, a) -> (q0, a, Y)
"#;
        let error = parse(input).unwrap_err();

        assert_eq!(
            error.to_string(),
            "Program validation error: Missing 'states' section"
        );
    }

    #[test]
    fn test_parse_missing_transitions() {
        let input = r#"
name: Missing Transitions
states: 1
"#;
        let error = parse(input).unwrap_err();

        assert!(matches!(error, TuringMachineError::ValidationError(_)));
        assert_eq!(
            error.to_string(),
            "Program validation error: Missing 'transitions' section"
        );
    }

    #[test]
    fn test_parse_unsupported_action() {
        let input = r#"
name: Bad Action
states: 1
transitions:
  (q0, a) -> (q0, a, S)
"#;
        let error = parse(input).unwrap_err();

        assert!(matches!(error, TuringMachineError::ParseError(_)));
        assert!(error.to_string().contains("Invalid action"));
    }

    #[test]
    fn test_parse_whitespace_symbol_rejected() {
        let input = r#"
name: Blank
states: 1
transitions:
  (q0, ' ') -> (q0, a, Y)
"#;
        let error = parse(input).unwrap_err();

        assert!(matches!(error, TuringMachineError::ParseError(_)));
        assert!(error.to_string().contains("Invalid symbol"));
    }

    #[test]
    fn test_parse_duplicate_transition_last_wins() {
        let input = r#"
name: Redefined
states: 1
transitions:
  (q0, a) -> (q0, a, N)
  (q0, a) -> (q0, a, Y)
"#;
        let program = parse(input).unwrap();

        assert_eq!(program.machine.transitions().len(), 1);
        assert!(program.machine.run("a".parse().unwrap(), 0).is_accepted());
    }

    #[test]
    fn test_parse_duplicate_transition_strict() {
        let input = r#"
name: Redefined
mode: strict
states: 1
transitions:
  (q0, a) -> (q0, a, N)
  (q0, a) -> (q0, a, Y)
"#;
        let error = parse(input).unwrap_err();

        assert!(error.to_string().contains("Duplicate transition rule: (q0, a)"));
    }

    #[test]
    fn test_parse_syntax_error() {
        let input = r#"
name: Broken
states: 1
transitions:
  (q0, a) => (q0, a, Y)
"#;
        assert!(matches!(
            parse(input),
            Err(TuringMachineError::ParseError(_))
        ));
    }
}

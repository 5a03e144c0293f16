use crate::types::{Program, TuringMachineError};
use tracing::error;

// Embedded demo programs
const PROGRAM_TEXTS: [&str; 4] = [
    include_str!("../programs/even-as.tm"),
    include_str!("../programs/eraser.tm"),
    include_str!("../programs/park-head.tm"),
    include_str!("../programs/rewrite-a.tm"),
];

lazy_static::lazy_static! {
    pub static ref PROGRAMS: Vec<(&'static str, Program)> = PROGRAM_TEXTS
        .iter()
        .filter_map(|text| match crate::parser::parse(text) {
            Ok(program) => Some((*text, program)),
            Err(e) => {
                error!("failed to parse embedded program: {}", e);
                None
            }
        })
        .collect();
}

/// Read-only access to the embedded demo programs.
pub struct ProgramManager;

impl ProgramManager {
    /// Get the number of available programs
    pub fn count() -> usize {
        PROGRAMS.len()
    }

    /// Get a program by its index
    pub fn get_program_by_index(index: usize) -> Result<Program, TuringMachineError> {
        PROGRAMS
            .get(index)
            .map(|(_, program)| program.clone())
            .ok_or_else(|| {
                TuringMachineError::ValidationError(format!("Program index {} out of range", index))
            })
    }

    /// Get a program by its name, ignoring case
    pub fn get_program_by_name(name: &str) -> Result<Program, TuringMachineError> {
        PROGRAMS
            .iter()
            .find(|(_, program)| program.name.eq_ignore_ascii_case(name))
            .map(|(_, program)| program.clone())
            .ok_or_else(|| {
                TuringMachineError::ValidationError(format!("Program '{}' not found", name))
            })
    }

    /// List all program names
    pub fn list_program_names() -> Vec<String> {
        PROGRAMS
            .iter()
            .map(|(_, program)| program.name.clone())
            .collect()
    }

    /// Get information about a program by its index
    pub fn get_program_info(index: usize) -> Result<ProgramInfo, TuringMachineError> {
        let program = Self::get_program_by_index(index)?;

        Ok(ProgramInfo {
            index,
            name: program.name.clone(),
            start_state: program.machine.start_state().index(),
            state_count: program.machine.num_states(),
            alphabet: program.machine.alphabet().iter().map(|s| s.as_char()).collect(),
            transition_count: program.machine.transitions().len(),
            run_count: program.runs.len(),
        })
    }

    /// Search for programs by name
    pub fn search_programs(query: &str) -> Vec<usize> {
        let query = query.to_lowercase();

        PROGRAMS
            .iter()
            .enumerate()
            .filter(|(_, (_, program))| program.name.to_lowercase().contains(&query))
            .map(|(index, _)| index)
            .collect()
    }

    /// Get the original text of a program by its index
    pub fn get_program_text_by_index(index: usize) -> Result<&'static str, TuringMachineError> {
        PROGRAMS.get(index).map(|(text, _)| *text).ok_or_else(|| {
            TuringMachineError::ValidationError(format!(
                "Program text index {} out of range",
                index
            ))
        })
    }
}

#[derive(Debug, Clone)]
pub struct ProgramInfo {
    pub index: usize,
    pub name: String,
    pub start_state: usize,
    pub state_count: usize,
    pub alphabet: String,
    pub transition_count: usize,
    pub run_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::analyze;
    use crate::types::Halt;

    #[test]
    fn test_all_programs_parse() {
        assert_eq!(ProgramManager::count(), PROGRAM_TEXTS.len());
    }

    #[test]
    fn test_program_names() {
        let names = ProgramManager::list_program_names();

        assert_eq!(
            names,
            vec!["Even number of a's", "Eraser", "Park head", "Rewrite a's"]
        );
    }

    #[test]
    fn test_programs_can_be_executed() {
        for index in 0..ProgramManager::count() {
            let program = ProgramManager::get_program_by_index(index).unwrap();

            for run in &program.runs {
                let outcome = program.machine.run(run.tape.clone(), run.head);
                assert_eq!(
                    outcome.tape.len(),
                    run.tape.len(),
                    "Program '{}' changed the tape length",
                    program.name
                );
            }
        }
    }

    #[test]
    fn test_embedded_machines_are_consistent() {
        // The eraser ships with an input containing an undeclared symbol on purpose.
        for index in [0, 2, 3] {
            let program = ProgramManager::get_program_by_index(index).unwrap();
            assert!(
                analyze(&program).is_empty(),
                "Program '{}' has findings",
                program.name
            );
        }
    }

    #[test]
    fn test_program_manager_get_program_by_index() {
        assert!(ProgramManager::get_program_by_index(0).is_ok());
        assert!(ProgramManager::get_program_by_index(999).is_err());
    }

    #[test]
    fn test_program_manager_get_program_by_name() {
        let program = ProgramManager::get_program_by_name("eraser").unwrap();
        let outcome = program.machine.run("aabaa#".parse().unwrap(), 0);

        assert_eq!(outcome.halt, Halt::Accepted);
        assert!(ProgramManager::get_program_by_name("Nonexistent").is_err());
    }

    #[test]
    fn test_program_manager_get_program_info() {
        let info = ProgramManager::get_program_info(2).unwrap();

        assert_eq!(info.index, 2);
        assert_eq!(info.name, "Park head");
        assert_eq!(info.start_state, 0);
        assert_eq!(info.state_count, 2);
        assert_eq!(info.alphabet, "#<ab");
        assert_eq!(info.transition_count, 8);
        assert_eq!(info.run_count, 3);

        assert!(ProgramManager::get_program_info(999).is_err());
    }

    #[test]
    fn test_program_manager_search_programs() {
        assert_eq!(ProgramManager::search_programs("a's"), vec![0, 3]);
        assert_eq!(ProgramManager::search_programs("PARK"), vec![2]);
        assert!(ProgramManager::search_programs("nonexistent").is_empty());
    }

    #[test]
    fn test_program_text_matches_program() {
        let text = ProgramManager::get_program_text_by_index(1).unwrap();

        assert!(text.contains("name: Eraser"));
        assert!(ProgramManager::get_program_text_by_index(999).is_err());
    }
}

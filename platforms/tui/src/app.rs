use action::Action;
use keymap::{Config, KeyMapConfig};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Margin, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, BorderType, Borders, Padding, Paragraph, Wrap},
    Frame,
};
use tmsim::{
    Configuration, Execution, Halt, Program, ProgramLoader, ProgramManager, Run, Step, Summary,
    DEFAULT_MAX_STEPS,
};

const BLOCK_PADDING: Padding = Padding::new(1, 1, 0, 0);

pub struct App {
    program: Program,
    current_program_index: usize,
    current_run_index: usize,
    execution: Execution,
    max_steps: usize,
    auto_play: bool,
    message: String,
    show_help: bool,
    show_configuration: bool,
    pub(crate) keymap: Config<Action>,
    // Indicates if the program was loaded from a file/stdin, disabling program switching
    program_loaded_from_source: bool,
    program_content: String,
}

impl App {
    pub fn new_default(max_steps: usize) -> Result<Self, String> {
        let program = ProgramManager::get_program_by_index(0)
            .map_err(|e| format!("Failed to load built-in program: {}", e))?;
        let program_content = ProgramManager::get_program_text_by_index(0)
            .map_err(|e| format!("Failed to load built-in program: {}", e))?
            .to_string();

        Ok(Self::with_program(
            program,
            program_content,
            max_steps,
            false,
            "Press 'h' for help.",
        ))
    }

    pub fn new_from_program_string(
        program_content: String,
        max_steps: usize,
    ) -> Result<Self, String> {
        let program = ProgramLoader::load_program_from_string(&program_content)
            .map_err(|e| format!("Failed to load program: {}", e))?;

        Ok(Self::with_program(
            program,
            program_content,
            max_steps,
            true,
            "Program loaded from source. Press 'h' for help.",
        ))
    }

    fn with_program(
        program: Program,
        program_content: String,
        max_steps: usize,
        program_loaded_from_source: bool,
        message: &str,
    ) -> Self {
        let execution = start_run(&program, 0);

        Self {
            program,
            current_program_index: 0,
            current_run_index: 0,
            execution,
            max_steps,
            auto_play: false,
            message: message.to_string(),
            show_help: false,
            show_configuration: false,
            keymap: Action::keymap_config(),
            program_loaded_from_source,
            program_content,
        }
    }

    pub fn render(&mut self, f: &mut Frame) {
        let inner_area = f.area().inner(Margin::new(1, 0));

        // Program info, middle (source + machine), status
        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5),
                Constraint::Min(0),
                Constraint::Length(3),
            ])
            .split(inner_area);

        self.render_program_info(f, main_chunks[0]);

        let middle_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(50),
                Constraint::Length(1),
                Constraint::Percentage(50),
            ])
            .split(main_chunks[1]);

        if self.show_configuration {
            self.render_configuration(f, middle_chunks[0]);
        } else {
            self.render_source_code(f, middle_chunks[0]);
        }

        let right_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0)])
            .split(middle_chunks[2]);

        self.render_machine_state(f, right_chunks[0]);

        if self.show_help {
            self.render_help(f, right_chunks[1]);
        } else {
            self.render_tape(f, right_chunks[1]);
        }

        self.render_status(f, main_chunks[2]);
    }

    fn render_source_code(&self, f: &mut Frame, area: Rect) {
        let keywords = [
            "name:",
            "mode:",
            "states:",
            "start:",
            "alphabet:",
            "transitions:",
            "runs:",
        ];

        let lines: Vec<Line> = self
            .program_content
            .lines()
            .map(|line| {
                let mut parts = line.split_whitespace();
                match parts.next() {
                    Some(first_word) if keywords.contains(&first_word) => Line::from(vec![
                        Span::styled(first_word, Style::default().fg(Color::Yellow)),
                        Span::raw(" "),
                        Span::raw(parts.collect::<Vec<_>>().join(" ")),
                    ]),
                    Some(first_word) if first_word.starts_with("//") => {
                        Line::from(Span::styled(line, Style::default().fg(Color::DarkGray)))
                    }
                    _ => Line::from(line),
                }
            })
            .collect();

        let paragraph = section("Source Code", lines).wrap(Wrap { trim: false });
        f.render_widget(paragraph, area);
    }

    fn render_configuration(&self, f: &mut Frame, area: Rect) {
        let lines: Vec<Line> = Configuration(&self.program.machine)
            .to_string()
            .lines()
            .map(|line| Line::from(line.to_string()))
            .collect();

        let paragraph = section("Configuration", lines).wrap(Wrap { trim: false });
        f.render_widget(paragraph, area);
    }

    fn render_program_info(&self, f: &mut Frame, area: Rect) {
        let machine = &self.program.machine;
        let run_count = self.program.runs.len();

        let text = vec![
            Line::from(vec![
                Span::styled("Program: ", Style::default().fg(Color::Yellow)),
                Span::raw(if self.program_loaded_from_source {
                    format!("{} (Custom)", self.program.name)
                } else {
                    format!(
                        "{} ({}/{})",
                        self.program.name,
                        self.current_program_index + 1,
                        ProgramManager::count()
                    )
                }),
            ]),
            Line::from(vec![
                Span::styled("Run: ", Style::default().fg(Color::Yellow)),
                Span::raw(match self.program.runs.get(self.current_run_index) {
                    Some(run) => format!(
                        "\"{}\" @ {} ({}/{})",
                        run.tape,
                        run.head,
                        self.current_run_index + 1,
                        run_count
                    ),
                    None => "no runs declared".to_string(),
                }),
            ]),
            Line::from(vec![
                Span::styled("States: ", Style::default().fg(Color::Yellow)),
                Span::raw(machine.num_states().to_string()),
                Span::styled(" | Start: ", Style::default().fg(Color::Yellow)),
                Span::raw(machine.start_state().to_string()),
                Span::styled(" | Rules: ", Style::default().fg(Color::Yellow)),
                Span::raw(machine.transitions().len().to_string()),
            ]),
        ];

        let paragraph = Paragraph::new(text)
            .block(block("tmsim - Turing Machine Simulator (TUI)").title_alignment(Alignment::Center));

        f.render_widget(paragraph, area);
    }

    fn render_tape(&self, f: &mut Frame, area: Rect) {
        let tape = self.execution.tape();
        let head = self.execution.head();
        let head_index = tape.index(head);

        let cells: Vec<Span> = tape
            .iter()
            .enumerate()
            .map(|(i, symbol)| {
                if Some(i) == head_index {
                    Span::styled(
                        format!(" {symbol} "),
                        Style::default()
                            .bg(Color::Yellow)
                            .fg(Color::Black)
                            .add_modifier(Modifier::BOLD),
                    )
                } else {
                    Span::raw(format!(" {symbol} "))
                }
            })
            .collect();

        let head_indicator = match self.execution.symbol() {
            Some(symbol) => format!("Head at position: {} (symbol: '{}')", head, symbol),
            None => format!("Head at position: {} (off the tape)", head),
        };

        let text = vec![
            Line::from(cells),
            Line::from(Span::styled(
                head_indicator,
                Style::default().fg(Color::Cyan),
            )),
        ];

        let paragraph = section("Tape", text).wrap(Wrap { trim: false });
        f.render_widget(paragraph, area);
    }

    fn render_machine_state(&self, f: &mut Frame, area: Rect) {
        let step_count = self.execution.step_count();

        let (status_text, status_color) = match self.execution.halt() {
            Some(Halt::Accepted) => ("ACCEPTED", Color::Green),
            Some(Halt::Rejected) => ("REJECTED", Color::Red),
            Some(Halt::Undefined { .. }) => ("UNDEFINED", Color::Red),
            Some(Halt::OutOfBounds { .. }) => ("OUT OF BOUNDS", Color::Red),
            None if self.at_step_limit() => ("STEP LIMIT", Color::Magenta),
            None if step_count == 0 => ("READY", Color::Blue),
            None => ("RUNNING", Color::Green),
        };

        let detail = match self.execution.halt() {
            Some(halt) => halt.to_string(),
            None => match self.step_limit() {
                Some(limit) => format!("Step limit: {}", limit),
                None => "Step limit: none".to_string(),
            },
        };

        let text = vec![
            Line::from(vec![
                Span::styled("Current State: ", Style::default().fg(Color::Yellow)),
                Span::styled(
                    self.execution.state().to_string(),
                    Style::default()
                        .fg(status_color)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(" | Steps: ", Style::default().fg(Color::Yellow)),
                Span::raw(step_count.to_string()),
                Span::styled(" | Status: ", Style::default().fg(Color::Yellow)),
                Span::styled(status_text, Style::default().fg(status_color)),
            ]),
            Line::from(Span::styled(detail, Style::default().fg(Color::Cyan))),
        ];

        f.render_widget(section("Machine State", text), area);
    }

    fn render_help(&self, f: &mut Frame, area: Rect) {
        let help_text = vec![
            Line::from("Controls:"),
            Line::from("  Space - Step forward"),
            Line::from("  Enter - Run until the machine halts or hits the step limit"),
            Line::from("  r - Reset the current run"),
            Line::from("  n - Next declared run"),
            Line::from("  p - Toggle auto-play"),
            Line::from("  c - Toggle source / configuration"),
            Line::from(if self.program_loaded_from_source {
                "  ← → - Program switching disabled (loaded from file/stdin)"
            } else {
                "  ← → - Switch programs"
            }),
            Line::from("  h - Toggle this help"),
            Line::from("  q - Quit"),
            Line::from(""),
            Line::from("Actions: R moves right, L moves left, Y accepts, N rejects."),
            Line::from("A run halts when it accepts, rejects, finds no rule,"),
            Line::from("or moves the head off either end of the tape."),
        ];

        f.render_widget(section("Help", help_text), area);
    }

    fn render_status(&self, f: &mut Frame, area: Rect) {
        let outer = block("Status");
        let inner = outer.inner(area);
        let hint = "h: help";
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Fill(1), Constraint::Length(hint.len() as u16)])
            .split(inner);

        let auto_play_status = if self.auto_play { "ON" } else { "OFF" };
        let status = Line::from(vec![
            Span::raw("Auto-play: "),
            Span::styled(auto_play_status, Style::default().fg(Color::Yellow)),
            Span::raw(format!(" | {}", self.message)),
        ]);

        let hint = Text::from(
            Line::from(Span::styled(hint, Style::default().fg(Color::Yellow))).right_aligned(),
        );

        f.render_widget(outer, area);
        f.render_widget(status, chunks[0]);
        f.render_widget(hint, chunks[1]);
    }

    pub fn step_machine(&mut self) {
        if self.at_step_limit() {
            self.message = format!("No halt after {} steps. Press 'r' to reset.", self.max_steps);
            self.auto_play = false;
            return;
        }

        match self.program.machine.step(&mut self.execution) {
            Step::Continue => {
                self.message = format!("Step {} completed", self.execution.step_count());
            }
            Step::Halt(_) => self.on_halt(),
        }
    }

    /// Steps the current run until it halts or reaches the step limit.
    ///
    /// Without a limit, each call makes at most `DEFAULT_MAX_STEPS` moves so the
    /// interface stays responsive.
    pub fn finish_run(&mut self) {
        let budget = match self.step_limit() {
            Some(limit) => limit.saturating_sub(self.execution.step_count()),
            None => DEFAULT_MAX_STEPS,
        };

        match self.program.machine.run_bounded(&mut self.execution, budget) {
            Step::Continue => {
                self.message = match self.step_limit() {
                    Some(limit) => format!("No halt after {} steps. Press 'r' to reset.", limit),
                    None => format!(
                        "Still running after {} steps. Press Enter to continue.",
                        self.execution.step_count()
                    ),
                };
                self.auto_play = false;
            }
            Step::Halt(_) => self.on_halt(),
        }
    }

    /// The move budget of a run; zero means no limit.
    fn step_limit(&self) -> Option<usize> {
        (self.max_steps != 0).then_some(self.max_steps)
    }

    /// True when the run has used its budget and its next step would still move.
    fn at_step_limit(&self) -> bool {
        self.step_limit()
            .is_some_and(|limit| self.execution.step_count() >= limit)
            && self.program.machine.moves_next(&self.execution)
    }

    fn on_halt(&mut self) {
        self.message = match self.execution.clone().into_outcome() {
            Ok(outcome) => Summary(&outcome).to_string(),
            Err(_) => "Machine is halted. Press 'r' to reset.".to_string(),
        };
        self.auto_play = false;
    }

    pub fn reset_machine(&mut self) {
        self.execution = start_run(&self.program, self.current_run_index);
        self.message = "Machine reset".to_string();
        self.auto_play = false;
    }

    /// Cycles to the next run declared by the program.
    pub fn next_run(&mut self) {
        let run_count = self.program.runs.len();
        if run_count == 0 {
            self.message = "Program declares no runs.".to_string();
            return;
        }

        self.current_run_index = (self.current_run_index + 1) % run_count;
        self.execution = start_run(&self.program, self.current_run_index);
        self.auto_play = false;
        self.message = format!("Run {}/{}", self.current_run_index + 1, run_count);
    }

    pub fn toggle_auto_play(&mut self) {
        self.auto_play = !self.auto_play;
        self.message = format!(
            "Auto-play {}",
            if self.auto_play {
                "enabled"
            } else {
                "disabled"
            }
        );
    }

    pub fn is_auto_playing(&self) -> bool {
        self.auto_play && !self.execution.is_halted()
    }

    pub fn next_program(&mut self) {
        if self.program_loaded_from_source {
            self.message = "Cannot switch programs when loaded from file/stdin.".to_string();
            return;
        }
        let count = ProgramManager::count();
        if count == 0 {
            return;
        }
        self.load_program_at((self.current_program_index + 1) % count);
    }

    pub fn previous_program(&mut self) {
        if self.program_loaded_from_source {
            self.message = "Cannot switch programs when loaded from file/stdin.".to_string();
            return;
        }
        let count = ProgramManager::count();
        if count == 0 {
            return;
        }
        let index = if self.current_program_index == 0 {
            count - 1
        } else {
            self.current_program_index - 1
        };
        self.load_program_at(index);
    }

    fn load_program_at(&mut self, index: usize) {
        let loaded = ProgramManager::get_program_by_index(index).and_then(|program| {
            ProgramManager::get_program_text_by_index(index).map(|text| (program, text))
        });

        match loaded {
            Ok((program, text)) => {
                self.message = format!("Loaded program: {}", program.name);
                self.execution = start_run(&program, 0);
                self.program = program;
                self.program_content = text.to_string();
                self.current_program_index = index;
                self.current_run_index = 0;
                self.auto_play = false;
            }
            Err(e) => self.message = e.to_string(),
        }
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn toggle_configuration(&mut self) {
        self.show_configuration = !self.show_configuration;
    }
}

/// Starts the program's `index`th declared run, or an empty tape if it declares none.
fn start_run(program: &Program, index: usize) -> Execution {
    let run = program.runs.get(index).cloned().unwrap_or(Run {
        tape: Default::default(),
        head: 0,
    });

    program.machine.start(run.tape, run.head)
}

fn section<'a>(title: &'a str, content: Vec<Line<'a>>) -> Paragraph<'a> {
    Paragraph::new(content).block(block(title))
}

fn block(title: &str) -> Block {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(format!(" {title} "))
        .padding(BLOCK_PADDING)
}

use keymap::KeyMap;

#[derive(KeyMap, Clone, Copy, Debug, PartialEq)]
pub enum Action {
    /// Quit the application
    #[key("q")]
    Quit,
    /// Restart the current input from its starting head
    #[key("r")]
    Reset,
    /// Advance the machine by one step
    #[key("space")]
    Step,
    /// Run the current input until it halts or hits the step limit
    #[key("enter")]
    Finish,
    /// Toggle auto-play
    #[key("p")]
    ToggleAutoPlay,
    /// Toggle the configuration view
    #[key("c")]
    ToggleConfiguration,
    /// Toggle help display
    #[key("h")]
    ToggleHelp,
    /// Switch to the next input of the program
    #[key("n")]
    NextRun,
    /// Load the previous program
    #[key("left")]
    PreviousProgram,
    /// Load the next program
    #[key("right")]
    NextProgram,
}

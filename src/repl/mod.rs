//! REPL (Read-Eval-Print Loop) module for the interactive wizard
//!
//! Ties the rustyline input, the command handler and the display manager
//! to one `WizardController`. The prompt follows the active step.

pub mod commands;
pub mod display;
pub mod input;

use anyhow::Result;
use std::path::PathBuf;

use crate::cli::Config;
use crate::repl::commands::CommandHandler;
pub use crate::repl::display::DisplayManager;
use crate::repl::input::InputHandler;
use crate::wizard::{WizardController, WizardStep};

/// REPL session coordinator
pub struct ReplSession {
    input_handler: InputHandler,
    command_handler: CommandHandler,
    display_manager: DisplayManager,
    controller: WizardController,
}

impl ReplSession {
    /// Create REPL session without persistent history
    pub fn new(config: Config) -> Result<Self> {
        Self::build(InputHandler::new()?, config)
    }

    /// Create REPL session with persistent history
    pub fn with_history(history_path: PathBuf, config: Config) -> Result<Self> {
        Self::build(InputHandler::with_history(history_path)?, config)
    }

    fn build(input_handler: InputHandler, config: Config) -> Result<Self> {
        let display_manager = DisplayManager::new().with_progress(config.display.show_progress_bars);
        let command_handler = CommandHandler::with_config(config);

        Ok(ReplSession {
            input_handler,
            command_handler,
            display_manager,
            controller: WizardController::new(),
        })
    }

    /// Show welcome banner and the first step
    pub fn show_welcome(&self, version: &str) {
        self.display_manager.show_banner(version);
        self.display_manager.show_step(self.controller.step());
        println!(
            "Fill in the report with /set FIELD VALUE, check it with /report, then /submit.\n"
        );
    }

    /// Read a line of input from user
    ///
    /// Returns:
    /// - Ok(Some(input)) for normal input
    /// - Ok(None) for EOF/exit
    /// - Err for interrupt
    pub fn read_input(&mut self) -> Result<Option<String>> {
        self.display_manager.show_prompt()?;
        self.input_handler.read_line()
    }

    /// Handle user input
    ///
    /// Returns true if session should continue, false to exit
    pub fn handle_input(&mut self, input: &str) -> Result<bool> {
        if input.trim().is_empty() {
            return Ok(true);
        }

        let command = self.command_handler.parse(input);
        let keep_going =
            self.command_handler
                .execute(command, &mut self.controller, &self.display_manager)?;

        self.input_handler.set_step(self.controller.step());
        Ok(keep_going)
    }

    /// Run until /exit, Ctrl-D or a readline failure
    pub fn run(&mut self) -> Result<()> {
        loop {
            match self.read_input() {
                Ok(Some(input)) => {
                    if input.is_empty() {
                        continue;
                    }
                    match self.handle_input(&input) {
                        Ok(true) => {}
                        Ok(false) => break,
                        Err(e) => self.display_manager.show_error(&e.to_string()),
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    if e.to_string().contains("Interrupted") {
                        println!("\nUse /exit to quit gracefully");
                        continue;
                    }
                    return Err(e);
                }
            }
        }

        tracing::info!(
            session_id = %self.controller.session_id(),
            step = ?self.controller.step(),
            events = self.controller.telemetry().event_count(),
            "repl session ended"
        );
        self.save()
    }

    pub fn controller(&self) -> &WizardController {
        &self.controller
    }

    pub fn step(&self) -> WizardStep {
        self.controller.step()
    }

    /// Get display manager
    pub fn display(&self) -> &DisplayManager {
        &self.display_manager
    }

    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.command_handler.is_verbose()
    }

    /// Set verbose mode
    pub fn set_verbose(&mut self, enable: bool) {
        self.command_handler.set_verbose(enable);
    }

    /// Save session state
    pub fn save(&mut self) -> Result<()> {
        self.input_handler.save_history()?;
        Ok(())
    }

    /// Current prompt text
    pub fn prompt(&self) -> &str {
        self.input_handler.prompt()
    }
}

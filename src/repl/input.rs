//! Input handler for REPL using rustyline
//!
//! Line editing and persistent history. The prompt names the active
//! wizard step.

use rustyline::history::History;
use anyhow::{Context, Result};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::PathBuf;

use crate::wizard::WizardStep;

/// Input handler managing readline interface and command history
pub struct InputHandler {
    editor: DefaultEditor,
    history_path: Option<PathBuf>,
    prompt: String,
}

/// Prompt text for a wizard step
pub fn step_prompt(step: WizardStep) -> String {
    let tag = match step {
        WizardStep::CollectingReport => "report",
        WizardStep::CollectingMeals => "meals",
        WizardStep::ShowingAnalysis => "analysis",
    };
    format!(">nutricare [{}]: ", tag)
}

impl InputHandler {
    /// Create new input handler
    pub fn new() -> Result<Self> {
        let editor = DefaultEditor::new()?;

        Ok(InputHandler {
            editor,
            history_path: None,
            prompt: step_prompt(WizardStep::CollectingReport),
        })
    }

    /// Create input handler with persistent history
    ///
    /// A missing or unreadable history file starts an empty history.
    pub fn with_history(history_file: PathBuf) -> Result<Self> {
        let mut editor = DefaultEditor::new()?;

        if history_file.exists() {
            if let Err(e) = editor.load_history(&history_file) {
                tracing::warn!(path = %history_file.display(), error = %e, "could not load history");
            }
        }

        Ok(InputHandler {
            editor,
            history_path: Some(history_file),
            prompt: step_prompt(WizardStep::CollectingReport),
        })
    }

    /// Set custom prompt
    pub fn set_prompt(&mut self, prompt: String) {
        self.prompt = prompt;
    }

    /// Point the prompt at a wizard step
    pub fn set_step(&mut self, step: WizardStep) {
        self.prompt = step_prompt(step);
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Read a line of input from user
    ///
    /// Returns:
    /// - Ok(Some(input)) for normal input
    /// - Ok(None) for EOF (Ctrl-D)
    /// - Err on interrupt (Ctrl-C) or other errors
    pub fn read_line(&mut self) -> Result<Option<String>> {
        match self.editor.readline(&self.prompt) {
            Ok(line) => {
                let trimmed = line.trim();

                if trimmed.is_empty() {
                    return Ok(Some(String::new()));
                }

                let _ = self.editor.add_history_entry(trimmed);

                Ok(Some(trimmed.to_string()))
            }
            Err(ReadlineError::Interrupted) => Err(anyhow::anyhow!("Interrupted")),
            Err(ReadlineError::Eof) => Ok(None),
            Err(err) => Err(anyhow::anyhow!("Readline error: {}", err)),
        }
    }

    /// Save history to disk, creating the parent directory
    pub fn save_history(&mut self) -> Result<()> {
        if let Some(ref path) = self.history_path {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            self.editor.save_history(path)?;
        }
        Ok(())
    }

    /// Clear command history
    pub fn clear_history(&mut self) {
        let _ = self.editor.history_mut().clear();
    }

    /// Get history size
    pub fn history_len(&self) -> usize {
        self.editor.history().len()
    }
}

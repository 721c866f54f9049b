//! Command handler for REPL commands
//!
//! Global commands work in every step; the rest belong to one wizard step
//! and are refused by the controller elsewhere. Errors from the wizard are
//! rendered here and never end the session.

use anyhow::Result;
use colored::*;
use std::path::PathBuf;

use crate::cli::Config;
use crate::errors::{Result as WizardResult, WizardError};
use crate::intake::write_export;
use crate::reference::{out_of_range, NutrientRange};
use crate::repl::display::DisplayManager;
use crate::types::MealType;
use crate::wizard::{WizardController, WizardStep};

/// Events listed by a verbose `/status`
const RECENT_ACTIVITY: usize = 5;

/// REPL command types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Status,
    Exit,
    Clear,
    Verbose { enable: bool },
    Foods { query: Option<String> },
    Ranges,
    // Report step
    Set { field: String, value: String },
    Unset { field: String },
    Attach { path: PathBuf },
    /// Zero-based; typed 1-based
    Detach { index: usize },
    Report,
    Submit,
    // Meal step
    Type { meal_type: MealType },
    Time { time: String },
    Add { food: String },
    /// Zero-based; typed 1-based
    Remove { index: usize },
    Meal,
    Commit,
    Meals,
    Analyze { force: bool },
    // Analysis step
    Analysis,
    Export { path: Option<String> },
    /// Plain text; a food search during the meal step
    Search { query: String },
    /// Known command with bad arguments
    Invalid { usage: String },
    Unknown { input: String },
}

/// Command handler for parsing and executing REPL commands
pub struct CommandHandler {
    verbose: bool,
    config: Config,
}

impl CommandHandler {
    /// Create new command handler
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        CommandHandler { verbose: false, config }
    }

    /// Parse input string into a command
    pub fn parse(&self, input: &str) -> Command {
        let trimmed = input.trim();

        let Some(body) = trimmed.strip_prefix('/') else {
            return Command::Search { query: trimmed.to_string() };
        };

        let (name, rest) = match body.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (body, ""),
        };
        if name.is_empty() {
            return Command::Unknown { input: input.to_string() };
        }

        match name.to_lowercase().as_str() {
            "help" | "h" => Command::Help,
            "exit" | "quit" | "q" => Command::Exit,
            "status" => Command::Status,
            "clear" | "cls" => Command::Clear,
            "verbose" => {
                let enable = match rest.to_lowercase().as_str() {
                    "" | "on" | "1" | "true" => true,
                    _ => false,
                };
                Command::Verbose { enable }
            }
            "foods" => Command::Foods { query: non_empty(rest) },
            "ranges" => Command::Ranges,
            "set" => match rest.split_once(char::is_whitespace) {
                Some((field, value)) if !value.trim().is_empty() => Command::Set {
                    field: field.to_string(),
                    value: value.trim().to_string(),
                },
                _ => invalid("/set FIELD VALUE"),
            },
            "unset" => match non_empty(rest) {
                Some(field) => Command::Unset { field },
                None => invalid("/unset FIELD"),
            },
            "attach" => match non_empty(rest) {
                Some(path) => Command::Attach { path: PathBuf::from(path) },
                None => invalid("/attach PATH"),
            },
            "detach" => match parse_position(rest) {
                Some(index) => Command::Detach { index },
                None => invalid("/detach N (1-based)"),
            },
            "report" => Command::Report,
            "submit" | "next" => Command::Submit,
            "type" => match rest.parse::<MealType>() {
                Ok(meal_type) => Command::Type { meal_type },
                Err(_) => invalid("/type breakfast|lunch|dinner|snack"),
            },
            "time" => Command::Time { time: rest.to_string() },
            "add" => match non_empty(rest) {
                Some(food) => Command::Add { food },
                None => invalid("/add FOOD"),
            },
            "remove" | "rm" => match parse_position(rest) {
                Some(index) => Command::Remove { index },
                None => invalid("/remove N (1-based)"),
            },
            "meal" => Command::Meal,
            "commit" => Command::Commit,
            "meals" => Command::Meals,
            "analyze" | "finish" => match rest {
                "" => Command::Analyze { force: false },
                "--force" | "-f" => Command::Analyze { force: true },
                _ => invalid("/analyze [--force]"),
            },
            "analysis" => Command::Analysis,
            "export" => Command::Export { path: non_empty(rest) },
            _ => Command::Unknown { input: input.to_string() },
        }
    }

    /// Execute a command
    ///
    /// Returns true if REPL should continue, false if should exit
    pub fn execute(
        &mut self,
        command: Command,
        controller: &mut WizardController,
        display: &DisplayManager,
    ) -> Result<bool> {
        match command {
            Command::Help => self.show_help(controller.step()),
            Command::Exit => {
                println!("{}", "Goodbye!".green());
                return Ok(false);
            }
            Command::Status => self.show_status(controller, display),
            Command::Clear => display.clear_screen()?,
            Command::Verbose { enable } => {
                self.verbose = enable;
                let status = if enable { "enabled" } else { "disabled" };
                println!("{}", format!("Verbose mode {}", status).cyan());
            }
            Command::Foods { query } => {
                let catalog = controller.catalog();
                let foods = match query {
                    Some(q) => catalog.search(&q),
                    None => catalog.all().iter().collect(),
                };
                display.show_foods(&foods);
            }
            Command::Ranges => display.show_ranges(),

            Command::Set { field, value } => {
                if let Some(field) = report_outcome(display, controller.set_field(&field, &value)) {
                    display.show_success(&format!("{} set", field));
                    if self.verbose {
                        self.show_range_warnings(controller, display);
                    }
                }
            }
            Command::Unset { field } => {
                if let Some(field) = report_outcome(display, controller.clear_field(&field)) {
                    display.show_success(&format!("{} cleared", field));
                }
            }
            Command::Attach { path } => {
                if let Some(name) = report_outcome(display, controller.attach_file(&path)) {
                    display.show_success(&format!("Attached {}", name));
                }
            }
            Command::Detach { index } => {
                if let Some(name) = report_outcome(display, controller.detach(index)) {
                    display.show_success(&format!("Removed {}", name));
                }
            }
            Command::Report => match controller.report_collector() {
                Some(collector) => display.show_report(collector),
                None => match controller.report() {
                    Some(report) => {
                        display.show_table("Submitted Report", &[
                            ("Age".to_string(), report.age.to_string()),
                            ("Gender".to_string(), report.gender.to_string()),
                            ("Blood pressure".to_string(), report.blood_pressure.clone()),
                            ("Last test".to_string(), report.last_test_date.to_string()),
                            ("Attachments".to_string(), report.medical_reports.len().to_string()),
                        ]);
                        for (range, value, _) in out_of_range(report.nutrients.iter()) {
                            display.show_warning(&range_warning(&range, value));
                        }
                    }
                    None => display.show_info("No report yet."),
                },
            },
            Command::Submit => {
                if report_outcome(display, controller.submit_report()).is_some() {
                    self.show_step_entry(controller, display)?;
                } else if let Some(collector) = controller.report_collector() {
                    if self.verbose {
                        display.show_report(collector);
                    }
                }
            }

            Command::Type { meal_type } => {
                if report_outcome(display, controller.set_meal_type(meal_type)).is_some() {
                    display.show_success(&format!("Meal type: {}", meal_type.title()));
                }
            }
            Command::Time { time } => {
                if report_outcome(display, controller.set_meal_time(&time)).is_some() {
                    let stored = controller
                        .meal_collector()
                        .map(|meals| meals.current().time.clone())
                        .unwrap_or_default();
                    display.show_success(&time_message(&stored));
                }
            }
            Command::Add { food } => {
                if let Some(item) = report_outcome(display, controller.add_food(&food)) {
                    display.show_success(&format!(
                        "Added {} ({}, {} kcal)",
                        item.name, item.quantity, item.calories
                    ));
                    self.show_current_meal(controller, display);
                }
            }
            Command::Remove { index } => {
                if let Some(item) = report_outcome(display, controller.remove_item(index)) {
                    display.show_success(&format!("Removed {}", item.name));
                    self.show_current_meal(controller, display);
                }
            }
            Command::Meal => match controller.meal_collector() {
                Some(meals) => display.show_meal(meals.current()),
                None => display.show_info("No meal in progress."),
            },
            Command::Commit => {
                if let Some(count) = report_outcome(display, controller.commit_meal()) {
                    display.show_success(&format!("Meal recorded ({} total)", count));
                }
            }
            Command::Meals => {
                display.show_meals(controller.committed_meals());
                if let Some(meals) = controller.meal_collector() {
                    let current = meals.current_calories();
                    if current > 0 {
                        display.show_info(&format!(
                            "Meal in progress: {} kcal ({} kcal with recorded meals)",
                            current,
                            current + meals.committed_calories()
                        ));
                    }
                }
            }
            Command::Analyze { force } => {
                let outcome = if force {
                    controller.force_analysis()
                } else {
                    controller.finalize_meals()
                };
                if report_outcome(display, outcome).is_some() {
                    self.show_step_entry(controller, display)?;
                } else if !force && controller.step() == WizardStep::CollectingMeals {
                    display.show_info("Record a meal with /commit, or use /analyze --force.");
                }
            }

            Command::Analysis => match controller.analysis() {
                Some(analysis) => display.show_analysis(analysis),
                None => display.show_info("The analysis is shown after the meal step."),
            },
            Command::Export { path } => self.export(path, controller, display),

            Command::Search { query } => {
                if controller.step() == WizardStep::CollectingMeals {
                    let results = controller.catalog().search(&query);
                    display.show_foods(&results);
                    if !results.is_empty() {
                        println!("  Use {} to add one.", "/add NAME".cyan());
                    }
                } else {
                    println!("Type {} for available commands", "/help".cyan());
                }
            }
            Command::Invalid { usage } => {
                display.show_error(&format!("Usage: {}", usage));
            }
            Command::Unknown { input } => {
                println!("{}", format!("Unknown command: {}", input).red());
                println!("Type {} for available commands", "/help".cyan());
            }
        }

        Ok(true)
    }

    /// Header and first view of the step just entered
    fn show_step_entry(&self, controller: &WizardController, display: &DisplayManager) -> Result<()> {
        if self.config.display.clear_on_step {
            display.clear_screen()?;
        }
        display.show_step(controller.step());

        match controller.step() {
            WizardStep::CollectingReport => {}
            WizardStep::CollectingMeals => {
                self.show_current_meal(controller, display);
                println!(
                    "\n  Type a food name to search, then {} it. {} records the meal.",
                    "/add".cyan(),
                    "/commit".cyan()
                );
            }
            WizardStep::ShowingAnalysis => {
                if let Some(analysis) = controller.analysis() {
                    display.show_analysis(analysis);
                }
                println!("\n  Use {} to save the session, {} to quit.", "/export".cyan(), "/exit".cyan());
            }
        }
        Ok(())
    }

    fn show_current_meal(&self, controller: &WizardController, display: &DisplayManager) {
        if let Some(meals) = controller.meal_collector() {
            display.show_meal(meals.current());
        }
    }

    fn show_range_warnings(&self, controller: &WizardController, display: &DisplayManager) {
        if let Some(collector) = controller.report_collector() {
            for (range, value, _) in collector.range_warnings() {
                display.show_warning(&range_warning(&range, value));
            }
        }
    }

    fn export(&self, path: Option<String>, controller: &WizardController, display: &DisplayManager) {
        let Some(snapshot) = report_outcome(display, controller.snapshot()) else {
            return;
        };

        let target = path.unwrap_or_else(|| {
            let id = snapshot.session_id.simple().to_string();
            format!("nutricare-{}.json", &id[..8])
        });
        let path = self.config.resolve_export_path(&target);

        if report_outcome(display, write_export(&snapshot, &path)).is_some() {
            display.show_success(&format!("Session exported to {}", path.display()));
        }
    }

    /// Display help information
    fn show_help(&self, step: WizardStep) {
        println!("\n{}", "Available Commands:".bold().cyan());
        println!("{}", "=".repeat(60).cyan());

        let global = [
            ("/help, /h", "Show this help message"),
            ("/status", "Show session status and statistics"),
            ("/foods [query]", "Search the food catalog"),
            ("/ranges", "Show nutrient reference ranges"),
            ("/verbose [on|off]", "Toggle verbose output"),
            ("/clear, /cls", "Clear screen"),
            ("/exit, /quit, /q", "Exit REPL"),
        ];
        let step_commands: &[(&str, &str)] = match step {
            WizardStep::CollectingReport => &[
                ("/set FIELD VALUE", "Set a report field (e.g. /set bp 120/80)"),
                ("/unset FIELD", "Clear a report field"),
                ("/attach PATH", "Attach a PDF, PNG or JPG report"),
                ("/detach N", "Remove attachment N"),
                ("/report", "Show the report and missing fields"),
                ("/submit", "Submit the report and continue"),
            ],
            WizardStep::CollectingMeals => &[
                ("<text>", "Search foods by name"),
                ("/type TYPE", "breakfast, lunch, dinner or snack"),
                ("/time HH:MM", "Set the meal time"),
                ("/add FOOD", "Add a catalog food to the meal"),
                ("/remove N", "Remove item N from the meal"),
                ("/meal", "Show the meal in progress"),
                ("/commit", "Record the meal"),
                ("/meals", "List recorded meals"),
                ("/analyze [--force]", "Finish and show the analysis"),
            ],
            WizardStep::ShowingAnalysis => &[
                ("/analysis", "Show the analysis again"),
                ("/meals", "List recorded meals"),
                ("/export [PATH]", "Save the session as JSON"),
            ],
        };

        println!("{}", step.display_name().bold());
        for (cmd, desc) in step_commands {
            println!("  {:<22} {}", cmd.green(), desc);
        }
        println!("{}", "Global".bold());
        for (cmd, desc) in global {
            println!("  {:<22} {}", cmd.green(), desc);
        }

        println!("\n{}", "Usage:".bold());
        println!("  - Use {} for command history", "UP/DOWN arrows".cyan());
        println!("  - Press {} or {} to exit", "Ctrl-D".cyan(), "/exit".cyan());
        println!();
    }

    /// Display session status
    fn show_status(&self, controller: &WizardController, display: &DisplayManager) {
        let mut rows = vec![
            ("Session".to_string(), controller.session_id().to_string()),
            ("Step".to_string(), format!("{}/3 {}", controller.step().number(), controller.step().display_name())),
        ];
        if let Some(collector) = controller.report_collector() {
            rows.push(("Missing fields".to_string(), collector.missing_fields().len().to_string()));
        }
        rows.extend(controller.telemetry().summary_lines());
        rows.push(("Verbose mode".to_string(), if self.verbose { "On" } else { "Off" }.to_string()));

        display.show_table("Session Status:", &rows);
        if self.verbose {
            let recent = controller.telemetry().recent_lines(RECENT_ACTIVITY);
            if !recent.is_empty() {
                display.show_table("Recent Activity:", &recent);
            }
        }
    }

    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Set verbose mode
    pub fn set_verbose(&mut self, enable: bool) {
        self.verbose = enable;
    }
}

impl Default for CommandHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Check if input is a command (starts with /)
pub fn is_command(input: &str) -> bool {
    input.trim().starts_with('/')
}

/// Render a wizard error; withheld actions are warnings
fn report_outcome<T>(display: &DisplayManager, result: WizardResult<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) if e.is_withheld() => {
            display.show_warning(&e.to_string());
            None
        }
        Err(WizardError::IoError(e)) => {
            display.show_error(&format!("I/O error: {}", e));
            None
        }
        Err(e) => {
            display.show_error(&e.to_string());
            None
        }
    }
}

fn range_warning(range: &NutrientRange, value: f64) -> String {
    format!(
        "{} {} is outside the normal range {}",
        range.nutrient.display_name(),
        value,
        range.describe()
    )
}

/// Confirmation for a stored meal time
fn time_message(stored: &str) -> String {
    if stored.is_empty() {
        "Meal time cleared".to_string()
    } else {
        format!("Meal time: {}", stored)
    }
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

/// 1-based position to zero-based index
fn parse_position(s: &str) -> Option<usize> {
    s.trim().parse::<usize>().ok()?.checked_sub(1)
}

fn invalid(usage: &str) -> Command {
    Command::Invalid { usage: usage.to_string() }
}

//! Display manager for the wizard terminal UI
//!
//! Views are built as strings by the `format_*` functions and printed by
//! `DisplayManager`. Indices shown to the user are 1-based.

use colored::*;
use crossterm::{
    cursor,
    execute,
    terminal::{Clear, ClearType},
};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::fmt::Write as _;
use std::io::{self, Write};

use crate::reference::{FoodItem, NutrientRange, RangeStatus};
use crate::types::{HealthAnalysis, MealEntry, RiskLevel, Severity};
use crate::wizard::{ReportCollector, ReportField, WizardStep, STEP_COUNT};

const RULE_WIDTH: usize = 60;

/// Display manager for the REPL
pub struct DisplayManager {
    show_progress: bool,
}

impl DisplayManager {
    pub fn new() -> Self {
        DisplayManager { show_progress: true }
    }

    /// Plain step headers instead of a progress bar
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Show welcome banner
    pub fn show_banner(&self, version: &str) {
        let width = 64;
        let top = format!("{}", "=".repeat(width).cyan());
        let title = format!("  NutriCare {} - Health Wizard", version);
        let info = "  Report -> Meals -> Analysis";

        println!("\n{}", top);
        println!("{}", title.bold().cyan());
        println!("{}", info.dimmed());
        println!("{}\n", top);
        println!("Type {} for commands, {} to quit\n", "/help".green(), "/exit".green());
    }

    /// Show which step the wizard is on
    pub fn show_step(&self, step: WizardStep) {
        if !self.show_progress {
            println!("\n{}", format_step_header(step).bold().cyan());
            return;
        }

        let pb = ProgressBar::with_draw_target(Some(STEP_COUNT), ProgressDrawTarget::stdout());
        let style = ProgressStyle::default_bar()
            .template("Step {pos}/{len} [{bar:30.cyan/blue}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-");
        pb.set_style(style);
        pb.set_position(step.number());
        pb.set_message(step.display_name().to_string());
        pb.abandon();
    }

    pub fn show_report(&self, collector: &ReportCollector) {
        print!("{}", format_report(collector));
    }

    pub fn show_meal(&self, meal: &MealEntry) {
        print!("{}", format_meal(meal, "Current Meal"));
    }

    pub fn show_meals(&self, meals: &[MealEntry]) {
        print!("{}", format_meal_list(meals));
    }

    pub fn show_analysis(&self, analysis: &HealthAnalysis) {
        print!("{}", format_analysis(analysis));
    }

    pub fn show_foods(&self, foods: &[&FoodItem]) {
        print!("{}", format_foods(foods));
    }

    pub fn show_ranges(&self) {
        print!("{}", format_ranges());
    }

    /// Show key/value rows under a section header
    pub fn show_table(&self, title: &str, rows: &[(String, String)]) {
        self.show_section(title);
        for (key, value) in rows {
            println!("  {:<18} {}", format!("{}:", key), value.green());
        }
        println!();
    }

    /// Display error message
    pub fn show_error(&self, error: &str) {
        println!("{} {}", "Error:".red().bold(), error.red());
    }

    /// Display warning message
    pub fn show_warning(&self, warning: &str) {
        println!("{} {}", "Warning:".yellow().bold(), warning.yellow());
    }

    /// Display info message
    pub fn show_info(&self, info: &str) {
        println!("{} {}", "Info:".cyan(), info);
    }

    pub fn show_success(&self, message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Display prompt for user input
    pub fn show_prompt(&self) -> io::Result<()> {
        io::stdout().flush()
    }

    /// Clear screen
    pub fn clear_screen(&self) -> io::Result<()> {
        execute!(io::stdout(), Clear(ClearType::All), cursor::MoveTo(0, 0))
    }

    /// Show section header
    pub fn show_section(&self, title: &str) {
        println!("\n{}", title.bold().cyan());
        println!("{}", "-".repeat(RULE_WIDTH).cyan());
    }
}

impl Default for DisplayManager {
    fn default() -> Self {
        Self::new()
    }
}

fn section(out: &mut String, title: &str) {
    let _ = writeln!(out, "\n{}", title.bold().cyan());
    let _ = writeln!(out, "{}", "-".repeat(RULE_WIDTH).cyan());
}

/// "Step 2/3: Meal Tracker"
pub fn format_step_header(step: WizardStep) -> String {
    format!("Step {}/{}: {}", step.number(), STEP_COUNT, step.display_name())
}

/// The report draft, attachments and range warnings
pub fn format_report(collector: &ReportCollector) -> String {
    let mut out = String::new();
    let draft = collector.draft();
    let missing = collector.missing_fields();

    section(&mut out, "Health Report");
    for field in ReportField::all() {
        let value = match draft.display_value(field) {
            Some(value) => value.green(),
            None if missing.contains(&field) => "missing".red(),
            None => "-".dimmed(),
        };
        let _ = writeln!(
            out,
            "  {:<16} {:<24} {}",
            field.key(),
            value,
            field.hint().dimmed()
        );
    }

    if !collector.attachments().is_empty() {
        section(&mut out, "Medical Reports");
        for (i, report) in collector.attachments().iter().enumerate() {
            let _ = writeln!(
                out,
                "  {}. {} {}",
                (i + 1).to_string().cyan(),
                report.file_name,
                format!("({}, {} bytes)", report.kind.mime_type(), report.size_bytes).dimmed()
            );
        }
    }

    for (range, value, status) in collector.range_warnings() {
        let direction = match status {
            RangeStatus::Below => "below",
            _ => "above",
        };
        let _ = writeln!(
            out,
            "  {} {} {} is {} the normal range {}",
            "!".yellow(),
            range.nutrient.display_name(),
            value,
            direction,
            range.describe()
        );
    }

    if missing.is_empty() {
        let _ = writeln!(out, "\n  Report complete. Use {} to continue.", "/submit".green());
    } else {
        let _ = writeln!(out, "\n  {} required field(s) missing.", missing.len().to_string().yellow());
    }
    out
}

/// One meal with numbered items and its calorie total
pub fn format_meal(meal: &MealEntry, title: &str) -> String {
    let mut out = String::new();
    let time = if meal.time.is_empty() { "no time set" } else { meal.time.as_str() };

    section(&mut out, &format!("{}: {} ({})", title, meal.meal_type.title(), time));
    if meal.items.is_empty() {
        let _ = writeln!(out, "  {}", "No items yet.".yellow());
    }
    for (i, item) in meal.items.iter().enumerate() {
        let _ = writeln!(
            out,
            "  {}. {:<20} {:<16} {}",
            (i + 1).to_string().cyan(),
            item.name,
            item.quantity.dimmed(),
            format!("{} kcal", item.calories)
        );
    }
    let _ = writeln!(out, "  Total: {} kcal", meal.total_calories().to_string().bold());
    out
}

/// All committed meals
pub fn format_meal_list(meals: &[MealEntry]) -> String {
    let mut out = String::new();
    section(&mut out, &format!("Recorded Meals ({})", meals.len()));

    if meals.is_empty() {
        let _ = writeln!(out, "  {}", "No meals recorded yet.".yellow());
        return out;
    }

    for (i, meal) in meals.iter().enumerate() {
        let names: Vec<&str> = meal.items.iter().map(|item| item.name.as_str()).collect();
        let _ = writeln!(
            out,
            "  {}. {:<10} {:<6} {} kcal  {}",
            (i + 1).to_string().cyan(),
            meal.meal_type.title(),
            meal.time,
            meal.total_calories(),
            names.join(", ").dimmed()
        );
    }
    let total: u32 = meals.iter().map(MealEntry::total_calories).sum();
    let _ = writeln!(out, "  Total: {} kcal", total.to_string().bold());
    out
}

fn severity_label(severity: Severity) -> ColoredString {
    match severity {
        Severity::Low => "low".green(),
        Severity::Moderate => "moderate".yellow(),
        Severity::Severe => "severe".red(),
    }
}

fn risk_label(level: RiskLevel) -> ColoredString {
    match level {
        RiskLevel::Low => "low".green(),
        RiskLevel::Moderate => "moderate".yellow(),
        RiskLevel::High => "high".red(),
    }
}

/// Nutritional status, deficiencies and risks
pub fn format_analysis(analysis: &HealthAnalysis) -> String {
    let mut out = String::new();

    section(&mut out, "Nutritional Status");
    let _ = writeln!(out, "  {}", analysis.nutritional_status.category.bold());
    let _ = writeln!(out, "  {}", analysis.nutritional_status.description);

    section(&mut out, "Nutrient Deficiencies");
    for deficiency in &analysis.deficiencies {
        let _ = writeln!(
            out,
            "  {} [{}]",
            deficiency.nutrient.bold(),
            severity_label(deficiency.severity)
        );
        for rec in &deficiency.recommendations {
            let _ = writeln!(out, "    {} {}", "•".cyan(), rec);
        }
    }

    section(&mut out, "Potential Health Risks");
    for risk in &analysis.potential_risks {
        let _ = writeln!(out, "  {} [{} risk]", risk.condition.bold(), risk_label(risk.risk_level));
        for measure in &risk.preventive_measures {
            let _ = writeln!(out, "    {} {}", "•".cyan(), measure);
        }
    }
    out
}

/// Food picklist
pub fn format_foods(foods: &[&FoodItem]) -> String {
    let mut out = String::new();
    if foods.is_empty() {
        let _ = writeln!(out, "  {}", "No matching foods.".yellow());
        return out;
    }
    for food in foods {
        let _ = writeln!(
            out,
            "  {:<16} {:>4} kcal  {}",
            food.name.green(),
            food.calories,
            food.default_quantity.dimmed()
        );
    }
    out
}

/// Nutrient reference range table
pub fn format_ranges() -> String {
    let mut out = String::new();
    section(&mut out, "Nutrient Reference Ranges");
    for range in NutrientRange::all() {
        let _ = writeln!(
            out,
            "  {:<14} {:<14} {}",
            range.nutrient.display_name(),
            range.nutrient.key().dimmed(),
            range.describe()
        );
    }
    out
}

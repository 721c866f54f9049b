//! NutriCare - Main CLI Entry Point

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use nutricare::{
    cli::{Args, Commands, Config, Verbosity},
    intake::{run_intake, write_export, IntakeFile},
    logging::LoggingConfig,
    reference::FoodCatalog,
    repl::{DisplayManager, ReplSession},
    WizardController,
};
use std::path::{Path, PathBuf};

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn main() -> Result<()> {
    let args = Args::parse();

    if let Err(msg) = args.validate() {
        eprintln!("{} {}", "Error:".red().bold(), msg);
        std::process::exit(2);
    }

    let config = Config::load(args.config.clone()).context("Failed to load configuration")?;
    let verbosity = args.verbosity_or(&config.display.default_verbosity);

    if !config.display.color_output {
        colored::control::set_override(false);
    }
    LoggingConfig::from_config(&config, verbosity).init()?;

    match args.command() {
        Commands::Start => run_repl(&config, verbosity),
        Commands::Analyze { file, output, force } => {
            run_analyze(&config, verbosity, &file, output.as_deref(), force)
        }
        Commands::Foods { query } => {
            list_foods(query.as_deref());
            Ok(())
        }
        Commands::Ranges => {
            DisplayManager::new().show_ranges();
            Ok(())
        }
        Commands::Config => show_config(&args, &config, verbosity),
    }
}

/// Run the wizard interactively
fn run_repl(config: &Config, verbosity: Verbosity) -> Result<()> {
    let mut repl_session = ReplSession::with_history(config.history_file(), config.clone())?;
    repl_session.set_verbose(verbosity.show_events());

    repl_session.show_welcome(VERSION);
    repl_session.run()
}

/// Replay an intake file and print the analysis
fn run_analyze(
    config: &Config,
    verbosity: Verbosity,
    file: &Path,
    output: Option<&Path>,
    force: bool,
) -> Result<()> {
    let intake = IntakeFile::load(file)
        .with_context(|| format!("Failed to read intake file {}", file.display()))?;
    let base_dir = file.parent().map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("."));

    let display = DisplayManager::new()
        .with_progress(config.display.show_progress_bars && verbosity.show_progress());
    let mut controller = WizardController::new();

    let step = run_intake(&mut controller, intake, &base_dir, force)
        .with_context(|| format!("Intake {} stopped at {}", file.display(), controller.step().display_name()))?;

    if verbosity.show_events() {
        display.show_meals(controller.committed_meals());
    }
    display.show_step(step);
    if let Some(analysis) = controller.analysis() {
        display.show_analysis(analysis);
    }

    if let Some(path) = output {
        let snapshot = controller.snapshot()?;
        write_export(&snapshot, path)
            .with_context(|| format!("Failed to write export {}", path.display()))?;
        if verbosity.show_progress() {
            display.show_success(&format!("Session exported to {}", path.display()));
        }
    }

    Ok(())
}

fn list_foods(query: Option<&str>) {
    let catalog = FoodCatalog::new();
    let foods = match query {
        Some(q) => catalog.search(q),
        None => catalog.all().iter().collect(),
    };
    DisplayManager::new().show_foods(&foods);
}

fn show_config(args: &Args, config: &Config, verbosity: Verbosity) -> Result<()> {
    println!("\n{}", "NutriCare Configuration".bold().cyan());
    println!("{}", "=".repeat(56).cyan());

    let source = match (&args.config, Config::default_path()) {
        (Some(path), _) => path.display().to_string(),
        (None, Some(path)) if path.exists() => path.display().to_string(),
        _ => "built-in defaults".to_string(),
    };
    println!("Source: {}", source);
    println!();

    println!("Display:");
    println!("  Verbosity:      {}", verbosity.as_str());
    println!("  Progress bars:  {}", if config.display.show_progress_bars { "enabled" } else { "disabled" });
    println!("  Color output:   {}", if config.display.color_output { "enabled" } else { "disabled" });
    println!("  Clear on step:  {}", if config.display.clear_on_step { "enabled" } else { "disabled" });
    println!();

    println!("Paths:");
    println!("  State dir:      {}", config.state_dir().display());
    println!("  History file:   {}", config.history_file().display());
    println!("  Export dir:     {}", config.export_dir().display());
    println!();

    println!("Logging:");
    println!("  Level:          {}", config.logging.level);
    println!("  Format:         {:?}", config.logging.format);
    println!();

    Ok(())
}

//! Command-line argument parsing for NutriCare
//!
//! Provides clap-based CLI with subcommands and verbosity control.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// NutriCare - health report, meal log and nutrition analysis in the terminal
#[derive(Parser, Debug)]
#[command(name = "nutricare")]
#[command(author = "Jerome (Kubashen) Naidoo")]
#[command(version)]
#[command(about = "Three-step health wizard: report, meals, analysis", long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbosity level: -q (quiet), default (normal), -v (verbose), -vv (very verbose)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Subcommand; defaults to `start`
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Start the interactive wizard
    Start,

    /// Run the wizard from a JSON intake file and print the analysis
    Analyze {
        /// Intake file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Write the session export as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Show the analysis even if the intake has no meals
        #[arg(long)]
        force: bool,
    },

    /// Search the food catalog (lists everything without a query)
    Foods {
        #[arg(value_name = "QUERY")]
        query: Option<String>,
    },

    /// Show nutrient reference ranges
    Ranges,

    /// Display current configuration
    Config,
}

/// Verbosity level enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
    VeryVerbose,
}

impl Args {
    /// Get verbosity level based on flags
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::VeryVerbose,
            }
        }
    }

    /// Verbosity from flags, falling back to the configured default
    pub fn verbosity_or(&self, configured: &str) -> Verbosity {
        if self.quiet || self.verbose > 0 {
            self.verbosity()
        } else {
            Verbosity::parse(configured).unwrap_or(Verbosity::Normal)
        }
    }

    /// Subcommand to run
    pub fn command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Start)
    }

    /// Reject flag combinations clap cannot express
    pub fn validate(&self) -> Result<(), String> {
        if self.quiet && self.verbose > 0 {
            return Err("Cannot combine --quiet with --verbose.".to_string());
        }
        Ok(())
    }
}

impl Verbosity {
    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "quiet",
            Verbosity::Normal => "normal",
            Verbosity::Verbose => "verbose",
            Verbosity::VeryVerbose => "very_verbose",
        }
    }

    pub fn parse(s: &str) -> Option<Verbosity> {
        match s {
            "quiet" => Some(Verbosity::Quiet),
            "normal" => Some(Verbosity::Normal),
            "verbose" => Some(Verbosity::Verbose),
            "very_verbose" => Some(Verbosity::VeryVerbose),
            _ => None,
        }
    }

    /// Check if should show progress bars
    pub fn show_progress(&self) -> bool {
        !matches!(self, Verbosity::Quiet)
    }

    /// Check if should show range warnings and step summaries
    pub fn show_events(&self) -> bool {
        matches!(self, Verbosity::Verbose | Verbosity::VeryVerbose)
    }
}

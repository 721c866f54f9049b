//! NutriCare - three-step health wizard
//!
//! Collects a health report, then meal entries, then shows a health
//! analysis. The library holds the wizard itself; the binary adds the
//! interactive REPL and the JSON intake mode.
//!
//! # Architecture
//!
//! - **types**: report, meal and analysis records
//! - **reference**: food catalog and nutrient reference ranges
//! - **wizard**: step machine, collectors, analyzer and controller
//! - **intake**: JSON intake replay and session export
//! - **cli / repl**: arguments, configuration and the terminal front end

pub mod errors;
pub mod types;
pub mod reference;
pub mod wizard;
pub mod telemetry;
pub mod intake;

// Re-export commonly used types
pub use errors::{Result, WizardError};
pub use wizard::{HealthAnalyzer, StaticAnalyzer, WizardController, WizardStep};

// Terminal front end
pub mod cli;
pub mod logging;
pub mod repl;

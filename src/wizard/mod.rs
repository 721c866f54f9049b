//! Health wizard
//!
//! The step state machine, the collectors backing the first two steps, the
//! analyzer seam and the controller that ties them together.

pub mod state;
pub mod report;
pub mod meals;
pub mod analysis;
pub mod controller;

// Re-export commonly used types
pub use state::{WizardEvent, WizardStep, STEP_COUNT};
pub use report::{ReportCollector, ReportDraft, ReportField};
pub use meals::MealCollector;
pub use analysis::{sample_analysis, HealthAnalyzer, StaticAnalyzer};
pub use controller::{SessionSnapshot, SessionState, WizardController};

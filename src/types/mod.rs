//! Type definitions module
//! 
//! Plain records passed through the wizard: the health report, meal entries
//! and the analysis shown at the end.

pub mod report;
pub mod meal;
pub mod analysis;

// Re-export commonly used types
pub use report::{AttachmentKind, Gender, MedicalReport, Nutrient, NutrientPanel, UserReport};
pub use meal::{MealEntry, MealItem, MealType};
pub use analysis::{Deficiency, HealthAnalysis, NutritionalStatus, PotentialRisk, RiskLevel, Severity};

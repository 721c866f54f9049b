//! Static reference tables
//!
//! The food picklist used by the meal step and the nutrient reference
//! ranges shown as guidance in the report step.

pub mod foods;
pub mod ranges;

// Re-export commonly used types
pub use foods::{FoodCatalog, FoodItem};
pub use ranges::{out_of_range, NutrientRange, RangeStatus};

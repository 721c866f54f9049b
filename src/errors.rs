//! Error types for NutriCare
//!
//! A single error enum covers the wizard, the collectors, intake files and
//! configuration. Withheld wizard actions (missing fields, empty meal, no
//! meals) are errors too, so callers can render them and leave state alone.

use thiserror::Error;

/// Main error type for the NutriCare wizard
#[derive(Error, Debug)]
pub enum WizardError {
    /// Wizard step transition errors
    #[error("Invalid transition from {from} to {to}: {reason}")]
    InvalidTransition {
        from: String,
        to: String,
        reason: String,
    },

    /// Action that belongs to a different wizard step
    #[error("'{action}' is not available during {step}")]
    WrongStep { action: String, step: String },

    /// Report submitted before every required field was filled in
    #[error("Report incomplete, missing: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    /// A field value that could not be parsed for its field
    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidField {
        field: String,
        value: String,
        reason: String,
    },

    /// Field name not part of the report
    #[error("Unknown field: {0}")]
    UnknownField(String),

    /// Index-based removal outside the list
    #[error("Index {index} out of range (have {len})")]
    IndexOutOfRange { index: usize, len: usize },

    /// Commit attempted on a meal without items
    #[error("Current meal has no items")]
    EmptyMeal,

    /// Analysis requested before any meal was committed
    #[error("No meals recorded yet")]
    NoMealsCommitted,

    /// Food name not in the catalog
    #[error("Unknown food: {0}")]
    UnknownFood(String),

    /// Attachment with a file type the report does not accept
    #[error("Unsupported attachment '{0}' (expected PDF, PNG or JPG)")]
    UnsupportedAttachment(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Generic errors with context
    #[error("{0}")]
    Generic(String),
}

/// Result type alias for wizard operations
pub type Result<T> = std::result::Result<T, WizardError>;

/// Convert anyhow errors to WizardError
impl From<anyhow::Error> for WizardError {
    fn from(err: anyhow::Error) -> Self {
        WizardError::Generic(err.to_string())
    }
}

impl WizardError {
    /// Build an `InvalidField` error
    pub fn invalid_field(field: &str, value: &str, reason: impl Into<String>) -> Self {
        WizardError::InvalidField {
            field: field.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// True for errors that only mean "action withheld", not a failure
    pub fn is_withheld(&self) -> bool {
        matches!(
            self,
            WizardError::MissingFields(_) | WizardError::EmptyMeal | WizardError::NoMealsCommitted
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_display() {
        let err = WizardError::MissingFields(vec!["age".to_string(), "iron".to_string()]);
        assert_eq!(err.to_string(), "Report incomplete, missing: age, iron");
    }

    #[test]
    fn test_invalid_transition_error() {
        let err = WizardError::InvalidTransition {
            from: "CollectingMeals".to_string(),
            to: "CollectingReport".to_string(),
            reason: "Cannot go backwards".to_string(),
        };
        assert!(err.to_string().contains("CollectingMeals"));
        assert!(err.to_string().contains("CollectingReport"));
    }

    #[test]
    fn test_index_out_of_range_display() {
        let err = WizardError::IndexOutOfRange { index: 4, len: 2 };
        assert!(err.to_string().contains('4'));
        assert!(err.to_string().contains('2'));
    }

    #[test]
    fn test_withheld_classification() {
        assert!(WizardError::EmptyMeal.is_withheld());
        assert!(WizardError::NoMealsCommitted.is_withheld());
        assert!(WizardError::MissingFields(vec![]).is_withheld());
        assert!(!WizardError::UnknownField("x".to_string()).is_withheld());
    }

    #[test]
    fn test_from_anyhow() {
        let err: WizardError = anyhow::anyhow!("boom").into();
        assert!(matches!(err, WizardError::Generic(ref m) if m == "boom"));
    }
}

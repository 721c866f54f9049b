//! Wizard step machine
//!
//! Deterministic three-step machine:
//! - Safety: no step is re-entered, there is no back-navigation
//! - Liveness: every non-terminal step has exactly one forward edge
//! - Determinism: unique next step per (step, event)

use crate::errors::{Result, WizardError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Wizard steps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WizardStep {
    /// Initial step - health report being filled in
    CollectingReport,

    /// Report accepted - meals being recorded
    CollectingMeals,

    /// Analysis shown (terminal)
    ShowingAnalysis,
}

/// Events that trigger step transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardEvent {
    /// Complete report submitted
    ReportSubmitted,

    /// Committed meals handed over for analysis
    MealsFinalized,
}

impl WizardStep {
    /// Check if this is the terminal step
    pub fn is_terminal(&self) -> bool {
        matches!(self, WizardStep::ShowingAnalysis)
    }

    /// Attempt step transition
    ///
    /// Valid transitions:
    /// 1. CollectingReport → CollectingMeals  (on: ReportSubmitted)
    /// 2. CollectingMeals  → ShowingAnalysis  (on: MealsFinalized)
    ///
    /// Everything else, including events on the terminal step, is rejected.
    pub fn transition(&self, event: WizardEvent) -> Result<WizardStep> {
        use WizardEvent::*;
        use WizardStep::*;

        match (self, event) {
            (CollectingReport, ReportSubmitted) => Ok(CollectingMeals),
            (CollectingMeals, MealsFinalized) => Ok(ShowingAnalysis),
            (from, event) => Err(WizardError::InvalidTransition {
                from: format!("{:?}", from),
                to: format!("(via {:?})", event),
                reason: format!("No valid transition from {:?} on {:?}", from, event),
            }),
        }
    }

    /// Get all valid events from this step
    pub fn valid_events(&self) -> Vec<WizardEvent> {
        match self {
            WizardStep::CollectingReport => vec![WizardEvent::ReportSubmitted],
            WizardStep::CollectingMeals => vec![WizardEvent::MealsFinalized],
            WizardStep::ShowingAnalysis => vec![],
        }
    }

    /// 1-based position in the wizard
    pub fn number(&self) -> u64 {
        match self {
            WizardStep::CollectingReport => 1,
            WizardStep::CollectingMeals => 2,
            WizardStep::ShowingAnalysis => 3,
        }
    }

    /// Human-readable step name
    pub fn display_name(&self) -> &'static str {
        match self {
            WizardStep::CollectingReport => "Health Information",
            WizardStep::CollectingMeals => "Meal Tracker",
            WizardStep::ShowingAnalysis => "Health Analysis",
        }
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Total number of wizard steps
pub const STEP_COUNT: u64 = 3;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_transitions() {
        assert_eq!(
            WizardStep::CollectingReport.transition(WizardEvent::ReportSubmitted).unwrap(),
            WizardStep::CollectingMeals
        );
        assert_eq!(
            WizardStep::CollectingMeals.transition(WizardEvent::MealsFinalized).unwrap(),
            WizardStep::ShowingAnalysis
        );
    }

    #[test]
    fn test_invalid_transitions() {
        // Cannot skip the meal step
        assert!(WizardStep::CollectingReport
            .transition(WizardEvent::MealsFinalized)
            .is_err());

        // Cannot resubmit a report
        assert!(WizardStep::CollectingMeals
            .transition(WizardEvent::ReportSubmitted)
            .is_err());
    }

    #[test]
    fn test_terminal_step() {
        assert!(WizardStep::ShowingAnalysis.is_terminal());
        assert!(!WizardStep::CollectingReport.is_terminal());
        assert!(!WizardStep::CollectingMeals.is_terminal());

        for event in [WizardEvent::ReportSubmitted, WizardEvent::MealsFinalized] {
            assert!(WizardStep::ShowingAnalysis.transition(event).is_err());
        }
        assert!(WizardStep::ShowingAnalysis.valid_events().is_empty());
    }

    #[test]
    fn test_valid_events_match_transitions() {
        for step in [
            WizardStep::CollectingReport,
            WizardStep::CollectingMeals,
            WizardStep::ShowingAnalysis,
        ] {
            for event in step.valid_events() {
                assert!(step.transition(event).is_ok());
            }
        }
    }

    #[test]
    fn test_step_numbers() {
        assert_eq!(WizardStep::CollectingReport.number(), 1);
        assert_eq!(WizardStep::ShowingAnalysis.number(), STEP_COUNT);
    }
}

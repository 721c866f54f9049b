//! Intake files and session export
//!
//! An intake file is a JSON document holding a report draft, attachment
//! paths and a list of meals. `run_intake` replays it through a
//! `WizardController` using the same operations the REPL uses, so the
//! same preconditions apply.

use crate::errors::Result;
use crate::types::MealEntry;
use crate::wizard::{ReportDraft, SessionSnapshot, WizardController, WizardStep};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// `report` section of an intake file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IntakeReport {
    #[serde(flatten)]
    pub draft: ReportDraft,
    /// Attachment paths, relative to the intake file
    #[serde(default)]
    pub attachments: Vec<PathBuf>,
}

/// Complete intake document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IntakeFile {
    #[serde(default)]
    pub report: IntakeReport,
    #[serde(default)]
    pub meals: Vec<MealEntry>,
}

impl IntakeFile {
    /// Read and parse an intake file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let intake = serde_json::from_str(&contents)?;
        tracing::debug!(path = %path.display(), "intake file loaded");
        Ok(intake)
    }
}

/// Replay an intake through the controller
///
/// Relative attachment paths resolve against `base_dir`. Meals without
/// items are skipped. With `force`, the analysis is shown even when no
/// meal was committed. Returns the step reached, which is
/// `ShowingAnalysis` on success.
pub fn run_intake(
    controller: &mut WizardController,
    intake: IntakeFile,
    base_dir: &Path,
    force: bool,
) -> Result<WizardStep> {
    let IntakeFile { report, meals } = intake;

    controller.load_draft(report.draft)?;
    for attachment in &report.attachments {
        let path = if attachment.is_absolute() {
            attachment.clone()
        } else {
            base_dir.join(attachment)
        };
        controller.attach_file(&path)?;
    }
    controller.submit_report()?;

    for (index, meal) in meals.into_iter().enumerate() {
        if meal.is_empty() {
            tracing::warn!(meal = index + 1, "skipping meal without items");
            continue;
        }

        controller.set_meal_type(meal.meal_type)?;
        controller.set_meal_time(&meal.time)?;
        for item in meal.items {
            controller.add_item(item)?;
        }
        controller.commit_meal()?;
    }

    if force {
        controller.force_analysis()
    } else {
        controller.finalize_meals()
    }
}

/// Write a session snapshot as pretty JSON, creating parent directories
pub fn write_export(snapshot: &SessionSnapshot, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let json = serde_json::to_string_pretty(snapshot)?;
    fs::write(path, json)?;
    tracing::info!(path = %path.display(), session_id = %snapshot.session_id, "session exported");
    Ok(())
}

/// Read a session export back
pub fn read_export(path: &Path) -> Result<SessionSnapshot> {
    let contents = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::WizardError;
    use crate::types::{MealType, Nutrient};
    use tempfile::TempDir;

    const SAMPLE: &str = r#"{
        "report": {
            "age": 34,
            "gender": "female",
            "weight": 62.5,
            "height": 168,
            "blood_pressure": "118/76",
            "blood_sugar": 88,
            "existing_conditions": ["asthma"],
            "last_test_date": "2024-03-15",
            "nutrients": {
                "vitamin_d": 18, "vitamin_b12": 450, "iron": 75, "calcium": 9.4,
                "protein": 7.1, "zinc": 90, "magnesium": 2.0, "folic_acid": 9
            }
        },
        "meals": [
            {
                "meal_type": "breakfast",
                "time": "08:00",
                "items": [{"name": "Oatmeal", "quantity": "1 cup cooked", "calories": 150}]
            },
            { "meal_type": "lunch", "items": [] },
            {
                "meal_type": "snack",
                "items": [{"name": "Apple", "quantity": "1 medium", "calories": 95}]
            }
        ]
    }"#;

    fn sample() -> IntakeFile {
        serde_json::from_str(SAMPLE).unwrap()
    }

    #[test]
    fn test_parse_sample() {
        let intake = sample();
        assert_eq!(intake.report.draft.age, Some(34));
        assert_eq!(intake.report.draft.nutrients.get(&Nutrient::Magnesium), Some(&2.0));
        assert!(intake.report.attachments.is_empty());
        assert_eq!(intake.meals.len(), 3);
        assert_eq!(intake.meals[2].meal_type, MealType::Snack);
    }

    #[test]
    fn test_run_sample_intake() {
        let mut controller = WizardController::new();
        let step = run_intake(&mut controller, sample(), Path::new("."), false).unwrap();

        assert_eq!(step, WizardStep::ShowingAnalysis);
        // The empty lunch is skipped
        assert_eq!(controller.committed_meals().len(), 2);
        assert_eq!(controller.committed_meals()[0].time, "08:00");
        assert_eq!(controller.report().unwrap().existing_conditions, vec!["asthma".to_string()]);
    }

    #[test]
    fn test_incomplete_report_stops_at_report_step() {
        let mut intake = sample();
        intake.report.draft.nutrients.remove(&Nutrient::Zinc);

        let mut controller = WizardController::new();
        let err = run_intake(&mut controller, intake, Path::new("."), false).unwrap_err();
        assert!(matches!(err, WizardError::MissingFields(_)));
        assert_eq!(controller.step(), WizardStep::CollectingReport);
    }

    #[test]
    fn test_no_meals_needs_force() {
        let mut intake = sample();
        intake.meals.clear();

        let mut controller = WizardController::new();
        let err = run_intake(&mut controller, intake.clone(), Path::new("."), false).unwrap_err();
        assert!(matches!(err, WizardError::NoMealsCommitted));
        assert_eq!(controller.step(), WizardStep::CollectingMeals);

        let mut controller = WizardController::new();
        let step = run_intake(&mut controller, intake, Path::new("."), true).unwrap();
        assert_eq!(step, WizardStep::ShowingAnalysis);
    }

    #[test]
    fn test_attachments_resolved_against_base_dir() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("labs.pdf"), b"%PDF-1.4").unwrap();

        let mut intake = sample();
        intake.report.attachments = vec![PathBuf::from("labs.pdf")];

        let mut controller = WizardController::new();
        run_intake(&mut controller, intake, dir.path(), false).unwrap();

        let reports = &controller.report().unwrap().medical_reports;
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].file_name, "labs.pdf");
        assert_eq!(reports[0].size_bytes, 8);
    }

    #[test]
    fn test_export_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("exports").join("session.json");

        let mut controller = WizardController::new();
        run_intake(&mut controller, sample(), Path::new("."), false).unwrap();
        let snapshot = controller.snapshot().unwrap();

        write_export(&snapshot, &path).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["report"]["gender"], "female");
        assert_eq!(value["analysis"]["nutritional_status"]["category"], "Generally Balanced Diet");
        assert_eq!(value["meals"].as_array().unwrap().len(), 2);

        let restored = read_export(&path).unwrap();
        assert_eq!(restored.session_id, snapshot.session_id);
        assert_eq!(restored.meals, snapshot.meals);
        assert_eq!(restored.analysis, snapshot.analysis);
        assert_eq!(restored.report.last_test_date, snapshot.report.last_test_date);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            IntakeFile::load(&dir.path().join("nope.json")),
            Err(WizardError::IoError(_))
        ));
    }

    #[test]
    fn test_load_malformed_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            IntakeFile::load(&path),
            Err(WizardError::SerializationError(_))
        ));
    }
}

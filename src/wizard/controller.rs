//! Wizard controller
//!
//! Owns the session state and sequences the three steps. Each transition
//! builds the next state from the previous one and replaces it whole; a
//! refused action leaves the state untouched.

use crate::errors::{Result, WizardError};
use crate::reference::FoodCatalog;
use crate::telemetry::{TelemetryCollector, TelemetryEvent};
use crate::types::{HealthAnalysis, MealEntry, MealItem, MealType, UserReport};
use crate::wizard::analysis::{HealthAnalyzer, StaticAnalyzer};
use crate::wizard::meals::MealCollector;
use crate::wizard::report::{ReportCollector, ReportDraft, ReportField};
use crate::wizard::state::{WizardEvent, WizardStep};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Instant;
use uuid::Uuid;

/// Session state, one variant per wizard step
#[derive(Debug, Clone)]
pub enum SessionState {
    CollectingReport(ReportCollector),
    CollectingMeals {
        report: UserReport,
        meals: MealCollector,
    },
    ShowingAnalysis {
        report: UserReport,
        meals: Vec<MealEntry>,
        analysis: HealthAnalysis,
    },
}

impl SessionState {
    pub fn step(&self) -> WizardStep {
        match self {
            SessionState::CollectingReport(_) => WizardStep::CollectingReport,
            SessionState::CollectingMeals { .. } => WizardStep::CollectingMeals,
            SessionState::ShowingAnalysis { .. } => WizardStep::ShowingAnalysis,
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        SessionState::CollectingReport(ReportCollector::new())
    }
}

/// Everything a finished session produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    pub exported_at: DateTime<Utc>,
    pub report: UserReport,
    pub meals: Vec<MealEntry>,
    pub analysis: HealthAnalysis,
}

/// Three-step wizard controller
pub struct WizardController {
    session_id: Uuid,
    state: SessionState,
    analyzer: Box<dyn HealthAnalyzer>,
    catalog: FoodCatalog,
    telemetry: TelemetryCollector,
}

impl WizardController {
    /// Create controller using the static analyzer
    pub fn new() -> Self {
        Self::with_analyzer(Box::new(StaticAnalyzer))
    }

    /// Create controller with a specific analyzer
    pub fn with_analyzer(analyzer: Box<dyn HealthAnalyzer>) -> Self {
        let session_id = Uuid::new_v4();
        tracing::info!(%session_id, analyzer = analyzer.name(), "wizard session started");

        Self {
            session_id,
            state: SessionState::default(),
            analyzer,
            catalog: FoodCatalog::new(),
            telemetry: TelemetryCollector::new(),
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn step(&self) -> WizardStep {
        self.state.step()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn catalog(&self) -> &FoodCatalog {
        &self.catalog
    }

    pub fn telemetry(&self) -> &TelemetryCollector {
        &self.telemetry
    }

    /// Report collector, while the report step is active
    pub fn report_collector(&self) -> Option<&ReportCollector> {
        match &self.state {
            SessionState::CollectingReport(collector) => Some(collector),
            _ => None,
        }
    }

    /// Meal collector, while the meal step is active
    pub fn meal_collector(&self) -> Option<&MealCollector> {
        match &self.state {
            SessionState::CollectingMeals { meals, .. } => Some(meals),
            _ => None,
        }
    }

    /// Direct access to the report collector; edits here skip telemetry
    pub fn report_collector_mut(&mut self) -> Result<&mut ReportCollector> {
        self.report_mut("edit report")
    }

    /// Direct access to the meal collector; edits here skip telemetry
    pub fn meal_collector_mut(&mut self) -> Result<&mut MealCollector> {
        self.meals_mut("edit meals")
    }

    /// Submitted report, once the report step is done
    pub fn report(&self) -> Option<&UserReport> {
        match &self.state {
            SessionState::CollectingReport(_) => None,
            SessionState::CollectingMeals { report, .. }
            | SessionState::ShowingAnalysis { report, .. } => Some(report),
        }
    }

    /// Meals committed so far
    pub fn committed_meals(&self) -> &[MealEntry] {
        match &self.state {
            SessionState::CollectingReport(_) => &[],
            SessionState::CollectingMeals { meals, .. } => meals.committed(),
            SessionState::ShowingAnalysis { meals, .. } => meals,
        }
    }

    pub fn analysis(&self) -> Option<&HealthAnalysis> {
        match &self.state {
            SessionState::ShowingAnalysis { analysis, .. } => Some(analysis),
            _ => None,
        }
    }

    // Report step

    /// Set a report field from user text
    pub fn set_field(&mut self, name: &str, raw: &str) -> Result<ReportField> {
        let field = self.report_mut("set")?.set_field(name, raw)?;
        self.telemetry.record(TelemetryEvent::FieldEdited {
            field: field.key().to_string(),
            timestamp: Instant::now(),
        });
        Ok(field)
    }

    /// Clear a report field
    pub fn clear_field(&mut self, name: &str) -> Result<ReportField> {
        let field = self.report_mut("unset")?.clear_field(name)?;
        self.telemetry.record(TelemetryEvent::FieldEdited {
            field: field.key().to_string(),
            timestamp: Instant::now(),
        });
        Ok(field)
    }

    /// Replace the draft wholesale, keeping attachments
    ///
    /// Values are checked like field edits; on error the draft is unchanged.
    pub fn load_draft(&mut self, draft: ReportDraft) -> Result<()> {
        let collector = self.report_mut("load")?;
        let mut loaded = ReportCollector::from_draft(draft)?;
        for report in collector.attachments() {
            loaded.attach(report.clone());
        }
        *collector = loaded;
        Ok(())
    }

    /// Attach a medical report file, returning its file name
    pub fn attach_file(&mut self, path: &Path) -> Result<String> {
        let file_name = self.report_mut("attach")?.attach_file(path)?.file_name.clone();
        self.telemetry.record(TelemetryEvent::AttachmentAdded {
            file_name: file_name.clone(),
            timestamp: Instant::now(),
        });
        Ok(file_name)
    }

    /// Remove an attachment by index, returning its file name
    pub fn detach(&mut self, index: usize) -> Result<String> {
        let removed = self.report_mut("detach")?.detach(index)?;
        self.telemetry.record(TelemetryEvent::AttachmentRemoved {
            file_name: removed.file_name.clone(),
            timestamp: Instant::now(),
        });
        Ok(removed.file_name)
    }

    /// Submit the report and move to the meal step
    ///
    /// Refused unless every required field is set.
    pub fn submit_report(&mut self) -> Result<WizardStep> {
        self.step().transition(WizardEvent::ReportSubmitted)?;

        let built = match &self.state {
            SessionState::CollectingReport(collector) => collector.build(),
            _ => return Err(self.wrong_step("submit")),
        };

        let report = built.map_err(|e| self.withheld("submit", e))?;
        self.replace_state(SessionState::CollectingMeals {
            report,
            meals: MealCollector::new(),
        });
        Ok(self.step())
    }

    // Meal step

    pub fn set_meal_type(&mut self, meal_type: MealType) -> Result<()> {
        self.meals_mut("type")?.set_meal_type(meal_type);
        Ok(())
    }

    pub fn set_meal_time(&mut self, raw: &str) -> Result<()> {
        self.meals_mut("time")?.set_time(raw)
    }

    /// Add a catalog food by name
    pub fn add_food(&mut self, name: &str) -> Result<MealItem> {
        let item = self
            .catalog
            .find(name)
            .map(|food| food.to_meal_item())
            .ok_or_else(|| WizardError::UnknownFood(name.to_string()))?;
        self.add_item(item.clone())?;
        Ok(item)
    }

    /// Add an arbitrary item to the in-progress meal
    pub fn add_item(&mut self, item: MealItem) -> Result<()> {
        let (name, calories) = (item.name.clone(), item.calories);
        self.meals_mut("add")?.add_item(item);
        self.telemetry.record(TelemetryEvent::ItemAdded {
            name,
            calories,
            timestamp: Instant::now(),
        });
        Ok(())
    }

    pub fn remove_item(&mut self, index: usize) -> Result<MealItem> {
        let removed = self.meals_mut("remove")?.remove_item(index)?;
        self.telemetry.record(TelemetryEvent::ItemRemoved {
            name: removed.name.clone(),
            timestamp: Instant::now(),
        });
        Ok(removed)
    }

    /// Commit the in-progress meal, returning the committed count
    pub fn commit_meal(&mut self) -> Result<usize> {
        let meals = self.meals_mut("commit")?;
        let (items, calories) = (meals.current().items.len(), meals.current_calories());

        let committed = meals.commit_meal();
        let count = committed.map_err(|e| self.withheld("commit", e))?;
        self.telemetry.record(TelemetryEvent::MealCommitted {
            items,
            calories,
            timestamp: Instant::now(),
        });
        Ok(count)
    }

    /// Hand the committed meals to the analyzer and show the result
    ///
    /// Refused while no meal has been committed.
    pub fn finalize_meals(&mut self) -> Result<WizardStep> {
        self.finalize(false)
    }

    /// Like `finalize_meals`, but also allowed with zero committed meals
    pub fn force_analysis(&mut self) -> Result<WizardStep> {
        self.finalize(true)
    }

    fn finalize(&mut self, force: bool) -> Result<WizardStep> {
        self.step().transition(WizardEvent::MealsFinalized)?;

        let outcome = match &self.state {
            SessionState::CollectingMeals { report, meals } => {
                let committed = if force {
                    Ok(meals.committed().to_vec())
                } else {
                    meals.finalize()
                };
                committed.map(|committed| (report.clone(), committed))
            }
            _ => return Err(self.wrong_step("analyze")),
        };

        let (report, meals) = outcome.map_err(|e| self.withheld("analyze", e))?;
        if force && meals.is_empty() {
            tracing::warn!("analysis forced with no meals recorded");
        }

        let analysis = self.analyzer.compute_analysis(&report, &meals);
        self.replace_state(SessionState::ShowingAnalysis {
            report,
            meals,
            analysis,
        });
        Ok(self.step())
    }

    // Analysis step

    /// Snapshot of a finished session
    pub fn snapshot(&self) -> Result<SessionSnapshot> {
        match &self.state {
            SessionState::ShowingAnalysis {
                report,
                meals,
                analysis,
            } => Ok(SessionSnapshot {
                session_id: self.session_id,
                exported_at: Utc::now(),
                report: report.clone(),
                meals: meals.clone(),
                analysis: analysis.clone(),
            }),
            _ => Err(self.wrong_step("export")),
        }
    }

    fn replace_state(&mut self, next: SessionState) {
        let from = self.step();
        self.state = next;
        let to = self.step();

        tracing::info!(session_id = %self.session_id, from = ?from, to = ?to, "wizard step changed");
        self.telemetry.record(TelemetryEvent::StepTransition {
            from: format!("{:?}", from),
            to: format!("{:?}", to),
            timestamp: Instant::now(),
        });
    }

    fn report_mut(&mut self, action: &str) -> Result<&mut ReportCollector> {
        let step = self.step();
        match &mut self.state {
            SessionState::CollectingReport(collector) => Ok(collector),
            _ => Err(WizardError::WrongStep {
                action: action.to_string(),
                step: step.display_name().to_string(),
            }),
        }
    }

    fn meals_mut(&mut self, action: &str) -> Result<&mut MealCollector> {
        let step = self.step();
        match &mut self.state {
            SessionState::CollectingMeals { meals, .. } => Ok(meals),
            _ => Err(WizardError::WrongStep {
                action: action.to_string(),
                step: step.display_name().to_string(),
            }),
        }
    }

    fn wrong_step(&self, action: &str) -> WizardError {
        WizardError::WrongStep {
            action: action.to_string(),
            step: self.step().display_name().to_string(),
        }
    }

    /// Record a refused action and pass the error through
    fn withheld(&mut self, action: &str, err: WizardError) -> WizardError {
        if err.is_withheld() {
            tracing::info!(action, reason = %err, "action withheld");
            self.telemetry.record(TelemetryEvent::ActionWithheld {
                action: action.to_string(),
                reason: err.to_string(),
                timestamp: Instant::now(),
            });
        }
        err
    }
}

impl Default for WizardController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::NutrientRange;
    use crate::types::Nutrient;

    fn fill_report(controller: &mut WizardController) {
        for (field, value) in [
            ("age", "30"),
            ("gender", "male"),
            ("weight", "70"),
            ("height", "175"),
            ("blood_pressure", "120/80"),
            ("blood_sugar", "90"),
            ("last_test_date", "2024-01-01"),
        ] {
            controller.set_field(field, value).unwrap();
        }
        for range in NutrientRange::all() {
            controller
                .set_field(range.nutrient.key(), &range.max.to_string())
                .unwrap();
        }
    }

    #[test]
    fn test_initial_state() {
        let controller = WizardController::new();
        assert_eq!(controller.step(), WizardStep::CollectingReport);
        assert!(controller.report_collector().is_some());
        assert!(controller.report().is_none());
        assert!(controller.analysis().is_none());
        assert!(controller.committed_meals().is_empty());
    }

    #[test]
    fn test_incomplete_report_stays_in_report_step() {
        let mut controller = WizardController::new();
        fill_report(&mut controller);
        controller.clear_field("magnesium").unwrap();

        let err = controller.submit_report().unwrap_err();
        assert!(matches!(err, WizardError::MissingFields(ref f) if f == &vec!["magnesium".to_string()]));
        assert_eq!(controller.step(), WizardStep::CollectingReport);
        assert_eq!(controller.telemetry().get_stats().actions_withheld, 1);
    }

    #[test]
    fn test_submit_report_moves_to_meals() {
        let mut controller = WizardController::new();
        fill_report(&mut controller);

        assert_eq!(controller.submit_report().unwrap(), WizardStep::CollectingMeals);
        assert_eq!(controller.report().unwrap().nutrients.get(Nutrient::Iron), 170.0);
        assert!(controller.report_collector().is_none());
        assert!(controller.meal_collector().is_some());
    }

    #[test]
    fn test_report_edits_refused_after_submit() {
        let mut controller = WizardController::new();
        fill_report(&mut controller);
        controller.submit_report().unwrap();

        assert!(matches!(
            controller.set_field("age", "31"),
            Err(WizardError::WrongStep { .. })
        ));
        assert!(matches!(
            controller.submit_report(),
            Err(WizardError::InvalidTransition { .. })
        ));
        assert_eq!(controller.report().unwrap().age, 30);
    }

    #[test]
    fn test_collector_access_matches_step() {
        let mut controller = WizardController::new();
        assert!(controller.report_collector_mut().is_ok());
        assert!(matches!(
            controller.meal_collector_mut(),
            Err(WizardError::WrongStep { .. })
        ));

        fill_report(&mut controller);
        controller.submit_report().unwrap();
        assert!(controller.report_collector_mut().is_err());
        controller.meal_collector_mut().unwrap().add_item(MealItem::new("Tea", "1 cup", 2));
        assert_eq!(controller.meal_collector().unwrap().current_calories(), 2);
    }

    #[test]
    fn test_meal_actions_refused_before_report() {
        let mut controller = WizardController::new();
        assert!(controller.add_food("Apple").is_err());
        assert!(controller.commit_meal().is_err());
        assert!(matches!(
            controller.finalize_meals(),
            Err(WizardError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_finalize_without_meals_refused() {
        let mut controller = WizardController::new();
        fill_report(&mut controller);
        controller.submit_report().unwrap();

        controller.add_food("Banana").unwrap();
        assert!(matches!(
            controller.finalize_meals(),
            Err(WizardError::NoMealsCommitted)
        ));
        assert_eq!(controller.step(), WizardStep::CollectingMeals);
    }

    #[test]
    fn test_force_analysis_with_no_meals() {
        let mut controller = WizardController::new();
        fill_report(&mut controller);
        controller.submit_report().unwrap();

        assert_eq!(controller.force_analysis().unwrap(), WizardStep::ShowingAnalysis);
        assert!(controller.committed_meals().is_empty());
        assert!(controller.analysis().is_some());
    }

    #[test]
    fn test_full_flow() {
        let mut controller = WizardController::new();
        fill_report(&mut controller);
        controller.submit_report().unwrap();

        controller.set_meal_type(MealType::Snack).unwrap();
        controller.set_meal_time("15:45").unwrap();
        let item = controller.add_food("apple").unwrap();
        assert_eq!(item.calories, 95);
        assert_eq!(controller.commit_meal().unwrap(), 1);

        assert_eq!(controller.finalize_meals().unwrap(), WizardStep::ShowingAnalysis);
        let analysis = controller.analysis().unwrap();
        assert_eq!(analysis.nutritional_status.category, "Generally Balanced Diet");
        assert_eq!(controller.committed_meals()[0].meal_type, MealType::Snack);

        let stats = controller.telemetry().get_stats();
        assert_eq!(stats.step_transitions, 2);
        assert_eq!(stats.meals_committed, 1);
        assert_eq!(stats.calories_committed, 95);
    }

    #[test]
    fn test_terminal_state_refuses_everything() {
        let mut controller = WizardController::new();
        fill_report(&mut controller);
        controller.submit_report().unwrap();
        controller.add_food("Eggs").unwrap();
        controller.commit_meal().unwrap();
        controller.finalize_meals().unwrap();

        assert!(controller.submit_report().is_err());
        assert!(controller.finalize_meals().is_err());
        assert!(controller.add_food("Eggs").is_err());
        assert_eq!(controller.step(), WizardStep::ShowingAnalysis);
    }

    #[test]
    fn test_unknown_food() {
        let mut controller = WizardController::new();
        fill_report(&mut controller);
        controller.submit_report().unwrap();

        assert!(matches!(
            controller.add_food("Pizza"),
            Err(WizardError::UnknownFood(_))
        ));
        assert!(controller.meal_collector().unwrap().current().items.is_empty());
    }

    #[test]
    fn test_snapshot_only_when_finished() {
        let mut controller = WizardController::new();
        assert!(controller.snapshot().is_err());

        fill_report(&mut controller);
        controller.submit_report().unwrap();
        controller.add_food("Oatmeal").unwrap();
        controller.commit_meal().unwrap();
        controller.finalize_meals().unwrap();

        let snapshot = controller.snapshot().unwrap();
        assert_eq!(snapshot.session_id, controller.session_id());
        assert_eq!(snapshot.meals.len(), 1);
        assert_eq!(snapshot.report.age, 30);
    }

    struct CountingAnalyzer;

    impl HealthAnalyzer for CountingAnalyzer {
        fn compute_analysis(&self, _report: &UserReport, meals: &[MealEntry]) -> HealthAnalysis {
            let mut analysis = crate::wizard::analysis::sample_analysis();
            analysis.nutritional_status.category = format!("{} meals", meals.len());
            analysis
        }

        fn name(&self) -> &'static str {
            "counting"
        }
    }

    #[test]
    fn test_custom_analyzer_substitution() {
        let mut controller = WizardController::with_analyzer(Box::new(CountingAnalyzer));
        fill_report(&mut controller);
        controller.submit_report().unwrap();
        for food in ["Eggs", "Spinach"] {
            controller.add_food(food).unwrap();
            controller.commit_meal().unwrap();
        }
        controller.finalize_meals().unwrap();

        assert_eq!(controller.analysis().unwrap().nutritional_status.category, "2 meals");
    }
}

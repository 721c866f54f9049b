//! Report collector
//!
//! Holds a partially filled health report (the draft) and the attached
//! files. Edits are field-level; `build` only succeeds once every required
//! field is present. Nutrient values outside their reference range are
//! accepted and surfaced as warnings.

use crate::errors::{Result, WizardError};
use crate::reference::ranges::{out_of_range, NutrientRange, RangeStatus};
use crate::types::{Gender, MedicalReport, Nutrient, NutrientPanel, UserReport};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// Addressable report fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportField {
    Age,
    Gender,
    Weight,
    Height,
    BloodPressure,
    BloodSugar,
    Cholesterol,
    ExistingConditions,
    LastTestDate,
    Nutrient(Nutrient),
}

impl ReportField {
    /// All fields in form order
    pub fn all() -> Vec<ReportField> {
        let mut fields = vec![
            ReportField::Age,
            ReportField::Gender,
            ReportField::Weight,
            ReportField::Height,
            ReportField::BloodPressure,
            ReportField::BloodSugar,
            ReportField::Cholesterol,
            ReportField::ExistingConditions,
            ReportField::LastTestDate,
        ];
        fields.extend(Nutrient::ALL.into_iter().map(ReportField::Nutrient));
        fields
    }

    /// Fields that must be set before the report can be submitted
    pub fn required() -> Vec<ReportField> {
        Self::all().into_iter().filter(|f| f.is_required()).collect()
    }

    pub fn is_required(&self) -> bool {
        !matches!(self, ReportField::Cholesterol | ReportField::ExistingConditions)
    }

    pub fn key(&self) -> &'static str {
        match self {
            ReportField::Age => "age",
            ReportField::Gender => "gender",
            ReportField::Weight => "weight",
            ReportField::Height => "height",
            ReportField::BloodPressure => "blood_pressure",
            ReportField::BloodSugar => "blood_sugar",
            ReportField::Cholesterol => "cholesterol",
            ReportField::ExistingConditions => "conditions",
            ReportField::LastTestDate => "last_test_date",
            ReportField::Nutrient(n) => n.key(),
        }
    }

    /// Hint shown next to the field in the report view
    pub fn hint(&self) -> String {
        match self {
            ReportField::Age => "years".to_string(),
            ReportField::Gender => "male | female | other".to_string(),
            ReportField::Weight => "kg".to_string(),
            ReportField::Height => "cm".to_string(),
            ReportField::BloodPressure => "e.g. 120/80".to_string(),
            ReportField::BloodSugar => "mg/dL".to_string(),
            ReportField::Cholesterol => "mg/dL, optional".to_string(),
            ReportField::ExistingConditions => "comma separated, optional".to_string(),
            ReportField::LastTestDate => "YYYY-MM-DD".to_string(),
            ReportField::Nutrient(n) => {
                format!("normal range {}", NutrientRange::for_nutrient(*n).describe())
            }
        }
    }

    /// Parse a field name as typed by the user
    ///
    /// Accepts snake_case, camelCase and a few short aliases.
    pub fn parse(name: &str) -> Result<ReportField> {
        let normalized: String = name
            .chars()
            .filter(|c| !matches!(c, '_' | ' ' | '-'))
            .collect::<String>()
            .to_lowercase();

        let field = match normalized.as_str() {
            "age" => ReportField::Age,
            "gender" | "sex" => ReportField::Gender,
            "weight" => ReportField::Weight,
            "height" => ReportField::Height,
            "bloodpressure" | "bp" => ReportField::BloodPressure,
            "bloodsugar" | "glucose" => ReportField::BloodSugar,
            "cholesterol" => ReportField::Cholesterol,
            "conditions" | "existingconditions" => ReportField::ExistingConditions,
            "lasttestdate" | "testdate" | "date" => ReportField::LastTestDate,
            _ => Nutrient::from_key(&normalized)
                .map(ReportField::Nutrient)
                .ok_or_else(|| WizardError::UnknownField(name.to_string()))?,
        };

        Ok(field)
    }
}

impl fmt::Display for ReportField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Partially filled health report
///
/// This is also the `report` section of an intake file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportDraft {
    pub age: Option<u32>,
    pub gender: Option<Gender>,
    pub weight: Option<f64>,
    pub height: Option<f64>,
    pub blood_pressure: Option<String>,
    pub blood_sugar: Option<f64>,
    pub cholesterol: Option<f64>,
    pub existing_conditions: Vec<String>,
    pub last_test_date: Option<NaiveDate>,
    pub nutrients: BTreeMap<Nutrient, f64>,
}

impl ReportDraft {
    fn is_set(&self, field: ReportField) -> bool {
        match field {
            ReportField::Age => self.age.is_some(),
            ReportField::Gender => self.gender.is_some(),
            ReportField::Weight => self.weight.is_some(),
            ReportField::Height => self.height.is_some(),
            ReportField::BloodPressure => self.blood_pressure.is_some(),
            ReportField::BloodSugar => self.blood_sugar.is_some(),
            ReportField::Cholesterol => self.cholesterol.is_some(),
            ReportField::ExistingConditions => !self.existing_conditions.is_empty(),
            ReportField::LastTestDate => self.last_test_date.is_some(),
            ReportField::Nutrient(n) => self.nutrients.contains_key(&n),
        }
    }

    /// Current value of a field, formatted for display
    pub fn display_value(&self, field: ReportField) -> Option<String> {
        match field {
            ReportField::Age => self.age.map(|v| v.to_string()),
            ReportField::Gender => self.gender.map(|g| g.to_string()),
            ReportField::Weight => self.weight.map(|v| v.to_string()),
            ReportField::Height => self.height.map(|v| v.to_string()),
            ReportField::BloodPressure => self.blood_pressure.clone(),
            ReportField::BloodSugar => self.blood_sugar.map(|v| v.to_string()),
            ReportField::Cholesterol => self.cholesterol.map(|v| v.to_string()),
            ReportField::ExistingConditions => {
                if self.existing_conditions.is_empty() {
                    None
                } else {
                    Some(self.existing_conditions.join(", "))
                }
            }
            ReportField::LastTestDate => self.last_test_date.map(|d| d.to_string()),
            ReportField::Nutrient(n) => self.nutrients.get(&n).map(|v| v.to_string()),
        }
    }
}

/// Collector for the report step
#[derive(Debug, Clone, Default)]
pub struct ReportCollector {
    draft: ReportDraft,
    attachments: Vec<MedicalReport>,
}

impl ReportCollector {
    /// Create an empty collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing draft
    ///
    /// Values are checked the same way as field edits.
    pub fn from_draft(draft: ReportDraft) -> Result<Self> {
        let mut collector = Self::new();

        if let Some(age) = draft.age {
            collector.set_age(age)?;
        }
        collector.draft.gender = draft.gender;
        if let Some(weight) = draft.weight {
            collector.set_weight(weight)?;
        }
        if let Some(height) = draft.height {
            collector.set_height(height)?;
        }
        if let Some(bp) = draft.blood_pressure {
            collector.set_blood_pressure(&bp)?;
        }
        if let Some(sugar) = draft.blood_sugar {
            collector.set_blood_sugar(sugar)?;
        }
        if let Some(cholesterol) = draft.cholesterol {
            collector.set_cholesterol(cholesterol)?;
        }
        collector.set_conditions(draft.existing_conditions);
        collector.draft.last_test_date = draft.last_test_date;
        for (nutrient, value) in draft.nutrients {
            collector.set_nutrient(nutrient, value)?;
        }

        Ok(collector)
    }

    pub fn draft(&self) -> &ReportDraft {
        &self.draft
    }

    /// Set a field from user text
    ///
    /// On a parse failure the draft is left unchanged.
    pub fn set_field(&mut self, name: &str, raw: &str) -> Result<ReportField> {
        let field = ReportField::parse(name)?;
        self.set(field, raw)?;
        Ok(field)
    }

    /// Set a known field from user text
    pub fn set(&mut self, field: ReportField, raw: &str) -> Result<()> {
        let key = field.key();
        let value = raw.trim();

        match field {
            ReportField::Age => {
                let age = value
                    .parse::<u32>()
                    .map_err(|e| WizardError::invalid_field(key, raw, e.to_string()))?;
                self.set_age(age)?;
            }
            ReportField::Gender => self.draft.gender = Some(value.parse()?),
            ReportField::Weight => self.set_weight(parse_number(key, raw)?)?,
            ReportField::Height => self.set_height(parse_number(key, raw)?)?,
            ReportField::BloodPressure => self.set_blood_pressure(value)?,
            ReportField::BloodSugar => self.set_blood_sugar(parse_number(key, raw)?)?,
            ReportField::Cholesterol => self.set_cholesterol(parse_number(key, raw)?)?,
            ReportField::ExistingConditions => {
                self.set_conditions(value.split(',').map(str::to_string).collect())
            }
            ReportField::LastTestDate => {
                let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
                    .map_err(|e| WizardError::invalid_field(key, raw, e.to_string()))?;
                self.draft.last_test_date = Some(date);
            }
            ReportField::Nutrient(n) => self.set_nutrient(n, parse_number(key, raw)?)?,
        }

        tracing::debug!(field = key, "report field set");
        Ok(())
    }

    /// Clear a field by name
    pub fn clear_field(&mut self, name: &str) -> Result<ReportField> {
        let field = ReportField::parse(name)?;
        match field {
            ReportField::Age => self.draft.age = None,
            ReportField::Gender => self.draft.gender = None,
            ReportField::Weight => self.draft.weight = None,
            ReportField::Height => self.draft.height = None,
            ReportField::BloodPressure => self.draft.blood_pressure = None,
            ReportField::BloodSugar => self.draft.blood_sugar = None,
            ReportField::Cholesterol => self.draft.cholesterol = None,
            ReportField::ExistingConditions => self.draft.existing_conditions.clear(),
            ReportField::LastTestDate => self.draft.last_test_date = None,
            ReportField::Nutrient(n) => {
                self.draft.nutrients.remove(&n);
            }
        }
        Ok(field)
    }

    pub fn set_age(&mut self, age: u32) -> Result<()> {
        if age == 0 {
            return Err(WizardError::invalid_field("age", "0", "must be positive"));
        }
        self.draft.age = Some(age);
        Ok(())
    }

    pub fn set_gender(&mut self, gender: Gender) {
        self.draft.gender = Some(gender);
    }

    pub fn set_weight(&mut self, kg: f64) -> Result<()> {
        self.draft.weight = Some(check_positive("weight", kg)?);
        Ok(())
    }

    pub fn set_height(&mut self, cm: f64) -> Result<()> {
        self.draft.height = Some(check_positive("height", cm)?);
        Ok(())
    }

    pub fn set_blood_pressure(&mut self, reading: &str) -> Result<()> {
        let reading = reading.trim();
        if reading.is_empty() {
            return Err(WizardError::invalid_field("blood_pressure", reading, "must not be empty"));
        }
        self.draft.blood_pressure = Some(reading.to_string());
        Ok(())
    }

    pub fn set_blood_sugar(&mut self, mg_dl: f64) -> Result<()> {
        self.draft.blood_sugar = Some(check_finite("blood_sugar", mg_dl)?);
        Ok(())
    }

    pub fn set_cholesterol(&mut self, value: f64) -> Result<()> {
        self.draft.cholesterol = Some(check_finite("cholesterol", value)?);
        Ok(())
    }

    /// Replace the condition list; blank entries are dropped
    pub fn set_conditions(&mut self, conditions: Vec<String>) {
        self.draft.existing_conditions = conditions
            .into_iter()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect();
    }

    pub fn set_last_test_date(&mut self, date: NaiveDate) {
        self.draft.last_test_date = Some(date);
    }

    /// Set a nutrient lab value
    ///
    /// Any finite value is accepted, including ones outside the
    /// reference range.
    pub fn set_nutrient(&mut self, nutrient: Nutrient, value: f64) -> Result<()> {
        let value = check_finite(nutrient.key(), value)?;
        self.draft.nutrients.insert(nutrient, value);
        Ok(())
    }

    /// Append an attachment, returning the new count
    pub fn attach(&mut self, report: MedicalReport) -> usize {
        tracing::debug!(file = %report.file_name, bytes = report.size_bytes, "attachment added");
        self.attachments.push(report);
        self.attachments.len()
    }

    /// Read a file from disk and attach it
    pub fn attach_file(&mut self, path: &Path) -> Result<&MedicalReport> {
        let report = MedicalReport::from_path(path)?;
        self.attach(report);
        Ok(&self.attachments[self.attachments.len() - 1])
    }

    /// Remove the attachment at `index`, keeping the order of the rest
    pub fn detach(&mut self, index: usize) -> Result<MedicalReport> {
        if index >= self.attachments.len() {
            return Err(WizardError::IndexOutOfRange {
                index,
                len: self.attachments.len(),
            });
        }
        Ok(self.attachments.remove(index))
    }

    pub fn attachments(&self) -> &[MedicalReport] {
        &self.attachments
    }

    /// Required fields not yet set, in form order
    pub fn missing_fields(&self) -> Vec<ReportField> {
        ReportField::required()
            .into_iter()
            .filter(|f| !self.draft.is_set(*f))
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// Nutrients set so far that fall outside their reference range
    pub fn range_warnings(&self) -> Vec<(NutrientRange, f64, RangeStatus)> {
        out_of_range(self.draft.nutrients.iter().map(|(nutrient, value)| (*nutrient, *value)))
    }

    /// Assemble the report
    ///
    /// Fails with `MissingFields` listing every required field not yet set.
    pub fn build(&self) -> Result<UserReport> {
        let draft = &self.draft;
        let (
            Some(age),
            Some(gender),
            Some(weight),
            Some(height),
            Some(blood_pressure),
            Some(blood_sugar),
            Some(last_test_date),
        ) = (
            draft.age,
            draft.gender,
            draft.weight,
            draft.height,
            draft.blood_pressure.clone(),
            draft.blood_sugar,
            draft.last_test_date,
        )
        else {
            return Err(self.missing_error());
        };

        if !self.is_complete() {
            return Err(self.missing_error());
        }

        let mut nutrients = NutrientPanel::default();
        for (nutrient, value) in &draft.nutrients {
            nutrients.set(*nutrient, *value);
        }

        Ok(UserReport {
            age,
            gender,
            weight,
            height,
            blood_pressure,
            blood_sugar,
            cholesterol: draft.cholesterol,
            existing_conditions: draft.existing_conditions.clone(),
            last_test_date,
            nutrients,
            medical_reports: self.attachments.clone(),
        })
    }

    fn missing_error(&self) -> WizardError {
        WizardError::MissingFields(
            self.missing_fields()
                .iter()
                .map(|f| f.key().to_string())
                .collect(),
        )
    }
}

fn parse_number(field: &str, raw: &str) -> Result<f64> {
    raw.trim()
        .parse::<f64>()
        .map_err(|e| WizardError::invalid_field(field, raw, e.to_string()))
}

fn check_finite(field: &str, value: f64) -> Result<f64> {
    if !value.is_finite() {
        return Err(WizardError::invalid_field(field, &value.to_string(), "must be a finite number"));
    }
    Ok(value)
}

fn check_positive(field: &str, value: f64) -> Result<f64> {
    let value = check_finite(field, value)?;
    if value <= 0.0 {
        return Err(WizardError::invalid_field(field, &value.to_string(), "must be positive"));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AttachmentKind;

    fn complete_collector() -> ReportCollector {
        let mut collector = ReportCollector::new();
        collector.set_field("age", "30").unwrap();
        collector.set_field("gender", "male").unwrap();
        collector.set_field("weight", "70").unwrap();
        collector.set_field("height", "175").unwrap();
        collector.set_field("bloodPressure", "120/80").unwrap();
        collector.set_field("bloodSugar", "90").unwrap();
        collector.set_field("lastTestDate", "2024-01-01").unwrap();
        for range in NutrientRange::all() {
            collector.set_nutrient(range.nutrient, range.min).unwrap();
        }
        collector
    }

    #[test]
    fn test_empty_collector_missing_all_required() {
        let collector = ReportCollector::new();
        let missing = collector.missing_fields();
        assert_eq!(missing.len(), 15);
        assert_eq!(missing[0], ReportField::Age);
        assert!(!missing.contains(&ReportField::Cholesterol));
        assert!(!missing.contains(&ReportField::ExistingConditions));
    }

    #[test]
    fn test_build_complete_report() {
        let collector = complete_collector();
        assert!(collector.is_complete());

        let report = collector.build().unwrap();
        assert_eq!(report.age, 30);
        assert_eq!(report.gender, Gender::Male);
        assert_eq!(report.blood_pressure, "120/80");
        assert_eq!(report.last_test_date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(report.nutrients.vitamin_d, 20.0);
        assert!(report.cholesterol.is_none());
    }

    #[test]
    fn test_build_reports_every_missing_field() {
        let mut collector = complete_collector();
        collector.clear_field("iron").unwrap();
        collector.clear_field("age").unwrap();

        match collector.build() {
            Err(WizardError::MissingFields(fields)) => {
                assert_eq!(fields, vec!["age".to_string(), "iron".to_string()]);
            }
            other => panic!("expected MissingFields, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_value_leaves_draft_unchanged() {
        let mut collector = ReportCollector::new();
        collector.set_field("weight", "70").unwrap();

        assert!(matches!(
            collector.set_field("weight", "heavy"),
            Err(WizardError::InvalidField { .. })
        ));
        assert!(collector.set_field("weight", "-3").is_err());
        assert_eq!(collector.draft().weight, Some(70.0));
    }

    #[test]
    fn test_age_must_be_positive_integer() {
        let mut collector = ReportCollector::new();
        assert!(collector.set_field("age", "0").is_err());
        assert!(collector.set_field("age", "29.5").is_err());
        assert!(collector.set_field("age", "29").is_ok());
    }

    #[test]
    fn test_unknown_field() {
        let mut collector = ReportCollector::new();
        assert!(matches!(
            collector.set_field("shoe_size", "42"),
            Err(WizardError::UnknownField(_))
        ));
    }

    #[test]
    fn test_field_name_aliases() {
        assert_eq!(ReportField::parse("bp").unwrap(), ReportField::BloodPressure);
        assert_eq!(ReportField::parse("blood_sugar").unwrap(), ReportField::BloodSugar);
        assert_eq!(
            ReportField::parse("vitaminB12").unwrap(),
            ReportField::Nutrient(Nutrient::VitaminB12)
        );
    }

    #[test]
    fn test_conditions_split_and_trimmed() {
        let mut collector = ReportCollector::new();
        collector.set_field("conditions", "asthma, , hypothyroidism ").unwrap();
        assert_eq!(
            collector.draft().existing_conditions,
            vec!["asthma".to_string(), "hypothyroidism".to_string()]
        );
    }

    #[test]
    fn test_out_of_range_nutrient_accepted_with_warning() {
        let mut collector = complete_collector();
        collector.set_field("vitamin_d", "5").unwrap();

        let warnings = collector.range_warnings();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].0.nutrient, Nutrient::VitaminD);
        assert_eq!(warnings[0].2, RangeStatus::Below);
        assert!(collector.build().is_ok());
    }

    #[test]
    fn test_attach_and_detach_preserve_order() {
        let mut collector = ReportCollector::new();
        for name in ["a.pdf", "b.png", "c.jpg"] {
            collector.attach(MedicalReport::from_bytes(name, vec![0]).unwrap());
        }

        let removed = collector.detach(1).unwrap();
        assert_eq!(removed.file_name, "b.png");

        let names: Vec<&str> = collector.attachments().iter().map(|r| r.file_name.as_str()).collect();
        assert_eq!(names, vec!["a.pdf", "c.jpg"]);
        assert_eq!(collector.attachments()[1].kind, AttachmentKind::Jpeg);
    }

    #[test]
    fn test_detach_out_of_range() {
        let mut collector = ReportCollector::new();
        assert!(matches!(
            collector.detach(0),
            Err(WizardError::IndexOutOfRange { index: 0, len: 0 })
        ));
    }

    #[test]
    fn test_attachments_carried_into_report() {
        let mut collector = complete_collector();
        collector.attach(MedicalReport::from_bytes("labs.pdf", vec![1, 2]).unwrap());
        let report = collector.build().unwrap();
        assert_eq!(report.medical_reports.len(), 1);
    }

    #[test]
    fn test_from_draft_validates() {
        let draft = ReportDraft {
            weight: Some(-1.0),
            ..Default::default()
        };
        assert!(ReportCollector::from_draft(draft).is_err());

        let draft = ReportDraft {
            age: Some(41),
            gender: Some(Gender::Female),
            ..Default::default()
        };
        let collector = ReportCollector::from_draft(draft).unwrap();
        assert_eq!(collector.draft().age, Some(41));
        assert!(!collector.is_complete());
    }

    #[test]
    fn test_display_value() {
        let collector = complete_collector();
        assert_eq!(
            collector.draft().display_value(ReportField::LastTestDate),
            Some("2024-01-01".to_string())
        );
        assert_eq!(collector.draft().display_value(ReportField::Cholesterol), None);
    }
}

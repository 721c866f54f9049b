//! Health analysis
//!
//! `HealthAnalyzer` is the seam between the wizard and whatever produces the
//! final analysis. The shipped `StaticAnalyzer` ignores its inputs and
//! returns a fixed sample result.

use crate::types::{
    Deficiency, HealthAnalysis, MealEntry, NutritionalStatus, PotentialRisk, RiskLevel, Severity,
    UserReport,
};

/// Produces the analysis shown in the last wizard step
pub trait HealthAnalyzer {
    fn compute_analysis(&self, report: &UserReport, meals: &[MealEntry]) -> HealthAnalysis;

    /// Name used in logs
    fn name(&self) -> &'static str;
}

/// Analyzer returning the fixed sample analysis
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticAnalyzer;

impl HealthAnalyzer for StaticAnalyzer {
    fn compute_analysis(&self, _report: &UserReport, _meals: &[MealEntry]) -> HealthAnalysis {
        sample_analysis()
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// The fixed analysis returned by `StaticAnalyzer`
pub fn sample_analysis() -> HealthAnalysis {
    HealthAnalysis {
        nutritional_status: NutritionalStatus {
            category: "Generally Balanced Diet".to_string(),
            description: "Your diet shows a good balance of major nutrients, but there's room for improvement in specific areas.".to_string(),
        },
        deficiencies: vec![
            Deficiency {
                nutrient: "Vitamin D".to_string(),
                severity: Severity::Moderate,
                recommendations: strings(&[
                    "Spend 15-20 minutes in sunlight daily",
                    "Include fatty fish in your diet",
                    "Consider vitamin D fortified foods",
                ]),
            },
            Deficiency {
                nutrient: "Iron".to_string(),
                severity: Severity::Low,
                recommendations: strings(&[
                    "Increase intake of lean red meat",
                    "Consume more leafy greens",
                    "Pair iron-rich foods with vitamin C sources",
                ]),
            },
        ],
        potential_risks: vec![
            PotentialRisk {
                condition: "Type 2 Diabetes".to_string(),
                risk_level: RiskLevel::Low,
                preventive_measures: strings(&[
                    "Maintain current balanced diet",
                    "Regular exercise",
                    "Monitor sugar intake",
                ]),
            },
            PotentialRisk {
                condition: "Hypertension".to_string(),
                risk_level: RiskLevel::Moderate,
                preventive_measures: strings(&[
                    "Reduce sodium intake",
                    "Increase potassium-rich foods",
                    "Regular blood pressure monitoring",
                ]),
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Gender, NutrientPanel};
    use chrono::NaiveDate;

    fn report(age: u32) -> UserReport {
        UserReport {
            age,
            gender: Gender::Other,
            weight: 60.0,
            height: 160.0,
            blood_pressure: "110/70".to_string(),
            blood_sugar: 85.0,
            cholesterol: None,
            existing_conditions: vec![],
            last_test_date: NaiveDate::from_ymd_opt(2023, 6, 1).unwrap(),
            nutrients: NutrientPanel::default(),
            medical_reports: vec![],
        }
    }

    #[test]
    fn test_sample_analysis_shape() {
        let analysis = sample_analysis();
        assert_eq!(analysis.nutritional_status.category, "Generally Balanced Diet");
        assert_eq!(analysis.deficiencies.len(), 2);
        assert_eq!(analysis.potential_risks.len(), 2);
        assert_eq!(analysis.deficiencies[0].nutrient, "Vitamin D");
        assert_eq!(analysis.deficiencies[0].severity, Severity::Moderate);
        assert_eq!(analysis.potential_risks[1].risk_level, RiskLevel::Moderate);
        assert!(analysis.deficiencies.iter().all(|d| d.recommendations.len() == 3));
    }

    #[test]
    fn test_static_analyzer_ignores_input() {
        let analyzer = StaticAnalyzer;
        let a = analyzer.compute_analysis(&report(20), &[]);
        let b = analyzer.compute_analysis(&report(80), &[MealEntry::default()]);
        assert_eq!(a, b);
        assert_eq!(a, sample_analysis());
    }
}

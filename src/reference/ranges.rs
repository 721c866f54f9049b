//! Nutrient reference ranges
//!
//! Healthy lab ranges per nutrient. These are guidance only: a value outside
//! its range is still accepted by the report collector.

use crate::types::Nutrient;

/// Where a value falls relative to its reference range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeStatus {
    Below,
    Within,
    Above,
}

/// Reference range for one nutrient
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NutrientRange {
    pub nutrient: Nutrient,
    pub min: f64,
    pub max: f64,
    pub unit: &'static str,
}

impl NutrientRange {
    /// Reference range for a nutrient
    pub fn for_nutrient(nutrient: Nutrient) -> NutrientRange {
        let (min, max, unit) = match nutrient {
            Nutrient::VitaminD => (20.0, 50.0, "ng/mL"),
            Nutrient::VitaminB12 => (200.0, 900.0, "pg/mL"),
            Nutrient::Iron => (60.0, 170.0, "μg/dL"),
            Nutrient::Calcium => (8.5, 10.5, "mg/dL"),
            Nutrient::Protein => (6.0, 8.3, "g/dL"),
            Nutrient::Zinc => (60.0, 120.0, "μg/dL"),
            Nutrient::Magnesium => (1.7, 2.2, "mg/dL"),
            Nutrient::FolicAcid => (2.0, 20.0, "ng/mL"),
        };

        NutrientRange { nutrient, min, max, unit }
    }

    /// All ranges in display order
    pub fn all() -> Vec<NutrientRange> {
        Nutrient::ALL.into_iter().map(Self::for_nutrient).collect()
    }

    /// Classify a value; bounds are inclusive
    pub fn classify(&self, value: f64) -> RangeStatus {
        if value < self.min {
            RangeStatus::Below
        } else if value > self.max {
            RangeStatus::Above
        } else {
            RangeStatus::Within
        }
    }

    /// e.g. "20-50 ng/mL"
    pub fn describe(&self) -> String {
        format!("{}-{} {}", self.min, self.max, self.unit)
    }
}

/// Values that fall outside their nutrient's reference range
pub fn out_of_range<I>(values: I) -> Vec<(NutrientRange, f64, RangeStatus)>
where
    I: IntoIterator<Item = (Nutrient, f64)>,
{
    values
        .into_iter()
        .filter_map(|(nutrient, value)| {
            let range = NutrientRange::for_nutrient(nutrient);
            match range.classify(value) {
                RangeStatus::Within => None,
                status => Some((range, value, status)),
            }
        })
        .collect()
}

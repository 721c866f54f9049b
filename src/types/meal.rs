//! Meal entry types

use crate::errors::{Result, WizardError};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Meal slot within a day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    #[default]
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealType {
    pub const ALL: [MealType; 4] = [
        MealType::Breakfast,
        MealType::Lunch,
        MealType::Dinner,
        MealType::Snack,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MealType::Breakfast => "breakfast",
            MealType::Lunch => "lunch",
            MealType::Dinner => "dinner",
            MealType::Snack => "snack",
        }
    }

    /// Capitalized name for headings
    pub fn title(&self) -> &'static str {
        match self {
            MealType::Breakfast => "Breakfast",
            MealType::Lunch => "Lunch",
            MealType::Dinner => "Dinner",
            MealType::Snack => "Snack",
        }
    }
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MealType {
    type Err = WizardError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "breakfast" => Ok(MealType::Breakfast),
            "lunch" => Ok(MealType::Lunch),
            "dinner" => Ok(MealType::Dinner),
            "snack" => Ok(MealType::Snack),
            _ => Err(WizardError::invalid_field(
                "type",
                s,
                "expected breakfast, lunch, dinner or snack",
            )),
        }
    }
}

/// One food item within a meal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealItem {
    pub name: String,
    pub quantity: String,
    pub calories: u32,
}

impl MealItem {
    pub fn new(name: impl Into<String>, quantity: impl Into<String>, calories: u32) -> Self {
        MealItem {
            name: name.into(),
            quantity: quantity.into(),
            calories,
        }
    }
}

/// A recorded meal
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MealEntry {
    pub meal_type: MealType,
    /// `HH:MM`, or empty when not given
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub items: Vec<MealItem>,
}

impl MealEntry {
    pub fn new(meal_type: MealType) -> Self {
        MealEntry {
            meal_type,
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn total_calories(&self) -> u32 {
        self.items.iter().map(|item| item.calories).sum()
    }
}

/// Normalize a meal time to `HH:MM`
///
/// An empty string is allowed and stays empty.
pub fn parse_meal_time(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(String::new());
    }

    NaiveTime::parse_from_str(trimmed, "%H:%M")
        .map(|time| time.format("%H:%M").to_string())
        .map_err(|e| WizardError::invalid_field("time", raw, e.to_string()))
}

//! Meal collector
//!
//! Maintains one in-progress meal and the list of committed meals. The
//! committed list only ever grows, one non-empty meal per commit.

use crate::errors::{Result, WizardError};
use crate::reference::FoodItem;
use crate::types::meal::parse_meal_time;
use crate::types::{MealEntry, MealItem, MealType};

/// Collector for the meal step
#[derive(Debug, Clone, Default)]
pub struct MealCollector {
    current: MealEntry,
    committed: Vec<MealEntry>,
}

impl MealCollector {
    /// Create collector with an empty breakfast in progress
    pub fn new() -> Self {
        Self::default()
    }

    /// The in-progress meal
    pub fn current(&self) -> &MealEntry {
        &self.current
    }

    /// Meals committed so far, oldest first
    pub fn committed(&self) -> &[MealEntry] {
        &self.committed
    }

    pub fn set_meal_type(&mut self, meal_type: MealType) {
        self.current.meal_type = meal_type;
    }

    /// Set the meal time; empty or `HH:MM`
    pub fn set_time(&mut self, raw: &str) -> Result<()> {
        self.current.time = parse_meal_time(raw)?;
        Ok(())
    }

    /// Append an item to the in-progress meal
    pub fn add_item(&mut self, item: MealItem) {
        tracing::debug!(item = %item.name, calories = item.calories, "meal item added");
        self.current.items.push(item);
    }

    /// Append one default portion of a catalog food
    pub fn add_food(&mut self, food: &FoodItem) {
        self.add_item(food.to_meal_item());
    }

    /// Remove the item at `index` from the in-progress meal
    pub fn remove_item(&mut self, index: usize) -> Result<MealItem> {
        if index >= self.current.items.len() {
            return Err(WizardError::IndexOutOfRange {
                index,
                len: self.current.items.len(),
            });
        }
        Ok(self.current.items.remove(index))
    }

    pub fn can_commit(&self) -> bool {
        !self.current.is_empty()
    }

    /// Commit the in-progress meal
    ///
    /// On success the meal is appended, the in-progress meal resets to an
    /// empty breakfast, and the new committed count is returned. An empty
    /// meal is not committed and nothing changes.
    pub fn commit_meal(&mut self) -> Result<usize> {
        if !self.can_commit() {
            return Err(WizardError::EmptyMeal);
        }

        let meal = std::mem::take(&mut self.current);
        tracing::info!(
            meal_type = %meal.meal_type,
            items = meal.items.len(),
            calories = meal.total_calories(),
            "meal committed"
        );
        self.committed.push(meal);
        Ok(self.committed.len())
    }

    pub fn can_finalize(&self) -> bool {
        !self.committed.is_empty()
    }

    /// Hand over the committed meals
    pub fn finalize(&self) -> Result<Vec<MealEntry>> {
        if !self.can_finalize() {
            return Err(WizardError::NoMealsCommitted);
        }
        Ok(self.committed.clone())
    }

    /// Calories of the in-progress meal
    pub fn current_calories(&self) -> u32 {
        self.current.total_calories()
    }

    /// Calories across all committed meals
    pub fn committed_calories(&self) -> u32 {
        self.committed.iter().map(MealEntry::total_calories).sum()
    }
}

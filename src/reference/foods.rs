//! Food catalog for the meal picklist
//!
//! A fixed set of common foods with a calorie value and a default quantity.
//! Lookups are case-insensitive; search keeps catalog order.

use crate::types::MealItem;

/// A catalog entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FoodItem {
    pub name: &'static str,
    pub calories: u32,
    pub default_quantity: &'static str,
}

impl FoodItem {
    /// Meal item for one default portion of this food
    pub fn to_meal_item(&self) -> MealItem {
        MealItem::new(self.name, self.default_quantity, self.calories)
    }
}

const COMMON_FOODS: [FoodItem; 10] = [
    FoodItem { name: "Apple", calories: 95, default_quantity: "1 medium" },
    FoodItem { name: "Banana", calories: 105, default_quantity: "1 medium" },
    FoodItem { name: "Chicken Breast", calories: 165, default_quantity: "100g" },
    FoodItem { name: "Brown Rice", calories: 216, default_quantity: "1 cup cooked" },
    FoodItem { name: "Eggs", calories: 70, default_quantity: "1 large" },
    FoodItem { name: "Salmon", calories: 208, default_quantity: "100g" },
    FoodItem { name: "Spinach", calories: 7, default_quantity: "1 cup raw" },
    FoodItem { name: "Greek Yogurt", calories: 130, default_quantity: "1 cup" },
    FoodItem { name: "Oatmeal", calories: 150, default_quantity: "1 cup cooked" },
    FoodItem { name: "Almonds", calories: 164, default_quantity: "1 oz (23 nuts)" },
];

/// Food catalog
#[derive(Debug, Clone)]
pub struct FoodCatalog {
    foods: Vec<FoodItem>,
}

impl FoodCatalog {
    /// Create catalog with the common foods
    pub fn new() -> Self {
        Self {
            foods: COMMON_FOODS.to_vec(),
        }
    }

    /// Case-insensitive substring search on name
    ///
    /// The query is matched as given, spaces included. An empty query
    /// matches nothing; the picklist stays closed until something is typed.
    pub fn search(&self, query: &str) -> Vec<&FoodItem> {
        let needle = query.to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }

        self.foods
            .iter()
            .filter(|food| food.name.to_lowercase().contains(&needle))
            .collect()
    }

    /// Exact name lookup, ignoring case
    pub fn find(&self, name: &str) -> Option<&FoodItem> {
        let name = name.trim();
        self.foods
            .iter()
            .find(|food| food.name.eq_ignore_ascii_case(name))
    }

    pub fn all(&self) -> &[FoodItem] {
        &self.foods
    }

    pub fn len(&self) -> usize {
        self.foods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.foods.is_empty()
    }
}

impl Default for FoodCatalog {
    fn default() -> Self {
        Self::new()
    }
}

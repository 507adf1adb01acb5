use serde::{Deserialize, Serialize};

use super::nutrition::NutritionInfo;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

/// A meal as proposed by a generator. Calorie and cost figures are the
/// generator's own estimates, not catalog values.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedMeal {
    pub name: String,
    pub meal_type: MealType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipe_name: Option<String>,
    /// Display-only ingredient names.
    #[serde(default)]
    pub ingredients: Vec<String>,
    pub estimated_calories: f64,
    pub estimated_cost: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedDay {
    pub day_index: u32,
    pub meals: Vec<GeneratedMeal>,
    #[serde(default)]
    pub total_calories: f64,
    #[serde(default)]
    pub total_cost: f64,
}

impl GeneratedDay {
    pub fn new(day_index: u32, meals: Vec<GeneratedMeal>) -> Self {
        let mut day = GeneratedDay {
            day_index,
            meals,
            total_calories: 0.0,
            total_cost: 0.0,
        };
        day.recompute_totals();
        day
    }

    /// Re-derives the day totals from its meals.
    pub fn recompute_totals(&mut self) {
        self.total_calories = self.meals.iter().map(|m| m.estimated_calories).sum();
        self.total_cost = self.meals.iter().map(|m| m.estimated_cost).sum();
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedMealPlan {
    pub days: Vec<GeneratedDay>,
    #[serde(default)]
    pub total_cost: f64,
    #[serde(default)]
    pub average_daily_calories: f64,
}

impl GeneratedMealPlan {
    pub fn from_days(days: Vec<GeneratedDay>) -> Self {
        let mut plan = GeneratedMealPlan {
            days,
            total_cost: 0.0,
            average_daily_calories: 0.0,
        };
        plan.summarize();
        plan
    }

    /// Re-derives day totals from meals, then plan totals from days.
    pub fn summarize(&mut self) {
        for day in &mut self.days {
            day.recompute_totals();
        }
        self.summarize_from_days();
    }

    /// Re-derives plan totals from the current day-level figures.
    pub fn summarize_from_days(&mut self) {
        self.total_cost = self.days.iter().map(|d| d.total_cost).sum();
        self.average_daily_calories = if self.days.is_empty() {
            0.0
        } else {
            self.days.iter().map(|d| d.total_calories).sum::<f64>() / self.days.len() as f64
        };
    }

    pub fn meal_count(&self) -> usize {
        self.days.iter().map(|d| d.meals.len()).sum()
    }
}

/// A meal in the persisted plan. `cost` and `nutrition` are the flat values
/// used when the meal has no catalog recipe.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoredMeal {
    pub name: String,
    pub meal_type: MealType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipe_id: Option<String>,
    pub servings: f64,
    pub cost: f64,
    pub calories: f64,
    pub nutrition: NutritionInfo,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoredDay {
    pub day_index: u32,
    pub total_calories: f64,
    pub total_cost: f64,
    pub meals: Vec<StoredMeal>,
}

/// The persisted-plan shape consumed by the nutrition, pricing and grocery
/// roll-ups.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoredMealPlan {
    pub id: String,
    pub budget: f64,
    pub calorie_target: f64,
    pub duration_days: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Generator-side cost estimate after budget adjustment.
    pub estimated_cost: f64,
    pub days: Vec<StoredDay>,
}

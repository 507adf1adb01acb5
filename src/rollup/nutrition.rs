use serde::{Deserialize, Serialize};

use super::{Rollup, ValueExtractor};
use crate::catalog::Catalog;
use crate::error::Result;
use crate::models::{Ingredient, NutritionInfo, StoredDay, StoredMeal, StoredMealPlan};

#[derive(Debug, Default, Clone, Copy)]
pub struct NutritionExtractor;

impl ValueExtractor for NutritionExtractor {
    type Value = NutritionInfo;

    fn per_hundred(&self, ingredient: &Ingredient) -> NutritionInfo {
        ingredient.nutrition_per_hundred()
    }

    fn flat(&self, meal: &StoredMeal) -> NutritionInfo {
        meal.nutrition
    }
}

fn rollup(catalog: &Catalog) -> Rollup<'_, NutritionExtractor> {
    Rollup::new(catalog, NutritionExtractor)
}

pub fn calculate_ingredient_nutrition(
    catalog: &Catalog,
    ingredient_id: &str,
    quantity: f64,
) -> Result<NutritionInfo> {
    rollup(catalog).ingredient_value(ingredient_id, quantity)
}

pub fn calculate_recipe_nutrition(catalog: &Catalog, recipe_id: &str, servings: f64) -> Result<NutritionInfo> {
    rollup(catalog).recipe_value(recipe_id, servings)
}

pub fn calculate_meal_nutrition(catalog: &Catalog, meal: &StoredMeal) -> Result<NutritionInfo> {
    rollup(catalog).meal_value(meal)
}

pub fn calculate_day_nutrition(catalog: &Catalog, day: &StoredDay) -> Result<NutritionInfo> {
    rollup(catalog).day_value(day)
}

pub fn calculate_plan_nutrition(catalog: &Catalog, plan: &StoredMealPlan) -> Result<NutritionInfo> {
    rollup(catalog).plan_value(plan)
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DayNutrition {
    pub day_index: u32,
    pub nutrition: NutritionInfo,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlanNutrition {
    pub total: NutritionInfo,
    pub daily: Vec<DayNutrition>,
    pub average_daily: NutritionInfo,
}

/// Plan total plus the per-day figures it was summed from.
pub fn plan_nutrition_breakdown(catalog: &Catalog, plan: &StoredMealPlan) -> Result<PlanNutrition> {
    let values = rollup(catalog).day_values(plan)?;
    let total: NutritionInfo = values.iter().copied().sum();
    let average_daily = if values.is_empty() {
        NutritionInfo::default()
    } else {
        total.scale(1.0 / values.len() as f64)
    };
    let daily = plan
        .days
        .iter()
        .zip(values)
        .map(|(day, nutrition)| DayNutrition {
            day_index: day.day_index,
            nutrition,
        })
        .collect();
    Ok(PlanNutrition {
        total,
        daily,
        average_daily,
    })
}

/// Actual-versus-target comparison for a single nutrient.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NutrientCheck {
    pub target: f64,
    pub actual: f64,
    pub difference: f64,
    pub percentage: f64,
    pub within_tolerance: bool,
}

pub fn check_nutrient(actual: f64, target: f64, tolerance: f64) -> NutrientCheck {
    let difference = actual - target;
    NutrientCheck {
        target,
        actual,
        difference,
        percentage: if target > 0.0 { actual / target * 100.0 } else { 0.0 },
        within_tolerance: difference.abs() <= target * tolerance,
    }
}

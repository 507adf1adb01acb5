use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::nutrition::NutritionInfo;

/// Macronutrients and optional micronutrients per 100 units of an ingredient.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Macros {
    #[serde(default)]
    pub protein: f64,
    #[serde(default)]
    pub carbs: f64,
    #[serde(default)]
    pub fat: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fiber: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calcium: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iron: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vitamin_c: Option<f64>,
}

/// Catalog ingredient. Calorie, macro and price figures are per 100 `unit`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Ingredient {
    pub id: String,
    pub name: String,
    pub category: String,
    pub unit: String,
    pub calories_per_unit: f64,
    #[serde(default, alias = "macrosPerUnit")]
    pub macros: Macros,
    pub default_price: f64,
    #[serde(default)]
    pub local_prices: HashMap<String, f64>,
}

impl Ingredient {
    /// Nutrition of 100 units.
    pub fn nutrition_per_hundred(&self) -> NutritionInfo {
        NutritionInfo {
            calories: self.calories_per_unit,
            protein: self.macros.protein,
            carbs: self.macros.carbs,
            fat: self.macros.fat,
            fiber: self.macros.fiber,
            calcium: self.macros.calcium,
            iron: self.macros.iron,
            vitamin_c: self.macros.vitamin_c,
        }
    }

    /// Price of 100 units, preferring the regional price when one is listed.
    pub fn price_per_hundred(&self, region: Option<&str>) -> f64 {
        region
            .and_then(|r| self.local_prices.get(r))
            .copied()
            .unwrap_or(self.default_price)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecipeIngredient {
    pub ingredient_id: String,
    /// Absolute quantity for the whole recipe, in the ingredient's unit.
    pub quantity: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: String,
    pub name: String,
    /// Calories of the full recipe, as declared by the catalog.
    pub calories: f64,
    pub servings: f64,
    #[serde(default)]
    pub cuisine: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub ingredients: Vec<RecipeIngredient>,
}

impl Recipe {
    pub fn calories_per_serving(&self) -> Option<f64> {
        if self.servings > 0.0 && self.calories > 0.0 {
            Some(self.calories / self.servings)
        } else {
            None
        }
    }
}

use serde::{Deserialize, Serialize};

use super::{Rollup, ValueExtractor};
use crate::catalog::Catalog;
use crate::error::Result;
use crate::models::{Ingredient, StoredMeal, StoredMealPlan};

/// Reads prices with an optional regional override.
#[derive(Debug, Default, Clone)]
pub struct PriceExtractor {
    pub region: Option<String>,
}

impl PriceExtractor {
    pub fn new(region: Option<&str>) -> Self {
        PriceExtractor {
            region: region.map(str::to_string),
        }
    }
}

impl ValueExtractor for PriceExtractor {
    type Value = f64;

    fn per_hundred(&self, ingredient: &Ingredient) -> f64 {
        ingredient.price_per_hundred(self.region.as_deref())
    }

    fn flat(&self, meal: &StoredMeal) -> f64 {
        meal.cost
    }
}

fn rollup<'a>(catalog: &'a Catalog, region: Option<&str>) -> Rollup<'a, PriceExtractor> {
    Rollup::new(catalog, PriceExtractor::new(region))
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IngredientPricing {
    pub ingredient_id: String,
    pub quantity: f64,
    pub unit: String,
    /// Price of a single unit.
    pub price_per_unit: f64,
    pub total_cost: f64,
}

pub fn ingredient_pricing(
    catalog: &Catalog,
    ingredient_id: &str,
    quantity: f64,
    region: Option<&str>,
) -> Result<IngredientPricing> {
    let ingredient = catalog.find_ingredient(ingredient_id)?;
    let total_cost = rollup(catalog, region).ingredient_value(ingredient_id, quantity)?;
    Ok(IngredientPricing {
        ingredient_id: ingredient.id.clone(),
        quantity,
        unit: ingredient.unit.clone(),
        price_per_unit: ingredient.price_per_hundred(region) / 100.0,
        total_cost,
    })
}

pub fn calculate_ingredient_cost(
    catalog: &Catalog,
    ingredient_id: &str,
    quantity: f64,
    region: Option<&str>,
) -> Result<f64> {
    rollup(catalog, region).ingredient_value(ingredient_id, quantity)
}

pub fn calculate_recipe_cost(
    catalog: &Catalog,
    recipe_id: &str,
    servings: f64,
    region: Option<&str>,
) -> Result<f64> {
    rollup(catalog, region).recipe_value(recipe_id, servings)
}

pub fn calculate_meal_cost(catalog: &Catalog, meal: &StoredMeal, region: Option<&str>) -> Result<f64> {
    rollup(catalog, region).meal_value(meal)
}

/// Catalog cost of the whole plan. The plan's own region applies unless
/// `region` overrides it.
pub fn calculate_plan_cost(catalog: &Catalog, plan: &StoredMealPlan, region: Option<&str>) -> Result<f64> {
    rollup(catalog, region.or(plan.region.as_deref())).plan_value(plan)
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DayCost {
    pub day_index: u32,
    pub cost: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlanCostBreakdown {
    pub total_cost: f64,
    pub average_daily_cost: f64,
    pub daily_costs: Vec<DayCost>,
}

pub fn plan_cost_breakdown(
    catalog: &Catalog,
    plan: &StoredMealPlan,
    region: Option<&str>,
) -> Result<PlanCostBreakdown> {
    let costs = rollup(catalog, region.or(plan.region.as_deref())).day_values(plan)?;
    let total_cost: f64 = costs.iter().sum();
    let average_daily_cost = if costs.is_empty() {
        0.0
    } else {
        total_cost / costs.len() as f64
    };
    let daily_costs = plan
        .days
        .iter()
        .zip(costs)
        .map(|(day, cost)| DayCost {
            day_index: day.day_index,
            cost,
        })
        .collect();
    Ok(PlanCostBreakdown {
        total_cost,
        average_daily_cost,
        daily_costs,
    })
}

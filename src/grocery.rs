//! Shopping list derived from a stored plan.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::error::{PlannerError, Result};
use crate::models::StoredMealPlan;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GroceryItem {
    pub ingredient_id: String,
    pub name: String,
    /// Total across the whole plan, in `unit`.
    pub quantity: f64,
    pub unit: String,
    pub estimated_cost: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GroceryList {
    pub items: Vec<GroceryItem>,
    pub total_cost: f64,
    pub meal_plan_id: String,
}

#[derive(Default)]
struct Tally {
    quantity: f64,
    cost: f64,
}

/// Expands every recipe meal into absolute ingredient quantities and sums
/// them per ingredient. Recipe-less meals add nothing. Items come out in
/// ingredient-id order.
///
/// `region` overrides the plan's own region for pricing.
pub fn build_grocery_list(
    plan: &StoredMealPlan,
    catalog: &Catalog,
    region: Option<&str>,
) -> Result<GroceryList> {
    let region = region.or(plan.region.as_deref());
    let mut tallies: BTreeMap<&str, Tally> = BTreeMap::new();

    for meal in plan.days.iter().flat_map(|day| &day.meals) {
        let Some(recipe_id) = meal.recipe_id.as_deref() else {
            continue;
        };
        let recipe = catalog.find_recipe(recipe_id)?;
        if recipe.servings <= 0.0 {
            return Err(PlannerError::InvalidCatalog(format!(
                "recipe '{}' has non-positive servings",
                recipe.id
            )));
        }
        let factor = meal.servings / recipe.servings;
        for ri in &recipe.ingredients {
            let ingredient = catalog.find_ingredient(&ri.ingredient_id)?;
            let quantity = ri.quantity * factor;
            let price_per_unit = ingredient.price_per_hundred(region) / 100.0;
            let tally = tallies.entry(ingredient.id.as_str()).or_default();
            tally.quantity += quantity;
            tally.cost += quantity * price_per_unit;
        }
    }

    let mut items = Vec::with_capacity(tallies.len());
    for (ingredient_id, tally) in tallies {
        let ingredient = catalog.find_ingredient(ingredient_id)?;
        items.push(GroceryItem {
            ingredient_id: ingredient.id.clone(),
            name: ingredient.name.clone(),
            quantity: tally.quantity,
            unit: ingredient.unit.clone(),
            estimated_cost: tally.cost,
        });
    }
    let total_cost = items.iter().map(|item| item.estimated_cost).sum();

    tracing::debug!(plan = %plan.id, items = items.len(), total_cost, "built grocery list");

    Ok(GroceryList {
        items,
        total_cost,
        meal_plan_id: plan.id.clone(),
    })
}

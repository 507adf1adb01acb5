use serde::Serialize;

use crate::catalog::{Catalog, CatalogSample};
use crate::config::GeneratorConfig;
use crate::models::MealPlanRequest;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstraintContext<'a> {
    pub duration_days: u32,
    pub total_budget: f64,
    pub daily_budget: f64,
    pub daily_calorie_target: f64,
    pub dietary_preferences: &'a [String],
    pub health_goals: &'a [String],
    pub allergies: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub struct RecipeIngredientContext<'a> {
    pub name: &'a str,
    pub quantity: f64,
    pub unit: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeContext<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub calories: f64,
    pub servings: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cuisine: Option<&'a str>,
    pub tags: &'a [String],
    pub ingredients: Vec<RecipeIngredientContext<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientContext<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub category: &'a str,
    pub unit: &'a str,
    /// Price per 100 units, regional when available.
    pub price: f64,
    pub calories: f64,
}

/// Everything the model sees besides the instructions.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanContext<'a> {
    pub constraints: ConstraintContext<'a>,
    pub available_recipes: Vec<RecipeContext<'a>>,
    pub available_ingredients: Vec<IngredientContext<'a>>,
}

pub fn build_plan_context<'a>(
    request: &'a MealPlanRequest,
    catalog: &'a Catalog,
    sample: CatalogSample<'a>,
    prompt_ingredient_limit: usize,
) -> PlanContext<'a> {
    let region = request.region.as_deref();

    let available_recipes = sample
        .recipes
        .into_iter()
        .map(|recipe| RecipeContext {
            id: &recipe.id,
            name: &recipe.name,
            calories: recipe.calories,
            servings: recipe.servings,
            cuisine: recipe.cuisine.as_deref(),
            tags: &recipe.tags,
            ingredients: recipe
                .ingredients
                .iter()
                .filter_map(|ri| {
                    // Unknown ids are left out of the prompt; aggregation reports them later.
                    catalog.find_ingredient(&ri.ingredient_id).ok().map(|ingredient| {
                        RecipeIngredientContext {
                            name: &ingredient.name,
                            quantity: ri.quantity,
                            unit: &ingredient.unit,
                        }
                    })
                })
                .collect(),
        })
        .collect();

    let available_ingredients = sample
        .ingredients
        .iter()
        .take(prompt_ingredient_limit)
        .map(|ingredient| IngredientContext {
            id: &ingredient.id,
            name: &ingredient.name,
            category: &ingredient.category,
            unit: &ingredient.unit,
            price: ingredient.price_per_hundred(region),
            calories: ingredient.calories_per_unit,
        })
        .collect();

    PlanContext {
        constraints: ConstraintContext {
            duration_days: request.duration_days,
            total_budget: request.budget,
            daily_budget: request.daily_budget(),
            daily_calorie_target: request.calorie_target,
            dietary_preferences: &request.dietary_preferences,
            health_goals: &request.health_goals,
            allergies: request.allergies(),
            region,
        },
        available_recipes,
        available_ingredients,
    }
}

pub fn system_prompt(duration_days: u32) -> String {
    format!(
        "/no_thinking
You are a nutrition expert building a {duration_days}-day meal plan.
You receive a JSON object with \"constraints\", \"availableRecipes\" and \"availableIngredients\".
Rules:
1. Keep each day's total cost within constraints.dailyBudget.
2. Keep each day's calories close to constraints.dailyCalorieTarget.
3. Respect dietaryPreferences and never use anything listed in allergies.
4. Vary meals across days.
5. Prefer recipes from availableRecipes; set \"recipeName\" to the exact recipe name when you use one.

Respond ONLY with a JSON object of this shape, without markdown or commentary:
{{
  \"days\": [
    {{
      \"dayIndex\": 0,
      \"meals\": [
        {{
          \"name\": \"Meal name\",
          \"mealType\": \"BREAKFAST\" | \"LUNCH\" | \"DINNER\" | \"SNACK\",
          \"recipeName\": \"Recipe name if using an available recipe\",
          \"ingredients\": [\"ingredient1\", \"ingredient2\"],
          \"estimatedCalories\": 400,
          \"estimatedCost\": 150
        }}
      ],
      \"totalCalories\": 2000,
      \"totalCost\": 350
    }}
  ],
  \"totalCost\": 2450,
  \"averageDailyCalories\": 2000
}}
\"days\" must contain exactly {duration_days} entries with dayIndex 0 to {last}.",
        duration_days = duration_days,
        last = duration_days.saturating_sub(1),
    )
}

/// Renders the user message: the serialized [`PlanContext`].
pub fn user_prompt(
    request: &MealPlanRequest,
    catalog: &Catalog,
    config: &GeneratorConfig,
) -> Result<String, serde_json::Error> {
    let sample = catalog.sample_for(request, config.recipe_sample, config.ingredient_sample);
    let context = build_plan_context(request, catalog, sample, config.prompt_ingredient_limit);
    serde_json::to_string_pretty(&context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Ingredient, Macros, Recipe, RecipeIngredient};
    use std::collections::HashMap;

    fn catalog() -> Catalog {
        let ingredients = (0..5)
            .map(|i| Ingredient {
                id: format!("ing-{}", i),
                name: format!("Ingredient {}", i),
                category: "Other".to_string(),
                unit: "g".to_string(),
                calories_per_unit: 100.0,
                macros: Macros::default(),
                default_price: 10.0,
                local_prices: HashMap::from([("pune".to_string(), 8.0)]),
            })
            .collect();
        let recipes = vec![
            Recipe {
                id: "r1".to_string(),
                name: "Dal Rice".to_string(),
                calories: 900.0,
                servings: 3.0,
                cuisine: Some("Indian".to_string()),
                tags: vec!["vegetarian".to_string()],
                ingredients: vec![
                    RecipeIngredient {
                        ingredient_id: "ing-0".to_string(),
                        quantity: 150.0,
                    },
                    RecipeIngredient {
                        ingredient_id: "missing".to_string(),
                        quantity: 10.0,
                    },
                ],
            },
            Recipe {
                id: "r2".to_string(),
                name: "Chicken Satay".to_string(),
                calories: 1200.0,
                servings: 4.0,
                cuisine: None,
                tags: vec!["non-vegetarian".to_string(), "peanut".to_string()],
                ingredients: vec![RecipeIngredient {
                    ingredient_id: "ing-1".to_string(),
                    quantity: 200.0,
                }],
            },
        ];
        Catalog::new(ingredients, recipes).unwrap()
    }

    fn request() -> MealPlanRequest {
        MealPlanRequest {
            budget: 700.0,
            calorie_target: 2200.0,
            dietary_preferences: vec!["VEGETARIAN".to_string()],
            health_goals: vec!["GAIN_MUSCLE".to_string()],
            allergies: Some(vec!["peanut".to_string()]),
            duration_days: 7,
            region: Some("pune".to_string()),
        }
    }

    #[test]
    fn test_context_respects_limits_and_region() {
        let catalog = catalog();
        let request = request();
        let context = build_plan_context(&request, &catalog, catalog.sample(10, 4), 2);
        assert_eq!(context.available_ingredients.len(), 2);
        assert_eq!(context.available_ingredients[0].price, 8.0);
        assert_eq!(context.available_recipes[0].ingredients.len(), 1);
        assert_eq!(context.constraints.daily_budget, 100.0);
    }

    #[test]
    fn test_user_prompt_is_json() {
        let prompt = user_prompt(&request(), &catalog(), &GeneratorConfig::default()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&prompt).unwrap();
        assert_eq!(value["constraints"]["allergies"][0], "peanut");
        assert_eq!(value["availableRecipes"][0]["name"], "Dal Rice");
        // the satay clashes with both the diet and the allergy
        assert_eq!(value["availableRecipes"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_system_prompt_mentions_day_count() {
        let prompt = system_prompt(3);
        assert!(prompt.contains("3-day"));
        assert!(prompt.contains("dayIndex 0 to 2"));
    }
}

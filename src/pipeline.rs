//! End-to-end planning for one request: generate, adjust to budget,
//! materialize against the catalog, then recompute cost and nutrition from
//! catalog data.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::budget::{adjust_to_budget, validate_budget, BudgetAdjustment, BudgetCompliance};
use crate::catalog::Catalog;
use crate::compliance::{check_plan_compliance, PlanCompliance};
use crate::config::{BudgetPolicy, GeneratorConfig, PlanConfig};
use crate::error::Result;
use crate::grocery::{build_grocery_list, GroceryList};
use crate::models::{
    GeneratedMeal, GeneratedMealPlan, MealPlanRequest, NutritionInfo, StoredDay, StoredMeal, StoredMealPlan,
};
use crate::plan_generator::{generate_with_fallback, FallbackPlanGenerator, LlmPlanGenerator, PlanGenerator, PlanSource};
use crate::rollup::nutrition::calculate_plan_nutrition;
use crate::rollup::pricing::{plan_cost_breakdown, PlanCostBreakdown};

fn materialize_meal(meal: &GeneratedMeal, catalog: &Catalog) -> StoredMeal {
    let recipe = meal
        .recipe_name
        .as_deref()
        .and_then(|name| catalog.find_recipe_by_name(name));

    // Servings are chosen so the recipe's per-serving calories match the
    // generator's estimate.
    let scaled = recipe
        .and_then(|r| r.calories_per_serving())
        .map(|per_serving| meal.estimated_calories / per_serving)
        .filter(|s| s.is_finite() && *s > 0.0);
    let servings = match (recipe, scaled) {
        (_, Some(servings)) => servings,
        (Some(r), None) => {
            tracing::debug!(
                recipe = %r.id,
                estimated_calories = meal.estimated_calories,
                "servings not derivable from calories, using 1"
            );
            1.0
        }
        (None, None) => 1.0,
    };

    if let (Some(name), None) = (&meal.recipe_name, recipe) {
        tracing::debug!(recipe = %name, "recipe name not in catalog, keeping flat values");
    }

    StoredMeal {
        name: meal.name.clone(),
        meal_type: meal.meal_type,
        recipe_id: recipe.map(|r| r.id.clone()),
        servings,
        cost: meal.estimated_cost,
        calories: meal.estimated_calories,
        nutrition: NutritionInfo::estimate_from_calories(meal.estimated_calories),
    }
}

/// Converts a generated plan into the stored shape, resolving recipe names
/// against the catalog. Unresolved meals keep the generator's figures.
pub fn materialize(
    plan: &GeneratedMealPlan,
    request: &MealPlanRequest,
    catalog: &Catalog,
    id: &str,
) -> StoredMealPlan {
    let days = plan
        .days
        .iter()
        .map(|day| StoredDay {
            day_index: day.day_index,
            total_calories: day.total_calories,
            total_cost: day.total_cost,
            meals: day.meals.iter().map(|meal| materialize_meal(meal, catalog)).collect(),
        })
        .collect();

    StoredMealPlan {
        id: id.to_string(),
        budget: request.budget,
        calorie_target: request.calorie_target,
        duration_days: request.duration_days,
        region: request.region.clone(),
        estimated_cost: plan.total_cost,
        days,
    }
}

fn new_plan_id() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    format!("plan-{:x}", nanos)
}

/// Result of one planning run.
///
/// The flattened plan carries the generator's estimates; `actual_cost` and
/// `nutrition` are recomputed from the catalog. `compliance` checks the final
/// plan, so a fallback plan that conflicts with the request is reported here.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct MealPlanResponse {
    pub meal_plan_id: String,
    pub source: PlanSource,
    #[serde(flatten)]
    pub plan: GeneratedMealPlan,
    pub actual_cost: f64,
    pub nutrition: NutritionInfo,
    pub cost_breakdown: PlanCostBreakdown,
    pub budget_adjustment: BudgetAdjustment,
    pub budget_compliance: BudgetCompliance,
    pub compliance: PlanCompliance,
    pub stored_plan: StoredMealPlan,
    pub grocery_list: GroceryList,
}

pub struct MealPlanner {
    catalog: Arc<Catalog>,
    generator: Box<dyn PlanGenerator>,
    generation_timeout: Option<Duration>,
    policy: BudgetPolicy,
    plan_config: PlanConfig,
}

impl MealPlanner {
    pub fn new(catalog: Arc<Catalog>, generator: Box<dyn PlanGenerator>) -> Self {
        MealPlanner {
            catalog,
            generator,
            generation_timeout: None,
            policy: BudgetPolicy::default(),
            plan_config: PlanConfig::default(),
        }
    }

    /// Planner backed by the remote model, bounded by the configured timeout.
    pub fn from_config(catalog: Arc<Catalog>, config: GeneratorConfig) -> Self {
        let timeout = Duration::from_secs(config.timeout_secs);
        MealPlanner::new(catalog, Box::new(LlmPlanGenerator::new(config))).with_timeout(Some(timeout))
    }

    /// Planner that never calls out; every plan comes from the fallback.
    pub fn offline(catalog: Arc<Catalog>) -> Self {
        MealPlanner::new(catalog, Box::new(FallbackPlanGenerator))
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.generation_timeout = timeout;
        self
    }

    pub fn with_policy(mut self, policy: BudgetPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_plan_config(mut self, plan_config: PlanConfig) -> Self {
        self.plan_config = plan_config;
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn generator_name(&self) -> &str {
        self.generator.name()
    }

    /// Runs the full pipeline. Generation problems are absorbed by the
    /// fallback; validation and catalog lookup failures are returned.
    pub async fn plan(&self, request: &MealPlanRequest, meal_plan_id: Option<String>) -> Result<MealPlanResponse> {
        request.validate(&self.plan_config)?;

        let outcome =
            generate_with_fallback(self.generator.as_ref(), request, &self.catalog, self.generation_timeout).await;
        let mut plan = outcome.plan;
        let budget_adjustment = adjust_to_budget(&mut plan, request, &self.policy);

        let meal_plan_id = meal_plan_id.unwrap_or_else(new_plan_id);
        let stored_plan = materialize(&plan, request, &self.catalog, &meal_plan_id);

        let cost_breakdown = plan_cost_breakdown(&self.catalog, &stored_plan, None)?;
        let nutrition = calculate_plan_nutrition(&self.catalog, &stored_plan)?;
        let grocery_list = build_grocery_list(&stored_plan, &self.catalog, None)?;
        let actual_cost = cost_breakdown.total_cost;
        let budget_compliance = validate_budget(actual_cost, request.budget, self.policy.tolerance);
        let compliance = check_plan_compliance(&plan, request);
        if !compliance.compliant {
            tracing::warn!(plan = %meal_plan_id, violations = %compliance.summary(), "plan conflicts with allergies or preferences");
        }

        tracing::info!(
            plan = %meal_plan_id,
            source = ?outcome.source,
            estimated_cost = plan.total_cost,
            actual_cost,
            within_budget = budget_compliance.within_budget,
            "meal plan ready"
        );

        Ok(MealPlanResponse {
            meal_plan_id,
            source: outcome.source,
            plan,
            actual_cost,
            nutrition,
            cost_breakdown,
            budget_adjustment,
            budget_compliance,
            compliance,
            stored_plan,
            grocery_list,
        })
    }

    pub fn grocery_list(&self, plan: &StoredMealPlan, region: Option<&str>) -> Result<GroceryList> {
        build_grocery_list(plan, &self.catalog, region)
    }
}

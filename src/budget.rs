//! Per-day budget reconciliation of generated plans, plus plan-level budget
//! checks and budget suggestions.

use serde::{Deserialize, Serialize};

use crate::config::BudgetPolicy;
use crate::models::{GeneratedDay, GeneratedMealPlan, MealPlanRequest};

/// A day that was rescaled by the adjuster.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DayAdjustment {
    pub day_index: u32,
    pub original_cost: f64,
    pub adjusted_cost: f64,
    pub scale: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct BudgetAdjustment {
    pub daily_budget: f64,
    pub adjusted_days: Vec<DayAdjustment>,
    /// Days still above tolerance after the pass.
    pub residual_days: Vec<u32>,
}

impl BudgetAdjustment {
    pub fn is_converged(&self) -> bool {
        self.residual_days.is_empty()
    }
}

fn adjust_day(day: &mut GeneratedDay, daily_budget: f64, policy: &BudgetPolicy) -> Option<DayAdjustment> {
    day.recompute_totals();
    if day.total_cost <= daily_budget * (1.0 + policy.tolerance) {
        return None;
    }
    let original_cost = day.total_cost;
    let scale = (daily_budget * policy.target_ratio) / original_cost;
    for meal in &mut day.meals {
        meal.estimated_cost *= scale;
    }
    // total_cost stays exactly the sum of the scaled meal costs
    day.recompute_totals();
    Some(DayAdjustment {
        day_index: day.day_index,
        original_cost,
        adjusted_cost: day.total_cost,
        scale,
    })
}

/// Single corrective pass: every day whose cost exceeds the daily budget slice
/// by more than the tolerance has all of its meal costs scaled so the day lands
/// on `daily_budget * target_ratio`. Calories are left untouched and nothing
/// is moved between days.
pub fn adjust_to_budget(
    plan: &mut GeneratedMealPlan,
    request: &MealPlanRequest,
    policy: &BudgetPolicy,
) -> BudgetAdjustment {
    let daily_budget = request.daily_budget();
    let limit = daily_budget * (1.0 + policy.tolerance);

    let adjusted_days: Vec<DayAdjustment> = plan
        .days
        .iter_mut()
        .filter_map(|day| adjust_day(day, daily_budget, policy))
        .collect();

    let residual_days: Vec<u32> = plan
        .days
        .iter()
        .filter(|day| day.total_cost > limit)
        .map(|day| day.day_index)
        .collect();

    plan.summarize_from_days();

    for adjustment in &adjusted_days {
        tracing::debug!(
            day = adjustment.day_index,
            from = adjustment.original_cost,
            to = adjustment.adjusted_cost,
            "scaled day cost to budget"
        );
    }
    if !residual_days.is_empty() {
        tracing::warn!(?residual_days, daily_budget, "days remain over budget after adjustment");
    }

    BudgetAdjustment {
        daily_budget,
        adjusted_days,
        residual_days,
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BudgetCompliance {
    pub within_budget: bool,
    pub budget_utilization_percent: f64,
    pub cost_difference: f64,
    pub budget: f64,
    pub actual_cost: f64,
    pub tolerance: f64,
}

/// Compares a plan cost against the whole-plan budget.
pub fn validate_budget(actual_cost: f64, budget: f64, tolerance: f64) -> BudgetCompliance {
    BudgetCompliance {
        within_budget: actual_cost <= budget * (1.0 + tolerance),
        budget_utilization_percent: if budget > 0.0 {
            actual_cost / budget * 100.0
        } else {
            0.0
        },
        cost_difference: actual_cost - budget,
        budget,
        actual_cost,
        tolerance,
    }
}

const BASE_COST_PER_100_KCAL: f64 = 15.0;

fn preference_multiplier(preference: &str) -> f64 {
    match preference {
        "VEGAN" => 0.9,
        "VEGETARIAN" => 0.95,
        "NON_VEGETARIAN" => 1.1,
        "KETO" => 1.2,
        "ORGANIC" => 1.5,
        _ => 1.0,
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BudgetSuggestion {
    pub suggested_daily_budget: f64,
    pub suggested_weekly_budget: f64,
    pub min_budget: f64,
    pub max_budget: f64,
}

/// Rough weekly budget range for a daily calorie target.
pub fn suggest_budget_range(calorie_target: f64, dietary_preferences: &[String]) -> BudgetSuggestion {
    let multiplier: f64 = dietary_preferences
        .iter()
        .map(|p| preference_multiplier(p))
        .product();
    let daily = calorie_target / 100.0 * BASE_COST_PER_100_KCAL * multiplier;
    let weekly = daily * 7.0;
    BudgetSuggestion {
        suggested_daily_budget: daily,
        suggested_weekly_budget: weekly,
        min_budget: weekly * 0.7,
        max_budget: weekly * 1.5,
    }
}

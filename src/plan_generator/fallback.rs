use async_trait::async_trait;

use super::{GenerationError, PlanGenerator};
use crate::catalog::Catalog;
use crate::models::{GeneratedDay, GeneratedMeal, GeneratedMealPlan, MealPlanRequest, MealType};

struct MealSlot {
    name: &'static str,
    meal_type: MealType,
    ingredients: &'static [&'static str],
    calorie_share: f64,
    budget_share: f64,
}

const DAILY_SLOTS: &[MealSlot] = &[
    MealSlot {
        name: "Breakfast",
        meal_type: MealType::Breakfast,
        ingredients: &["Oats", "Banana", "Milk"],
        calorie_share: 0.25,
        budget_share: 0.20,
    },
    MealSlot {
        name: "Lunch",
        meal_type: MealType::Lunch,
        ingredients: &["Rice", "Dal", "Vegetables"],
        calorie_share: 0.40,
        budget_share: 0.40,
    },
    MealSlot {
        name: "Dinner",
        meal_type: MealType::Dinner,
        ingredients: &["Roti", "Curry", "Salad"],
        calorie_share: 0.35,
        budget_share: 0.40,
    },
];

/// Catalog-free plan built from fixed meal proportions. Always has exactly
/// `request.duration_days` days of three meals each.
pub fn fallback_generate(request: &MealPlanRequest) -> GeneratedMealPlan {
    let daily_calories = request.calorie_target;
    let daily_budget = request.daily_budget();

    let days = (0..request.duration_days)
        .map(|day_index| {
            let meals = DAILY_SLOTS
                .iter()
                .map(|slot| GeneratedMeal {
                    name: slot.name.to_string(),
                    meal_type: slot.meal_type,
                    recipe_name: None,
                    ingredients: slot.ingredients.iter().map(|s| s.to_string()).collect(),
                    estimated_calories: daily_calories * slot.calorie_share,
                    estimated_cost: daily_budget * slot.budget_share,
                })
                .collect();
            GeneratedDay::new(day_index, meals)
        })
        .collect();

    GeneratedMealPlan::from_days(days)
}

#[derive(Debug, Default, Clone, Copy)]
pub struct FallbackPlanGenerator;

#[async_trait]
impl PlanGenerator for FallbackPlanGenerator {
    fn name(&self) -> &str {
        "fallback"
    }

    async fn generate(
        &self,
        request: &MealPlanRequest,
        _catalog: &Catalog,
    ) -> Result<GeneratedMealPlan, GenerationError> {
        Ok(fallback_generate(request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(budget: f64, calories: f64, days: u32) -> MealPlanRequest {
        MealPlanRequest {
            budget,
            calorie_target: calories,
            dietary_preferences: vec!["VEGETARIAN".to_string()],
            health_goals: vec!["MAINTAIN_HEALTH".to_string()],
            allergies: None,
            duration_days: days,
            region: None,
        }
    }

    #[test]
    fn test_weekly_scenario_totals() {
        let plan = fallback_generate(&request(2100.0, 2000.0, 7));
        assert_eq!(plan.days.len(), 7);
        assert_eq!(plan.total_cost, 2100.0);
        assert_eq!(plan.average_daily_calories, 2000.0);

        let day = &plan.days[3];
        assert_eq!(day.day_index, 3);
        assert_eq!(day.meals.len(), 3);
        assert_eq!(day.meals[0].estimated_calories, 500.0);
        assert_eq!(day.meals[1].estimated_cost, 120.0);
        assert_eq!(day.meals[2].ingredients, vec!["Roti", "Curry", "Salad"]);
    }

    #[test]
    fn test_day_totals_are_exact_meal_sums() {
        let plan = fallback_generate(&request(1234.56, 1777.0, 9));
        for day in &plan.days {
            let calories: f64 = day.meals.iter().map(|m| m.estimated_calories).sum();
            let cost: f64 = day.meals.iter().map(|m| m.estimated_cost).sum();
            assert_eq!(calories, day.total_calories);
            assert_eq!(cost, day.total_cost);
        }
    }

    #[test]
    fn test_shares_sum_to_one() {
        let calories: f64 = DAILY_SLOTS.iter().map(|s| s.calorie_share).sum();
        let budget: f64 = DAILY_SLOTS.iter().map(|s| s.budget_share).sum();
        assert!((calories - 1.0).abs() < 1e-12);
        assert!((budget - 1.0).abs() < 1e-12);
    }
}

//! Meal plan generation.
//!
//! Producing a plan is a pluggable capability behind [`PlanGenerator`]. The
//! remote model ([`LlmPlanGenerator`]) may fail in many ways; the
//! deterministic fallback ([`FallbackPlanGenerator`]) cannot.
//! [`generate_with_fallback`] runs one attempt with the given generator and
//! switches to the fallback on any error, so callers always get a plan.

pub mod context;
pub mod fallback;
pub mod llm;

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::api_connection::ApiConnectionError;
use crate::catalog::Catalog;
use crate::compliance::check_plan_compliance;
use crate::models::{GeneratedMealPlan, MealPlanRequest};

pub use fallback::{fallback_generate, FallbackPlanGenerator};
pub use llm::{parse_plan_response, LlmPlanGenerator};

/// Why a generator did not produce a usable plan. Never surfaced to callers
/// of [`generate_with_fallback`].
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error(transparent)]
    Api(#[from] ApiConnectionError),

    #[error("model returned no content")]
    EmptyResponse,

    #[error("model response is not valid plan JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("model plan violates plan shape: {0}")]
    Schema(String),

    #[error("model plan ignores allergies or dietary preferences: {0}")]
    Noncompliant(String),

    #[error("model call exceeded {0:?}")]
    Timeout(Duration),
}

#[async_trait]
pub trait PlanGenerator: Send + Sync {
    fn name(&self) -> &str;

    async fn generate(
        &self,
        request: &MealPlanRequest,
        catalog: &Catalog,
    ) -> Result<GeneratedMealPlan, GenerationError>;
}

const _: () = {
    fn _assert_object_safe(_: &dyn PlanGenerator) {}
};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PlanSource {
    Model,
    Fallback,
}

#[derive(Debug, Clone)]
pub struct GenerationOutcome {
    pub plan: GeneratedMealPlan,
    pub source: PlanSource,
    /// Reason the primary generator was abandoned, when it was.
    pub failure: Option<String>,
}

/// Checks the output guarantee: exactly `duration_days` days, indexed
/// `0..duration_days`, each with at least one meal and finite, non-negative
/// estimates. Days are put in index order.
pub fn validate_plan_shape(
    plan: &mut GeneratedMealPlan,
    request: &MealPlanRequest,
) -> Result<(), GenerationError> {
    let expected = request.duration_days as usize;
    if plan.days.len() != expected {
        return Err(GenerationError::Schema(format!(
            "expected {} days, got {}",
            expected,
            plan.days.len()
        )));
    }
    plan.days.sort_by_key(|d| d.day_index);
    for (position, day) in plan.days.iter().enumerate() {
        if day.day_index as usize != position {
            return Err(GenerationError::Schema(format!(
                "day indexes must be 0..{}, found {} at position {}",
                expected, day.day_index, position
            )));
        }
        if day.meals.is_empty() {
            return Err(GenerationError::Schema(format!("day {} has no meals", day.day_index)));
        }
        let bad_meal = day.meals.iter().find(|m| {
            !m.estimated_calories.is_finite()
                || !m.estimated_cost.is_finite()
                || m.estimated_calories < 0.0
                || m.estimated_cost < 0.0
        });
        if let Some(meal) = bad_meal {
            return Err(GenerationError::Schema(format!(
                "meal '{}' on day {} has invalid estimates",
                meal.name, day.day_index
            )));
        }
    }
    Ok(())
}

/// Runs `generator` once, bounded by `timeout`, and falls back to the
/// deterministic plan on any failure. A plan that puts an allergen or a
/// preference-forbidden ingredient in any meal counts as a failure.
pub async fn generate_with_fallback(
    generator: &dyn PlanGenerator,
    request: &MealPlanRequest,
    catalog: &Catalog,
    timeout: Option<Duration>,
) -> GenerationOutcome {
    let attempt = match timeout {
        Some(limit) => tokio::time::timeout(limit, generator.generate(request, catalog))
            .await
            .unwrap_or(Err(GenerationError::Timeout(limit))),
        None => generator.generate(request, catalog).await,
    };

    let checked = attempt.and_then(|mut plan| {
        validate_plan_shape(&mut plan, request)?;
        let compliance = check_plan_compliance(&plan, request);
        if !compliance.compliant {
            return Err(GenerationError::Noncompliant(compliance.summary()));
        }
        plan.summarize();
        Ok(plan)
    });

    match checked {
        Ok(plan) => {
            tracing::info!(generator = generator.name(), days = plan.days.len(), "plan generated");
            GenerationOutcome {
                plan,
                source: PlanSource::Model,
                failure: None,
            }
        }
        Err(err) => {
            tracing::warn!(generator = generator.name(), error = %err, "generation failed, using fallback plan");
            GenerationOutcome {
                plan: fallback_generate(request),
                source: PlanSource::Fallback,
                failure: Some(err.to_string()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GeneratedDay, GeneratedMeal, MealType};

    struct FixedGenerator(GeneratedMealPlan);

    #[async_trait]
    impl PlanGenerator for FixedGenerator {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn generate(
            &self,
            _request: &MealPlanRequest,
            _catalog: &Catalog,
        ) -> Result<GeneratedMealPlan, GenerationError> {
            Ok(self.0.clone())
        }
    }

    struct SlowGenerator;

    #[async_trait]
    impl PlanGenerator for SlowGenerator {
        fn name(&self) -> &str {
            "slow"
        }

        async fn generate(
            &self,
            _request: &MealPlanRequest,
            _catalog: &Catalog,
        ) -> Result<GeneratedMealPlan, GenerationError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Err(GenerationError::EmptyResponse)
        }
    }

    fn request(days: u32) -> MealPlanRequest {
        MealPlanRequest {
            budget: 1400.0,
            calorie_target: 1800.0,
            dietary_preferences: vec![],
            health_goals: vec![],
            allergies: None,
            duration_days: days,
            region: None,
        }
    }

    fn day(index: u32) -> GeneratedDay {
        GeneratedDay {
            day_index: index,
            meals: vec![GeneratedMeal {
                name: "Upma".to_string(),
                meal_type: MealType::Breakfast,
                recipe_name: None,
                ingredients: vec!["Semolina".to_string()],
                estimated_calories: 400.0,
                estimated_cost: 50.0,
            }],
            total_calories: 1.0,
            total_cost: 1.0,
        }
    }

    fn empty_catalog() -> Catalog {
        Catalog::new(vec![], vec![]).unwrap()
    }

    #[tokio::test]
    async fn test_model_plan_is_summarized() {
        let plan = GeneratedMealPlan {
            days: vec![day(1), day(0)],
            total_cost: 0.0,
            average_daily_calories: 0.0,
        };
        let outcome =
            generate_with_fallback(&FixedGenerator(plan), &request(2), &empty_catalog(), None).await;
        assert_eq!(outcome.source, PlanSource::Model);
        assert_eq!(outcome.plan.days[0].day_index, 0);
        assert_eq!(outcome.plan.days[0].total_calories, 400.0);
        assert_eq!(outcome.plan.total_cost, 100.0);
    }

    #[tokio::test]
    async fn test_wrong_day_count_falls_back() {
        let plan = GeneratedMealPlan {
            days: vec![day(0)],
            total_cost: 0.0,
            average_daily_calories: 0.0,
        };
        let outcome =
            generate_with_fallback(&FixedGenerator(plan), &request(3), &empty_catalog(), None).await;
        assert_eq!(outcome.source, PlanSource::Fallback);
        assert_eq!(outcome.plan.days.len(), 3);
        assert!(outcome.failure.unwrap().contains("expected 3 days"));
    }

    #[tokio::test]
    async fn test_timeout_falls_back() {
        let outcome = generate_with_fallback(
            &SlowGenerator,
            &request(2),
            &empty_catalog(),
            Some(Duration::from_millis(10)),
        )
        .await;
        assert_eq!(outcome.source, PlanSource::Fallback);
        assert!(outcome.failure.unwrap().contains("exceeded"));
    }

    #[tokio::test]
    async fn test_allergen_or_meat_in_model_plan_falls_back() {
        let mut satay = day(0);
        satay.meals[0].name = "Satay".to_string();
        satay.meals[0].ingredients = vec!["Peanut".to_string(), "Chicken".to_string()];
        let plan = GeneratedMealPlan::from_days(vec![satay]);

        let mut constrained = request(1);
        constrained.allergies = Some(vec!["peanut".to_string()]);
        constrained.dietary_preferences = vec!["VEGETARIAN".to_string()];

        let outcome =
            generate_with_fallback(&FixedGenerator(plan.clone()), &constrained, &empty_catalog(), None).await;
        assert_eq!(outcome.source, PlanSource::Fallback);
        let failure = outcome.failure.unwrap();
        assert!(failure.contains("Peanut (allergy peanut)"));
        assert!(failure.contains("Chicken (VEGETARIAN)"));

        // same plan is fine without the constraints
        let outcome = generate_with_fallback(&FixedGenerator(plan), &request(1), &empty_catalog(), None).await;
        assert_eq!(outcome.source, PlanSource::Model);
    }

    #[test]
    fn test_shape_rejects_gaps_and_negative_costs() {
        let mut plan = GeneratedMealPlan {
            days: vec![day(0), day(2)],
            total_cost: 0.0,
            average_daily_calories: 0.0,
        };
        assert!(validate_plan_shape(&mut plan, &request(2)).is_err());

        let mut negative = day(0);
        negative.meals[0].estimated_cost = -5.0;
        let mut plan = GeneratedMealPlan {
            days: vec![negative],
            total_cost: 0.0,
            average_daily_calories: 0.0,
        };
        assert!(validate_plan_shape(&mut plan, &request(1)).is_err());
    }
}

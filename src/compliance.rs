//! Deterministic allergy and dietary-preference checks.
//!
//! The model only sees allergies and preferences as prompt text, so its plans
//! are re-checked here by keyword matching before they are accepted.

use serde::{Deserialize, Serialize};

use crate::models::{GeneratedMealPlan, MealPlanRequest, Recipe};

/// Keywords that an ingredient must not contain under a preference.
pub fn forbidden_keywords(preference: &str) -> &'static [&'static str] {
    match preference {
        "VEGETARIAN" => &["meat", "chicken", "fish", "pork", "beef", "lamb"],
        "VEGAN" => &[
            "meat", "chicken", "fish", "pork", "beef", "lamb", "dairy", "milk", "cheese", "butter", "egg",
        ],
        "PESCATARIAN" => &["meat", "chicken", "pork", "beef", "lamb"],
        "GLUTEN_FREE" => &["wheat", "gluten", "barley", "rye"],
        "DAIRY_FREE" => &["dairy", "milk", "cheese", "butter", "cream"],
        _ => &[],
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AllergyViolation {
    pub ingredient: String,
    pub allergy: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceViolation {
    pub ingredient: String,
    pub preference: String,
    pub keyword: String,
}

/// An ingredient conflicts with an allergy when either name contains the
/// other, ignoring case. Blank entries never match.
pub fn check_allergy_compliance(ingredients: &[String], allergies: &[String]) -> Vec<AllergyViolation> {
    let mut violations = Vec::new();
    for ingredient in ingredients {
        let lower = ingredient.trim().to_lowercase();
        if lower.is_empty() {
            continue;
        }
        let hit = allergies.iter().find(|allergy| {
            let allergy = allergy.trim().to_lowercase();
            !allergy.is_empty() && (lower.contains(&allergy) || allergy.contains(&lower))
        });
        if let Some(allergy) = hit {
            violations.push(AllergyViolation {
                ingredient: ingredient.clone(),
                allergy: allergy.clone(),
            });
        }
    }
    violations
}

pub fn check_dietary_preference_compliance(
    ingredients: &[String],
    dietary_preferences: &[String],
) -> Vec<PreferenceViolation> {
    let mut violations = Vec::new();
    for preference in dietary_preferences {
        for ingredient in ingredients {
            let lower = ingredient.to_lowercase();
            if let Some(keyword) = forbidden_keywords(preference).iter().find(|k| lower.contains(*k)) {
                violations.push(PreferenceViolation {
                    ingredient: ingredient.clone(),
                    preference: preference.clone(),
                    keyword: keyword.to_string(),
                });
            }
        }
    }
    violations
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MealViolations {
    pub day_index: u32,
    pub meal: String,
    pub allergies: Vec<AllergyViolation>,
    pub preferences: Vec<PreferenceViolation>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PlanCompliance {
    pub compliant: bool,
    pub violations: Vec<MealViolations>,
}

impl PlanCompliance {
    /// One-line description of the violations, for logs and errors.
    pub fn summary(&self) -> String {
        self.violations
            .iter()
            .map(|v| {
                let mut hits: Vec<String> = v
                    .allergies
                    .iter()
                    .map(|a| format!("{} (allergy {})", a.ingredient, a.allergy))
                    .collect();
                hits.extend(
                    v.preferences
                        .iter()
                        .map(|p| format!("{} ({})", p.ingredient, p.preference)),
                );
                format!("day {} '{}': {}", v.day_index, v.meal, hits.join(", "))
            })
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Checks every meal's ingredient list against the request's allergies and
/// dietary preferences.
pub fn check_plan_compliance(plan: &GeneratedMealPlan, request: &MealPlanRequest) -> PlanCompliance {
    let violations: Vec<MealViolations> = plan
        .days
        .iter()
        .flat_map(|day| day.meals.iter().map(move |meal| (day.day_index, meal)))
        .filter_map(|(day_index, meal)| {
            let allergies = check_allergy_compliance(&meal.ingredients, request.allergies());
            let preferences = check_dietary_preference_compliance(&meal.ingredients, &request.dietary_preferences);
            if allergies.is_empty() && preferences.is_empty() {
                None
            } else {
                Some(MealViolations {
                    day_index,
                    meal: meal.name.clone(),
                    allergies,
                    preferences,
                })
            }
        })
        .collect();
    PlanCompliance {
        compliant: violations.is_empty(),
        violations,
    }
}

/// Whether a recipe's tags allow it for the request.
///
/// VEGETARIAN drops `non-vegetarian` tags, VEGAN drops `dairy` and `meat`
/// tags, GLUTEN_FREE keeps only `gluten-free` tags, and any tag containing an
/// allergy drops the recipe.
pub fn recipe_allowed(recipe: &Recipe, request: &MealPlanRequest) -> bool {
    let tags: Vec<String> = recipe.tags.iter().map(|t| t.to_lowercase()).collect();
    let any_tag = |needle: &str| tags.iter().any(|t| t.contains(needle));

    for preference in &request.dietary_preferences {
        let allowed = match preference.as_str() {
            "VEGETARIAN" => !any_tag("non-vegetarian"),
            "VEGAN" => !any_tag("dairy") && !any_tag("meat"),
            "GLUTEN_FREE" => any_tag("gluten-free"),
            _ => true,
        };
        if !allowed {
            return false;
        }
    }
    !request.allergies().iter().any(|allergy| {
        let allergy = allergy.trim().to_lowercase();
        !allergy.is_empty() && any_tag(&allergy)
    })
}

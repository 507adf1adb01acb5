use serde::{Deserialize, Serialize};

use crate::config::{PlanConfig, DEFAULT_DURATION_DAYS};
use crate::error::{PlannerError, Result};

fn default_duration_days() -> u32 {
    DEFAULT_DURATION_DAYS
}

/// A user's constraints for one plan. `budget` covers the whole duration.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MealPlanRequest {
    pub budget: f64,
    /// Daily calorie target.
    pub calorie_target: f64,
    #[serde(default)]
    pub dietary_preferences: Vec<String>,
    #[serde(default)]
    pub health_goals: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allergies: Option<Vec<String>>,
    #[serde(default = "default_duration_days")]
    pub duration_days: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

impl MealPlanRequest {
    pub fn daily_budget(&self) -> f64 {
        self.budget / self.duration_days.max(1) as f64
    }

    pub fn allergies(&self) -> &[String] {
        self.allergies.as_deref().unwrap_or(&[])
    }

    /// Checks ranges and vocabularies before the pipeline runs.
    pub fn validate(&self, config: &PlanConfig) -> Result<()> {
        if self.budget.is_nan() || self.budget <= 0.0 {
            return Err(PlannerError::Validation(format!(
                "budget must be positive, got {}",
                self.budget
            )));
        }
        if !config.budget.contains(self.budget) {
            return Err(PlannerError::Validation(format!(
                "budget {} outside [{}, {}]",
                self.budget, config.budget.min, config.budget.max
            )));
        }
        if !config.calories.contains(self.calorie_target) {
            return Err(PlannerError::Validation(format!(
                "calorieTarget {} outside [{}, {}]",
                self.calorie_target, config.calories.min, config.calories.max
            )));
        }
        if self.duration_days == 0 || !config.duration_days.contains(self.duration_days as f64) {
            return Err(PlannerError::Validation(format!(
                "durationDays {} outside [{}, {}]",
                self.duration_days, config.duration_days.min, config.duration_days.max
            )));
        }
        if let Some(unknown) = self
            .dietary_preferences
            .iter()
            .find(|p| !config.dietary_preferences.contains(p))
        {
            return Err(PlannerError::Validation(format!(
                "unknown dietary preference '{}'",
                unknown
            )));
        }
        if let Some(unknown) = self
            .health_goals
            .iter()
            .find(|g| !config.health_goals.contains(g))
        {
            return Err(PlannerError::Validation(format!(
                "unknown health goal '{}'",
                unknown
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> MealPlanRequest {
        serde_json::from_str(
            r#"{"budget": 2100, "calorieTarget": 2000,
                "dietaryPreferences": ["VEGETARIAN"], "healthGoals": ["MAINTAIN_HEALTH"]}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_duration_defaults_to_seven_days() {
        let req = request();
        assert_eq!(req.duration_days, 7);
        assert_eq!(req.daily_budget(), 300.0);
        assert!(req.allergies().is_empty());
        assert!(req.validate(&PlanConfig::default()).is_ok());
    }

    #[test]
    fn test_rejects_out_of_range_values() {
        let config = PlanConfig::default();

        let mut req = request();
        req.calorie_target = 900.0;
        assert!(matches!(req.validate(&config), Err(PlannerError::Validation(_))));

        let mut req = request();
        req.duration_days = 0;
        assert!(req.validate(&config).is_err());

        let mut req = request();
        req.budget = -10.0;
        assert!(req.validate(&config).is_err());
    }

    #[test]
    fn test_rejects_unknown_vocabulary() {
        let mut req = request();
        req.health_goals.push("LIVE_FOREVER".to_string());
        let err = req.validate(&PlanConfig::default()).unwrap_err();
        assert!(err.to_string().contains("LIVE_FOREVER"));
    }
}

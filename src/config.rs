use dotenv::dotenv;
use serde::{Deserialize, Serialize};
use std::env;

pub const API_KEY_ENV_VAR: &str = "OPENROUTER_API_KEY";
pub const MODEL_ENV_VAR: &str = "MEAL_PLANNER_MODEL";
pub const TIMEOUT_ENV_VAR: &str = "MEAL_PLANNER_TIMEOUT_SECS";
pub const BASE_URL_ENV_VAR: &str = "OPENROUTER_BASE_URL";

pub const DEFAULT_MODEL: &str = "qwen/qwen3-32b";
pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_DURATION_DAYS: u32 = 7;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct NumericRange {
    pub min: f64,
    pub max: f64,
    pub default: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
}

impl NumericRange {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Accepted request ranges and vocabularies.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlanConfig {
    pub budget: NumericRange,
    pub calories: NumericRange,
    pub duration_days: NumericRange,
    pub dietary_preferences: Vec<String>,
    pub health_goals: Vec<String>,
}

impl Default for PlanConfig {
    fn default() -> Self {
        PlanConfig {
            budget: NumericRange {
                min: 500.0,
                max: 10000.0,
                default: 2500.0,
                step: Some(100.0),
            },
            calories: NumericRange {
                min: 1000.0,
                max: 5000.0,
                default: 2000.0,
                step: Some(50.0),
            },
            duration_days: NumericRange {
                min: 1.0,
                max: 30.0,
                default: DEFAULT_DURATION_DAYS as f64,
                step: None,
            },
            dietary_preferences: [
                "VEGETARIAN",
                "VEGAN",
                "NON_VEGETARIAN",
                "GLUTEN_FREE",
                "DAIRY_FREE",
                "KETO",
                "PALEO",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            health_goals: ["LOSE_WEIGHT", "GAIN_MUSCLE", "MAINTAIN_HEALTH", "IMPROVE_ENERGY"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Settings for the remote model call and the catalog sample sent with it.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub api_key_env_var: String,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,
    pub recipe_sample: usize,
    pub ingredient_sample: usize,
    /// Ingredients actually rendered into the prompt, out of the sample.
    pub prompt_ingredient_limit: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            api_key_env_var: API_KEY_ENV_VAR.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.2,
            max_tokens: 8192,
            timeout_secs: 60,
            recipe_sample: 100,
            ingredient_sample: 200,
            prompt_ingredient_limit: 50,
        }
    }
}

impl GeneratorConfig {
    /// Defaults overridden by environment variables (a `.env` file is honoured).
    pub fn from_env() -> Self {
        dotenv().ok();
        let mut config = GeneratorConfig::default();
        if let Ok(model) = env::var(MODEL_ENV_VAR) {
            if !model.trim().is_empty() {
                config.model = model;
            }
        }
        if let Ok(base_url) = env::var(BASE_URL_ENV_VAR) {
            if !base_url.trim().is_empty() {
                config.base_url = base_url.trim_end_matches('/').to_string();
            }
        }
        if let Some(secs) = env::var(TIMEOUT_ENV_VAR)
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
        {
            config.timeout_secs = secs;
        }
        config
    }
}

/// Tolerance rules for the per-day budget check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BudgetPolicy {
    /// A day is over budget above `daily_budget * (1 + tolerance)`.
    pub tolerance: f64,
    /// Over-budget days are scaled to `daily_budget * target_ratio`.
    pub target_ratio: f64,
}

impl Default for BudgetPolicy {
    fn default() -> Self {
        BudgetPolicy {
            tolerance: 0.10,
            target_ratio: 1.05,
        }
    }
}

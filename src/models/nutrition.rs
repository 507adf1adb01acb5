use serde::{Deserialize, Serialize};
use std::iter::Sum;
use std::ops::{Add, AddAssign};

/// Absolute nutrition values. Macros in grams, minerals and vitamin C in mg.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NutritionInfo {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fiber: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calcium: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iron: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vitamin_c: Option<f64>,
}

// Share of calories per macro used when a meal has no catalog recipe.
const ESTIMATE_PROTEIN_SHARE: f64 = 0.15;
const ESTIMATE_CARBS_SHARE: f64 = 0.50;
const ESTIMATE_FAT_SHARE: f64 = 0.35;

// Atwater factors, kcal per gram.
const KCAL_PER_G_PROTEIN: f64 = 4.0;
const KCAL_PER_G_CARBS: f64 = 4.0;
const KCAL_PER_G_FAT: f64 = 9.0;

impl NutritionInfo {
    /// Rough macro split for a meal that only carries a calorie estimate.
    pub fn estimate_from_calories(calories: f64) -> Self {
        NutritionInfo {
            calories,
            protein: calories * ESTIMATE_PROTEIN_SHARE / KCAL_PER_G_PROTEIN,
            carbs: calories * ESTIMATE_CARBS_SHARE / KCAL_PER_G_CARBS,
            fat: calories * ESTIMATE_FAT_SHARE / KCAL_PER_G_FAT,
            ..Default::default()
        }
    }

    pub fn scale(self, factor: f64) -> Self {
        NutritionInfo {
            calories: self.calories * factor,
            protein: self.protein * factor,
            carbs: self.carbs * factor,
            fat: self.fat * factor,
            fiber: self.fiber.map(|v| v * factor),
            calcium: self.calcium.map(|v| v * factor),
            iron: self.iron.map(|v| v * factor),
            vitamin_c: self.vitamin_c.map(|v| v * factor),
        }
    }
}

impl AddAssign for NutritionInfo {
    fn add_assign(&mut self, other: Self) {
        self.calories += other.calories;
        self.protein += other.protein;
        self.carbs += other.carbs;
        self.fat += other.fat;
        macro_rules! add_optional {
            ($field:ident) => {
                if let Some(value) = other.$field {
                    self.$field = Some(self.$field.unwrap_or(0.0) + value);
                }
            };
        }
        add_optional!(fiber);
        add_optional!(calcium);
        add_optional!(iron);
        add_optional!(vitamin_c);
    }
}

impl Add for NutritionInfo {
    type Output = NutritionInfo;

    fn add(mut self, other: Self) -> Self {
        self += other;
        self
    }
}

impl Sum for NutritionInfo {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(NutritionInfo::default(), Add::add)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_keeps_present_optionals() {
        let a = NutritionInfo {
            calories: 100.0,
            protein: 5.0,
            fiber: Some(2.0),
            ..Default::default()
        };
        let b = NutritionInfo {
            calories: 50.0,
            fat: 1.0,
            iron: Some(0.5),
            ..Default::default()
        };
        let total = a + b;
        assert_eq!(total.calories, 150.0);
        assert_eq!(total.protein, 5.0);
        assert_eq!(total.fat, 1.0);
        assert_eq!(total.fiber, Some(2.0));
        assert_eq!(total.iron, Some(0.5));
        assert_eq!(total.calcium, None);
    }

    #[test]
    fn test_estimate_from_calories_uses_atwater() {
        let estimate = NutritionInfo::estimate_from_calories(900.0);
        assert!((estimate.protein - 33.75).abs() < 1e-9); // 900 * 0.15 / 4
        assert!((estimate.carbs - 112.5).abs() < 1e-9); // 900 * 0.5 / 4
        assert!((estimate.fat - 35.0).abs() < 1e-9); // 900 * 0.35 / 9
    }

    #[test]
    fn test_scale_and_serde_names() {
        let info = NutritionInfo {
            calories: 10.0,
            vitamin_c: Some(4.0),
            ..Default::default()
        }
        .scale(0.5);
        let json = serde_json::to_value(info).unwrap();
        assert_eq!(json["calories"], 5.0);
        assert_eq!(json["vitaminC"], 2.0);
        assert!(json.get("fiber").is_none());
    }
}

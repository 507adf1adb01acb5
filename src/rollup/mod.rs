//! Additive roll-ups from ingredient to recipe, meal, day and plan.
//!
//! Nutrition and pricing share the same walk and differ only in the value
//! read off each ingredient (and off recipe-less meals), which is what a
//! [`ValueExtractor`] supplies. Catalog values are stored per 100 units.

pub mod nutrition;
pub mod pricing;

use std::ops::Add;

use rayon::prelude::*;

use crate::catalog::Catalog;
use crate::error::{PlannerError, Result};
use crate::models::{Ingredient, NutritionInfo, StoredDay, StoredMeal, StoredMealPlan};

pub trait RollupValue: Copy + Default + Add<Output = Self> + Send + Sync {
    fn scale(self, factor: f64) -> Self;
}

impl RollupValue for f64 {
    fn scale(self, factor: f64) -> Self {
        self * factor
    }
}

impl RollupValue for NutritionInfo {
    fn scale(self, factor: f64) -> Self {
        NutritionInfo::scale(self, factor)
    }
}

pub trait ValueExtractor: Sync {
    type Value: RollupValue;

    /// Value of 100 units of `ingredient`.
    fn per_hundred(&self, ingredient: &Ingredient) -> Self::Value;

    /// Value recorded on a meal that has no catalog recipe.
    fn flat(&self, meal: &StoredMeal) -> Self::Value;
}

pub struct Rollup<'a, E> {
    catalog: &'a Catalog,
    extractor: E,
}

impl<'a, E: ValueExtractor> Rollup<'a, E> {
    pub fn new(catalog: &'a Catalog, extractor: E) -> Self {
        Rollup { catalog, extractor }
    }

    pub fn ingredient_value(&self, ingredient_id: &str, quantity: f64) -> Result<E::Value> {
        let ingredient = self.catalog.find_ingredient(ingredient_id)?;
        Ok(self.extractor.per_hundred(ingredient).scale(quantity / 100.0))
    }

    /// Whole-recipe total divided by the recipe's servings, times `servings`.
    pub fn recipe_value(&self, recipe_id: &str, servings: f64) -> Result<E::Value> {
        let recipe = self.catalog.find_recipe(recipe_id)?;
        if recipe.servings <= 0.0 {
            return Err(PlannerError::InvalidCatalog(format!(
                "recipe '{}' has non-positive servings",
                recipe.id
            )));
        }
        let mut total = E::Value::default();
        for ri in &recipe.ingredients {
            total = total + self.ingredient_value(&ri.ingredient_id, ri.quantity)?;
        }
        Ok(total.scale(servings / recipe.servings))
    }

    pub fn meal_value(&self, meal: &StoredMeal) -> Result<E::Value> {
        match &meal.recipe_id {
            Some(recipe_id) => self.recipe_value(recipe_id, meal.servings),
            None => Ok(self.extractor.flat(meal)),
        }
    }

    pub fn day_value(&self, day: &StoredDay) -> Result<E::Value> {
        let mut total = E::Value::default();
        for meal in &day.meals {
            total = total + self.meal_value(meal)?;
        }
        Ok(total)
    }

    /// One value per day, in day order. Days are resolved in parallel.
    pub fn day_values(&self, plan: &StoredMealPlan) -> Result<Vec<E::Value>> {
        plan.days.par_iter().map(|day| self.day_value(day)).collect()
    }

    pub fn plan_value(&self, plan: &StoredMealPlan) -> Result<E::Value> {
        // Summed sequentially so the result does not depend on scheduling.
        Ok(self
            .day_values(plan)?
            .into_iter()
            .fold(E::Value::default(), |acc, v| acc + v))
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    struct CaloriesOnly;

    impl ValueExtractor for CaloriesOnly {
        type Value = f64;

        fn per_hundred(&self, ingredient: &Ingredient) -> f64 {
            ingredient.calories_per_unit
        }

        fn flat(&self, meal: &StoredMeal) -> f64 {
            meal.calories
        }
    }

    #[test]
    fn test_recipe_value_scales_by_servings() {
        let catalog = catalog();
        let rollup = Rollup::new(&catalog, CaloriesOnly);
        // whole recipe: 200 + 50 = 250 kcal for 2 servings
        assert!((rollup.recipe_value("r", 2.0).unwrap() - 250.0).abs() < 1e-9);
        assert!((rollup.recipe_value("r", 1.0).unwrap() - 125.0).abs() < 1e-9);
        assert!((rollup.recipe_value("r", 4.0).unwrap() - 500.0).abs() < 1e-9);
    }

    #[test]
    fn test_plan_value_mixes_recipe_and_flat_meals() {
        let catalog = catalog();
        let rollup = Rollup::new(&catalog, CaloriesOnly);
        let plan = plan(vec![vec![recipe_meal(1.0), flat_meal(300.0, 40.0)], vec![recipe_meal(2.0)]]);
        assert_eq!(rollup.day_values(&plan).unwrap().len(), 2);
        assert!((rollup.plan_value(&plan).unwrap() - 675.0).abs() < 1e-9);
    }

    #[test]
    fn test_missing_ids_are_errors_not_zero() {
        let catalog = catalog();
        let rollup = Rollup::new(&catalog, CaloriesOnly);
        assert!(matches!(
            rollup.recipe_value("broken", 1.0),
            Err(PlannerError::NotFound { entity: "Ingredient", .. })
        ));
        assert!(matches!(
            rollup.recipe_value("nope", 1.0),
            Err(PlannerError::NotFound { entity: "Recipe", .. })
        ));

        let mut meal = recipe_meal(1.0);
        meal.recipe_id = Some("nope".to_string());
        let plan = plan(vec![vec![flat_meal(100.0, 1.0)], vec![meal]]);
        assert!(rollup.plan_value(&plan).is_err());
    }
}

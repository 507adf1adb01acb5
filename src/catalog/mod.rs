//! Read-only access to the ingredient and recipe catalog.
//!
//! The catalog is built once and then only borrowed: every roll-up takes a
//! `&Catalog` so tests can run against small fixture catalogs.

pub mod data_loader;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::compliance::recipe_allowed;
use crate::error::{PlannerError, Result};
use crate::models::{Ingredient, MealPlanRequest, Recipe};

pub use data_loader::{categorize_ingredient, load_catalog_json, load_ingredient_csv, parse_ingredient_csv};

/// Serialized form of a catalog: `{ "ingredients": [...], "recipes": [...] }`.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct CatalogData {
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    #[serde(default)]
    pub recipes: Vec<Recipe>,
}

#[derive(Debug, Clone)]
pub struct Catalog {
    ingredients: Vec<Ingredient>,
    recipes: Vec<Recipe>,
    ingredient_index: HashMap<String, usize>,
    recipe_index: HashMap<String, usize>,
}

/// A bounded slice of the catalog handed to the remote generator.
#[derive(Debug, Clone)]
pub struct CatalogSample<'a> {
    pub recipes: Vec<&'a Recipe>,
    pub ingredients: &'a [Ingredient],
}

fn check_amount(value: f64, what: &str, owner: &str) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(PlannerError::InvalidCatalog(format!(
            "{} of '{}' must be a finite non-negative number, got {}",
            what, owner, value
        )))
    }
}

fn check_ingredient(ingredient: &Ingredient) -> Result<()> {
    let id = ingredient.id.as_str();
    check_amount(ingredient.calories_per_unit, "caloriesPerUnit", id)?;
    check_amount(ingredient.default_price, "defaultPrice", id)?;
    let macros = &ingredient.macros;
    for (what, value) in [("protein", macros.protein), ("carbs", macros.carbs), ("fat", macros.fat)] {
        check_amount(value, what, id)?;
    }
    for (what, value) in [
        ("fiber", macros.fiber),
        ("calcium", macros.calcium),
        ("iron", macros.iron),
        ("vitaminC", macros.vitamin_c),
    ] {
        if let Some(value) = value {
            check_amount(value, what, id)?;
        }
    }
    for (region, price) in &ingredient.local_prices {
        check_amount(*price, &format!("local price for {}", region), id)?;
    }
    Ok(())
}

fn check_recipe(recipe: &Recipe) -> Result<()> {
    check_amount(recipe.calories, "calories", &recipe.id)?;
    check_amount(recipe.servings, "servings", &recipe.id)?;
    for ri in &recipe.ingredients {
        check_amount(ri.quantity, &format!("quantity of {}", ri.ingredient_id), &recipe.id)?;
    }
    Ok(())
}

impl Catalog {
    /// Builds the lookup indexes. Duplicate ids and non-finite or negative
    /// amounts are rejected.
    pub fn new(ingredients: Vec<Ingredient>, recipes: Vec<Recipe>) -> Result<Self> {
        ingredients.iter().try_for_each(check_ingredient)?;
        recipes.iter().try_for_each(check_recipe)?;

        let mut ingredient_index = HashMap::with_capacity(ingredients.len());
        for (idx, ingredient) in ingredients.iter().enumerate() {
            if ingredient_index.insert(ingredient.id.clone(), idx).is_some() {
                return Err(PlannerError::InvalidCatalog(format!(
                    "duplicate ingredient id '{}'",
                    ingredient.id
                )));
            }
        }
        let mut recipe_index = HashMap::with_capacity(recipes.len());
        for (idx, recipe) in recipes.iter().enumerate() {
            if recipe_index.insert(recipe.id.clone(), idx).is_some() {
                return Err(PlannerError::InvalidCatalog(format!(
                    "duplicate recipe id '{}'",
                    recipe.id
                )));
            }
        }
        Ok(Catalog {
            ingredients,
            recipes,
            ingredient_index,
            recipe_index,
        })
    }

    pub fn from_data(data: CatalogData) -> Result<Self> {
        Catalog::new(data.ingredients, data.recipes)
    }

    /// Returns a new catalog with `extra` ingredients appended.
    pub fn with_ingredients(self, extra: Vec<Ingredient>) -> Result<Self> {
        let mut ingredients = self.ingredients;
        ingredients.extend(extra);
        Catalog::new(ingredients, self.recipes)
    }

    pub fn ingredients(&self) -> &[Ingredient] {
        &self.ingredients
    }

    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    pub fn find_ingredient(&self, id: &str) -> Result<&Ingredient> {
        self.ingredient_index
            .get(id)
            .map(|&idx| &self.ingredients[idx])
            .ok_or_else(|| PlannerError::ingredient_not_found(id))
    }

    pub fn find_recipe(&self, id: &str) -> Result<&Recipe> {
        self.recipe_index
            .get(id)
            .map(|&idx| &self.recipes[idx])
            .ok_or_else(|| PlannerError::recipe_not_found(id))
    }

    /// Case-insensitive substring search on ingredient names, optionally
    /// restricted to one category.
    pub fn search_ingredients(&self, query: &str, category: Option<&str>) -> Vec<&Ingredient> {
        let needle = query.trim().to_lowercase();
        self.ingredients
            .iter()
            .filter(|i| i.name.to_lowercase().contains(&needle))
            .filter(|i| category.map_or(true, |c| i.category.eq_ignore_ascii_case(c)))
            .collect()
    }

    pub fn ingredients_by_category(&self, category: &str) -> Vec<&Ingredient> {
        self.ingredients
            .iter()
            .filter(|i| i.category.eq_ignore_ascii_case(category))
            .collect()
    }

    /// Resolves a free-text recipe name.
    ///
    /// An exact case-insensitive match wins. Otherwise the first recipe in
    /// catalog order whose name contains `query` is returned.
    pub fn find_recipe_by_name(&self, query: &str) -> Option<&Recipe> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }
        self.recipes
            .iter()
            .find(|r| r.name.to_lowercase() == needle)
            .or_else(|| {
                self.recipes
                    .iter()
                    .find(|r| r.name.to_lowercase().contains(&needle))
            })
    }

    pub fn sample(&self, recipe_cap: usize, ingredient_cap: usize) -> CatalogSample<'_> {
        CatalogSample {
            recipes: self.recipes.iter().take(recipe_cap).collect(),
            ingredients: &self.ingredients[..self.ingredients.len().min(ingredient_cap)],
        }
    }

    /// Like [`Catalog::sample`], but recipes whose tags clash with the
    /// request's allergies or dietary preferences are skipped before the cap
    /// is applied.
    pub fn sample_for(
        &self,
        request: &MealPlanRequest,
        recipe_cap: usize,
        ingredient_cap: usize,
    ) -> CatalogSample<'_> {
        let recipes: Vec<&Recipe> = self
            .recipes
            .iter()
            .filter(|recipe| recipe_allowed(recipe, request))
            .take(recipe_cap)
            .collect();
        tracing::debug!(
            kept = recipes.len(),
            total = self.recipes.len(),
            "recipes sampled for request"
        );
        CatalogSample {
            recipes,
            ingredients: &self.ingredients[..self.ingredients.len().min(ingredient_cap)],
        }
    }
}

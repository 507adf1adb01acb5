pub mod catalog;
pub mod nutrition;
pub mod plan;
pub mod request;

pub use catalog::{Ingredient, Macros, Recipe, RecipeIngredient};
pub use nutrition::NutritionInfo;
pub use plan::{
    GeneratedDay, GeneratedMeal, GeneratedMealPlan, MealType, StoredDay, StoredMeal, StoredMealPlan,
};
pub use request::MealPlanRequest;

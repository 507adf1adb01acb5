pub mod api_connection;
pub mod budget;
pub mod catalog;
pub mod cli;
pub mod compliance;
pub mod config;
pub mod error;
pub mod grocery;
pub mod models;
pub mod pipeline;
pub mod plan_generator;
pub mod rollup;

pub use catalog::Catalog;
pub use error::{PlannerError, Result};
pub use pipeline::{MealPlanResponse, MealPlanner};

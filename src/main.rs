use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use meal_planner::budget::suggest_budget_range;
use meal_planner::catalog::{load_catalog_json, load_ingredient_csv};
use meal_planner::cli::{parse_args, Command};
use meal_planner::config::{GeneratorConfig, PlanConfig};
use meal_planner::grocery::build_grocery_list;
use meal_planner::models::{MealPlanRequest, StoredMealPlan};
use meal_planner::{Catalog, MealPlanner, PlannerError};
use serde::Serialize;
use tokio::fs;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_catalog(catalog_path: &Path, ingredients_csv: Option<&Path>) -> Result<Catalog> {
    let catalog = load_catalog_json(catalog_path)
        .with_context(|| format!("Failed to load catalog from '{}'", catalog_path.display()))?;
    match ingredients_csv {
        Some(csv_path) => {
            let extra = load_ingredient_csv(csv_path)
                .with_context(|| format!("Failed to load ingredients from '{}'", csv_path.display()))?;
            Ok(catalog.with_ingredients(extra)?)
        }
        None => Ok(catalog),
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {} file '{}'", what, path.display()))?;
    let value = serde_json::from_str(&content)
        .map_err(PlannerError::from)
        .with_context(|| format!("Failed to parse {} file '{}'", what, path.display()))?;
    Ok(value)
}

async fn emit<T: Serialize>(value: &T, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => {
            fs::write(path, json)
                .await
                .with_context(|| format!("Failed to write '{}'", path.display()))?;
            tracing::info!(path = %path.display(), "response written");
        }
        None => println!("{}", json),
    }
    Ok(())
}

async fn run() -> Result<()> {
    let cli_args = parse_args();

    match cli_args.command {
        Command::Generate {
            request,
            catalog,
            ingredients_csv,
            offline,
            plan_id,
            output,
        } => {
            let meal_request: MealPlanRequest = read_json(&request, "request").await?;
            meal_request.validate(&PlanConfig::default())?;

            let catalog = Arc::new(load_catalog(&catalog, ingredients_csv.as_deref())?);
            let planner = if offline {
                MealPlanner::offline(catalog)
            } else {
                MealPlanner::from_config(catalog, GeneratorConfig::from_env())
            };
            tracing::info!(generator = planner.generator_name(), "planning");

            let response = planner.plan(&meal_request, plan_id).await?;
            emit(&response, output.as_deref()).await
        }
        Command::Grocery { plan, catalog, region } => {
            let stored: StoredMealPlan = read_json(&plan, "plan").await?;
            let catalog = load_catalog(&catalog, None)?;
            let list = build_grocery_list(&stored, &catalog, region.as_deref())?;
            emit(&list, None).await
        }
        Command::Config => emit(&PlanConfig::default(), None).await,
        Command::SuggestBudget { calories, preferences } => {
            emit(&suggest_budget_range(calories, &preferences), None).await
        }
    }
}

fn error_kind(err: &anyhow::Error) -> &'static str {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<PlannerError>())
        .map(PlannerError::kind)
        .unwrap_or_else(|| {
            if err.chain().any(|cause| cause.is::<std::io::Error>()) {
                "io"
            } else {
                "internal"
            }
        })
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    init_tracing();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let body = serde_json::json!({
                "error": {
                    "kind": error_kind(&err),
                    "message": format!("{:#}", err),
                }
            });
            println!("{}", body);
            ExitCode::FAILURE
        }
    }
}

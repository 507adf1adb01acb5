use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate a costed meal plan for a request
    Generate {
        /// Path to the MealPlanRequest JSON file
        #[arg(short, long)]
        request: PathBuf,

        /// Path to the catalog JSON file ({"ingredients": [...], "recipes": [...]})
        #[arg(short, long)]
        catalog: PathBuf,

        /// Extra ingredients from a nutrition/price CSV
        #[arg(long)]
        ingredients_csv: Option<PathBuf>,

        /// Skip the model and use the deterministic plan
        #[arg(long)]
        offline: bool,

        /// Id to give the stored plan
        #[arg(long)]
        plan_id: Option<String>,

        /// Write the response here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the grocery list for a stored plan
    Grocery {
        /// Path to the stored plan JSON file
        #[arg(short, long)]
        plan: PathBuf,

        #[arg(short, long)]
        catalog: PathBuf,

        /// Region whose local prices apply
        #[arg(long)]
        region: Option<String>,
    },

    /// Print the accepted request ranges and vocabularies
    Config,

    /// Suggest a weekly budget range for a calorie target
    SuggestBudget {
        #[arg(long)]
        calories: f64,

        /// Dietary preference, may be repeated
        #[arg(long = "preference")]
        preferences: Vec<String>,
    },
}

pub fn parse_args() -> Cli {
    Cli::parse()
}

use thiserror::Error;

/// Errors surfaced to callers of the planning pipeline.
///
/// Generation failures never show up here: they are recovered by the
/// fallback generator inside [`crate::plan_generator`].
#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Invalid catalog data: {0}")]
    InvalidCatalog(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl PlannerError {
    pub fn ingredient_not_found(id: &str) -> Self {
        PlannerError::NotFound {
            entity: "Ingredient",
            id: id.to_string(),
        }
    }

    pub fn recipe_not_found(id: &str) -> Self {
        PlannerError::NotFound {
            entity: "Recipe",
            id: id.to_string(),
        }
    }

    /// Machine-readable error kind for error responses.
    pub fn kind(&self) -> &'static str {
        match self {
            PlannerError::NotFound { .. } => "not_found",
            PlannerError::Validation(_) => "validation",
            PlannerError::InvalidCatalog(_) => "invalid_catalog",
            PlannerError::Io(_) => "io",
            PlannerError::Json(_) => "json",
            PlannerError::Csv(_) => "csv",
        }
    }
}

pub type Result<T> = std::result::Result<T, PlannerError>;

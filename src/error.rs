//! Error types for the scoring pipeline.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("missing input file: {}", .path.display())]
    MissingInput { path: PathBuf },

    #[error("schema mismatch in {table}: no column `{column}` for field `{field}`")]
    SchemaMismatch {
        table: String,
        field: String,
        column: String,
    },

    #[error("config: {0}")]
    Config(String),

    #[error("csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

impl PipelineError {
    pub fn missing_input(path: impl Into<PathBuf>) -> Self {
        Self::MissingInput { path: path.into() }
    }

    pub fn schema_mismatch(table: &str, field: &str, column: &str) -> Self {
        Self::SchemaMismatch {
            table: table.to_string(),
            field: field.to_string(),
            column: column.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;

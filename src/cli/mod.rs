//! CLI support for sprig
//!
//! Provides programmatic access to the `sprig` subcommands so other tools can
//! evaluate, check, list and translate expressions without shelling out.

mod check;
mod convert;

pub use check::{CheckOptions, CheckResult, execute_check, list_tokens, translate_sql};
pub use convert::{bindings_from_json, json_to_value, value_to_json};

use std::io;

use thiserror::Error;

/// Errors that can occur during CLI operations
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Compile error: {0}")]
    Compile(#[from] crate::CompileError),

    #[error("Evaluation error: {0}")]
    Eval(#[from] crate::EvalError),

    #[error("SQL error: {0}")]
    Sql(#[from] crate::SqlError),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Bindings were valid JSON but not usable as variables
    #[error("Invalid bindings: {0}")]
    InvalidBindings(String),
}

pub mod config;
pub mod error;
pub mod graph;
pub mod lexer;
pub mod mld;
pub mod model;
pub mod parser;
pub mod report;
pub mod rules;
pub mod serializer;
pub mod sql;
pub mod transform;

use tracing::info;
use wasm_bindgen::prelude::*;

pub use config::EngineConfig;
pub use error::{ConfigError, EngineError, Result};
pub use graph::{find_cycle, Graph};
pub use mld::LogicalSchema;
pub use model::Model;
pub use rules::{validate, Diagnostic, Severity};
pub use sql::{emit, map_type, Dialect, SqlScript, TypeParams};
pub use transform::{transform, transform_with, InheritanceStrategy, TransformOptions};

/// Settings for the whole MCD to SQL pipeline.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerateOptions {
    pub dialect: Dialect,
    pub transform: TransformOptions,
    /// Emit even when validation reports errors.
    pub allow_errors: bool,
}

impl GenerateOptions {
    pub fn from_config(config: &EngineConfig) -> std::result::Result<Self, ConfigError> {
        Ok(Self {
            dialect: config.dialect()?,
            transform: config.transform.clone(),
            allow_errors: config.sql.allow_errors,
        })
    }
}

/// Validate, transform and emit.
///
/// Warnings never block generation; errors do unless
/// [`GenerateOptions::allow_errors`] is set. The diagnostics travel with the
/// script, or with the error when generation is refused.
pub fn generate_sql(model: &Model, options: &GenerateOptions) -> Result<SqlScript> {
    let diagnostics = validate(model);
    let errors = rules::error_count(&diagnostics);
    if errors > 0 && !options.allow_errors {
        return Err(EngineError::InvalidModel {
            errors,
            diagnostics,
        });
    }

    let schema = transform_with(model, &options.transform);
    let mut script = SqlScript::new(&schema, options.dialect);
    script.diagnostics = diagnostics;
    info!(
        dialect = %options.dialect,
        tables = schema.tables.len(),
        statements = script.statements.len(),
        "SQL generated"
    );
    Ok(script)
}

/// Read a model from JSON or from the text notation.
pub fn parse_model(source: &str, json: bool) -> Result<Model> {
    if json {
        Ok(Model::from_json(source)?)
    } else {
        Ok(parser::parse_notation(source)?)
    }
}

/// Initialize panic hook for better error messages in WASM
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
}

/// Validate a JSON model, returning the diagnostics as JSON
#[wasm_bindgen(js_name = "validateMcd")]
pub fn validate_mcd(source: &str) -> std::result::Result<String, String> {
    let model = Model::from_json(source).map_err(|e| e.to_string())?;
    serde_json::to_string(&validate(&model)).map_err(|e| e.to_string())
}

/// Convert a JSON model to a SQL script for the named dialect
#[wasm_bindgen(js_name = "mcdToSql")]
pub fn mcd_to_sql(source: &str, dialect: Option<String>) -> std::result::Result<String, String> {
    let model = Model::from_json(source).map_err(|e| e.to_string())?;
    let dialect = match dialect {
        Some(name) => name.parse::<Dialect>().map_err(|e| e.to_string())?,
        None => Dialect::default(),
    };
    let options = GenerateOptions {
        dialect,
        ..Default::default()
    };
    let script = generate_sql(&model, &options).map_err(|e| e.to_string())?;
    Ok(script.render(true))
}

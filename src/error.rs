//! Error types with fix suggestions
//!
//! `FormattingEngine::format` never fails; these errors come from the
//! fallible edges around it (config loading, state files, JSON paths and
//! direct formula parsing).

use thiserror::Error;

use crate::formula::FormulaError;

/// Crate-wide result alias
pub type Result<T, E = BindError> = std::result::Result<T, E>;

/// Trait for errors that provide fix suggestions
pub trait FixSuggestion {
    fn fix_suggestion(&self) -> Option<&str>;
}

#[derive(Error, Debug)]
pub enum BindError {
    // ─────────────────────────────────────────────────────────────
    // I/O (BIND-001)
    // ─────────────────────────────────────────────────────────────
    #[error("BIND-001: Failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    // ─────────────────────────────────────────────────────────────
    // Configuration (BIND-010 to BIND-011)
    // ─────────────────────────────────────────────────────────────
    #[error("BIND-010: Invalid engine config: {0}")]
    Config(#[from] toml::de::Error),

    #[error("BIND-011: UTC offset of {minutes} minutes is out of range")]
    InvalidOffset { minutes: i32 },

    // ─────────────────────────────────────────────────────────────
    // State input (BIND-020 to BIND-021)
    // ─────────────────────────────────────────────────────────────
    #[error("BIND-020: Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("BIND-021: States must be a JSON object of id → value, got {found}")]
    StatesNotObject { found: String },

    // ─────────────────────────────────────────────────────────────
    // JSON path (BIND-030)
    // ─────────────────────────────────────────────────────────────
    #[error("BIND-030: JSON path '{path}' is not supported (use a.b or a[0].b)")]
    JsonPathUnsupported { path: String },

    // ─────────────────────────────────────────────────────────────
    // Formulas (BIND-040)
    // ─────────────────────────────────────────────────────────────
    #[error("BIND-040: Formula error: {0}")]
    Formula(#[from] FormulaError),
}

impl FixSuggestion for BindError {
    fn fix_suggestion(&self) -> Option<&str> {
        match self {
            BindError::Io { .. } => Some("Check file path and permissions"),
            BindError::Config(_) => Some("Check TOML syntax and field types (see EngineConfig)"),
            BindError::InvalidOffset { .. } => {
                Some("Use an offset between -1439 and 1439 minutes, or omit it for local time")
            }
            BindError::Json(_) => Some("Ensure the file is valid JSON (try parsing with jq)"),
            BindError::StatesNotObject { .. } => {
                Some("Write states as {\"state.id.val\": value, ...}")
            }
            BindError::JsonPathUnsupported { .. } => {
                Some("Use simple paths like field.subfield or items[0].name")
            }
            BindError::Formula(_) => {
                Some("Formulas accept arithmetic, comparisons, ?:, Math.* and string helpers")
            }
        }
    }
}

//! Engine configuration (TOML)
//!
//! ```toml
//! user = "admin"
//! language = "de"
//! date_format = "DD.MM.YYYY"
//! utc_offset_minutes = 60      # omit for host local time
//!
//! [formula]
//! max_steps = 10000
//! max_depth = 64
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::binding::MAX_TOKENS;
use crate::date::{DateZone, DEFAULT_DATE_FORMAT};
use crate::error::{BindError, Result};
use crate::formula::FormulaLimits;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub user: String,
    pub login_required: bool,
    pub instance: u64,
    pub language: String,
    pub date_format: String,
    /// Fixed UTC offset for dates; host local time when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub utc_offset_minutes: Option<i32>,
    /// Binding tokens processed per template
    pub max_bindings: usize,
    pub formula: FormulaLimits,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            user: String::new(),
            login_required: false,
            instance: 0,
            language: "en".to_string(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            utc_offset_minutes: None,
            max_bindings: MAX_TOKENS,
            formula: FormulaLimits::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| BindError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Zone for date operators
    pub fn zone(&self) -> Result<DateZone> {
        match self.utc_offset_minutes {
            Some(minutes) => DateZone::from_offset_minutes(minutes),
            None => Ok(DateZone::Local),
        }
    }
}

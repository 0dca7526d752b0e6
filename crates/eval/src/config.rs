//! Engine configuration.
//!
//! # Example
//!
//! ```toml
//! default_language = "legacy"
//! default_zone = "+01:00"
//! input_variable = "cellInput"
//! ```
//!
//! Every key is optional.

use std::path::Path;

use serde::{Deserialize, Serialize};
use time::UtcOffset;

use crate::error::EvalError;
use crate::temporal::parse_offset;
use crate::types::ExpressionLanguage;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Backend for clauses without an expression language tag.
    pub default_language: ExpressionLanguage,
    /// Platform zone, `Z` or `±HH:MM`.
    pub default_zone: String,
    /// Name an input expression's value is bound to for the unary tests.
    pub input_variable: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            default_language: ExpressionLanguage::Strict,
            default_zone: "Z".to_string(),
            input_variable: "cellInput".to_string(),
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(content: &str) -> Result<EngineConfig, EvalError> {
        let config: EngineConfig = toml::from_str(content).map_err(|e| EvalError::InvalidConfig {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file from `path`.
    pub fn from_path(path: &Path) -> Result<EngineConfig, EvalError> {
        let content = std::fs::read_to_string(path).map_err(|e| EvalError::InvalidConfig {
            message: format!("could not read '{}': {}", path.display(), e),
        })?;
        EngineConfig::from_toml_str(&content)
    }

    /// The configured platform zone.
    pub fn zone(&self) -> Result<UtcOffset, EvalError> {
        parse_offset(&self.default_zone).ok_or_else(|| EvalError::InvalidConfig {
            message: format!("invalid default_zone '{}'", self.default_zone),
        })
    }

    pub fn validate(&self) -> Result<(), EvalError> {
        self.zone()?;
        if let ExpressionLanguage::Other(tag) = &self.default_language {
            return Err(EvalError::InvalidConfig {
                message: format!("unknown default_language '{}'", tag),
            });
        }
        if self.input_variable.trim().is_empty() {
            return Err(EvalError::InvalidConfig {
                message: "input_variable must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

#![forbid(unsafe_code)]

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuntimeMode {
    /// Reject anything the filter grammar does not fully consume.
    #[default]
    Strict,
    /// Accept a complete leading expression and ignore what follows it.
    Lenient,
}

#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("invalid policy: {0}")]
    Invalid(&'static str),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryPolicy {
    pub mode: RuntimeMode,
    /// Non-null cells sampled per column when inferring a schema.
    pub inference_sample_rows: usize,
    pub default_page_size: usize,
    pub max_page_size: usize,
    pub max_upload_bytes: u64,
    /// Deepest filter nesting accepted, counting parenthesised groups and
    /// chained comparisons.
    pub max_depth: usize,
}

impl Default for QueryPolicy {
    fn default() -> Self {
        Self::strict()
    }
}

impl QueryPolicy {
    #[must_use]
    pub fn strict() -> Self {
        Self {
            mode: RuntimeMode::Strict,
            inference_sample_rows: 100,
            default_page_size: 20,
            max_page_size: 1_000,
            max_upload_bytes: 50 * 1024 * 1024,
            max_depth: 64,
        }
    }

    #[must_use]
    pub fn lenient() -> Self {
        Self {
            mode: RuntimeMode::Lenient,
            ..Self::strict()
        }
    }

    #[must_use]
    pub fn with_mode(mut self, mode: RuntimeMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn allows_trailing_tokens(&self) -> bool {
        matches!(self.mode, RuntimeMode::Lenient)
    }

    /// Clamp a requested page size into `1..=max_page_size`; `None` and `0`
    /// fall back to the default.
    #[must_use]
    pub fn page_size(&self, requested: Option<usize>) -> usize {
        match requested {
            Some(0) | None => self.default_page_size,
            Some(size) => size.min(self.max_page_size),
        }
    }

    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.inference_sample_rows == 0 {
            return Err(PolicyError::Invalid("inference_sample_rows must be positive"));
        }
        if self.max_depth == 0 {
            return Err(PolicyError::Invalid("max_depth must be positive"));
        }
        if self.default_page_size == 0 || self.max_page_size == 0 {
            return Err(PolicyError::Invalid("page sizes must be positive"));
        }
        if self.default_page_size > self.max_page_size {
            return Err(PolicyError::Invalid(
                "default_page_size must not exceed max_page_size",
            ));
        }
        Ok(())
    }

    /// Parse a JSON policy document. Missing fields take their strict default.
    pub fn from_json_str(input: &str) -> Result<Self, PolicyError> {
        let policy: Self = serde_json::from_str(input)?;
        policy.validate()?;
        Ok(policy)
    }

    pub fn from_json_path(path: impl AsRef<Path>) -> Result<Self, PolicyError> {
        let input = std::fs::read_to_string(path)?;
        Self::from_json_str(&input)
    }
}

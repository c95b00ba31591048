use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// The terms to search for and the locality to search them in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchPlan {
    pub postal_code: String,
    pub country_code: String,
    pub terms: Vec<String>,
}

impl SearchPlan {
    /// Validate the plan in place.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] when the plan cannot produce
    /// well-formed object keys.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.postal_code.trim().is_empty() {
            return Err(ConfigError::Validation(
                "postal_code must be non-empty".to_string(),
            ));
        }
        if self.country_code.trim().is_empty() {
            return Err(ConfigError::Validation(
                "country_code must be non-empty".to_string(),
            ));
        }
        if self.terms.is_empty() {
            return Err(ConfigError::Validation(
                "at least one search term is required".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for term in &self.terms {
            if term.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "search terms must be non-empty".to_string(),
                ));
            }
            // A slash would add a directory level to the object key.
            if term.contains('/') {
                return Err(ConfigError::Validation(format!(
                    "search term '{term}' must not contain '/'"
                )));
            }
            if !seen.insert(term.to_lowercase()) {
                return Err(ConfigError::Validation(format!(
                    "duplicate search term: '{term}'"
                )));
            }
        }

        Ok(())
    }
}

/// Load and validate a search plan from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_plan(path: &Path) -> Result<SearchPlan, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::PlanFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let plan: SearchPlan = serde_yaml::from_str(&content)?;
    plan.validate()?;

    Ok(plan)
}

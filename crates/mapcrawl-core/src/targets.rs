use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::record::{QueryTuple, Zone};
use crate::ConfigError;

/// The fixed city and category lists a crawl walks through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Targets {
    pub cities: Vec<String>,
    pub categories: Vec<String>,
}

impl Targets {
    /// Total number of tuples a full traversal visits.
    #[must_use]
    pub fn tuple_count(&self) -> usize {
        self.cities.len() * Zone::ALL.len() * self.categories.len()
    }

    /// Every tuple in traversal order: city outer, then zone, then category.
    #[must_use]
    pub fn tuples(&self) -> Vec<QueryTuple> {
        let mut out = Vec::with_capacity(self.tuple_count());
        for city in &self.cities {
            for zone in Zone::ALL {
                for category in &self.categories {
                    out.push(QueryTuple::new(city.clone(), zone, category.clone()));
                }
            }
        }
        out
    }
}

/// Load and validate the targets configuration from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_targets(path: &Path) -> Result<Targets, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::TargetsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_targets(&content)
}

pub(crate) fn parse_targets(content: &str) -> Result<Targets, ConfigError> {
    let targets: Targets = serde_yaml::from_str(content)?;
    validate_list("city", &targets.cities)?;
    validate_list("category", &targets.categories)?;
    Ok(targets)
}

fn validate_list(kind: &str, values: &[String]) -> Result<(), ConfigError> {
    if values.is_empty() {
        return Err(ConfigError::Validation(format!(
            "at least one {kind} is required"
        )));
    }

    let mut seen = HashSet::new();
    for value in values {
        if value.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "{kind} names must be non-empty"
            )));
        }
        if !seen.insert(value.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate {kind}: '{value}'"
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "targets_test.rs"]
mod tests;

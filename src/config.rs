//! Evaluation configuration (TOML).
//!
//! ```toml
//! [comparator]
//! gold_attribute = "entity_type"
//! separator = "_"
//! tag_key = "ent"
//!
//! [[category]]
//! name = "Persons"
//! tags = { ent = "per" }
//! gold = { attribute_prefix = { name = "entity_type", prefix = "per" } }
//! ```
//!
//! Missing `[comparator]` fields fall back to the values above. A file with
//! no `[[category]]` entries falls back to [`CategorySet::benasch`].

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::category::{Category, CategorySet};
use crate::eval::strategy::CoarseTypeComparator;
use crate::{Error, Result};

/// Parsed evaluation configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvalConfig {
    /// Type-agreement comparator used by the typed scoring modes
    #[serde(default)]
    pub comparator: CoarseTypeComparator,
    /// Categories in report order
    #[serde(default, rename = "category")]
    pub categories: Vec<Category>,
}

impl EvalConfig {
    /// Parse from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::config(format!("invalid TOML: {}", e)))
    }

    /// Load from a TOML file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// The configured categories, or the BeNASch set if none are configured.
    pub fn category_set(&self) -> Result<CategorySet> {
        if self.categories.is_empty() {
            log::info!("no categories configured, using BeNASch defaults");
            return Ok(CategorySet::benasch());
        }
        CategorySet::new(self.categories.clone())
    }
}

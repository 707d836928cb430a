//! Module catalog parsed from the generated `crates.js` manifest.

use std::fs;
use std::path::Path;

use indexmap::IndexSet;
use once_cell::sync::Lazy;
use regex::Regex;
use traitdex_api::ModuleName;

use crate::error::{Result, TraitdexError};

/// File name of the catalog inside a docs tree.
pub const CATALOG_FILE: &str = "crates.js";

/// Matches the catalog assignment, capturing the JSON name array.
static CATALOG_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"window\.ALL_CRATES\s*=\s*(\[[^\]]*\])\s*;")
        .expect("Failed to compile catalog pattern - this is a fatal error")
});

/// Names of every module the site was generated for, in generation order.
///
/// The catalog is advisory: the index accepts fragments for modules the
/// catalog never mentions, and the cross-check only reports the difference.
#[derive(Debug, Default, Clone)]
pub struct ModuleCatalog {
    modules: IndexSet<ModuleName>,
}

impl ModuleCatalog {
    /// Parses catalog source of the form `window.ALL_CRATES = ["a","b"];`.
    pub fn parse_str(source: &str) -> Result<Self> {
        let captures = CATALOG_LINE.captures(source).ok_or_else(|| {
            TraitdexError::Parsing("catalog has no ALL_CRATES assignment".to_string())
        })?;
        let names: Vec<ModuleName> = serde_json::from_str(&captures[1])?;
        Ok(Self {
            modules: names.into_iter().collect(),
        })
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let source = fs::read_to_string(path)?;
        Self::parse_str(&source)
    }

    pub fn contains(&self, module: &str) -> bool {
        self.modules.contains(module)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ModuleName> {
        self.modules.iter()
    }
}

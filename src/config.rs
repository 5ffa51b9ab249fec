//! JSON configuration for the in-memory tree scanner.
//!
//! Every section is optional; omitted sections take the built-in defaults.
//!
//! ```json
//! {
//!   "catalog": { "lexical_phrases": ["you won't believe"] },
//!   "queries": [{ "tags": ["h2"], "within": "a" }],
//!   "scanner": { "min_fallback_text_len": 12 }
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::catalog::PatternCatalog;
use crate::classifier::TextClassifier;
use crate::dom::{default_queries, StructuralQuery};
use crate::error::Result;
use crate::scanner::{ScannerOptions, TreeScanner};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub catalog: PatternCatalog,
    pub queries: Vec<StructuralQuery>,
    pub scanner: ScannerOptions,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            catalog: PatternCatalog::default(),
            queries: default_queries(),
            scanner: ScannerOptions::default(),
        }
    }
}

impl ScanConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn validate(&self) -> Result<()> {
        self.catalog.validate()
    }

    pub fn classifier(&self) -> TextClassifier {
        TextClassifier::new(self.catalog.clone())
    }

    pub fn into_scanner(self) -> TreeScanner<StructuralQuery> {
        TreeScanner::new(TextClassifier::new(self.catalog), self.queries, self.scanner)
    }
}

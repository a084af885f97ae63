// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Canned answers keyed by query type and language.
//!
//! The file is a JSON object of objects:
//!
//! ```json
//! { "hours": { "en": "We are open 10:00-22:00.", "th": "..." } }
//! ```
//!
//! Unknown query types and languages in the file are kept but never looked
//! up. Empty strings count as missing.

use std::collections::HashMap;
use std::path::Path;

use concierge_core::{ConciergeError, Language, QueryType};

use crate::phrases;

/// Key under which a catalog may define its own greeting per language.
const OTHER_KEY: &str = "other";

/// Read-only answer catalog, loaded once at startup.
#[derive(Debug, Clone, Default)]
pub struct ResponseCatalog {
    entries: HashMap<String, HashMap<String, String>>,
}

impl ResponseCatalog {
    /// Reads and parses the catalog file. Any failure here is a startup error.
    pub fn load(path: &Path) -> Result<Self, ConciergeError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConciergeError::Catalog {
            message: format!("failed to read {}", path.display()),
            source: Some(Box::new(e)),
        })?;
        Self::from_json(&content).map_err(|e| match e {
            ConciergeError::Catalog { message, source } => ConciergeError::Catalog {
                message: format!("{}: {message}", path.display()),
                source,
            },
            other => other,
        })
    }

    /// Parses a catalog from JSON text.
    pub fn from_json(content: &str) -> Result<Self, ConciergeError> {
        let entries = serde_json::from_str(content).map_err(|e| ConciergeError::Catalog {
            message: "expected an object mapping query type to language to text".to_string(),
            source: Some(Box::new(e)),
        })?;
        Ok(Self { entries })
    }

    /// The answer for `(query_type, language)`. Never fails.
    ///
    /// Falls back to the catalog's own `other` entry for the language, then to
    /// the built-in greeting for the language.
    pub fn lookup(&self, query_type: QueryType, language: Language) -> &str {
        self.entry(query_type.as_ref(), language)
            .or_else(|| self.entry(OTHER_KEY, language))
            .unwrap_or_else(|| phrases::greeting(language))
    }

    /// True when the file has a non-empty answer for exactly this pair.
    pub fn contains(&self, query_type: QueryType, language: Language) -> bool {
        self.entry(query_type.as_ref(), language).is_some()
    }

    /// Number of query types defined in the file.
    pub fn topic_count(&self) -> usize {
        self.entries.len()
    }

    fn entry(&self, key: &str, language: Language) -> Option<&str> {
        self.entries
            .get(key)
            .and_then(|by_language| by_language.get(language.as_ref()))
            .map(String::as_str)
            .filter(|text| !text.trim().is_empty())
    }
}

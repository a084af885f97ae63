// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Model-backed message classification.
//!
//! The generator is asked for a JSON object naming the language and query
//! type. Its output is untrusted: fences are stripped, the object is
//! extracted, and each field is checked against its domain. Script detection
//! then overrides the language on every path, including the fallback.

use std::sync::Arc;

use concierge_core::{Classification, Language, ProviderAdapter, ProviderRequest, QueryType};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::outcome::Outcome;
use crate::{prompts, script};

/// Labels messages with a language and a query type.
pub struct Classifier {
    provider: Arc<dyn ProviderAdapter>,
}

impl Classifier {
    pub fn new(provider: Arc<dyn ProviderAdapter>) -> Self {
        Self { provider }
    }

    /// Classify `text`. Never fails; see [`Outcome`] for whether the model
    /// label was used.
    pub async fn classify(&self, text: &str) -> Outcome<Classification> {
        let request = ProviderRequest::prompt(prompts::classification(text)).with_temperature(0.0);

        let outcome = match self.provider.complete(request).await {
            Ok(response) => match parse_classification(&response.content, text) {
                Some(classification) => Outcome::Fresh(classification),
                None => {
                    warn!(raw = %response.content, "unparseable classification, using default");
                    Outcome::fallback(Classification::fallback(text), "unparseable model output")
                }
            },
            Err(e) => {
                warn!(error = %e, "classification call failed, using default");
                Outcome::fallback(Classification::fallback(text), e.to_string())
            }
        };

        let outcome = outcome.map(apply_script_override);
        let label = outcome.value();
        debug!(
            language = %label.language,
            query_type = %label.query_type,
            fallback = outcome.is_fallback(),
            "classified message"
        );
        outcome
    }
}

/// Forces the language when the script leaves no doubt.
fn apply_script_override(mut classification: Classification) -> Classification {
    if let Some(language) = script::detect(&classification.original_text) {
        classification.language = language;
    }
    classification
}

/// Parses model output into a classification of `text`.
///
/// Returns `None` when the output holds no JSON object, or an object in which
/// neither field is in its domain. Otherwise a field that is missing or
/// outside its domain takes its default on its own.
pub fn parse_classification(raw: &str, text: &str) -> Option<Classification> {
    let body = extract_object(strip_code_fence(raw))?;
    let value: Value = serde_json::from_str(body).ok()?;
    let object = value.as_object()?;

    let language = str_field(object, "language").trim().parse::<Language>().ok();
    let query_type = str_field(object, "query_type").trim().parse::<QueryType>().ok();
    if language.is_none() && query_type.is_none() {
        return None;
    }

    Some(Classification {
        language: language.unwrap_or_default(),
        query_type: query_type.unwrap_or_default(),
        original_text: text.to_string(),
    })
}

fn str_field<'a>(object: &'a Map<String, Value>, name: &str) -> &'a str {
    object.get(name).and_then(Value::as_str).unwrap_or_default()
}

/// Removes a surrounding markdown code fence, tagged `json` or not.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let inner = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

/// The text from the first `{` to the last `}`.
fn extract_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

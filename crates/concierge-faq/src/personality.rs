// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Best-effort tone rewriting of canned answers.

use std::sync::Arc;
use std::time::Duration;

use concierge_core::{ConciergeError, Language, ProviderAdapter};
use tracing::{debug, warn};

use crate::outcome::Outcome;
use crate::prompts;

/// Rephrases canned answers in a warmer register.
///
/// A failed, empty, or overdue generation returns the input unchanged.
#[derive(Clone)]
pub struct Rewriter {
    provider: Arc<dyn ProviderAdapter>,
    enabled: bool,
    deadline: Duration,
}

impl Rewriter {
    pub fn new(provider: Arc<dyn ProviderAdapter>, enabled: bool, deadline: Duration) -> Self {
        Self {
            provider,
            enabled,
            deadline,
        }
    }

    /// Replaces the generation deadline.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    pub async fn rewrite(&self, base: &str, language: Language) -> Outcome<String> {
        if !self.enabled {
            return Outcome::Fresh(base.to_string());
        }

        let generation =
            tokio::time::timeout(self.deadline, self.provider.generate(&prompts::personality(base)))
                .await;
        let Ok(generation) = generation else {
            let e = ConciergeError::Timeout {
                duration: self.deadline,
            };
            warn!(%language, error = %e, "rewrite timed out, keeping canned text");
            return Outcome::fallback(base.to_string(), e.to_string());
        };

        match generation {
            Ok(text) => {
                let text = text.trim();
                if text.is_empty() {
                    warn!(%language, "empty rewrite, keeping canned text");
                    Outcome::fallback(base.to_string(), "empty generation")
                } else {
                    debug!(%language, "rewrote canned answer");
                    Outcome::Fresh(text.to_string())
                }
            }
            Err(e) => {
                warn!(%language, error = %e, "rewrite failed, keeping canned text");
                Outcome::fallback(base.to_string(), e.to_string())
            }
        }
    }
}

// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `concierge check` command implementation.
//!
//! Runs offline checks against a loaded configuration: credentials, platform
//! setup and the response catalog. Nothing is sent to any external API.

use std::path::Path;

use concierge_config::ReplyMode;
use concierge_config::model::ConciergeConfig;
use concierge_core::error::ConciergeError;
use concierge_core::types::{Language, QueryType};
use concierge_faq::ResponseCatalog;
use concierge_gemini::GeminiProvider;
use strum::IntoEnumIterator;

/// Status of a single check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

/// Result of a single check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: &'static str,
    pub status: CheckStatus,
    pub message: String,
}

impl CheckResult {
    fn new(name: &'static str, status: CheckStatus, message: impl Into<String>) -> Self {
        Self {
            name,
            status,
            message: message.into(),
        }
    }
}

/// Run the `concierge check` command. Fails if any check fails.
pub fn run_check(config: &ConciergeConfig) -> Result<(), ConciergeError> {
    let results = collect_checks(config);

    println!();
    println!("  concierge check");
    println!("  {}", "-".repeat(50));

    let mut fail_count = 0;
    let mut warn_count = 0;
    for result in &results {
        let tag = match result.status {
            CheckStatus::Pass => "[OK]  ",
            CheckStatus::Warn => {
                warn_count += 1;
                "[WARN]"
            }
            CheckStatus::Fail => {
                fail_count += 1;
                "[FAIL]"
            }
        };
        println!("    {tag} {:<12} {}", result.name, result.message);
    }

    println!("  {}", "-".repeat(50));
    println!(
        "  {} passed, {warn_count} warnings, {fail_count} failed",
        results.len() - warn_count - fail_count
    );
    println!();

    if fail_count > 0 {
        return Err(ConciergeError::Config(format!(
            "{fail_count} check(s) failed"
        )));
    }
    Ok(())
}

pub fn collect_checks(config: &ConciergeConfig) -> Vec<CheckResult> {
    vec![
        CheckResult::new("config", CheckStatus::Pass, "loaded and validated"),
        check_gemini(config),
        check_platforms(config),
        check_messenger_signature(config),
        check_catalog(config),
    ]
}

fn check_gemini(config: &ConciergeConfig) -> CheckResult {
    match GeminiProvider::new(&config.gemini) {
        Ok(_) => CheckResult::new(
            "gemini",
            CheckStatus::Pass,
            format!("model {}", config.gemini.model),
        ),
        Err(e) => CheckResult::new("gemini", CheckStatus::Fail, e.to_string()),
    }
}

fn check_platforms(config: &ConciergeConfig) -> CheckResult {
    let mut routes = Vec::new();
    if config.line.is_configured() {
        routes.push("LINE (POST /callback)");
    }
    if config.messenger.is_configured() {
        routes.push("Messenger (GET/POST /webhook)");
    }

    if routes.is_empty() {
        CheckResult::new(
            "platforms",
            CheckStatus::Fail,
            "no chat platform configured",
        )
    } else {
        CheckResult::new("platforms", CheckStatus::Pass, routes.join(", "))
    }
}

fn check_messenger_signature(config: &ConciergeConfig) -> CheckResult {
    if !config.messenger.is_configured() {
        return CheckResult::new("signatures", CheckStatus::Pass, "no Messenger page");
    }
    if config.messenger.app_secret.is_some() {
        CheckResult::new("signatures", CheckStatus::Pass, "X-Hub-Signature-256 enforced")
    } else {
        CheckResult::new(
            "signatures",
            CheckStatus::Warn,
            "messenger.app_secret unset, Messenger deliveries are not verified",
        )
    }
}

fn check_catalog(config: &ConciergeConfig) -> CheckResult {
    if config.faq.mode == ReplyMode::Relay {
        return CheckResult::new("catalog", CheckStatus::Pass, "relay mode, catalog unused");
    }

    let catalog = match ResponseCatalog::load(Path::new(&config.faq.catalog_path)) {
        Ok(catalog) => catalog,
        Err(e) => return CheckResult::new("catalog", CheckStatus::Fail, e.to_string()),
    };

    let missing = missing_answers(&catalog);
    if missing.is_empty() {
        CheckResult::new(
            "catalog",
            CheckStatus::Pass,
            format!("{} topics, every language covered", catalog.topic_count()),
        )
    } else {
        CheckResult::new(
            "catalog",
            CheckStatus::Warn,
            format!(
                "{} topics, falling back for {}",
                catalog.topic_count(),
                missing.join(", ")
            ),
        )
    }
}

/// `topic/lang` pairs with no dedicated answer.
fn missing_answers(catalog: &ResponseCatalog) -> Vec<String> {
    QueryType::iter()
        .filter(|q| *q != QueryType::Other)
        .flat_map(|q| Language::iter().map(move |l| (q, l)))
        .filter(|(q, l)| !catalog.contains(*q, *l))
        .map(|(q, l)| format!("{q}/{l}"))
        .collect()
}

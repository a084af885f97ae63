// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Covers constraints serde cannot express: a usable bind address, non-zero
//! thresholds and timeouts, and platform credentials that come in pairs.

use crate::diagnostic::ConfigError;
use crate::model::ConciergeConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every error instead of stopping at the first one.
pub fn validate_config(config: &ConciergeConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    validate_server(config, &mut errors);
    validate_gemini(config, &mut errors);
    validate_faq(config, &mut errors);
    validate_platforms(config, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_server(config: &ConciergeConfig, errors: &mut Vec<ConfigError>) {
    let host = config.server.host.trim();
    if host.is_empty() {
        errors.push(ConfigError::validation("server.host must not be empty"));
    } else {
        let is_valid_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':');
        if !is_valid_ip && !is_valid_hostname {
            errors.push(ConfigError::validation(format!(
                "server.host `{host}` is not a valid IP address or hostname"
            )));
        }
    }

    if config.server.port == 0 {
        errors.push(ConfigError::validation("server.port must not be 0"));
    }
}

fn validate_gemini(config: &ConciergeConfig, errors: &mut Vec<ConfigError>) {
    if config.gemini.model.trim().is_empty() {
        errors.push(ConfigError::validation("gemini.model must not be empty"));
    }
    if config.gemini.request_timeout_secs == 0 {
        errors.push(ConfigError::validation(
            "gemini.request_timeout_secs must be greater than 0",
        ));
    }
    if config.gemini.max_output_tokens == Some(0) {
        errors.push(ConfigError::validation(
            "gemini.max_output_tokens must be greater than 0 when set",
        ));
    }
}

fn validate_faq(config: &ConciergeConfig, errors: &mut Vec<ConfigError>) {
    let faq = &config.faq;
    if faq.catalog_path.trim().is_empty() {
        errors.push(ConfigError::validation("faq.catalog_path must not be empty"));
    }
    if faq.handoff_after == 0 {
        errors.push(ConfigError::validation(
            "faq.handoff_after must be at least 1",
        ));
    }
    if faq.history_limit == 0 {
        errors.push(ConfigError::validation(
            "faq.history_limit must be at least 1",
        ));
    }
    if faq.history_limit < faq.handoff_after {
        errors.push(ConfigError::validation(format!(
            "faq.history_limit ({}) must not be smaller than faq.handoff_after ({})",
            faq.history_limit, faq.handoff_after
        )));
    }
    if faq.response_timeout_secs == 0 {
        errors.push(ConfigError::validation(
            "faq.response_timeout_secs must be greater than 0",
        ));
    }
}

fn validate_platforms(config: &ConciergeConfig, errors: &mut Vec<ConfigError>) {
    let line = &config.line;
    if line.channel_access_token.is_some() != line.channel_secret.is_some() {
        errors.push(ConfigError::validation(
            "line.channel_access_token and line.channel_secret must be set together",
        ));
    }

    let messenger = &config.messenger;
    if messenger.page_access_token.is_some() != messenger.verify_token.is_some() {
        errors.push(ConfigError::validation(
            "messenger.page_access_token and messenger.verify_token must be set together",
        ));
    }
    if messenger.app_secret.is_some() && messenger.page_access_token.is_none() {
        errors.push(ConfigError::validation(
            "messenger.app_secret is set but messenger.page_access_token is not",
        ));
    }
}

// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./concierge.toml` > `~/.config/concierge/concierge.toml` >
//! `/etc/concierge/concierge.toml`, with environment variable overrides via the
//! `CONCIERGE_` prefix and the bare credential names the bots were first deployed with.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::ConciergeConfig;

/// Config sections addressable through `CONCIERGE_<SECTION>_<KEY>` variables.
const SECTIONS: &[&str] = &["agent", "server", "gemini", "faq", "line", "messenger"];

/// Bare credential variables and the config key each one sets.
const LEGACY_ENV_KEYS: &[(&str, &str)] = &[
    ("google_api_key", "gemini.api_key"),
    ("line_channel_access_token", "line.channel_access_token"),
    ("line_channel_secret", "line.channel_secret"),
    ("fb_page_access_token", "messenger.page_access_token"),
    ("fb_verify_token", "messenger.verify_token"),
    ("fb_app_secret", "messenger.app_secret"),
];

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/concierge/concierge.toml` (system-wide)
/// 3. `~/.config/concierge/concierge.toml` (user XDG config)
/// 4. `./concierge.toml` (local directory)
/// 5. Bare credential variables (`GOOGLE_API_KEY`, `LINE_CHANNEL_SECRET`, ...)
/// 6. `CONCIERGE_*` environment variables
pub fn load_config() -> Result<ConciergeConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<ConciergeConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ConciergeConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<ConciergeConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ConciergeConfig::default()))
        .merge(Toml::file(path))
        .merge(legacy_env_provider())
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading (exposed for diagnostic use).
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(ConciergeConfig::default()))
        .merge(Toml::file("/etc/concierge/concierge.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("concierge/concierge.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("concierge.toml"))
        .merge(legacy_env_provider())
        .merge(env_provider())
}

/// Maps `CONCIERGE_<SECTION>_<KEY>` to `<section>.<key>`.
///
/// Uses `Env::map()` rather than `Env::split("_")` because keys contain
/// underscores: `CONCIERGE_LINE_CHANNEL_SECRET` is `line.channel_secret`.
fn env_provider() -> Env {
    Env::prefixed("CONCIERGE_").map(|key| section_key(key.as_str()).into())
}

/// Maps the bare credential variable names onto their config keys.
fn legacy_env_provider() -> Env {
    let names: Vec<&str> = LEGACY_ENV_KEYS.iter().map(|(name, _)| *name).collect();
    Env::raw().only(&names).map(|key| {
        let lower = key.as_str().to_ascii_lowercase();
        LEGACY_ENV_KEYS
            .iter()
            .find(|(name, _)| *name == lower)
            .map(|(_, mapped)| (*mapped).to_string())
            .unwrap_or(lower)
            .into()
    })
}

/// Turns `line_channel_secret` into `line.channel_secret`.
///
/// Keys that do not start with a known section are returned unchanged so
/// that `deny_unknown_fields` reports them.
pub(crate) fn section_key(raw: &str) -> String {
    let lower = raw.to_ascii_lowercase();
    for section in SECTIONS {
        if let Some(rest) = lower.strip_prefix(section) {
            if let Some(field) = rest.strip_prefix('_') {
                return format!("{section}.{field}");
            }
        }
    }
    lower
}

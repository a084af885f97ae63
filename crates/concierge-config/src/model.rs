// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Concierge chat relay.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Concierge configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ConciergeConfig {
    /// Process identity and logging.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Webhook HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Gemini text generation settings.
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// FAQ handler policy.
    #[serde(default)]
    pub faq: FaqConfig,

    /// LINE Messaging API integration.
    #[serde(default)]
    pub line: LineConfig,

    /// Facebook Messenger integration.
    #[serde(default)]
    pub messenger: MessengerConfig,
}

/// Process identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name used in logs.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_agent_name() -> String {
    "concierge".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Webhook HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Address to bind the webhook server to.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind the webhook server to.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

/// Gemini API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GeminiConfig {
    /// Gemini API key. `None` falls back to the `GOOGLE_API_KEY` environment variable.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model used for classification, rewriting, and direct relay.
    #[serde(default = "default_gemini_model")]
    pub model: String,

    /// API base URL, up to and including the version segment.
    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,

    /// Per-request HTTP timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Output token cap. `None` uses the model default.
    #[serde(default)]
    pub max_output_tokens: Option<u32>,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_gemini_model(),
            base_url: default_gemini_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            max_output_tokens: None,
        }
    }
}

fn default_gemini_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

/// How inbound messages are answered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplyMode {
    /// Classify, answer from the catalog, rewrite, hand off after a cutoff.
    #[default]
    Faq,
    /// Forward the raw message to the model and return its text.
    Relay,
}

/// FAQ handler policy.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FaqConfig {
    /// Reply mode.
    #[serde(default)]
    pub mode: ReplyMode,

    /// Path to the JSON response catalog.
    #[serde(default = "default_catalog_path")]
    pub catalog_path: String,

    /// Number of prior replies after which the conversation is handed to staff.
    #[serde(default = "default_handoff_after")]
    pub handoff_after: usize,

    /// Replies kept per sender.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    /// Rewrite canned answers in a warmer tone.
    #[serde(default = "default_personality")]
    pub personality: bool,

    /// Deadline in seconds for lookup plus rewrite before apologizing.
    #[serde(default = "default_response_timeout_secs")]
    pub response_timeout_secs: u64,
}

impl Default for FaqConfig {
    fn default() -> Self {
        Self {
            mode: ReplyMode::default(),
            catalog_path: default_catalog_path(),
            handoff_after: default_handoff_after(),
            history_limit: default_history_limit(),
            personality: default_personality(),
            response_timeout_secs: default_response_timeout_secs(),
        }
    }
}

fn default_catalog_path() -> String {
    "data/faq.json".to_string()
}

fn default_handoff_after() -> usize {
    3
}

fn default_history_limit() -> usize {
    10
}

fn default_personality() -> bool {
    true
}

fn default_response_timeout_secs() -> u64 {
    60
}

/// LINE Messaging API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LineConfig {
    /// Long-lived channel access token used for the reply API.
    #[serde(default)]
    pub channel_access_token: Option<String>,

    /// Channel secret used to verify `X-Line-Signature`.
    #[serde(default)]
    pub channel_secret: Option<String>,

    /// Messaging API base URL.
    #[serde(default = "default_line_api_base_url")]
    pub api_base_url: String,
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            channel_access_token: None,
            channel_secret: None,
            api_base_url: default_line_api_base_url(),
        }
    }
}

impl LineConfig {
    /// True when both credentials are present.
    pub fn is_configured(&self) -> bool {
        self.channel_access_token.is_some() && self.channel_secret.is_some()
    }
}

fn default_line_api_base_url() -> String {
    "https://api.line.me".to_string()
}

/// Facebook Messenger configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MessengerConfig {
    /// Page access token used for the Send API.
    #[serde(default)]
    pub page_access_token: Option<String>,

    /// Token echoed back during webhook subscription.
    #[serde(default)]
    pub verify_token: Option<String>,

    /// App secret for `X-Hub-Signature-256` verification. `None` skips the check.
    #[serde(default)]
    pub app_secret: Option<String>,

    /// Graph API version segment.
    #[serde(default = "default_graph_api_version")]
    pub graph_api_version: String,

    /// Graph API base URL.
    #[serde(default = "default_graph_api_base_url")]
    pub api_base_url: String,
}

impl Default for MessengerConfig {
    fn default() -> Self {
        Self {
            page_access_token: None,
            verify_token: None,
            app_secret: None,
            graph_api_version: default_graph_api_version(),
            api_base_url: default_graph_api_base_url(),
        }
    }
}

impl MessengerConfig {
    /// True when both the page token and the verify token are present.
    pub fn is_configured(&self) -> bool {
        self.page_access_token.is_some() && self.verify_token.is_some()
    }
}

fn default_graph_api_version() -> String {
    "v18.0".to_string()
}

fn default_graph_api_base_url() -> String {
    "https://graph.facebook.com".to_string()
}

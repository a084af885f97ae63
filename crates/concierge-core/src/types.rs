// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the core handler, adapters, and the dispatch loop.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Unique identifier for a delivered reply, as reported by the platform.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

/// Chat platform a message arrived on.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Line,
    Messenger,
}

/// Reply language.
///
/// Parsing is case-insensitive; anything unrecognized is treated as English
/// by callers via [`Language::parse_or_default`].
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Th,
    Ja,
    Zh,
}

impl Language {
    /// Parses a language code, falling back to English for unknown codes.
    pub fn parse_or_default(code: &str) -> Self {
        code.trim().parse().unwrap_or_default()
    }
}

/// Coarse intent of a user message.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum QueryType {
    Location,
    Menu,
    Hours,
    Booking,
    Parking,
    #[default]
    Other,
}

impl QueryType {
    /// Parses a query type, falling back to `Other` for unknown values.
    pub fn parse_or_default(value: &str) -> Self {
        value.trim().parse().unwrap_or_default()
    }
}

/// How a reply was produced. Used for branching and logs, never shown to users.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ResponseCategory {
    /// Canned FAQ answer for a recognized query type.
    Faq,
    /// Greeting or unclassified message.
    Other,
    /// Conversation escalated to a human.
    Handoff,
    /// Apology after an internal failure.
    Error,
}

/// The (language, query type) label derived from a raw message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub language: Language,
    pub query_type: QueryType,
    pub original_text: String,
}

impl Classification {
    /// The safe default used whenever classification cannot be trusted.
    pub fn fallback(text: &str) -> Self {
        Self {
            language: Language::En,
            query_type: QueryType::Other,
            original_text: text.to_string(),
        }
    }
}

// --- Channel types ---

/// An inbound text message received from a chat platform webhook.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    /// Platform event or message identifier.
    pub id: String,
    /// Opaque sender identifier (LINE user id, Messenger PSID).
    pub sender_id: String,
    /// Message text.
    pub text: String,
    /// Platform the message came from.
    pub platform: Platform,
    /// LINE reply token; replies on LINE are addressed by token, not user.
    pub reply_token: Option<String>,
    /// ISO 8601 receive timestamp.
    pub received_at: String,
}

impl InboundMessage {
    /// Where a reply to this message should be delivered.
    pub fn reply_target(&self) -> ReplyTarget {
        match &self.reply_token {
            Some(token) => ReplyTarget::ReplyToken(token.clone()),
            None => ReplyTarget::User(self.sender_id.clone()),
        }
    }
}

/// Addressing for an outbound reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyTarget {
    /// Reply to a specific inbound event (LINE reply token).
    ReplyToken(String),
    /// Push to a user id (Messenger recipient).
    User(String),
}

/// An outbound reply to be sent via a channel adapter.
#[derive(Debug, Clone)]
pub struct OutboundMessage {
    pub platform: Platform,
    pub target: ReplyTarget,
    pub text: String,
}

// --- Provider types ---

/// A single-prompt request to a text generation provider.
#[derive(Debug, Clone, Default)]
pub struct ProviderRequest {
    /// Full prompt text.
    pub prompt: String,
    /// Model override; `None` uses the provider default.
    pub model: Option<String>,
    /// Sampling temperature override.
    pub temperature: Option<f32>,
    /// Output token cap override.
    pub max_output_tokens: Option<u32>,
}

impl ProviderRequest {
    /// Builds a request with provider defaults for everything but the prompt.
    pub fn prompt(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Self::default()
        }
    }

    /// Sets the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// A complete generation from a provider.
#[derive(Debug, Clone)]
pub struct ProviderResponse {
    /// Generated text.
    pub content: String,
    /// Model that produced the text.
    pub model: String,
}

// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Concierge chat relay.
//!
//! This crate provides the trait definitions, error type, and common types
//! shared by the FAQ handler, the platform adapters, and the dispatch loop.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::ConciergeError;
pub use types::{
    Classification, InboundMessage, Language, MessageId, OutboundMessage, Platform,
    ProviderRequest, ProviderResponse, QueryType, ReplyTarget, ResponseCategory,
};

pub use traits::{ChannelAdapter, PluginAdapter, ProviderAdapter};

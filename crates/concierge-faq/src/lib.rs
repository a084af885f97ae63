// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message classification and reply generation for the Concierge relay.
//!
//! This crate provides:
//! - [`ResponseCatalog`]: canned answers keyed by query type and language
//! - [`Classifier`]: model-backed language and intent labelling with script overrides
//! - [`Rewriter`]: best-effort tone rewriting of canned answers
//! - [`ConversationTracker`]: bounded per-sender reply history
//! - [`FaqResponder`] and [`RelayResponder`]: the two [`Responder`] modes
//!
//! Nothing here returns an error to the dispatch loop. Every external call
//! degrades to a fixed value wrapped in an [`Outcome`].

pub mod catalog;
pub mod classifier;
pub mod outcome;
pub mod personality;
pub mod phrases;
pub mod prompts;
pub mod relay;
pub mod responder;
pub mod script;
pub mod tracker;

pub use catalog::ResponseCatalog;
pub use classifier::Classifier;
pub use outcome::Outcome;
pub use personality::Rewriter;
pub use relay::RelayResponder;
pub use responder::{FaqResponder, Reply, Responder};
pub use tracker::{ConversationTracker, Exchange};

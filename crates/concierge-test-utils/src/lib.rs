// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Concierge integration tests.
//!
//! Provides mock adapters for fast, deterministic, CI-runnable tests without
//! external services.
//!
//! # Components
//!
//! - [`MockProvider`] - Scripted text generator with failure and delay modes
//! - [`MockChannel`] - Reply transport that captures outbound messages

pub mod mock_channel;
pub mod mock_provider;

pub use mock_channel::MockChannel;
pub use mock_provider::{MockProvider, MockReply};

// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Channel adapter trait for chat platform reply transports (LINE, Messenger).

use async_trait::async_trait;

use crate::error::ConciergeError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{MessageId, OutboundMessage, Platform};

/// Adapter that delivers replies to a chat platform.
///
/// Inbound delivery happens through the webhook gateway; channel adapters
/// only own the outbound half. Failures are reported, never retried.
#[async_trait]
pub trait ChannelAdapter: PluginAdapter {
    /// The platform this adapter delivers to.
    fn platform(&self) -> Platform;

    /// Sends a reply through the channel.
    async fn send(&self, msg: OutboundMessage) -> Result<MessageId, ConciergeError>;
}

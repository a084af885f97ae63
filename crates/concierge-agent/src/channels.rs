// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Routes outbound replies to the adapter for their platform.

use std::collections::HashMap;
use std::sync::Arc;

use concierge_core::ConciergeError;
use concierge_core::traits::channel::ChannelAdapter;
use concierge_core::types::{MessageId, OutboundMessage, Platform};
use tracing::{info, warn};

/// The reply channels available to the dispatch loop, one per platform.
#[derive(Default, Clone)]
pub struct ChannelSet {
    channels: HashMap<Platform, Arc<dyn ChannelAdapter>>,
}

impl ChannelSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `channel` under its own platform, replacing any earlier one.
    pub fn add(&mut self, channel: Arc<dyn ChannelAdapter>) {
        let platform = channel.platform();
        info!(%platform, adapter = channel.name(), "reply channel registered");
        self.channels.insert(platform, channel);
    }

    pub fn get(&self, platform: Platform) -> Option<&Arc<dyn ChannelAdapter>> {
        self.channels.get(&platform)
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    /// Sends `msg` through the channel for `msg.platform`.
    pub async fn send(&self, msg: OutboundMessage) -> Result<MessageId, ConciergeError> {
        let channel = self.get(msg.platform).ok_or_else(|| {
            ConciergeError::Internal(format!("no reply channel for {}", msg.platform))
        })?;
        channel.send(msg).await
    }

    /// Shuts every channel down, logging failures.
    pub async fn shutdown(&self) {
        for (platform, channel) in &self.channels {
            if let Err(e) = channel.shutdown().await {
                warn!(%platform, error = %e, "channel shutdown failed");
            }
        }
    }
}

impl std::fmt::Debug for ChannelSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.channels.keys()).finish()
    }
}

// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Base adapter trait that channel and provider adapters implement.

use async_trait::async_trait;

use crate::error::ConciergeError;

/// The base trait for all Concierge adapters: identity and shutdown.
#[async_trait]
pub trait PluginAdapter: Send + Sync + 'static {
    /// Returns the human-readable name of this adapter instance.
    fn name(&self) -> &str;

    /// Gracefully shuts down the adapter, releasing any held resources.
    async fn shutdown(&self) -> Result<(), ConciergeError>;
}

// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook gateway for the Concierge chat relay.
//!
//! The gateway owns the HTTP surface the chat platforms call. Handlers verify
//! each delivery, turn it into [`InboundMessage`]s and push them onto an mpsc
//! queue drained by the dispatch loop. Replies do not flow back through the
//! gateway; they go out through the platform channel adapters.
//!
//! [`InboundMessage`]: concierge_core::types::InboundMessage

pub mod handlers;
pub mod server;

pub use server::{GatewayState, HealthState, build_router, start_server};

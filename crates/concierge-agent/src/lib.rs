// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dispatch loop for the Concierge chat relay.
//!
//! The [`AgentLoop`] is the central coordinator that:
//! - Receives verified messages from the webhook gateway's queue
//! - Asks the configured [`Responder`] for a reply, given the sender's history
//! - Records the reply in the [`ConversationTracker`]
//! - Sends it back through the channel for the message's platform
//! - Handles graceful shutdown

pub mod channels;
pub mod shutdown;

use std::sync::Arc;
use std::time::Duration;

use concierge_core::error::ConciergeError;
use concierge_core::types::{InboundMessage, OutboundMessage};
use concierge_faq::{ConversationTracker, Reply, Responder};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

pub use channels::ChannelSet;

/// Grace period for in-flight replies after shutdown is requested.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

/// Coordinates message flow between the gateway queue, the responder and
/// the reply channels.
///
/// Cheap to clone; every message is handled on its own task with a clone.
#[derive(Clone)]
pub struct AgentLoop {
    responder: Arc<dyn Responder>,
    tracker: Arc<ConversationTracker>,
    channels: Arc<ChannelSet>,
}

impl AgentLoop {
    pub fn new(
        responder: Arc<dyn Responder>,
        tracker: Arc<ConversationTracker>,
        channels: ChannelSet,
    ) -> Self {
        info!(channels = ?channels, history_limit = tracker.limit(), "dispatch loop initialized");
        Self {
            responder,
            tracker,
            channels: Arc::new(channels),
        }
    }

    pub fn tracker(&self) -> &Arc<ConversationTracker> {
        &self.tracker
    }

    /// Runs until `cancel` fires or the inbound queue closes.
    ///
    /// On exit, in-flight messages are given [`DRAIN_TIMEOUT`] to finish and
    /// the reply channels are shut down.
    pub async fn run(
        &self,
        mut inbound: mpsc::Receiver<InboundMessage>,
        cancel: CancellationToken,
    ) -> Result<(), ConciergeError> {
        info!("dispatch loop running");
        let mut tasks = JoinSet::new();

        loop {
            tokio::select! {
                msg = inbound.recv() => {
                    let Some(msg) = msg else {
                        info!("inbound queue closed, stopping dispatch loop");
                        break;
                    };
                    let agent = self.clone();
                    tasks.spawn(async move {
                        if let Err(e) = agent.handle_inbound(msg).await {
                            error!(error = %e, "failed to deliver reply");
                        }
                    });
                }
                Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                    if let Err(e) = joined {
                        error!(error = %e, "message task panicked");
                    }
                }
                _ = cancel.cancelled() => {
                    info!("shutdown signal received, stopping dispatch loop");
                    break;
                }
            }
        }

        shutdown::drain_tasks(&mut tasks, DRAIN_TIMEOUT).await;
        self.channels.shutdown().await;

        info!(
            conversations = self.tracker.sender_count(),
            "dispatch loop stopped"
        );
        Ok(())
    }

    /// Handles one message: respond, record, then send.
    ///
    /// The reply is recorded before sending, so a transport failure still
    /// counts towards the sender's handoff threshold. The returned error is
    /// the transport's; it is not retried.
    pub async fn handle_inbound(&self, inbound: InboundMessage) -> Result<Reply, ConciergeError> {
        let sender_id = inbound.sender_id.as_str();
        let count = self.tracker.count(sender_id);

        debug!(
            platform = %inbound.platform,
            sender_id,
            message_count = count,
            "handling inbound message"
        );

        let reply = self.responder.respond(&inbound.text, count).await;
        self.tracker.record(sender_id, reply.text.clone(), reply.category);

        let outbound = OutboundMessage {
            platform: inbound.platform,
            target: inbound.reply_target(),
            text: reply.text.clone(),
        };

        match self.channels.send(outbound).await {
            Ok(message_id) => {
                info!(
                    platform = %inbound.platform,
                    sender_id,
                    category = %reply.category,
                    message_id = %message_id.0,
                    "reply sent"
                );
                Ok(reply)
            }
            Err(e) => {
                warn!(platform = %inbound.platform, sender_id, "reply transport failed");
                Err(e)
            }
        }
    }
}

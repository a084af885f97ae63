// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `concierge serve` command implementation.
//!
//! Builds the Gemini provider, the responder for the configured reply mode,
//! one reply channel per configured platform, and the webhook gateway, then
//! runs the dispatch loop until SIGINT/SIGTERM.

use std::path::Path;
use std::sync::Arc;

use concierge_agent::{AgentLoop, ChannelSet, shutdown};
use concierge_config::model::ConciergeConfig;
use concierge_config::ReplyMode;
use concierge_core::error::ConciergeError;
use concierge_core::types::InboundMessage;
use concierge_core::ProviderAdapter;
use concierge_faq::{ConversationTracker, FaqResponder, RelayResponder, Responder, ResponseCatalog};
use concierge_gateway::GatewayState;
use concierge_gemini::GeminiProvider;
use concierge_line::{LineChannel, LineWebhook};
use concierge_messenger::{MessengerChannel, MessengerWebhook};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// Messages accepted by the gateway but not yet picked up by the loop.
const INBOUND_QUEUE_CAPACITY: usize = 256;

/// Runs the `concierge serve` command.
pub async fn run_serve(config: ConciergeConfig) -> Result<(), ConciergeError> {
    init_tracing(&config.agent.log_level);

    info!(
        agent_name = config.agent.name.as_str(),
        mode = ?config.faq.mode,
        "starting concierge serve"
    );

    let channels = build_channels(&config)?;
    let provider: Arc<dyn ProviderAdapter> = Arc::new(GeminiProvider::new(&config.gemini)?);
    let responder = build_responder(&config, provider.clone())?;
    let tracker = Arc::new(ConversationTracker::new(config.faq.history_limit));
    let agent = AgentLoop::new(responder, tracker, channels);
    log_heap_usage("startup");

    let (inbound_tx, inbound_rx) = mpsc::channel(INBOUND_QUEUE_CAPACITY);
    let state = gateway_state(&config, inbound_tx);
    let cancel = shutdown::install_signal_handler();

    let server = tokio::spawn({
        let cancel = cancel.clone();
        let server_config = config.server.clone();
        async move {
            let result = concierge_gateway::start_server(&server_config, state, cancel.clone()).await;
            if let Err(e) = &result {
                error!(error = %e, "webhook server failed");
                cancel.cancel();
            }
            result
        }
    });

    agent.run(inbound_rx, cancel.clone()).await?;
    cancel.cancel();

    match server.await {
        Ok(result) => result?,
        Err(e) => return Err(ConciergeError::Internal(format!("webhook server task failed: {e}"))),
    }

    if let Err(e) = provider.shutdown().await {
        warn!(provider = provider.name(), error = %e, "provider shutdown failed");
    }

    log_heap_usage("shutdown");
    info!("concierge stopped");
    Ok(())
}

/// One reply channel per configured platform. At least one is required.
pub(crate) fn build_channels(config: &ConciergeConfig) -> Result<ChannelSet, ConciergeError> {
    let mut channels = ChannelSet::new();
    if config.line.is_configured() {
        channels.add(Arc::new(LineChannel::new(&config.line)?));
    }
    if config.messenger.is_configured() {
        channels.add(Arc::new(MessengerChannel::new(&config.messenger)?));
    }

    if channels.is_empty() {
        return Err(ConciergeError::Config(
            "no chat platform configured. Set the [line] or [messenger] credentials.".into(),
        ));
    }
    Ok(channels)
}

/// Webhook verifiers for the configured platforms.
pub(crate) fn gateway_state(
    config: &ConciergeConfig,
    inbound_tx: mpsc::Sender<InboundMessage>,
) -> GatewayState {
    let mut state = GatewayState::new(inbound_tx);
    if config.line.is_configured() {
        if let Some(secret) = &config.line.channel_secret {
            state = state.with_line(LineWebhook::new(secret.clone()));
        }
    }
    if config.messenger.is_configured() {
        if let Some(webhook) = MessengerWebhook::from_config(&config.messenger) {
            state = state.with_messenger(webhook);
        }
    }
    state
}

/// The responder for `faq.mode`. FAQ mode loads the catalog and fails if it
/// is missing or malformed.
pub(crate) fn build_responder(
    config: &ConciergeConfig,
    provider: Arc<dyn ProviderAdapter>,
) -> Result<Arc<dyn Responder>, ConciergeError> {
    match config.faq.mode {
        ReplyMode::Faq => {
            let catalog = ResponseCatalog::load(Path::new(&config.faq.catalog_path))?;
            info!(
                path = config.faq.catalog_path.as_str(),
                topics = catalog.topic_count(),
                handoff_after = config.faq.handoff_after,
                "response catalog loaded"
            );
            Ok(Arc::new(FaqResponder::new(
                provider,
                Arc::new(catalog),
                &config.faq,
            )))
        }
        ReplyMode::Relay => Ok(Arc::new(RelayResponder::new(provider))),
    }
}

/// Allocated and resident heap bytes as reported by jemalloc.
#[cfg(not(target_env = "msvc"))]
pub(crate) fn heap_stats() -> Option<(usize, usize)> {
    // Stats are cached until the epoch advances.
    tikv_jemalloc_ctl::epoch::advance().ok()?;
    let allocated = tikv_jemalloc_ctl::stats::allocated::read().ok()?;
    let resident = tikv_jemalloc_ctl::stats::resident::read().ok()?;
    Some((allocated, resident))
}

#[cfg(target_env = "msvc")]
pub(crate) fn heap_stats() -> Option<(usize, usize)> {
    None
}

fn log_heap_usage(stage: &str) {
    if let Some((allocated, resident)) = heap_stats() {
        info!(
            stage,
            allocated_bytes = allocated,
            resident_bytes = resident,
            "heap usage"
        );
    }
}

/// Initializes the tracing subscriber with the configured log level.
///
/// `RUST_LOG` takes precedence when set.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("concierge={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

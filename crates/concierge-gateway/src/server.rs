// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use concierge_config::model::ServerConfig;
use concierge_core::ConciergeError;
use concierge_core::types::InboundMessage;
use concierge_line::LineWebhook;
use concierge_messenger::MessengerWebhook;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

use crate::handlers;

/// Health state for the liveness endpoint.
#[derive(Debug, Clone)]
pub struct HealthState {
    /// Process start time for uptime calculation.
    pub start_time: std::time::Instant,
}

/// Shared state for axum request handlers.
#[derive(Debug, Clone)]
pub struct GatewayState {
    /// Queue drained by the dispatch loop.
    pub inbound_tx: mpsc::Sender<InboundMessage>,
    /// LINE webhook verifier, when LINE is configured.
    pub line: Option<Arc<LineWebhook>>,
    /// Messenger webhook verifier, when Messenger is configured.
    pub messenger: Option<Arc<MessengerWebhook>>,
    pub health: HealthState,
}

impl GatewayState {
    pub fn new(inbound_tx: mpsc::Sender<InboundMessage>) -> Self {
        Self {
            inbound_tx,
            line: None,
            messenger: None,
            health: HealthState {
                start_time: std::time::Instant::now(),
            },
        }
    }

    pub fn with_line(mut self, webhook: LineWebhook) -> Self {
        self.line = Some(Arc::new(webhook));
        self
    }

    pub fn with_messenger(mut self, webhook: MessengerWebhook) -> Self {
        self.messenger = Some(Arc::new(webhook));
        self
    }
}

/// Builds the router. Platform routes are mounted only for configured platforms:
/// - POST /callback (LINE)
/// - GET, POST /webhook (Messenger)
/// - GET /health
pub fn build_router(state: GatewayState) -> Router {
    let mut app = Router::new()
        .route("/health", get(handlers::get_health))
        .with_state(state.clone());

    if state.line.is_some() {
        app = app.merge(
            Router::new()
                .route("/callback", post(handlers::line_callback))
                .with_state(state.clone()),
        );
    }

    if state.messenger.is_some() {
        app = app.merge(
            Router::new()
                .route(
                    "/webhook",
                    get(handlers::messenger_verify).post(handlers::messenger_webhook),
                )
                .with_state(state),
        );
    }

    app.layer(TraceLayer::new_for_http())
}

/// Start the webhook server and serve until `cancel` fires.
pub async fn start_server(
    config: &ServerConfig,
    state: GatewayState,
    cancel: CancellationToken,
) -> Result<(), ConciergeError> {
    let line = state.line.is_some();
    let messenger = state.messenger.is_some();
    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| ConciergeError::Channel {
            message: format!("failed to bind gateway to {addr}: {e}"),
            source: Some(Box::new(e)),
        })?;

    tracing::info!(%addr, line, messenger, "webhook server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await
        .map_err(|e| ConciergeError::Channel {
            message: format!("gateway server error: {e}"),
            source: Some(Box::new(e)),
        })?;

    tracing::info!("webhook server stopped");
    Ok(())
}

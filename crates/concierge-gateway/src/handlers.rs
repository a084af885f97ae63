// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the webhook gateway.
//!
//! Handles POST /callback, GET and POST /webhook, GET /health.

use std::time::Duration;

use axum::{
    Json,
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use concierge_core::ConciergeError;
use concierge_core::types::InboundMessage;
use concierge_messenger::{Subscription, SubscriptionQuery};
use serde::Serialize;
use tracing::{debug, warn};

use crate::server::GatewayState;

/// How long a handler waits for room in the inbound queue.
const ENQUEUE_TIMEOUT: Duration = Duration::from_secs(5);

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Health status string.
    pub status: String,
    /// Binary version.
    pub version: String,
    /// Uptime in seconds.
    pub uptime_secs: u64,
}

/// POST /callback
///
/// LINE webhook. A missing or bad `X-Line-Signature` is a 400.
pub async fn line_callback(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let Some(webhook) = state.line.as_ref() else {
        return StatusCode::NOT_FOUND.into_response();
    };

    let signature = header_str(&headers, concierge_line::signature::SIGNATURE_HEADER);
    match webhook.handle(signature, &body) {
        Ok(messages) => enqueue(&state, messages).await,
        Err(ConciergeError::Signature { .. }) => {
            warn!("rejected LINE webhook with invalid signature");
            (StatusCode::BAD_REQUEST, "Invalid signature").into_response()
        }
        Err(e) => {
            warn!(error = %e, "rejected malformed LINE webhook");
            (StatusCode::BAD_REQUEST, "Malformed payload").into_response()
        }
    }
}

/// GET /webhook
///
/// Messenger subscription handshake.
pub async fn messenger_verify(
    State(state): State<GatewayState>,
    Query(query): Query<SubscriptionQuery>,
) -> Response {
    let Some(webhook) = state.messenger.as_ref() else {
        return StatusCode::NOT_FOUND.into_response();
    };

    match webhook.verify_subscription(&query) {
        Subscription::Confirmed(challenge) => {
            debug!("Messenger subscription confirmed");
            (StatusCode::OK, challenge).into_response()
        }
        Subscription::TokenMismatch => {
            warn!("Messenger subscription attempted with wrong verify token");
            (StatusCode::FORBIDDEN, "Verification token mismatch").into_response()
        }
        Subscription::NotRequested => (StatusCode::OK, "Hello world").into_response(),
    }
}

/// POST /webhook
///
/// Messenger deliveries. A bad `X-Hub-Signature-256` is a 403.
pub async fn messenger_webhook(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let Some(webhook) = state.messenger.as_ref() else {
        return StatusCode::NOT_FOUND.into_response();
    };

    let signature = header_str(&headers, concierge_messenger::signature::SIGNATURE_HEADER);
    match webhook.handle(signature, &body) {
        Ok(messages) => enqueue(&state, messages).await,
        Err(ConciergeError::Signature { .. }) => {
            warn!("rejected Messenger webhook with invalid signature");
            (StatusCode::FORBIDDEN, "Invalid signature").into_response()
        }
        Err(e) => {
            warn!(error = %e, "rejected malformed Messenger webhook");
            (StatusCode::BAD_REQUEST, "Malformed payload").into_response()
        }
    }
}

/// GET /health
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.health.start_time.elapsed().as_secs(),
    })
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Pushes verified messages to the dispatch loop, then acknowledges with `OK`.
///
/// A delivery is queued whole or not at all: on 503 the platform redelivers
/// every event in it.
async fn enqueue(state: &GatewayState, messages: Vec<InboundMessage>) -> Response {
    if messages.is_empty() {
        return (StatusCode::OK, "OK").into_response();
    }
    if messages.len() > state.inbound_tx.max_capacity() {
        warn!(batch = messages.len(), "delivery larger than the inbound queue");
        return (StatusCode::SERVICE_UNAVAILABLE, "inbound queue full").into_response();
    }

    let reserve = state.inbound_tx.reserve_many(messages.len());
    let permits = match tokio::time::timeout(ENQUEUE_TIMEOUT, reserve).await {
        Ok(Ok(permits)) => permits,
        Ok(Err(_)) => {
            warn!("dispatch loop is not accepting messages");
            return (StatusCode::SERVICE_UNAVAILABLE, "dispatch loop stopped").into_response();
        }
        Err(_) => {
            warn!(batch = messages.len(), "inbound queue full");
            return (StatusCode::SERVICE_UNAVAILABLE, "inbound queue full").into_response();
        }
    };

    for (permit, message) in permits.zip(messages) {
        debug!(
            platform = %message.platform,
            sender_id = message.sender_id,
            "enqueueing inbound message"
        );
        permit.send(message);
    }
    (StatusCode::OK, "OK").into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::build_router;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use concierge_core::types::Platform;
    use concierge_line::LineWebhook;
    use concierge_messenger::MessengerWebhook;
    use tokio::sync::mpsc;
    use tower::ServiceExt;

    const LINE_SECRET: &str = "line-secret";
    const APP_SECRET: &str = "app-secret";

    fn app(capacity: usize) -> (axum::Router, mpsc::Receiver<InboundMessage>) {
        let (tx, rx) = mpsc::channel(capacity);
        let state = GatewayState::new(tx)
            .with_line(LineWebhook::new(LINE_SECRET))
            .with_messenger(MessengerWebhook::new("verify-me", Some(APP_SECRET.into())));
        (build_router(state), rx)
    }

    async fn send(app: axum::Router, request: Request<Body>) -> (StatusCode, String) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), 64 * 1024).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    fn post(uri: &str, header: Option<(&str, String)>, body: &'static str) -> Request<Body> {
        let mut builder = Request::builder().method("POST").uri(uri);
        if let Some((name, value)) = header {
            builder = builder.header(name, value);
        }
        builder.body(Body::from(body)).unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    const LINE_BODY: &str = r#"{"destination":"U0","events":[{"type":"message","replyToken":"r1","source":{"type":"user","userId":"U1"},"timestamp":1700000000000,"message":{"type":"text","id":"1","text":"Where are you?"}}]}"#;

    const MESSENGER_BODY: &str = r#"{"object":"page","entry":[{"id":"P","messaging":[{"sender":{"id":"PSID1"},"recipient":{"id":"P"},"message":{"mid":"m1","text":"メニューは?"}}]}]}"#;

    #[tokio::test]
    async fn line_signed_delivery_is_enqueued() {
        let (app, mut rx) = app(4);
        let signature = concierge_line::signature::sign(LINE_SECRET, LINE_BODY.as_bytes());
        let (status, body) = send(
            app,
            post("/callback", Some(("x-line-signature", signature)), LINE_BODY),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "OK");
        let message = rx.try_recv().unwrap();
        assert_eq!(message.platform, Platform::Line);
        assert_eq!(message.sender_id, "U1");
        assert_eq!(message.reply_token.as_deref(), Some("r1"));
    }

    #[tokio::test]
    async fn line_bad_signature_is_400_and_nothing_enqueued() {
        let (app, mut rx) = app(4);
        let signature = concierge_line::signature::sign("other-secret", LINE_BODY.as_bytes());
        let (status, _) = send(
            app.clone(),
            post("/callback", Some(("x-line-signature", signature)), LINE_BODY),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(app, post("/callback", None, LINE_BODY)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn messenger_handshake() {
        let (app, _rx) = app(1);

        let (status, body) = send(
            app.clone(),
            get("/webhook?hub.mode=subscribe&hub.verify_token=verify-me&hub.challenge=42"),
        )
        .await;
        assert_eq!((status, body.as_str()), (StatusCode::OK, "42"));

        let (status, body) = send(
            app.clone(),
            get("/webhook?hub.mode=subscribe&hub.verify_token=wrong&hub.challenge=42"),
        )
        .await;
        assert_eq!(
            (status, body.as_str()),
            (StatusCode::FORBIDDEN, "Verification token mismatch")
        );

        let (status, body) = send(app, get("/webhook")).await;
        assert_eq!((status, body.as_str()), (StatusCode::OK, "Hello world"));
    }

    #[tokio::test]
    async fn messenger_signed_delivery_is_enqueued() {
        let (app, mut rx) = app(4);
        let signature = concierge_messenger::signature::sign(APP_SECRET, MESSENGER_BODY.as_bytes());
        let (status, body) = send(
            app,
            post("/webhook", Some(("x-hub-signature-256", signature)), MESSENGER_BODY),
        )
        .await;

        assert_eq!((status, body.as_str()), (StatusCode::OK, "OK"));
        let message = rx.try_recv().unwrap();
        assert_eq!(message.platform, Platform::Messenger);
        assert_eq!(message.text, "メニューは?");
        assert!(message.reply_token.is_none());
    }

    #[tokio::test]
    async fn messenger_bad_signature_is_403() {
        let (app, mut rx) = app(4);
        let (status, _) = send(
            app,
            post(
                "/webhook",
                Some(("x-hub-signature-256", "sha256=00".to_string())),
                MESSENGER_BODY,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert!(rx.try_recv().is_err());
    }

    const LINE_BATCH_BODY: &str = r#"{"destination":"U0","events":[{"type":"message","replyToken":"r2","source":{"type":"user","userId":"U2"},"timestamp":1700000000000,"message":{"type":"text","id":"2","text":"Menu?"}},{"type":"message","replyToken":"r3","source":{"type":"user","userId":"U3"},"timestamp":1700000000000,"message":{"type":"text","id":"3","text":"Parking?"}}]}"#;

    #[tokio::test(start_paused = true)]
    async fn delivery_that_does_not_fit_enqueues_nothing() {
        let (app, mut rx) = app(2);
        let signature = concierge_line::signature::sign(LINE_SECRET, LINE_BODY.as_bytes());
        let (status, _) = send(
            app.clone(),
            post("/callback", Some(("x-line-signature", signature)), LINE_BODY),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        // One slot left, two events in the delivery.
        let batch_signature =
            concierge_line::signature::sign(LINE_SECRET, LINE_BATCH_BODY.as_bytes());
        let (status, _) = send(
            app.clone(),
            post(
                "/callback",
                Some(("x-line-signature", batch_signature.clone())),
                LINE_BATCH_BODY,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(rx.try_recv().unwrap().sender_id, "U1");
        assert!(rx.try_recv().is_err());

        // The redelivery fits once the queue has drained.
        let (status, _) = send(
            app,
            post(
                "/callback",
                Some(("x-line-signature", batch_signature)),
                LINE_BATCH_BODY,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(rx.try_recv().unwrap().sender_id, "U2");
        assert_eq!(rx.try_recv().unwrap().sender_id, "U3");
    }

    #[tokio::test]
    async fn closed_queue_is_503() {
        let (app, rx) = app(1);
        drop(rx);
        let signature = concierge_line::signature::sign(LINE_SECRET, LINE_BODY.as_bytes());
        let (status, _) = send(
            app,
            post("/callback", Some(("x-line-signature", signature)), LINE_BODY),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn health_reports_version() {
        let (app, _rx) = app(1);
        let (status, body) = send(app, get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    }
}

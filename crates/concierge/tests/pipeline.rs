// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests for the webhook → dispatch → reply pipeline.
//!
//! Each test wires a real gateway router, dispatch loop and responder to a
//! scripted provider and capturing reply channels. No network is used.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use concierge_agent::{AgentLoop, ChannelSet};
use concierge_config::model::FaqConfig;
use concierge_core::types::{Language, Platform, ReplyTarget, ResponseCategory};
use concierge_faq::{ConversationTracker, FaqResponder, RelayResponder, Responder, ResponseCatalog, phrases};
use concierge_gateway::{GatewayState, build_router};
use concierge_line::LineWebhook;
use concierge_messenger::MessengerWebhook;
use concierge_test_utils::{MockChannel, MockProvider};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

const LINE_SECRET: &str = "line-secret";

const CATALOG: &str = r#"{
    "hours": {"en": "We are open 10am to 10pm.", "th": "เปิด 10 โมงถึง 4 ทุ่ม"},
    "other": {"en": "Hello! How can we help?"}
}"#;

struct Pipeline {
    router: axum::Router,
    line: Arc<MockChannel>,
    messenger: Arc<MockChannel>,
    tracker: Arc<ConversationTracker>,
    cancel: CancellationToken,
}

impl Pipeline {
    fn start(responder: Arc<dyn Responder>) -> Self {
        let line = Arc::new(MockChannel::new(Platform::Line));
        let messenger = Arc::new(MockChannel::new(Platform::Messenger));
        let mut channels = ChannelSet::new();
        channels.add(line.clone());
        channels.add(messenger.clone());

        let tracker = Arc::new(ConversationTracker::new(10));
        let agent = AgentLoop::new(responder, tracker.clone(), channels);

        let (tx, rx) = mpsc::channel(16);
        let router = build_router(
            GatewayState::new(tx)
                .with_line(LineWebhook::new(LINE_SECRET))
                .with_messenger(MessengerWebhook::new("verify", None)),
        );

        let cancel = CancellationToken::new();
        tokio::spawn({
            let cancel = cancel.clone();
            async move { agent.run(rx, cancel).await }
        });

        Self {
            router,
            line,
            messenger,
            tracker,
            cancel,
        }
    }

    async fn post_line(&self, user: &str, reply_token: &str, text: &str) -> StatusCode {
        let body = line_body(user, reply_token, text);
        let signature = concierge_line::signature::sign(LINE_SECRET, body.as_bytes());
        let request = Request::builder()
            .method("POST")
            .uri("/callback")
            .header("x-line-signature", signature)
            .body(Body::from(body))
            .unwrap();
        self.router.clone().oneshot(request).await.unwrap().status()
    }

    async fn post_messenger(&self, sender: &str, text: &str) -> StatusCode {
        let body = format!(
            r#"{{"object":"page","entry":[{{"id":"P","messaging":[{{"sender":{{"id":"{sender}"}},"recipient":{{"id":"P"}},"message":{{"mid":"m","text":"{text}"}}}}]}}]}}"#
        );
        let request = Request::builder()
            .method("POST")
            .uri("/webhook")
            .body(Body::from(body))
            .unwrap();
        self.router.clone().oneshot(request).await.unwrap().status()
    }
}

impl Drop for Pipeline {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

fn line_body(user: &str, reply_token: &str, text: &str) -> String {
    format!(
        r#"{{"destination":"U0","events":[{{"type":"message","replyToken":"{reply_token}","source":{{"type":"user","userId":"{user}"}},"timestamp":1700000000000,"message":{{"type":"text","id":"1","text":"{text}"}}}}]}}"#
    )
}

fn faq_responder(provider: Arc<MockProvider>) -> Arc<dyn Responder> {
    let catalog = Arc::new(ResponseCatalog::from_json(CATALOG).unwrap());
    let config = FaqConfig {
        personality: false,
        ..FaqConfig::default()
    };
    Arc::new(FaqResponder::new(provider, catalog, &config))
}

async fn wait_for(channel: &MockChannel, count: usize) {
    tokio::time::timeout(Duration::from_secs(5), channel.wait_for_sent(count))
        .await
        .expect("reply was not sent in time");
}

#[tokio::test]
async fn line_question_gets_catalog_answer() {
    let provider = Arc::new(MockProvider::with_responses([
        r#"{"language": "en", "query_type": "hours"}"#,
    ]));
    let pipeline = Pipeline::start(faq_responder(provider));

    assert_eq!(
        pipeline.post_line("U1", "reply-1", "When do you open?").await,
        StatusCode::OK
    );
    wait_for(&pipeline.line, 1).await;

    let sent = pipeline.line.sent_messages().await;
    assert_eq!(sent[0].text, "We are open 10am to 10pm.");
    assert_eq!(sent[0].target, ReplyTarget::ReplyToken("reply-1".into()));
    assert_eq!(pipeline.messenger.sent_count().await, 0);

    let history = pipeline.tracker.history("U1");
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].category, ResponseCategory::Faq);
}

#[tokio::test]
async fn thai_script_overrides_model_language() {
    // The model claims English; the Thai script wins.
    let provider = Arc::new(MockProvider::with_responses([
        r#"{"language": "en", "query_type": "hours"}"#,
    ]));
    let pipeline = Pipeline::start(faq_responder(provider));

    pipeline.post_line("U2", "r", "เปิดกี่โมง").await;
    wait_for(&pipeline.line, 1).await;
    assert_eq!(
        pipeline.line.sent_messages().await[0].text,
        "เปิด 10 โมงถึง 4 ทุ่ม"
    );
}

#[tokio::test]
async fn fourth_message_is_handed_off() {
    let label = r#"{"language": "en", "query_type": "hours"}"#;
    let provider = Arc::new(MockProvider::with_responses([label, label, label, label]));
    let pipeline = Pipeline::start(faq_responder(provider));

    for n in 1..=4 {
        pipeline.post_line("U3", &format!("r{n}"), "hours?").await;
        wait_for(&pipeline.line, n).await;
    }

    let sent = pipeline.line.sent_messages().await;
    assert_eq!(sent[2].text, "We are open 10am to 10pm.");
    assert_eq!(sent[3].text, phrases::handoff(Language::En));
    assert_eq!(
        pipeline.tracker.history("U3")[3].category,
        ResponseCategory::Handoff
    );
}

#[tokio::test]
async fn classifier_outage_still_replies() {
    let pipeline = Pipeline::start(faq_responder(Arc::new(MockProvider::failing())));

    pipeline.post_line("U4", "r", "hello").await;
    wait_for(&pipeline.line, 1).await;

    // Default classification (en/other) resolves to the catalog's "other" entry.
    assert_eq!(
        pipeline.line.sent_messages().await[0].text,
        "Hello! How can we help?"
    );
}

#[tokio::test]
async fn messenger_relay_mode_replies_to_sender() {
    let provider = Arc::new(MockProvider::with_responses(["Sure, parking is free."]));
    let pipeline = Pipeline::start(Arc::new(RelayResponder::new(provider)));

    assert_eq!(
        pipeline.post_messenger("PSID9", "parking?").await,
        StatusCode::OK
    );
    wait_for(&pipeline.messenger, 1).await;

    let sent = pipeline.messenger.sent_messages().await;
    assert_eq!(sent[0].text, "Sure, parking is free.");
    assert_eq!(sent[0].target, ReplyTarget::User("PSID9".into()));
    assert_eq!(pipeline.line.sent_count().await, 0);
}

#[tokio::test]
async fn forged_line_delivery_never_reaches_the_loop() {
    let provider = Arc::new(MockProvider::new());
    let pipeline = Pipeline::start(faq_responder(provider.clone()));

    let request = Request::builder()
        .method("POST")
        .uri("/callback")
        .header("x-line-signature", "Zm9yZ2Vk")
        .body(Body::from(line_body("U5", "r", "hi")))
        .unwrap();
    let status = pipeline.router.clone().oneshot(request).await.unwrap().status();

    assert_eq!(status, StatusCode::BAD_REQUEST);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(provider.call_count().await, 0);
    assert_eq!(pipeline.line.sent_count().await, 0);
}

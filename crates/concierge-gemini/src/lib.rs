// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Google Gemini provider adapter for the Concierge chat relay.
//!
//! This crate implements [`ProviderAdapter`] over the Gemini
//! `generateContent` REST endpoint. Only single-shot text generation is
//! supported.

pub mod client;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use concierge_config::model::GeminiConfig;
use concierge_core::error::ConciergeError;
use concierge_core::traits::{PluginAdapter, ProviderAdapter};
use concierge_core::types::{ProviderRequest, ProviderResponse};
use tracing::{debug, info, warn};

use crate::client::GeminiClient;
use crate::types::{GenerateContentRequest, GenerationConfig};

/// Gemini provider implementing [`ProviderAdapter`].
///
/// API key resolution order: `gemini.api_key` (which the config loader also
/// fills from `GOOGLE_API_KEY`) -> error.
pub struct GeminiProvider {
    client: GeminiClient,
    model: String,
    max_output_tokens: Option<u32>,
}

impl GeminiProvider {
    /// Creates a new Gemini provider from the given configuration.
    pub fn new(config: &GeminiConfig) -> Result<Self, ConciergeError> {
        let api_key = resolve_api_key(&config.api_key)?;
        let client = GeminiClient::new(
            &api_key,
            &config.base_url,
            Duration::from_secs(config.request_timeout_secs),
        )?;

        info!(model = config.model, "Gemini provider initialized");

        Ok(Self {
            client,
            model: config.model.clone(),
            max_output_tokens: config.max_output_tokens,
        })
    }

    /// Converts a [`ProviderRequest`] to a Gemini request body.
    fn to_api_request(&self, request: &ProviderRequest) -> GenerateContentRequest {
        let generation_config = GenerationConfig {
            temperature: request.temperature,
            max_output_tokens: request.max_output_tokens.or(self.max_output_tokens),
        };

        let mut api_request = GenerateContentRequest::text(request.prompt.clone());
        if !generation_config.is_empty() {
            api_request.generation_config = Some(generation_config);
        }
        api_request
    }
}

/// Returns the configured key, rejecting blanks.
fn resolve_api_key(config_key: &Option<String>) -> Result<String, ConciergeError> {
    match config_key {
        Some(key) if !key.trim().is_empty() => Ok(key.clone()),
        _ => Err(ConciergeError::Config(
            "Gemini API key not found. Set gemini.api_key in config or the GOOGLE_API_KEY environment variable.".into(),
        )),
    }
}

#[async_trait]
impl PluginAdapter for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn shutdown(&self) -> Result<(), ConciergeError> {
        debug!("Gemini provider shutting down");
        Ok(())
    }
}

#[async_trait]
impl ProviderAdapter for GeminiProvider {
    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ConciergeError> {
        let model = request.model.clone().unwrap_or_else(|| self.model.clone());
        let api_request = self.to_api_request(&request);
        let started = std::time::Instant::now();
        let response = self.client.generate_content(&model, &api_request).await?;
        debug!(
            model,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "generateContent completed"
        );

        let Some(content) = response.text() else {
            let reason = response.block_reason().unwrap_or("no candidates");
            warn!(model, reason, "Gemini returned no text");
            return Err(ConciergeError::provider(format!(
                "Gemini returned no text ({reason})"
            )));
        };

        Ok(ProviderResponse {
            content,
            model: response.model_version.unwrap_or(model),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(base_url: &str) -> GeminiConfig {
        GeminiConfig {
            api_key: Some("test-key".into()),
            base_url: base_url.to_string(),
            ..GeminiConfig::default()
        }
    }

    #[test]
    fn missing_api_key_is_config_error() {
        let err = GeminiProvider::new(&GeminiConfig::default())
            .err()
            .expect("should fail without a key");
        assert!(matches!(err, ConciergeError::Config(_)));
        assert!(err.to_string().contains("GOOGLE_API_KEY"));
    }

    #[test]
    fn blank_api_key_is_rejected() {
        assert!(resolve_api_key(&Some("  ".into())).is_err());
        assert_eq!(resolve_api_key(&Some("k".into())).unwrap(), "k");
    }

    #[test]
    fn request_overrides_beat_config() {
        let mut cfg = config("http://localhost");
        cfg.max_output_tokens = Some(100);
        let provider = GeminiProvider::new(&cfg).unwrap();

        let plain = provider.to_api_request(&ProviderRequest::prompt("x"));
        assert_eq!(
            plain.generation_config.and_then(|g| g.max_output_tokens),
            Some(100)
        );

        let mut request = ProviderRequest::prompt("x").with_temperature(0.0);
        request.max_output_tokens = Some(5);
        let api = provider.to_api_request(&request);
        let generation = api.generation_config.unwrap();
        assert_eq!(generation.max_output_tokens, Some(5));
        assert_eq!(generation.temperature, Some(0.0));
    }

    #[tokio::test]
    async fn complete_sends_prompt_to_default_model() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-2.0-flash:generateContent"))
            .and(body_json(serde_json::json!({
                "contents": [{"role": "user", "parts": [{"text": "What time do you open?"}]}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{"content": {"role": "model", "parts": [{"text": "At 10."}]}}],
                "modelVersion": "gemini-2.0-flash-001"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = GeminiProvider::new(&config(&server.uri())).unwrap();
        let response = provider
            .complete(ProviderRequest::prompt("What time do you open?"))
            .await
            .unwrap();
        assert_eq!(response.content, "At 10.");
        assert_eq!(response.model, "gemini-2.0-flash-001");
    }

    #[tokio::test]
    async fn generate_uses_model_override() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-1.5-pro:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{"content": {"parts": [{"text": "ok"}]}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = GeminiProvider::new(&config(&server.uri())).unwrap();
        let request = ProviderRequest {
            model: Some("gemini-1.5-pro".into()),
            ..ProviderRequest::prompt("hi")
        };
        let response = provider.complete(request).await.unwrap();
        assert_eq!(response.model, "gemini-1.5-pro");
    }

    #[tokio::test]
    async fn blocked_prompt_is_provider_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "promptFeedback": {"blockReason": "SAFETY"}
            })))
            .mount(&server)
            .await;

        let provider = GeminiProvider::new(&config(&server.uri())).unwrap();
        let err = provider.generate("something").await.unwrap_err();
        assert!(matches!(err, ConciergeError::Provider { .. }));
        assert!(err.to_string().contains("SAFETY"));
    }
}

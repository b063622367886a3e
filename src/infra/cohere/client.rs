use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::Settings;
use crate::fetch::auth::ApiKey;
use crate::fetch::{BasicClient, HttpClient, post_json};
use crate::services::text_generation::{GenerationError, TextGenerator};

const MAX_TOKENS: u32 = 500;
const TEMPERATURE: f64 = 0.4;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Serialize)]
pub struct GenerateRequest<'a> {
    pub model: &'a str,
    pub prompt: &'a str,
    pub max_tokens: u32,
    pub temperature: f64,
    pub k: u32,
    pub stop_sequences: Vec<String>,
    pub return_likelihoods: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub generations: Vec<Generation>,
}

#[derive(Debug, Deserialize)]
pub struct Generation {
    #[serde(default)]
    pub text: String,
}

impl GenerateResponse {
    /// Text of the first generation, if there is one.
    pub fn into_text(self) -> Option<String> {
        self.generations.into_iter().next().map(|g| g.text)
    }
}

/// Text-generation client for a Cohere-style `generate` endpoint.
pub struct CohereClient<C> {
    http: C,
    url: String,
    model: String,
}

impl<C: HttpClient> CohereClient<C> {
    pub fn new(http: C, url: String, model: String) -> Self {
        Self { http, url, model }
    }
}

impl CohereClient<ApiKey<BasicClient>> {
    /// Builds an authenticated client, or `None` when no API key is configured.
    pub fn from_settings(settings: &Settings) -> Result<Option<Self>> {
        let Some(key) = settings.api_key.as_deref() else {
            return Ok(None);
        };
        let http = BasicClient::with_timeout(REQUEST_TIMEOUT).context("building HTTP client")?;
        let http = ApiKey::bearer(http, key)?;
        Ok(Some(Self::new(
            http,
            settings.api_url.clone(),
            settings.model.clone(),
        )))
    }
}

#[async_trait]
impl<C: HttpClient> TextGenerator for CohereClient<C> {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let body = GenerateRequest {
            model: &self.model,
            prompt,
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
            k: 0,
            stop_sequences: Vec::new(),
            return_likelihoods: "NONE",
        };

        let response = post_json(&self.http, &self.url, &body)
            .await
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        // The body of an error response may echo the prompt; keep the status only.
        if !response.status().is_success() {
            return Err(GenerationError::Status(response.status().as_u16()));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::InvalidResponse(e.to_string()))?;

        parsed.into_text().ok_or(GenerationError::Empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let body = GenerateRequest {
            model: "command",
            prompt: "hi",
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
            k: 0,
            stop_sequences: vec![],
            return_likelihoods: "NONE",
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "command");
        assert_eq!(json["max_tokens"], 500);
        assert_eq!(json["temperature"], 0.4);
    }

    #[test]
    fn test_response_first_generation() {
        let r: GenerateResponse =
            serde_json::from_str(r#"{"id":"x","generations":[{"id":"g1","text":"Sunny."},{"text":"Other"}]}"#)
                .unwrap();
        assert_eq!(r.into_text().as_deref(), Some("Sunny."));

        let empty: GenerateResponse = serde_json::from_str(r#"{"id":"x"}"#).unwrap();
        assert_eq!(empty.into_text(), None);
    }

    #[test]
    fn test_no_key_means_no_client() {
        let settings = Settings {
            api_key: None,
            ..Settings::default()
        };
        assert!(CohereClient::from_settings(&settings).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_an_error() {
        let client = CohereClient::new(
            BasicClient::with_timeout(Duration::from_secs(2)).unwrap(),
            "http://127.0.0.1:9/generate".to_string(),
            "command".to_string(),
        );
        let err = client.generate("prompt").await.unwrap_err();
        assert!(matches!(err, GenerationError::Transport(_)));
        assert!(!err.to_string().contains("127.0.0.1"));
    }
}

// src/services/generator.rs

//! Structure generation through an OpenAI-compatible chat API.
//!
//! A [`ModelChainGenerator`] asks each configured model in order until one
//! answers, then parses the reply into a [`SiteStructure`]. The chat
//! transport sits behind [`ChatClient`] so the chain can run against any
//! backend.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};

use crate::error::{AppError, Result};
use crate::models::{GeneratorConfig, SiteStructure};
use crate::services::prompt::{SYSTEM_PROMPT, user_prompt};
use crate::utils::http;
use crate::utils::text::strip_code_fences;

/// Where a generated record came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationSource {
    /// Answered by the named model
    Model(String),
    /// Produced by the pattern-matching extractor
    Fallback,
}

/// A generated site record together with the raw text it was parsed from.
#[derive(Debug, Clone)]
pub struct Generated {
    pub site: SiteStructure,
    pub raw: String,
    pub source: GenerationSource,
}

/// Produces a site record from a description.
#[async_trait]
pub trait StructureGenerator: Send + Sync {
    async fn generate(&self, description: &str) -> Result<Generated>;
}

/// Transport for a single chat completion.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Send one system + user exchange to `model` and return the reply text.
    async fn complete(&self, model: &str, system: &str, user: &str) -> Result<String>;
}

/// Generator trying an ordered list of models until one succeeds.
pub struct ModelChainGenerator<C> {
    client: C,
    models: Vec<String>,
}

/// Generator backed by the OpenAI chat completions API.
pub type OpenAiGenerator = ModelChainGenerator<OpenAiClient>;

impl<C: ChatClient> ModelChainGenerator<C> {
    pub fn new(client: C, models: Vec<String>) -> Self {
        Self { client, models }
    }

    /// Ask each model in turn; the last error propagates if all fail.
    async fn complete_with_fallback(&self, user: &str) -> Result<(String, String)> {
        let mut last_error = None;

        for model in &self.models {
            match self.client.complete(model, SYSTEM_PROMPT, user).await {
                Ok(reply) => {
                    log::info!("Using {} for structure generation", model);
                    return Ok((model.clone(), reply));
                }
                Err(e) => {
                    log::warn!("{} not available: {}", model, e);
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| AppError::config("No generator models configured")))
    }
}

impl OpenAiGenerator {
    /// Build a generator if an API key is available in the environment.
    pub fn from_config(config: &GeneratorConfig) -> Result<Option<Self>> {
        let Some(api_key) = config.api_key() else {
            return Ok(None);
        };
        let client = OpenAiClient::new(config, api_key)?;
        Ok(Some(Self::new(client, config.models.clone())))
    }
}

#[async_trait]
impl<C: ChatClient> StructureGenerator for ModelChainGenerator<C> {
    async fn generate(&self, description: &str) -> Result<Generated> {
        let (model, reply) = self.complete_with_fallback(&user_prompt(description)).await?;

        let raw = strip_code_fences(&reply).to_string();
        log::debug!("Model reply:\n{}", raw);

        let site = SiteStructure::from_json(&raw)
            .map_err(|e| AppError::generation(&model, format!("reply is not valid JSON: {e}")))?;

        Ok(Generated {
            site,
            raw,
            source: GenerationSource::Model(model),
        })
    }
}

/// OpenAI-compatible chat completions client.
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    base_url: String,
    temperature: f64,
    max_tokens: u32,
}

impl OpenAiClient {
    pub fn new(config: &GeneratorConfig, api_key: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: http::create_client(config)?,
            api_key: api_key.into(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    fn build_payload(&self, model: &str, system: &str, user: &str) -> Value {
        json!({
            "model": model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user },
            ],
            "temperature": self.temperature,
            "max_tokens": self.max_tokens,
        })
    }

    fn parse_content(model: &str, body: &Value) -> Result<String> {
        body.get("choices")
            .and_then(|v| v.as_array())
            .and_then(|arr| arr.first())
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|v| v.as_str())
            .map(|s| s.trim().to_string())
            .ok_or_else(|| AppError::generation(model, "response has no message content"))
    }

    fn error_message(body: &Value) -> String {
        body.get("error")
            .and_then(|e| e.get("message"))
            .and_then(|m| m.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| body.to_string())
    }
}

#[async_trait]
impl ChatClient for OpenAiClient {
    async fn complete(&self, model: &str, system: &str, user: &str) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&self.build_payload(model, system, user))
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        let body: Value = serde_json::from_str(&text).unwrap_or(Value::String(text));

        if !status.is_success() {
            return Err(AppError::generation(
                model,
                format!("HTTP {}: {}", status.as_u16(), Self::error_message(&body)),
            ));
        }

        Self::parse_content(model, &body)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    /// Chat client answering only for the listed models.
    struct StubClient {
        available: Vec<&'static str>,
        reply: &'static str,
        calls: Mutex<Vec<String>>,
    }

    impl StubClient {
        fn new(available: Vec<&'static str>, reply: &'static str) -> Self {
            Self {
                available,
                reply,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ChatClient for StubClient {
        async fn complete(&self, model: &str, _system: &str, _user: &str) -> Result<String> {
            self.calls.lock().unwrap().push(model.to_string());
            if self.available.contains(&model) {
                Ok(self.reply.to_string())
            } else {
                Err(AppError::generation(model, "model not found"))
            }
        }
    }

    fn models() -> Vec<String> {
        vec!["first".into(), "second".into(), "third".into()]
    }

    const REPLY: &str = "```json\n{\"site_type\": \"CommunicationSite\", \"site_title\": \"HR Portal\"}\n```";

    #[tokio::test]
    async fn test_chain_stops_at_first_success() {
        let generator = ModelChainGenerator::new(StubClient::new(vec!["second"], REPLY), models());
        let generated = generator.generate("hr portal").await.unwrap();

        assert_eq!(generated.source, GenerationSource::Model("second".into()));
        assert_eq!(generated.site.site_title.as_deref(), Some("HR Portal"));
        assert!(!generated.raw.contains("```"));
        assert_eq!(
            *generator.client.calls.lock().unwrap(),
            vec!["first".to_string(), "second".to_string()]
        );
    }

    #[tokio::test]
    async fn test_chain_propagates_last_error() {
        let generator = ModelChainGenerator::new(StubClient::new(vec![], REPLY), models());
        let err = generator.generate("hr portal").await.unwrap_err();

        match err {
            AppError::Generation { model, .. } => assert_eq!(model, "third"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_invalid_json_reply_is_generation_error() {
        let generator =
            ModelChainGenerator::new(StubClient::new(vec!["first"], "not json"), models());
        let err = generator.generate("hr portal").await.unwrap_err();
        assert!(matches!(err, AppError::Generation { .. }));
    }

    #[tokio::test]
    async fn test_empty_model_list_is_config_error() {
        let generator = ModelChainGenerator::new(StubClient::new(vec![], REPLY), Vec::new());
        let err = generator.generate("hr portal").await.unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_parse_content() {
        let body = json!({
            "choices": [{ "message": { "content": "  {\"a\": 1}  " } }]
        });
        assert_eq!(
            OpenAiClient::parse_content("gpt-4", &body).unwrap(),
            "{\"a\": 1}"
        );
        assert!(OpenAiClient::parse_content("gpt-4", &json!({})).is_err());
    }

    #[test]
    fn test_error_message_prefers_api_error() {
        let body = json!({ "error": { "message": "quota exceeded" } });
        assert_eq!(OpenAiClient::error_message(&body), "quota exceeded");
    }

    #[test]
    fn test_payload_shape() {
        let client = OpenAiClient::new(&GeneratorConfig::default(), "key").unwrap();
        let payload = client.build_payload("gpt-4", "sys", "usr");
        assert_eq!(payload["model"], "gpt-4");
        assert_eq!(payload["messages"][0]["role"], "system");
        assert_eq!(payload["messages"][1]["content"], "usr");
        assert_eq!(payload["max_tokens"], 3000);
    }
}

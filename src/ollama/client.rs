use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use super::prompt::format_prompt;
use crate::models::{ModelId, TextGenerator};
use crate::utils::GenerationError;

/// Client for the runtime's single-shot `/api/generate` endpoint
#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: Client,
    base_url: String,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: String,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
    #[serde(default)]
    error: Option<String>,
}

impl OllamaClient {
    pub fn new(base_url: impl Into<String>, temperature: f32) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            temperature,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn call(&self, prompt: String, model: &ModelId) -> Result<String, GenerationError> {
        let request = GenerateRequest {
            model: model.as_str(),
            prompt,
            stream: false,
            options: GenerateOptions {
                temperature: self.temperature,
            },
        };

        let url = format!("{}/api/generate", self.base_url);
        let response = self.client.post(&url).json(&request).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(GenerationError::Runtime(format!("{}: {}", status, text.trim())));
        }

        let body: GenerateResponse = response.json().await?;
        match body.error {
            Some(error) => Err(GenerationError::Runtime(error)),
            None => Ok(body.response),
        }
    }
}

#[async_trait]
impl TextGenerator for OllamaClient {
    async fn generate(
        &self,
        message: &str,
        model: &ModelId,
        timeout: Duration,
    ) -> Result<String, GenerationError> {
        let prompt = format_prompt(message);
        debug!("Generating with {} ({} prompt chars)", model, prompt.len());

        match tokio::time::timeout(timeout, self.call(prompt, model)).await {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(e)) => {
                warn!("Error calling Ollama: {}", e);
                Err(e)
            }
            Err(_) => {
                warn!("Generation with {} timed out after {:?}", model, timeout);
                Err(GenerationError::Timeout(timeout))
            }
        }
    }
}

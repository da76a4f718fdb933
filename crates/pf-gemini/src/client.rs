//! Gemini REST client implementation

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use url::Url;

use pf_core::{
    Error, GenerationConfig, GenerationRequest, GenerationService, ModelCatalog, ModelInfo, Result,
    SafetySetting,
};

use crate::config::GeminiConfig;

/// Gemini client
pub struct GeminiClient {
    config: GeminiConfig,
    base_url: Url,
    client: Client,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WireGenerationConfig {
    temperature: f32,
    top_k: u32,
    top_p: f32,
    max_output_tokens: u32,
}

impl From<&GenerationConfig> for WireGenerationConfig {
    fn from(config: &GenerationConfig) -> Self {
        Self {
            temperature: config.temperature,
            top_k: config.top_k,
            top_p: config.top_p,
            max_output_tokens: config.max_output_tokens,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content<'a>>,
    contents: Vec<Content<'a>>,
    generation_config: WireGenerationConfig,
    safety_settings: &'a [SafetySetting],
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<ResponseContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireModel {
    name: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    input_token_limit: Option<u32>,
    #[serde(default)]
    output_token_limit: Option<u32>,
    #[serde(default)]
    supported_generation_methods: Option<Vec<String>>,
}

#[derive(Deserialize)]
struct ListModelsResponse {
    #[serde(default)]
    models: Vec<WireModel>,
}

impl GeminiClient {
    /// Model constants
    pub const GEMINI_1_5_FLASH: &'static str = "gemini-1.5-flash";
    pub const GEMINI_1_5_PRO: &'static str = "gemini-1.5-pro";

    /// Create a new Gemini client from configuration
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let mut base_url = Url::parse(&config.api_url).map_err(|e| {
            Error::Configuration(format!("invalid Gemini API URL '{}': {}", config.api_url, e))
        })?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(Self {
            config,
            base_url,
            client,
        })
    }

    /// Create a new Gemini client from environment variables
    pub fn from_env() -> Result<Self> {
        let config = GeminiConfig::from_env()?;
        Self::new(config)
    }

    /// Set the default model
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| Error::Configuration(format!("invalid endpoint '{}': {}", path, e)))
    }

    /// Map a non-success status to an error
    async fn status_error(response: reqwest::Response) -> Error {
        let status = response.status();
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Error::Authentication(format!(
                "Gemini API rejected the credentials ({}): {}",
                status, error_text
            )),
            _ => Error::Service(format!(
                "Gemini API request failed with status {}: {}",
                status, error_text
            )),
        }
    }

    /// Perform the actual generation request
    async fn perform_generation(&self, request: &GenerationRequest) -> Result<String> {
        let model = request
            .config
            .model_id
            .as_deref()
            .unwrap_or(&self.config.model);
        let url = self.endpoint(&format!("v1beta/models/{}:generateContent", model))?;

        let body = GenerateContentRequest {
            system_instruction: request.system_instruction.as_deref().map(|text| Content {
                role: None,
                parts: vec![Part { text }],
            }),
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part {
                    text: &request.user_instruction,
                }],
            }],
            generation_config: WireGenerationConfig::from(&request.config),
            safety_settings: &request.safety,
        };

        debug!(model, "sending generateContent request");

        let response = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::status_error(response).await);
        }

        let data: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| Error::Serialization(e.to_string()))?;

        extract_text(data)
    }
}

/// Pull the generated text out of a response, surfacing safety blocks
fn extract_text(data: GenerateContentResponse) -> Result<String> {
    if let Some(reason) = data.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(Error::SafetyBlocked(format!("prompt blocked: {}", reason)));
    }

    let candidate = data
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| Error::Service("Gemini API returned no candidates".to_string()))?;

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    match candidate.finish_reason.as_deref() {
        Some(reason @ ("SAFETY" | "PROHIBITED_CONTENT" | "BLOCKLIST")) if text.trim().is_empty() => {
            Err(Error::SafetyBlocked(format!("response withheld: {}", reason)))
        }
        _ if text.trim().is_empty() => Err(Error::Service(
            "Empty response from Gemini API".to_string(),
        )),
        _ => Ok(text),
    }
}

#[async_trait]
impl GenerationService for GeminiClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        self.perform_generation(request).await
    }

    fn model_id(&self) -> &str {
        &self.config.model
    }
}

#[async_trait]
impl ModelCatalog for GeminiClient {
    async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        let url = self.endpoint("v1beta/models")?;

        let response = self
            .client
            .get(url)
            .header("x-goog-api-key", &self.config.api_key)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::status_error(response).await);
        }

        let data: ListModelsResponse = response
            .json()
            .await
            .map_err(|e| Error::Serialization(e.to_string()))?;

        Ok(data
            .models
            .into_iter()
            .filter(|m| {
                m.supported_generation_methods
                    .as_ref()
                    .is_none_or(|methods| methods.iter().any(|x| x == "generateContent"))
            })
            .map(|m| {
                let id = m
                    .name
                    .strip_prefix("models/")
                    .unwrap_or(&m.name)
                    .to_string();
                ModelInfo {
                    display_name: m.display_name.unwrap_or_else(|| id.clone()),
                    id,
                    input_token_limit: m.input_token_limit,
                    output_token_limit: m.output_token_limit,
                }
            })
            .collect())
    }
}

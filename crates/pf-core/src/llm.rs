//! Generation, advisory and model catalog collaborator traits

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analysis::Suggestion;
use crate::spec::PromptSpec;
use crate::{Error, Result};

/// Sampling parameters sent with each generation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Opaque model identifier, passed through untouched. `None` lets the
    /// service pick its default model.
    pub model_id: Option<String>,
    pub temperature: f32,
    pub top_k: u32,
    pub top_p: f32,
    pub max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model_id: None,
            temperature: 0.7,
            top_k: 40,
            top_p: 0.95,
            max_output_tokens: 512,
        }
    }
}

impl GenerationConfig {
    /// Parameters suited to a spec's mode and length
    pub fn for_spec(spec: &PromptSpec) -> Self {
        Self {
            temperature: spec.mode.temperature(),
            max_output_tokens: spec.length.max_output_tokens(),
            ..Default::default()
        }
    }

    pub fn with_model(mut self, model_id: Option<String>) -> Self {
        self.model_id = model_id;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HarmCategory {
    HarmCategoryHarassment,
    HarmCategoryHateSpeech,
    HarmCategorySexuallyExplicit,
    HarmCategoryDangerousContent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SafetyThreshold {
    BlockNone,
    BlockOnlyHigh,
    BlockMediumAndAbove,
    BlockLowAndAbove,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetySetting {
    pub category: HarmCategory,
    pub threshold: SafetyThreshold,
}

/// Default thresholds: every category blocked at medium and above
pub fn default_safety_settings() -> Vec<SafetySetting> {
    [
        HarmCategory::HarmCategoryHarassment,
        HarmCategory::HarmCategoryHateSpeech,
        HarmCategory::HarmCategorySexuallyExplicit,
        HarmCategory::HarmCategoryDangerousContent,
    ]
    .into_iter()
    .map(|category| SafetySetting {
        category,
        threshold: SafetyThreshold::BlockMediumAndAbove,
    })
    .collect()
}

/// A single call to the generation service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub system_instruction: Option<String>,
    pub user_instruction: String,
    pub config: GenerationConfig,
    pub safety: Vec<SafetySetting>,
}

impl GenerationRequest {
    pub fn new(user_instruction: impl Into<String>, config: GenerationConfig) -> Self {
        Self {
            system_instruction: None,
            user_instruction: user_instruction.into(),
            config,
            safety: default_safety_settings(),
        }
    }

    pub fn with_system(mut self, system_instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(system_instruction.into());
        self
    }
}

/// Which instruction layout an attempt used
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstructionVariant {
    /// Separate system and user instructions
    Structured,
    /// One forceful instruction, no system/user split
    Consolidated,
}

/// Record of one call to the generation service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationAttempt {
    /// 1 or 2
    pub ordinal: u8,
    pub variant: InstructionVariant,
    pub output_text: String,
    pub accepted: bool,
    /// Why the attempt was rejected
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection: Option<String>,
}

/// Final result of a generation or refinement request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationOutcome {
    /// Never empty
    pub text: String,
    pub used_fallback: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnostics: Option<String>,
    pub attempts: Vec<GenerationAttempt>,
    pub generated_at: DateTime<Utc>,
}

/// Trait for text generation services (e.g., Gemini)
///
/// Implementations may fail or report safety-withheld content through
/// [`Error::SafetyBlocked`]. Callers treat every error as a rejected attempt.
#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Generate text for a request
    async fn generate(&self, request: &GenerationRequest) -> Result<String>;

    /// Model used when the request does not name one
    fn model_id(&self) -> &str;
}

/// Optional collaborator that proposes suggestions for a spec
#[async_trait]
pub trait AdvisoryService: Send + Sync {
    async fn suggest(&self, spec: &PromptSpec) -> Result<Vec<Suggestion>>;
}

/// Model identifiers and limits, for display only
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub id: String,
    pub display_name: String,
    pub input_token_limit: Option<u32>,
    pub output_token_limit: Option<u32>,
}

#[async_trait]
pub trait ModelCatalog: Send + Sync {
    async fn list_models(&self) -> Result<Vec<ModelInfo>>;
}

/// Stand-in used when no generation backend is configured.
///
/// Every call fails, so the engine answers from its local fallback.
#[derive(Debug, Clone, Default)]
pub struct UnavailableService;

#[async_trait]
impl GenerationService for UnavailableService {
    async fn generate(&self, _request: &GenerationRequest) -> Result<String> {
        Err(Error::Configuration("no generation service configured".to_string()))
    }

    fn model_id(&self) -> &str {
        "offline"
    }
}

#[async_trait]
impl AdvisoryService for UnavailableService {
    async fn suggest(&self, _spec: &PromptSpec) -> Result<Vec<Suggestion>> {
        Err(Error::Configuration("no advisory service configured".to_string()))
    }
}

#[async_trait]
impl ModelCatalog for UnavailableService {
    async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::{Length, Mode};

    #[test]
    fn test_config_for_spec() {
        let spec = PromptSpec::new("api rest", Mode::Coding).with_length(Length::Long);
        let config = GenerationConfig::for_spec(&spec);
        assert_eq!(config.temperature, 0.3);
        assert_eq!(config.max_output_tokens, 1024);
        assert_eq!(config.top_k, 40);
        assert_eq!(config.model_id, None);
    }

    #[test]
    fn test_default_safety_settings() {
        let settings = default_safety_settings();
        assert_eq!(settings.len(), 4);
        assert!(settings
            .iter()
            .all(|s| s.threshold == SafetyThreshold::BlockMediumAndAbove));
        assert_eq!(
            serde_json::to_value(settings[0]).unwrap(),
            serde_json::json!({"category": "HARM_CATEGORY_HARASSMENT", "threshold": "BLOCK_MEDIUM_AND_ABOVE"})
        );
    }

    #[tokio::test]
    async fn test_unavailable_service_offline_behaviour() {
        let service = UnavailableService;
        let request = GenerationRequest::new("olá", GenerationConfig::default());
        assert!(matches!(
            service.generate(&request).await,
            Err(Error::Configuration(_))
        ));
        assert!(service
            .suggest(&PromptSpec::new("x", Mode::Explain))
            .await
            .is_err());
        assert!(service.list_models().await.unwrap().is_empty());
    }
}

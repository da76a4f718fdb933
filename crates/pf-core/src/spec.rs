//! Prompt parameter set and its enumerated fields

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::{Error, Result};

/// Lowercase and fold separators so `App-Creation`, `app creation` and
/// `app_creation` all parse the same way.
fn fold_key(s: &str) -> String {
    s.trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == '-' || c == ' ' { '_' } else { c })
        .collect()
}

/// Desired tone of the generated prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Professional,
    Casual,
    Technical,
    Creative,
    Formal,
    Friendly,
    Educational,
}

impl Tone {
    /// Get the label used inside prompt text
    pub fn label(&self) -> &'static str {
        match self {
            Tone::Professional => "profissional",
            Tone::Casual => "descontraído",
            Tone::Technical => "técnico",
            Tone::Creative => "criativo",
            Tone::Formal => "formal",
            Tone::Friendly => "amigável",
            Tone::Educational => "didático",
        }
    }

    /// Get all tones
    pub fn all() -> Vec<Tone> {
        vec![
            Tone::Professional,
            Tone::Casual,
            Tone::Technical,
            Tone::Creative,
            Tone::Formal,
            Tone::Friendly,
            Tone::Educational,
        ]
    }
}

impl Default for Tone {
    fn default() -> Self {
        Tone::Professional
    }
}

impl FromStr for Tone {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match fold_key(s).as_str() {
            "professional" | "profissional" => Ok(Tone::Professional),
            "casual" | "descontraido" | "descontraído" => Ok(Tone::Casual),
            "technical" | "tecnico" | "técnico" => Ok(Tone::Technical),
            "creative" | "criativo" => Ok(Tone::Creative),
            "formal" => Ok(Tone::Formal),
            "friendly" | "amigavel" | "amigável" => Ok(Tone::Friendly),
            "educational" | "didatico" | "didático" => Ok(Tone::Educational),
            other => Err(Error::Validation(format!("unknown tone '{}'", other))),
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Requested level of detail
///
/// The finer beginner/intermediate/advanced variants behave like
/// simple/moderate/detailed everywhere a tier matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Complexity {
    Simple,
    Moderate,
    Detailed,
    Beginner,
    Intermediate,
    Advanced,
}

impl Complexity {
    /// Collapse the finer variants onto the three base tiers
    pub fn tier(&self) -> Complexity {
        match self {
            Complexity::Simple | Complexity::Beginner => Complexity::Simple,
            Complexity::Moderate | Complexity::Intermediate => Complexity::Moderate,
            Complexity::Detailed | Complexity::Advanced => Complexity::Detailed,
        }
    }

    /// Token multiplier applied by the cost estimate
    pub fn token_multiplier(&self) -> f64 {
        match self.tier() {
            Complexity::Simple => 1.2,
            Complexity::Detailed => 2.0,
            _ => 1.5,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Complexity::Simple => "simples",
            Complexity::Moderate => "moderado",
            Complexity::Detailed => "detalhado",
            Complexity::Beginner => "iniciante",
            Complexity::Intermediate => "intermediário",
            Complexity::Advanced => "avançado",
        }
    }

    pub fn all() -> Vec<Complexity> {
        vec![
            Complexity::Simple,
            Complexity::Moderate,
            Complexity::Detailed,
            Complexity::Beginner,
            Complexity::Intermediate,
            Complexity::Advanced,
        ]
    }
}

impl Default for Complexity {
    fn default() -> Self {
        Complexity::Moderate
    }
}

impl FromStr for Complexity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match fold_key(s).as_str() {
            "simple" | "simples" => Ok(Complexity::Simple),
            "moderate" | "moderado" => Ok(Complexity::Moderate),
            "detailed" | "detalhado" => Ok(Complexity::Detailed),
            "beginner" | "iniciante" => Ok(Complexity::Beginner),
            "intermediate" | "intermediario" | "intermediário" => Ok(Complexity::Intermediate),
            "advanced" | "avancado" | "avançado" => Ok(Complexity::Advanced),
            other => Err(Error::Validation(format!("unknown complexity '{}'", other))),
        }
    }
}

impl fmt::Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Desired output length
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Length {
    Short,
    Medium,
    Long,
}

impl Length {
    pub fn label(&self) -> &'static str {
        match self {
            Length::Short => "curto",
            Length::Medium => "médio",
            Length::Long => "longo",
        }
    }

    /// Output token ceiling requested from the generation service
    pub fn max_output_tokens(&self) -> u32 {
        match self {
            Length::Short => 256,
            Length::Medium => 512,
            Length::Long => 1024,
        }
    }

    pub fn all() -> Vec<Length> {
        vec![Length::Short, Length::Medium, Length::Long]
    }
}

impl Default for Length {
    fn default() -> Self {
        Length::Medium
    }
}

impl FromStr for Length {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match fold_key(s).as_str() {
            "short" | "curto" => Ok(Length::Short),
            "medium" | "medio" | "médio" => Ok(Length::Medium),
            "long" | "longo" => Ok(Length::Long),
            other => Err(Error::Validation(format!("unknown length '{}'", other))),
        }
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Use case the prompt is written for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    AppCreation,
    ImageGeneration,
    ContentCreation,
    ProblemSolving,
    Coding,
    Instruct,
    Explain,
}

impl Mode {
    pub fn label(&self) -> &'static str {
        match self {
            Mode::AppCreation => "criação de aplicativo",
            Mode::ImageGeneration => "geração de imagem",
            Mode::ContentCreation => "criação de conteúdo",
            Mode::ProblemSolving => "resolução de problemas",
            Mode::Coding => "programação",
            Mode::Instruct => "instruções",
            Mode::Explain => "explicação",
        }
    }

    /// Sampling temperature suited to the use case
    pub fn temperature(&self) -> f32 {
        match self {
            Mode::ImageGeneration | Mode::ContentCreation => 0.9,
            Mode::Coding => 0.3,
            _ => 0.7,
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(self, Mode::ImageGeneration)
    }

    pub fn all() -> Vec<Mode> {
        vec![
            Mode::AppCreation,
            Mode::ImageGeneration,
            Mode::ContentCreation,
            Mode::ProblemSolving,
            Mode::Coding,
            Mode::Instruct,
            Mode::Explain,
        ]
    }
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match fold_key(s).as_str() {
            "app_creation" | "app" | "aplicativo" => Ok(Mode::AppCreation),
            "image_generation" | "image" | "imagem" => Ok(Mode::ImageGeneration),
            "content_creation" | "content" | "conteudo" | "conteúdo" => Ok(Mode::ContentCreation),
            "problem_solving" | "problem" | "problema" => Ok(Mode::ProblemSolving),
            "coding" | "code" | "codigo" | "código" => Ok(Mode::Coding),
            "instruct" | "instrucoes" | "instruções" => Ok(Mode::Instruct),
            "explain" | "explicar" => Ok(Mode::Explain),
            other => Err(Error::Validation(format!("unknown mode '{}'", other))),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// The structured parameter set describing a desired prompt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptSpec {
    /// Topic keywords, required
    pub keywords: String,
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub tone: Tone,
    #[serde(default)]
    pub complexity: Complexity,
    #[serde(default)]
    pub length: Length,
    pub mode: Mode,
    #[serde(default)]
    pub include_examples: bool,
    /// Only meaningful for image generation
    #[serde(default)]
    pub image_style: Option<String>,
    /// Only meaningful for image generation
    #[serde(default)]
    pub negative_prompt: Option<String>,
}

impl PromptSpec {
    /// Create a spec with default tone, complexity and length
    pub fn new(keywords: impl Into<String>, mode: Mode) -> Self {
        Self {
            keywords: keywords.into(),
            context: None,
            tone: Tone::default(),
            complexity: Complexity::default(),
            length: Length::default(),
            mode,
            include_examples: false,
            image_style: None,
            negative_prompt: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_tone(mut self, tone: Tone) -> Self {
        self.tone = tone;
        self
    }

    pub fn with_complexity(mut self, complexity: Complexity) -> Self {
        self.complexity = complexity;
        self
    }

    pub fn with_length(mut self, length: Length) -> Self {
        self.length = length;
        self
    }

    pub fn with_examples(mut self, include_examples: bool) -> Self {
        self.include_examples = include_examples;
        self
    }

    pub fn with_image_style(mut self, style: impl Into<String>) -> Self {
        self.image_style = Some(style.into());
        self
    }

    pub fn with_negative_prompt(mut self, negative: impl Into<String>) -> Self {
        self.negative_prompt = Some(negative.into());
        self
    }

    /// Copy of this spec with the keywords replaced
    pub fn with_keywords(&self, keywords: impl Into<String>) -> Self {
        Self {
            keywords: keywords.into(),
            ..self.clone()
        }
    }

    /// Trimmed keywords
    pub fn keywords_text(&self) -> &str {
        self.keywords.trim()
    }

    /// Keyword length in characters
    pub fn keyword_len(&self) -> usize {
        self.keywords_text().chars().count()
    }

    /// Context, if present and non-blank
    pub fn context_text(&self) -> Option<&str> {
        non_blank(self.context.as_deref())
    }

    /// Context length in characters, zero when absent
    pub fn context_len(&self) -> usize {
        self.context_text().map_or(0, |c| c.chars().count())
    }

    /// Image style, only reported in image generation mode
    pub fn image_style(&self) -> Option<&str> {
        if self.mode.is_image() {
            non_blank(self.image_style.as_deref())
        } else {
            None
        }
    }

    /// Negative prompt, only reported in image generation mode
    pub fn negative_prompt(&self) -> Option<&str> {
        if self.mode.is_image() {
            non_blank(self.negative_prompt.as_deref())
        } else {
            None
        }
    }

    /// Reject specs whose keywords are empty
    pub fn validate(&self) -> Result<()> {
        if self.keywords_text().is_empty() {
            return Err(Error::Validation(
                "keywords are required and must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Parse a spec from JSON text
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a spec from a JSON file
    pub async fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        Self::from_json(&content)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_mode_from_str() {
        assert_eq!("app_creation".parse::<Mode>().unwrap(), Mode::AppCreation);
        assert_eq!("Image-Generation".parse::<Mode>().unwrap(), Mode::ImageGeneration);
        assert_eq!("código".parse::<Mode>().unwrap(), Mode::Coding);
        assert!("poetry".parse::<Mode>().is_err());
    }

    #[test]
    fn test_complexity_tiers() {
        assert_eq!(Complexity::Beginner.tier(), Complexity::Simple);
        assert_eq!(Complexity::Intermediate.tier(), Complexity::Moderate);
        assert_eq!(Complexity::Advanced.tier(), Complexity::Detailed);
        assert_eq!(Complexity::Advanced.token_multiplier(), 2.0);
        assert_eq!(Complexity::Simple.token_multiplier(), 1.2);
        assert_eq!(Complexity::Intermediate.token_multiplier(), 1.5);
    }

    #[test]
    fn test_image_fields_ignored_outside_image_mode() {
        let spec = PromptSpec::new("landing page", Mode::Coding)
            .with_image_style("anime")
            .with_negative_prompt("blur");
        assert_eq!(spec.image_style(), None);
        assert_eq!(spec.negative_prompt(), None);

        let spec = PromptSpec::new("castelo", Mode::ImageGeneration)
            .with_image_style("  anime ")
            .with_negative_prompt("   ");
        assert_eq!(spec.image_style(), Some("anime"));
        assert_eq!(spec.negative_prompt(), None);
    }

    #[test]
    fn test_validate_rejects_blank_keywords() {
        assert!(PromptSpec::new("   ", Mode::Explain).validate().unwrap_err().is_validation());
        assert!(PromptSpec::new("fotossíntese", Mode::Explain).validate().is_ok());
    }

    #[test]
    fn test_lengths_count_characters() {
        let spec = PromptSpec::new(" ação ", Mode::Explain).with_context("çã");
        assert_eq!(spec.keyword_len(), 4);
        assert_eq!(spec.context_len(), 2);
    }

    #[test]
    fn test_from_json_defaults() {
        let spec = PromptSpec::from_json(r#"{"keywords": "gato", "mode": "image_generation", "imageStyle": "anime"}"#)
            .unwrap();
        assert_eq!(spec.tone, Tone::Professional);
        assert_eq!(spec.complexity, Complexity::Moderate);
        assert_eq!(spec.length, Length::Medium);
        assert!(!spec.include_examples);
        assert_eq!(spec.image_style(), Some("anime"));
    }

    #[tokio::test]
    async fn test_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"keywords": "api de pagamentos", "mode": "coding", "tone": "technical", "includeExamples": true}}"#
        )
        .unwrap();

        let spec = PromptSpec::from_json_file(file.path()).await.unwrap();
        assert_eq!(spec.mode, Mode::Coding);
        assert_eq!(spec.tone, Tone::Technical);
        assert!(spec.include_examples);
    }

    #[tokio::test]
    async fn test_from_json_file_missing() {
        let err = PromptSpec::from_json_file("/nonexistent/spec.json").await.unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}

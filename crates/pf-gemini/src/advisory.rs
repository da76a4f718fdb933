//! Advisory suggestions produced by the generation model

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use pf_core::{
    AdvisoryService, Error, GenerationConfig, GenerationRequest, GenerationService, Priority,
    PromptSpec, Result, Suggestion, SuggestionKind,
};

use crate::client::GeminiClient;

const ADVISORY_SYSTEM: &str = "Você é um especialista em engenharia de prompts. Analise os parâmetros recebidos e responda SOMENTE com um array JSON, sem texto adicional.";

/// Confidence given to the neutral advice used when a response can't be parsed
const NEUTRAL_CONFIDENCE: f32 = 0.3;

#[derive(Debug, Deserialize)]
struct AdvisoryItem {
    #[serde(default)]
    kind: Option<String>,
    title: String,
    description: String,
    #[serde(default)]
    example: Option<String>,
    #[serde(default)]
    priority: Option<String>,
    #[serde(default)]
    confidence: Option<f32>,
    #[serde(default)]
    field: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AdvisoryPayload {
    List(Vec<AdvisoryItem>),
    Wrapped { suggestions: Vec<AdvisoryItem> },
}

fn advisory_prompt(spec: &PromptSpec) -> Result<String> {
    Ok(format!(
        "Parâmetros do prompt:\n{}\n\n\
        Sugira de 2 a 5 melhorias. Cada item do array deve ter os campos:\n\
        \"kind\" (enhancement, optimization, alternative, keyword, context, tone ou structure),\n\
        \"title\", \"description\", \"example\" (opcional), \"priority\" (high, medium ou low),\n\
        \"confidence\" (0 a 1) e \"field\" (keywords, context, tone, complexity, length, mode,\n\
        include_examples, image_style ou negative_prompt).",
        serde_json::to_string_pretty(spec)?
    ))
}

/// Remove a surrounding markdown code fence, if any
fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") on the opening line
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

fn parse_kind(kind: Option<&str>) -> SuggestionKind {
    match kind.map(|k| k.trim().to_lowercase()).as_deref() {
        Some("optimization") => SuggestionKind::Optimization,
        Some("alternative") => SuggestionKind::Alternative,
        Some("keyword") | Some("keywords") => SuggestionKind::Keyword,
        Some("context") => SuggestionKind::Context,
        Some("tone") => SuggestionKind::Tone,
        Some("structure") => SuggestionKind::Structure,
        _ => SuggestionKind::Enhancement,
    }
}

fn parse_priority(priority: Option<&str>) -> Priority {
    match priority.map(|p| p.trim().to_lowercase()).as_deref() {
        Some("high") | Some("alta") => Priority::High,
        Some("low") | Some("baixa") => Priority::Low,
        _ => Priority::Medium,
    }
}

/// Parse the model's answer into suggestions
pub fn parse_advice(text: &str) -> Result<Vec<Suggestion>> {
    let payload: AdvisoryPayload = serde_json::from_str(strip_code_fences(text))
        .map_err(|e| Error::Format(format!("advisory response is not a suggestion list: {}", e)))?;

    let items = match payload {
        AdvisoryPayload::List(items) => items,
        AdvisoryPayload::Wrapped { suggestions } => suggestions,
    };

    Ok(items
        .into_iter()
        .filter(|item| !item.title.trim().is_empty())
        .map(|item| {
            let priority = parse_priority(item.priority.as_deref());
            let mut suggestion = Suggestion::new(
                parse_kind(item.kind.as_deref()),
                item.title.trim(),
                item.description.trim(),
                priority,
            );
            if let Some(confidence) = item.confidence {
                suggestion = suggestion.with_confidence(confidence);
            }
            if let Some(example) = item.example.filter(|e| !e.trim().is_empty()) {
                suggestion = suggestion.with_example(example);
            }
            if let Some(field) = item.field.filter(|f| !f.trim().is_empty()) {
                suggestion = suggestion.with_field(field.trim().to_lowercase());
            }
            suggestion
        })
        .collect())
}

/// Generic advice returned when the model's answer cannot be used
pub fn neutral_advice() -> Vec<Suggestion> {
    vec![
        Suggestion::new(
            SuggestionKind::Enhancement,
            "Detalhe o objetivo",
            "Descreva o resultado esperado e para quem ele se destina.",
            Priority::Low,
        )
        .with_confidence(NEUTRAL_CONFIDENCE),
        Suggestion::new(
            SuggestionKind::Structure,
            "Organize o pedido",
            "Separe tema, contexto e restrições em frases curtas.",
            Priority::Low,
        )
        .with_confidence(NEUTRAL_CONFIDENCE),
    ]
}

#[async_trait]
impl AdvisoryService for GeminiClient {
    async fn suggest(&self, spec: &PromptSpec) -> Result<Vec<Suggestion>> {
        let config = GenerationConfig {
            temperature: 0.4,
            max_output_tokens: 1024,
            ..Default::default()
        };
        let request =
            GenerationRequest::new(advisory_prompt(spec)?, config).with_system(ADVISORY_SYSTEM);

        let text = self.generate(&request).await?;

        match parse_advice(&text) {
            Ok(suggestions) => Ok(suggestions),
            Err(err) => {
                debug!(error = %err, "unparsable advisory response, using neutral advice");
                Ok(neutral_advice())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```json\n[1]\n```"), "[1]");
        assert_eq!(strip_code_fences("```\n[]\n```\n"), "[]");
        assert_eq!(strip_code_fences("  [] "), "[]");
    }

    #[test]
    fn test_parse_advice_list() {
        let text = r#"```json
[
  {"kind": "context", "title": "Defina o público", "description": "Quem vai ler?", "priority": "high", "confidence": 0.85, "field": "Context"},
  {"kind": "mystery", "title": "Seja breve", "description": "Corte redundâncias."}
]
```"#;
        let advice = parse_advice(text).unwrap();
        assert_eq!(advice.len(), 2);
        assert_eq!(advice[0].kind, SuggestionKind::Context);
        assert_eq!(advice[0].priority, Priority::High);
        assert_eq!(advice[0].confidence, 0.85);
        assert_eq!(advice[0].field.as_deref(), Some("context"));
        assert_eq!(advice[1].kind, SuggestionKind::Enhancement);
        assert_eq!(advice[1].priority, Priority::Medium);
        assert_eq!(advice[1].confidence, 0.7);
    }

    #[test]
    fn test_parse_advice_wrapped() {
        let text = r#"{"suggestions": [{"title": "A", "description": "B", "priority": "baixa"}]}"#;
        let advice = parse_advice(text).unwrap();
        assert_eq!(advice[0].priority, Priority::Low);
    }

    #[test]
    fn test_parse_advice_rejects_prose() {
        let err = parse_advice("Aqui estão algumas ideias: use mais contexto.").unwrap_err();
        assert!(matches!(err, Error::Format(_)));
    }

    #[test]
    fn test_neutral_advice_has_no_fields() {
        let advice = neutral_advice();
        assert_eq!(advice.len(), 2);
        assert!(advice.iter().all(|s| s.field.is_none()));
        assert!(advice.iter().all(|s| s.confidence == NEUTRAL_CONFIDENCE));
    }
}

//! Prompt normalization, scoring, generation and suggestion aggregation

mod engine;
mod instructions;
mod normalizer;
mod orchestrator;
mod quality_analyzer;
mod suggestions;
pub mod ui;

#[cfg(test)]
mod tests;

pub use engine::PromptEngine;
pub use instructions::{Task, synthesize_fallback};
pub use normalizer::{KeywordNormalizer, normalize};
pub use orchestrator::PromptGenerator;
pub use quality_analyzer::{QualityAnalyzer, recommended_tone};
pub use suggestions::{SuggestionAggregator, merge};

// Re-export core types
pub use pf_core::{Error, Result};

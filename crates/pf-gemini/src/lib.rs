//! Gemini integration for PromptForge
//!
//! This crate provides the Gemini implementation of the generation, advisory
//! and model catalog traits.

mod advisory;
mod client;
mod config;


pub use advisory::{neutral_advice, parse_advice};
pub use client::GeminiClient;
pub use config::{DEFAULT_API_URL, DEFAULT_MODEL, GeminiConfig};

// Re-export core types for convenience
pub use pf_core::{
    AdvisoryService, Error, GenerationConfig, GenerationRequest, GenerationService, ModelCatalog,
    ModelInfo, Result,
};

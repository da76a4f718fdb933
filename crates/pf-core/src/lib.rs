//! Core traits and types for PromptForge
//!
//! This crate defines the prompt parameter model, the diagnostics returned by
//! analysis, the collaborator traits the engine calls out to, and the
//! declarative template registry shared by fallback synthesis and suggestions.

pub mod analysis;
pub mod config;
pub mod error;
pub mod llm;
pub mod registry;
pub mod spec;


pub use analysis::{
    AnalysisReport, Impact, Issue, Priority, QualityScore, ReadabilityLevel, ScoreAxis, Severity,
    Suggestion, SuggestionKind,
};
pub use config::EngineConfig;
pub use error::{Error, Result};
pub use llm::{
    AdvisoryService, GenerationAttempt, GenerationConfig, GenerationOutcome, GenerationRequest,
    GenerationService, InstructionVariant, ModelCatalog, ModelInfo, SafetySetting,
    SafetyThreshold, HarmCategory, UnavailableService, default_safety_settings,
};
pub use registry::{ExampleSelector, ResolvedTemplate};
pub use spec::{Complexity, Length, Mode, PromptSpec, Tone};

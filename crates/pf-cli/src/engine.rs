//! The engine facade: analysis, generation and refinement behind one type

use pf_core::{
    AdvisoryService, AnalysisReport, EngineConfig, ExampleSelector, GenerationOutcome,
    GenerationService, PromptSpec, Result,
};
use tracing::debug;

use crate::orchestrator::PromptGenerator;
use crate::quality_analyzer::QualityAnalyzer;
use crate::suggestions::SuggestionAggregator;

/// Entry point for callers.
///
/// Every operation normalizes the keywords first. Only validation errors are
/// returned; collaborator failures are absorbed.
pub struct PromptEngine<G: GenerationService, A: AdvisoryService> {
    generator: PromptGenerator<G>,
    aggregator: SuggestionAggregator<A>,
    analyzer: QualityAnalyzer,
}

impl<G: GenerationService, A: AdvisoryService> PromptEngine<G, A> {
    /// Engine without an advisory service
    pub fn new(service: G, config: EngineConfig) -> Self {
        Self {
            aggregator: SuggestionAggregator::local(config.clone()),
            generator: PromptGenerator::with_config(service, config),
            analyzer: QualityAnalyzer::new(),
        }
    }

    /// Engine that enriches suggestions through `advisor`
    pub fn with_advisor(service: G, advisor: A, config: EngineConfig) -> Self {
        Self {
            aggregator: SuggestionAggregator::with_advisor(advisor, config.clone()),
            generator: PromptGenerator::with_config(service, config),
            analyzer: QualityAnalyzer::new(),
        }
    }

    pub fn with_selector(mut self, selector: ExampleSelector) -> Self {
        self.generator = self.generator.with_selector(selector);
        self
    }

    pub fn generator(&self) -> &PromptGenerator<G> {
        &self.generator
    }

    /// Full diagnostics for a spec
    pub async fn analyze(&self, spec: &PromptSpec) -> Result<AnalysisReport> {
        let spec = self.generator.prepare(spec)?;
        let mut report = self.analyzer.analyze(&spec);
        let local = std::mem::take(&mut report.suggestions);
        report.suggestions = self.aggregator.aggregate(&spec, local).await;

        debug!(
            overall = report.score.overall,
            issues = report.issues.len(),
            suggestions = report.suggestions.len(),
            "analysis finished"
        );
        Ok(report)
    }

    pub async fn generate(&self, spec: &PromptSpec) -> Result<GenerationOutcome> {
        self.generator.generate(spec).await
    }

    pub async fn refine(
        &self,
        spec: &PromptSpec,
        previous: &str,
        modification: &str,
    ) -> Result<GenerationOutcome> {
        self.generator.refine(spec, previous, modification).await
    }
}

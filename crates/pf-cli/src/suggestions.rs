//! Suggestion aggregation: local heuristics plus optional advisory enrichment

use std::collections::HashSet;

use tokio::time::timeout;
use tracing::debug;

use pf_core::{AdvisoryService, EngineConfig, PromptSpec, Suggestion};

/// Merges local suggestions with those of an optional advisory service.
///
/// Advisory failures and timeouts are swallowed; the result then holds the
/// local suggestions alone.
pub struct SuggestionAggregator<A: AdvisoryService> {
    advisor: Option<A>,
    config: EngineConfig,
}

impl<A: AdvisoryService> SuggestionAggregator<A> {
    /// Local suggestions only
    pub fn local(config: EngineConfig) -> Self {
        Self {
            advisor: None,
            config,
        }
    }

    pub fn with_advisor(advisor: A, config: EngineConfig) -> Self {
        Self {
            advisor: Some(advisor),
            config,
        }
    }

    pub fn has_advisor(&self) -> bool {
        self.advisor.is_some()
    }

    /// Combine `local` suggestions, already generated for `spec`, with the
    /// advisor's
    pub async fn aggregate(&self, spec: &PromptSpec, local: Vec<Suggestion>) -> Vec<Suggestion> {
        let external = match &self.advisor {
            Some(advisor) if spec.keyword_len() > self.config.advisory_min_keywords => {
                match timeout(self.config.advisory_timeout, advisor.suggest(spec)).await {
                    Ok(Ok(suggestions)) => suggestions,
                    Ok(Err(err)) => {
                        debug!(error = %err, "advisory service failed, using local suggestions");
                        Vec::new()
                    }
                    Err(_) => {
                        debug!("advisory service timed out, using local suggestions");
                        Vec::new()
                    }
                }
            }
            _ => Vec::new(),
        };

        merge(external, local, self.config.max_suggestions)
    }
}

/// External first, then local ones targeting a field no external suggestion
/// covers; capped, then ordered by descending confidence and priority
pub fn merge(external: Vec<Suggestion>, local: Vec<Suggestion>, max: usize) -> Vec<Suggestion> {
    let covered: HashSet<String> = external.iter().filter_map(|s| s.field.clone()).collect();

    let mut merged: Vec<Suggestion> = external
        .into_iter()
        .chain(local.into_iter().filter(|s| match &s.field {
            Some(field) => !covered.contains(field),
            None => true,
        }))
        .take(max)
        .collect();

    merged.sort_by(|a, b| {
        b.confidence
            .total_cmp(&a.confidence)
            .then_with(|| a.priority.cmp(&b.priority))
    });
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quality_analyzer::QualityAnalyzer;
    use async_trait::async_trait;
    use pf_core::{Error, Mode, Priority, Result, SuggestionKind};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    enum Behaviour {
        Reply,
        Fail,
        Hang,
    }

    struct ScriptedAdvisor {
        behaviour: Behaviour,
        calls: AtomicUsize,
    }

    impl ScriptedAdvisor {
        fn new(behaviour: Behaviour) -> Self {
            Self {
                behaviour,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl AdvisoryService for ScriptedAdvisor {
        async fn suggest(&self, _spec: &PromptSpec) -> Result<Vec<Suggestion>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.behaviour {
                Behaviour::Reply => Ok(vec![
                    Suggestion::new(
                        SuggestionKind::Context,
                        "Defina o público",
                        "Diga quem vai usar o app.",
                        Priority::Medium,
                    )
                    .with_field("context")
                    .with_confidence(0.8),
                ]),
                Behaviour::Fail => Err(Error::Format("not json".to_string())),
                Behaviour::Hang => {
                    tokio::time::sleep(Duration::from_secs(600)).await;
                    Ok(Vec::new())
                }
            }
        }
    }

    fn suggestion(field: &str, priority: Priority) -> Suggestion {
        Suggestion::new(SuggestionKind::Enhancement, field, "descrição", priority).with_field(field)
    }

    fn spec() -> PromptSpec {
        PromptSpec::new("aplicativo de tarefas para equipes", Mode::AppCreation)
    }

    #[test]
    fn test_merge_drops_local_duplicates_by_field() {
        let external = vec![suggestion("context", Priority::Low).with_confidence(0.95)];
        let local = vec![
            suggestion("context", Priority::High),
            suggestion("tone", Priority::Low),
        ];
        let merged = merge(external, local, 6);

        let fields: Vec<_> = merged.iter().filter_map(|s| s.field.as_deref()).collect();
        assert_eq!(fields, vec!["context", "tone"]);
        assert_eq!(merged[0].confidence, 0.95);
    }

    #[test]
    fn test_merge_caps_before_sorting() {
        let external = vec![suggestion("a", Priority::Low), suggestion("b", Priority::Low)];
        let local = vec![suggestion("c", Priority::High)];
        let merged = merge(external, local, 2);
        // the high-priority local suggestion is past the cap
        assert_eq!(merged.len(), 2);
        assert!(merged.iter().all(|s| s.priority == Priority::Low));
    }

    #[test]
    fn test_merge_orders_by_confidence_then_priority() {
        let local = vec![
            suggestion("x", Priority::Low),
            suggestion("y", Priority::High),
            suggestion("z", Priority::Medium).with_confidence(0.9),
        ];
        let merged = merge(Vec::new(), local, 6);
        let fields: Vec<_> = merged.iter().filter_map(|s| s.field.as_deref()).collect();
        assert_eq!(fields, vec!["y", "z", "x"]);
    }

    #[tokio::test]
    async fn test_external_suggestions_come_first() {
        let aggregator =
            SuggestionAggregator::with_advisor(ScriptedAdvisor::new(Behaviour::Reply), EngineConfig::default());
        let spec = spec();
        let local = QualityAnalyzer::new().analyze(&spec).suggestions;
        let suggestions = aggregator.aggregate(&spec, local).await;

        let context: Vec<_> = suggestions
            .iter()
            .filter(|s| s.field.as_deref() == Some("context"))
            .collect();
        assert_eq!(context.len(), 1);
        assert_eq!(context[0].title, "Defina o público");
    }

    #[tokio::test]
    async fn test_advisory_failure_degrades_to_local() {
        let advisor = ScriptedAdvisor::new(Behaviour::Fail);
        let aggregator = SuggestionAggregator::with_advisor(advisor, EngineConfig::default());
        let spec = spec();
        let local = QualityAnalyzer::new().analyze(&spec).suggestions;

        let suggestions = aggregator.aggregate(&spec, local.clone()).await;
        assert_eq!(suggestions, merge(Vec::new(), local, 6));
    }

    #[tokio::test(start_paused = true)]
    async fn test_advisory_timeout_degrades_to_local() {
        let aggregator = SuggestionAggregator::with_advisor(
            ScriptedAdvisor::new(Behaviour::Hang),
            EngineConfig::default(),
        );
        let spec = spec();
        let local = QualityAnalyzer::new().analyze(&spec).suggestions;
        let suggestions = aggregator.aggregate(&spec, local).await;
        assert!(suggestions.iter().all(|s| s.title != "Defina o público"));
    }

    #[tokio::test]
    async fn test_short_keywords_skip_advisor() {
        let aggregator = SuggestionAggregator::with_advisor(
            ScriptedAdvisor::new(Behaviour::Reply),
            EngineConfig::default(),
        );
        let spec = PromptSpec::new("app", Mode::AppCreation);
        aggregator.aggregate(&spec, Vec::new()).await;
        assert_eq!(aggregator.advisor.as_ref().unwrap().calls.load(Ordering::SeqCst), 0);
    }
}

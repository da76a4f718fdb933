//! Resilient generation orchestrator
//!
//! Drives the generation service through a linear state machine:
//! primary attempt, consolidated retry, then the local fallback. At most two
//! service calls are made per request, always sequentially.

use chrono::Utc;
use tokio::time::timeout;
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use pf_core::{
    EngineConfig, Error, ExampleSelector, GenerationAttempt, GenerationConfig, GenerationOutcome,
    GenerationRequest, GenerationService, InstructionVariant, PromptSpec, Result,
};

use crate::instructions::{self, Task};
use crate::normalizer::KeywordNormalizer;

/// States of a generation run after normalization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    PrimaryAttempt,
    RetryAttempt,
    Fallback,
    Done,
}

/// Turns a prompt spec into a finished prompt, never failing once the spec
/// is valid
pub struct PromptGenerator<G: GenerationService> {
    service: G,
    normalizer: KeywordNormalizer,
    config: EngineConfig,
    selector: ExampleSelector,
}

impl<G: GenerationService> PromptGenerator<G> {
    /// Create a generator with default configuration
    pub fn new(service: G) -> Self {
        Self::with_config(service, EngineConfig::default())
    }

    pub fn with_config(service: G, config: EngineConfig) -> Self {
        Self {
            service,
            normalizer: KeywordNormalizer::new(),
            config,
            selector: ExampleSelector::default(),
        }
    }

    /// Use `selector` to pick the fallback example
    pub fn with_selector(mut self, selector: ExampleSelector) -> Self {
        self.selector = selector;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn service(&self) -> &G {
        &self.service
    }

    /// Normalize the keywords and reject specs left without any
    pub fn prepare(&self, spec: &PromptSpec) -> Result<PromptSpec> {
        let normalized = spec.with_keywords(self.normalizer.normalize(&spec.keywords));
        normalized.validate()?;
        Ok(normalized)
    }

    /// Generate a prompt for `spec`
    pub async fn generate(&self, spec: &PromptSpec) -> Result<GenerationOutcome> {
        let spec = self.prepare(spec)?;
        self.run(&spec, Task::Fresh).await
    }

    /// Rewrite `previous` according to `modification`
    pub async fn refine(
        &self,
        spec: &PromptSpec,
        previous: &str,
        modification: &str,
    ) -> Result<GenerationOutcome> {
        if previous.trim().is_empty() {
            return Err(Error::Validation(
                "the prompt to refine must not be empty".to_string(),
            ));
        }
        if modification.trim().is_empty() {
            return Err(Error::Validation(
                "the modification request must not be empty".to_string(),
            ));
        }

        let spec = self.prepare(spec)?;
        self.run(
            &spec,
            Task::Refine {
                previous,
                modification,
            },
        )
        .await
    }

    async fn run(&self, spec: &PromptSpec, task: Task<'_>) -> Result<GenerationOutcome> {
        let span = info_span!(
            "generation",
            request_id = %Uuid::new_v4(),
            mode = %spec.mode,
            refinement = task.is_refinement(),
        );

        async move {
            let config = GenerationConfig::for_spec(spec).with_model(self.config.model_id.clone());
            let mut attempts: Vec<GenerationAttempt> = Vec::with_capacity(2);
            let mut text = String::new();
            let mut used_fallback = false;
            let mut stage = Stage::PrimaryAttempt;

            while stage != Stage::Done {
                debug!(?stage, "entering stage");
                stage = match stage {
                    Stage::PrimaryAttempt => {
                        let request = GenerationRequest::new(
                            instructions::user_instruction(spec, task),
                            config.clone(),
                        )
                        .with_system(instructions::system_instruction(spec));

                        let attempt = self
                            .attempt(1, InstructionVariant::Structured, &request)
                            .await;
                        let next = self.advance(&attempt, &mut text, Stage::RetryAttempt);
                        attempts.push(attempt);
                        next
                    }
                    Stage::RetryAttempt => {
                        let request = GenerationRequest::new(
                            instructions::consolidated_instruction(
                                spec,
                                task,
                                self.config.min_viable_length,
                            ),
                            config.clone(),
                        );

                        let attempt = self
                            .attempt(2, InstructionVariant::Consolidated, &request)
                            .await;
                        let next = self.advance(&attempt, &mut text, Stage::Fallback);
                        attempts.push(attempt);
                        next
                    }
                    Stage::Fallback => {
                        warn!("both attempts rejected, synthesizing fallback prompt");
                        text = instructions::synthesize_fallback(spec, task, self.selector);
                        used_fallback = true;
                        Stage::Done
                    }
                    Stage::Done => Stage::Done,
                };
            }

            info!(
                used_fallback,
                attempts = attempts.len(),
                "generation finished"
            );

            Ok(GenerationOutcome {
                text,
                used_fallback,
                diagnostics: diagnostics(&attempts),
                attempts,
                generated_at: Utc::now(),
            })
        }
        .instrument(span)
        .await
    }

    /// Call the service once, bounded by the attempt timeout
    async fn attempt(
        &self,
        ordinal: u8,
        variant: InstructionVariant,
        request: &GenerationRequest,
    ) -> GenerationAttempt {
        let result = match timeout(self.config.attempt_timeout, self.service.generate(request)).await
        {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout(format!(
                "no response within {}s",
                self.config.attempt_timeout.as_secs()
            ))),
        };

        let (output_text, rejection) = match result {
            Ok(output) => {
                let output = output.trim().to_string();
                let rejection = self.rejection_reason(&output);
                (output, rejection)
            }
            Err(err) => (String::new(), Some(err.to_string())),
        };

        if let Some(reason) = &rejection {
            warn!(ordinal, ?variant, reason = %reason, "attempt rejected");
        } else {
            debug!(ordinal, ?variant, chars = output_text.chars().count(), "attempt accepted");
        }

        GenerationAttempt {
            ordinal,
            variant,
            accepted: rejection.is_none(),
            output_text,
            rejection,
        }
    }

    /// Acceptance check over trimmed output
    fn rejection_reason(&self, output: &str) -> Option<String> {
        let chars = output.chars().count();
        if chars == 0 {
            Some("empty response".to_string())
        } else if chars < self.config.min_viable_length {
            Some(format!(
                "response too short ({} < {} characters)",
                chars, self.config.min_viable_length
            ))
        } else {
            None
        }
    }

    fn advance(&self, attempt: &GenerationAttempt, text: &mut String, on_reject: Stage) -> Stage {
        if attempt.accepted {
            *text = attempt.output_text.clone();
            Stage::Done
        } else {
            on_reject
        }
    }
}

/// Summary of the rejected attempts, if any
fn diagnostics(attempts: &[GenerationAttempt]) -> Option<String> {
    let rejected: Vec<String> = attempts
        .iter()
        .filter_map(|a| {
            a.rejection.as_ref().map(|reason| {
                let variant = match a.variant {
                    InstructionVariant::Structured => "structured",
                    InstructionVariant::Consolidated => "consolidated",
                };
                format!("attempt {} ({}): {}", a.ordinal, variant, reason)
            })
        })
        .collect();

    if rejected.is_empty() {
        None
    } else {
        Some(rejected.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pf_core::registry;
    use pf_core::{Mode, UnavailableService};
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    enum Reply {
        Text(&'static str),
        Fail,
        Blocked,
        Hang,
    }

    /// Generation double that replays a script and counts calls
    struct ScriptedService {
        replies: Mutex<VecDeque<Reply>>,
        requests: Mutex<Vec<GenerationRequest>>,
        calls: AtomicUsize,
    }

    impl ScriptedService {
        fn new(replies: Vec<Reply>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                requests: Mutex::new(Vec::new()),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl GenerationService for ScriptedService {
        async fn generate(&self, request: &GenerationRequest) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.requests.lock().unwrap().push(request.clone());
            let reply = self.replies.lock().unwrap().pop_front();
            match reply {
                Some(Reply::Text(text)) => Ok(text.to_string()),
                Some(Reply::Fail) => Err(Error::Service("upstream exploded".to_string())),
                Some(Reply::Blocked) => Err(Error::SafetyBlocked("SAFETY".to_string())),
                Some(Reply::Hang) => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok("late answer that nobody waits for".to_string())
                }
                None => Ok(String::new()),
            }
        }

        fn model_id(&self) -> &str {
            "scripted"
        }
    }

    const GOOD: &str = "Crie um aplicativo de tarefas com listas, prazos e lembretes.";

    fn tasks_spec() -> PromptSpec {
        PromptSpec::new("Crie um app de tarefas", Mode::AppCreation)
    }

    #[tokio::test]
    async fn test_empty_keywords_rejected_without_calls() {
        let generator = PromptGenerator::new(ScriptedService::new(vec![]));
        let err = generator
            .generate(&PromptSpec::new("", Mode::Coding))
            .await
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(generator.service().calls(), 0);

        // keywords that normalize to nothing are rejected the same way
        let err = generator
            .generate(&PromptSpec::new("Crie", Mode::Coding))
            .await
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(generator.service().calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_responses_fall_back() {
        let generator = PromptGenerator::new(ScriptedService::new(vec![
            Reply::Text(""),
            Reply::Text(""),
        ]));
        let outcome = generator.generate(&tasks_spec()).await.unwrap();

        assert!(outcome.used_fallback);
        assert!(!outcome.text.is_empty());
        assert!(outcome.text.contains("aplicativo"));
        assert!(outcome.text.contains("app tarefas"));
        assert_eq!(outcome.attempts.len(), 2);
        assert!(outcome.attempts.iter().all(|a| !a.accepted));
        assert_eq!(generator.service().calls(), 2);
        assert_eq!(
            outcome.diagnostics.as_deref(),
            Some("attempt 1 (structured): empty response; attempt 2 (consolidated): empty response")
        );
    }

    #[tokio::test]
    async fn test_primary_accepted() {
        let generator = PromptGenerator::new(ScriptedService::new(vec![Reply::Text(GOOD)]));
        let outcome = generator.generate(&tasks_spec()).await.unwrap();

        assert!(!outcome.used_fallback);
        assert_eq!(outcome.text, GOOD);
        assert!(outcome.diagnostics.is_none());
        assert_eq!(generator.service().calls(), 1);

        let requests = generator.service().requests.lock().unwrap();
        assert!(requests[0].system_instruction.is_some());
        assert!(requests[0].user_instruction.contains("app tarefas"));
    }

    #[tokio::test]
    async fn test_retry_uses_consolidated_instruction() {
        let generator = PromptGenerator::new(ScriptedService::new(vec![
            Reply::Text("curto"),
            Reply::Text(GOOD),
        ]));
        let outcome = generator.generate(&tasks_spec()).await.unwrap();

        assert!(!outcome.used_fallback);
        assert_eq!(outcome.text, GOOD);
        assert_eq!(outcome.attempts[0].output_text, "curto");
        assert_eq!(outcome.attempts[1].variant, InstructionVariant::Consolidated);
        assert!(outcome.diagnostics.unwrap().contains("too short"));

        let requests = generator.service().requests.lock().unwrap();
        assert!(requests[1].system_instruction.is_none());
    }

    #[tokio::test]
    async fn test_errors_and_safety_blocks_are_rejections() {
        let generator = PromptGenerator::new(ScriptedService::new(vec![
            Reply::Fail,
            Reply::Blocked,
            Reply::Text(GOOD),
        ]));
        let outcome = generator.generate(&tasks_spec()).await.unwrap();

        assert!(outcome.used_fallback);
        assert_eq!(generator.service().calls(), 2);
        let diagnostics = outcome.diagnostics.unwrap();
        assert!(diagnostics.contains("upstream exploded"));
        assert!(diagnostics.contains("safety filter"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeouts_advance_the_state_machine() {
        let generator = PromptGenerator::new(ScriptedService::new(vec![Reply::Hang, Reply::Hang]));
        let outcome = generator.generate(&tasks_spec()).await.unwrap();

        assert!(outcome.used_fallback);
        assert_eq!(generator.service().calls(), 2);
        assert!(outcome.diagnostics.unwrap().contains("no response within 30s"));
    }

    #[tokio::test]
    async fn test_unavailable_service_always_falls_back() {
        let generator = PromptGenerator::new(UnavailableService);
        for mode in Mode::all() {
            let outcome = generator
                .generate(&PromptSpec::new("feira de ciências", mode))
                .await
                .unwrap();
            assert!(outcome.used_fallback);
            assert!(outcome.text.contains(registry::mode_template(mode).required_phrase));
        }
    }

    #[tokio::test]
    async fn test_refine_folds_previous_text() {
        let generator = PromptGenerator::new(ScriptedService::new(vec![Reply::Text(GOOD)]));
        let outcome = generator
            .refine(&tasks_spec(), "Um app de tarefas.", "adicione modo escuro")
            .await
            .unwrap();
        assert_eq!(outcome.text, GOOD);

        let requests = generator.service().requests.lock().unwrap();
        assert!(requests[0].user_instruction.contains("Um app de tarefas."));
        assert!(requests[0].user_instruction.contains("adicione modo escuro"));
    }

    #[tokio::test]
    async fn test_refine_validation() {
        let generator = PromptGenerator::new(ScriptedService::new(vec![]));
        let err = generator.refine(&tasks_spec(), "  ", "mais curto").await.unwrap_err();
        assert!(err.is_validation());
        let err = generator.refine(&tasks_spec(), "Um app.", "").await.unwrap_err();
        assert!(err.is_validation());
        assert_eq!(generator.service().calls(), 0);
    }

    #[tokio::test]
    async fn test_model_id_passes_through() {
        let config = EngineConfig::default().with_model("modelo-opaco/v9");
        let generator =
            PromptGenerator::with_config(ScriptedService::new(vec![Reply::Text(GOOD)]), config);
        generator.generate(&tasks_spec()).await.unwrap();

        let requests = generator.service().requests.lock().unwrap();
        assert_eq!(requests[0].config.model_id.as_deref(), Some("modelo-opaco/v9"));
    }

    #[tokio::test]
    async fn test_fallback_respects_selector() {
        let spec = tasks_spec().with_examples(true);
        let bank = registry::mode_template(Mode::AppCreation).examples;

        let generator = PromptGenerator::new(UnavailableService).with_selector(ExampleSelector::Index(2));
        let outcome = generator.generate(&spec).await.unwrap();
        assert!(outcome.text.ends_with(bank[2]));
    }
}

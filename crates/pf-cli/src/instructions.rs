//! Instruction builders for the generation service and the local fallback
//! synthesizer

use pf_core::registry::{self, ResolvedTemplate};
use pf_core::{ExampleSelector, PromptSpec};

/// What a generation run is asked to produce
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task<'a> {
    /// A new prompt from the spec alone
    Fresh,
    /// A rewrite of an existing prompt
    Refine {
        previous: &'a str,
        modification: &'a str,
    },
}

impl Task<'_> {
    pub fn is_refinement(&self) -> bool {
        matches!(self, Task::Refine { .. })
    }
}

fn template_for(spec: &PromptSpec) -> ResolvedTemplate {
    registry::resolve(spec.mode, spec.image_style())
}

/// Role and style guidance sent as the system instruction of the first attempt
pub fn system_instruction(spec: &PromptSpec) -> String {
    let template = template_for(spec);
    let mut lines = vec![
        template.mode.role.to_string(),
        format!(
            "Escreva em tom {}, com complexidade {} e tamanho {}.",
            spec.tone, spec.complexity, spec.length
        ),
    ];

    if let Some(style) = template.style {
        lines.push(format!("O estilo visual deve ser descrito {}.", style.clause));
    } else if let Some(style) = spec.image_style() {
        lines.push(format!("Estilo visual desejado: {}.", style));
    }

    lines.push(
        "Responda apenas com o texto do prompt final, sem comentários, títulos ou formatação markdown."
            .to_string(),
    );
    lines.join("\n")
}

/// Requirements restated for the user instruction
fn requirements(spec: &PromptSpec) -> Vec<String> {
    let mut lines = Vec::new();

    if let Some(context) = spec.context_text() {
        lines.push(format!("Contexto: {}", context));
    }
    if let Some(negative) = spec.negative_prompt() {
        lines.push(format!("Elementos a evitar: {}", negative));
    }
    if spec.include_examples {
        lines.push("Inclua exemplos concretos no prompt.".to_string());
    }
    lines.push(format!("Tamanho desejado: {}.", spec.length));
    lines
}

/// User instruction of the first attempt
pub fn user_instruction(spec: &PromptSpec, task: Task<'_>) -> String {
    let mut lines = match task {
        Task::Fresh => vec![format!(
            "Crie um prompt de {} sobre: {}",
            spec.mode,
            spec.keywords_text()
        )],
        Task::Refine {
            previous,
            modification,
        } => vec![
            format!("Prompt atual:\n{}", previous.trim()),
            format!("Alteração solicitada: {}", modification.trim()),
            format!(
                "Reescreva o prompt aplicando a alteração e mantendo o tema: {}",
                spec.keywords_text()
            ),
        ],
    };
    lines.extend(requirements(spec));
    lines.join("\n")
}

/// Single instruction for the second attempt, with no system/user split
pub fn consolidated_instruction(spec: &PromptSpec, task: Task<'_>, min_length: usize) -> String {
    let template = template_for(spec);
    let mut lines = vec![
        "INSTRUÇÃO OBRIGATÓRIA.".to_string(),
        template.mode.role.to_string(),
    ];

    match task {
        Task::Fresh => lines.push(format!(
            "Escreva AGORA um prompt completo de {} sobre: {}.",
            spec.mode,
            spec.keywords_text()
        )),
        Task::Refine {
            previous,
            modification,
        } => {
            lines.push(format!(
                "Reescreva AGORA o prompt abaixo aplicando a alteração \"{}\".",
                modification.trim()
            ));
            lines.push(previous.trim().to_string());
        }
    }

    lines.push(format!(
        "Use tom {}, complexidade {} e tamanho {}.",
        spec.tone, spec.complexity, spec.length
    ));
    if let Some(style) = template.style {
        lines.push(format!("Estilo visual: {}.", style.clause));
    }
    lines.extend(requirements(spec));
    lines.push(format!(
        "A resposta NÃO pode ficar vazia e deve ter pelo menos {} caracteres. Responda SOMENTE com o texto do prompt.",
        min_length
    ));
    lines.join("\n")
}

/// Network-free prompt built from the registry.
///
/// Always non-empty and always contains the mode's required phrase. Apart
/// from the example, which comes from `selector`, the text depends only on
/// `spec` and `task`.
pub fn synthesize_fallback(spec: &PromptSpec, task: Task<'_>, selector: ExampleSelector) -> String {
    let template = template_for(spec);
    let mut sentences = vec![template.render(spec.keywords_text())];

    if let Some(style) = template.style {
        sentences.push(format!("Apresente o resultado {}.", style.clause));
    } else if let Some(style) = spec.image_style() {
        sentences.push(sentence(&format!("Estilo visual: {}", style)));
    }

    if let Some(context) = spec.context_text() {
        sentences.push(sentence(&format!("Contexto: {}", context)));
    }

    sentences.push(format!(
        "Use um tom {}, nível de complexidade {} e uma resposta de tamanho {}.",
        spec.tone, spec.complexity, spec.length
    ));

    if let Some(negative) = spec.negative_prompt() {
        sentences.push(sentence(&format!("Evite: {}", negative)));
    }

    if let Task::Refine { modification, .. } = task {
        let modification = modification.trim();
        if !modification.is_empty() {
            sentences.push(sentence(&format!("Ajuste solicitado: {}", modification)));
        }
    }

    if spec.include_examples {
        if let Some(example) = selector.select(template.examples()) {
            sentences.push(format!("Exemplo de referência: {}", example));
        }
    }

    sentences.join(" ")
}

/// Terminate with a period unless the text already ends in punctuation
fn sentence(text: &str) -> String {
    let text = text.trim_end();
    if text.ends_with(['.', '!', '?']) {
        text.to_string()
    } else {
        format!("{}.", text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pf_core::{Length, Mode, Tone};

    #[test]
    fn test_fallback_contains_required_phrase_for_every_mode() {
        for mode in Mode::all() {
            let spec = PromptSpec::new("app tarefas", mode);
            let text = synthesize_fallback(&spec, Task::Fresh, ExampleSelector::default());
            let phrase = registry::mode_template(mode).required_phrase;
            assert!(text.contains(phrase), "{:?}: {}", mode, text);
        }
    }

    #[test]
    fn test_fallback_is_deterministic() {
        let spec = PromptSpec::new("farol no penhasco", Mode::ImageGeneration)
            .with_image_style("aquarela")
            .with_negative_prompt("texto")
            .with_examples(true);
        let a = synthesize_fallback(&spec, Task::Fresh, ExampleSelector::Seed(9));
        let b = synthesize_fallback(&spec, Task::Fresh, ExampleSelector::Seed(9));
        assert_eq!(a, b);
        assert!(a.contains("em aquarela"));
        assert!(a.contains("Evite: texto."));
    }

    #[test]
    fn test_fallback_example_comes_from_selector() {
        let spec = PromptSpec::new("app tarefas", Mode::AppCreation).with_examples(true);
        let bank = registry::mode_template(Mode::AppCreation).examples;

        let text = synthesize_fallback(&spec, Task::Fresh, ExampleSelector::Index(1));
        assert!(text.ends_with(bank[1]));

        let without = synthesize_fallback(&spec.clone().with_examples(false), Task::Fresh, ExampleSelector::Index(1));
        assert!(!without.contains("Exemplo de referência"));
    }

    #[test]
    fn test_fallback_ignores_image_fields_outside_image_mode() {
        let spec = PromptSpec::new("api de pagamentos", Mode::Coding)
            .with_image_style("anime")
            .with_negative_prompt("blur");
        let text = synthesize_fallback(&spec, Task::Fresh, ExampleSelector::default());
        assert!(!text.contains("anime"));
        assert!(!text.contains("Evite"));
    }

    #[test]
    fn test_fallback_refinement_mentions_modification() {
        let spec = PromptSpec::new("app tarefas", Mode::AppCreation);
        let task = Task::Refine {
            previous: "Um app simples.",
            modification: "adicione modo escuro",
        };
        let text = synthesize_fallback(&spec, task, ExampleSelector::default());
        assert!(text.contains("Ajuste solicitado: adicione modo escuro."));
    }

    #[test]
    fn test_sentence_punctuation() {
        assert_eq!(sentence("Contexto: escola"), "Contexto: escola.");
        assert_eq!(sentence("Contexto: escola!"), "Contexto: escola!");
    }

    #[test]
    fn test_system_instruction_carries_role_and_style() {
        let spec = PromptSpec::new("samurai", Mode::ImageGeneration)
            .with_tone(Tone::Creative)
            .with_image_style("anime");
        let system = system_instruction(&spec);
        assert!(system.starts_with(registry::mode_template(Mode::ImageGeneration).role));
        assert!(system.contains("tom criativo"));
        assert!(system.contains("estilo anime"));
    }

    #[test]
    fn test_user_instruction_for_refinement() {
        let spec = PromptSpec::new("app tarefas", Mode::AppCreation)
            .with_context("Equipe pequena")
            .with_length(Length::Long);
        let task = Task::Refine {
            previous: "  Um app simples. ",
            modification: "inclua login",
        };
        let user = user_instruction(&spec, task);
        assert!(user.starts_with("Prompt atual:\nUm app simples.\n"));
        assert!(user.contains("Alteração solicitada: inclua login"));
        assert!(user.contains("Contexto: Equipe pequena"));
        assert!(user.contains("Tamanho desejado: longo."));
    }

    #[test]
    fn test_consolidated_instruction_states_minimum() {
        let spec = PromptSpec::new("api rest", Mode::Coding);
        let text = consolidated_instruction(&spec, Task::Fresh, 20);
        assert!(text.starts_with("INSTRUÇÃO OBRIGATÓRIA."));
        assert!(text.contains("pelo menos 20 caracteres"));
        assert!(text.contains("api rest"));
    }
}

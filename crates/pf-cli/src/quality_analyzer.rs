//! Quality analyzer for prompt specs
//!
//! Deterministic, explainable heuristics: five sub-scores, threshold-based
//! issues, gap-driven suggestions, a token estimate and a readability class.
//! Every caller that needs scoring goes through [`QualityAnalyzer`].

use regex::Regex;
use std::collections::HashSet;

use pf_core::registry;
use pf_core::{
    AnalysisReport, Complexity, Impact, Issue, Length, Mode, Priority, PromptSpec, QualityScore,
    ReadabilityLevel, ScoreAxis, Severity, Suggestion, SuggestionKind, Tone,
};

/// Below this many characters the keywords are unusable
pub const CRITICAL_KEYWORDS_LEN: usize = 5;
pub const MIN_KEYWORDS_LEN: usize = 10;
pub const OPTIMAL_KEYWORDS_LEN: usize = 50;
pub const MIN_CONTEXT_LEN: usize = 20;
pub const LONG_CONTEXT_LEN: usize = 100;
pub const TOKEN_BASE: usize = 50;

const STRENGTH_THRESHOLD: u8 = 80;
const IMPROVEMENT_THRESHOLD: u8 = 60;
const MAX_DETAIL_WORDS: usize = 5;

const VAGUE_WORDS: &[&str] = &[
    "algo", "alguma coisa", "talvez", "tipo assim", "qualquer coisa", "coisa", "coisas", "sei lá",
    "something", "maybe", "some kind of", "stuff", "whatever", "thing", "things",
];

const PRECISION_WORDS: &[&str] = &[
    "específico", "específica", "exatamente", "detalhado", "detalhada", "passo a passo",
    "preciso", "precisa", "concreto", "mensurável", "specific", "exactly", "detailed", "precise",
    "step by step", "measurable",
];

const DETAIL_WORDS: &[&str] = &[
    "como", "quando", "onde", "por que", "porque", "qual", "quais", "quanto", "quantos", "how",
    "when", "where", "why", "which", "how much", "what",
];

const TECHNICAL_WORDS: &[&str] = &[
    "api", "banco de dados", "database", "algoritmo", "algorithm", "framework", "react", "python",
    "rust", "javascript", "typescript", "sql", "backend", "frontend", "machine learning", "json",
    "http", "docker", "kubernetes", "cloud", "arquitetura", "architecture", "microsserviços",
    "microservices", "autenticação", "authentication", "iluminação", "lighting", "composição",
    "composition", "resolução", "4k", "8k", "lente", "lens",
];

/// Quality analyzer for prompt specs
#[derive(Debug, Clone)]
pub struct QualityAnalyzer {
    vague_patterns: Vec<Regex>,
    precision_patterns: Vec<Regex>,
    detail_patterns: Vec<Regex>,
    technical_patterns: Vec<Regex>,
}

fn compile_words(words: &[&str]) -> Vec<Regex> {
    words
        .iter()
        .filter_map(|w| Regex::new(&format!(r"(?i)\b{}\b", regex::escape(w))).ok())
        .collect()
}

impl QualityAnalyzer {
    /// Create a new quality analyzer
    pub fn new() -> Self {
        Self {
            vague_patterns: compile_words(VAGUE_WORDS),
            precision_patterns: compile_words(PRECISION_WORDS),
            detail_patterns: compile_words(DETAIL_WORDS),
            technical_patterns: compile_words(TECHNICAL_WORDS),
        }
    }

    /// Run every diagnostic and assemble the local analysis report
    pub fn analyze(&self, spec: &PromptSpec) -> AnalysisReport {
        let score = self.score(spec);
        let issues = self.detect_issues(spec);
        let suggestions = self.generate_suggestions(spec, &issues);

        AnalysisReport {
            score,
            strengths: self.strengths(&score),
            improvements: self.improvements(&score),
            issues,
            suggestions,
            readability_level: self.classify_readability(spec),
            estimated_tokens: self.estimate_tokens(spec),
        }
    }

    /// Five-axis score; each axis is clamped to [0, 100]
    pub fn score(&self, spec: &PromptSpec) -> QualityScore {
        QualityScore::from_parts(
            self.assess_clarity(spec),
            self.assess_specificity(spec),
            self.assess_structure(spec),
            self.assess_completeness(spec),
            self.assess_effectiveness(spec),
        )
    }

    fn assess_clarity(&self, spec: &PromptSpec) -> i32 {
        let mut score = 50;
        let keyword_len = spec.keyword_len();
        let text = scan_text(spec);

        if keyword_len >= MIN_KEYWORDS_LEN {
            score += 10;
        }
        if keyword_len >= OPTIMAL_KEYWORDS_LEN {
            score += 10;
        }
        if any_match(&self.vague_patterns, &text) {
            score -= 15;
        }
        if any_match(&self.precision_patterns, &text) {
            score += 10;
        }
        if spec.context_len() >= MIN_CONTEXT_LEN {
            score += 15;
        }

        score
    }

    fn assess_specificity(&self, spec: &PromptSpec) -> i32 {
        let mut score = 40;
        let text = scan_text(spec);

        let detail_words = count_matches(&self.detail_patterns, &text).min(MAX_DETAIL_WORDS);
        score += 5 * detail_words as i32;

        if any_match(&self.technical_patterns, &text) {
            score += 15;
        }
        if spec.image_style().is_some() {
            score += 15;
        }
        if spec.negative_prompt().is_some() {
            score += 10;
        }

        score
    }

    fn assess_structure(&self, spec: &PromptSpec) -> i32 {
        let mut score = 50;

        if is_well_matched(spec.tone, spec.mode) {
            score += 20;
        }
        if is_aligned(spec.complexity, spec.length) {
            score += 15;
        }
        if spec.include_examples && spec.length != Length::Short {
            score += 10;
        }

        score
    }

    fn assess_completeness(&self, spec: &PromptSpec) -> i32 {
        // Tone, complexity and mode are typed and therefore always present
        let mut score = 15 + 15 + 15;

        if spec.keyword_len() > 0 {
            score += 25;
        }
        if spec.context_text().is_some() {
            score += 20;
        }
        if spec.image_style().is_some() {
            score += 5;
        }
        if spec.negative_prompt().is_some() {
            score += 5;
        }

        score
    }

    fn assess_effectiveness(&self, spec: &PromptSpec) -> i32 {
        let mut score = 55;

        if is_aligned(spec.complexity, spec.length) {
            score += 20;
        }
        if let Some(context) = spec.context_text() {
            if shares_token(spec.keywords_text(), context) {
                score += 15;
            }
        }

        score
    }

    /// Threshold rules, ordered critical, then warnings, then info
    pub fn detect_issues(&self, spec: &PromptSpec) -> Vec<Issue> {
        let mut issues = Vec::new();
        let keyword_len = spec.keyword_len();

        if keyword_len < CRITICAL_KEYWORDS_LEN {
            issues.push(Issue {
                severity: Severity::Critical,
                category: ScoreAxis::Clarity,
                message: "As palavras-chave estão ausentes ou curtas demais para gerar um prompt útil."
                    .to_string(),
                suggestion: "Descreva o tema com pelo menos algumas palavras significativas."
                    .to_string(),
                impact: Impact::High,
                field: Some("keywords".to_string()),
            });
        } else if keyword_len < MIN_KEYWORDS_LEN {
            issues.push(Issue {
                severity: Severity::Warning,
                category: ScoreAxis::Clarity,
                message: "As palavras-chave são muito breves.".to_string(),
                suggestion: "Acrescente detalhes sobre o objetivo, o público ou o formato desejado."
                    .to_string(),
                impact: Impact::Medium,
                field: Some("keywords".to_string()),
            });
        }

        match spec.context_text() {
            None => issues.push(Issue {
                severity: Severity::Warning,
                category: ScoreAxis::Completeness,
                message: "Nenhum contexto foi informado.".to_string(),
                suggestion: "Informe o público-alvo, o objetivo e as restrições do resultado."
                    .to_string(),
                impact: Impact::Medium,
                field: Some("context".to_string()),
            }),
            Some(_) if spec.context_len() < MIN_CONTEXT_LEN => issues.push(Issue {
                severity: Severity::Warning,
                category: ScoreAxis::Completeness,
                message: "O contexto é curto demais para orientar a geração.".to_string(),
                suggestion: "Expanda o contexto com pelo menos uma frase completa.".to_string(),
                impact: Impact::Low,
                field: Some("context".to_string()),
            }),
            Some(_) => {}
        }

        if spec.length == Length::Short && spec.complexity.tier() == Complexity::Detailed {
            issues.push(Issue {
                severity: Severity::Warning,
                category: ScoreAxis::Structure,
                message: "Tamanho curto conflita com complexidade detalhada.".to_string(),
                suggestion: "Use tamanho longo ou reduza a complexidade.".to_string(),
                impact: Impact::High,
                field: Some("length".to_string()),
            });
        }

        if is_mismatched(spec.tone, spec.mode) {
            issues.push(Issue {
                severity: Severity::Info,
                category: ScoreAxis::Structure,
                message: format!(
                    "O tom {} combina pouco com o modo {}.",
                    spec.tone, spec.mode
                ),
                suggestion: format!(
                    "Considere o tom {} para este modo.",
                    recommended_tone(spec.mode)
                ),
                impact: Impact::Low,
                field: Some("tone".to_string()),
            });
        }

        // Stable sort keeps emission order inside each severity
        issues.sort_by_key(|issue| issue.severity);
        issues
    }

    /// One suggestion per improvable gap. Priority follows the severity of
    /// the issue being addressed, medium otherwise.
    pub fn generate_suggestions(&self, spec: &PromptSpec, issues: &[Issue]) -> Vec<Suggestion> {
        let template = registry::resolve(spec.mode, spec.image_style());
        let mut suggestions = Vec::new();

        for issue in issues {
            let priority = Priority::from_severity(issue.severity);
            let suggestion = match issue.field.as_deref() {
                Some("keywords") => {
                    let mut s = Suggestion::new(
                        SuggestionKind::Keyword,
                        "Detalhe melhor o tema",
                        issue.suggestion.clone(),
                        priority,
                    )
                    .with_field("keywords");
                    if let Some(example) = template.mode.examples.first() {
                        s = s.with_example(*example);
                    }
                    s
                }
                Some("context") => Suggestion::new(
                    SuggestionKind::Context,
                    "Adicione contexto",
                    issue.suggestion.clone(),
                    priority,
                )
                .with_example("Público: iniciantes. Objetivo: material de estudo. Restrição: linguagem simples.")
                .with_field("context"),
                Some("length") => Suggestion::new(
                    SuggestionKind::Alternative,
                    "Ajuste tamanho ou complexidade",
                    issue.suggestion.clone(),
                    priority,
                )
                .with_field("length"),
                Some("tone") => Suggestion::new(
                    SuggestionKind::Tone,
                    "Troque o tom",
                    issue.suggestion.clone(),
                    priority,
                )
                .with_example(recommended_tone(spec.mode).label())
                .with_field("tone"),
                _ => continue,
            };
            suggestions.push(suggestion);
        }

        if spec.mode.is_image() && spec.negative_prompt().is_none() {
            let hint = template
                .style
                .map(|s| s.negative_hint)
                .unwrap_or("baixa resolução, desfoque, marca d'água, texto na imagem");
            suggestions.push(
                Suggestion::new(
                    SuggestionKind::Enhancement,
                    "Adicione um prompt negativo",
                    "Liste o que a imagem não deve conter para reduzir artefatos indesejados.",
                    Priority::default(),
                )
                .with_example(hint)
                .with_field("negative_prompt"),
            );
        }

        if spec.mode.is_image() && spec.image_style().is_none() {
            suggestions.push(
                Suggestion::new(
                    SuggestionKind::Enhancement,
                    "Escolha um estilo visual",
                    "Um estilo definido deixa o resultado mais consistente.",
                    Priority::default(),
                )
                .with_example(registry::style_ids().join(", "))
                .with_field("image_style"),
            );
        }

        if spec.include_examples && spec.length == Length::Short {
            suggestions.push(
                Suggestion::new(
                    SuggestionKind::Optimization,
                    "Exemplos em resposta curta",
                    "Exemplos ocupam espaço; use tamanho médio ou longo, ou desative os exemplos.",
                    Priority::default(),
                )
                .with_field("include_examples"),
            );
        }

        suggestions
    }

    /// Estimated token cost: the sum of the base and per-field costs,
    /// multiplied by the complexity multiplier
    pub fn estimate_tokens(&self, spec: &PromptSpec) -> u32 {
        let mut sum = TOKEN_BASE + spec.keyword_len().div_ceil(4) + spec.context_len().div_ceil(4);
        if let Some(negative) = spec.negative_prompt() {
            sum += negative.chars().count().div_ceil(4);
        }
        (sum as f64 * spec.complexity.token_multiplier()).round() as u32
    }

    /// Classify by counting complexity signals
    pub fn classify_readability(&self, spec: &PromptSpec) -> ReadabilityLevel {
        let signals = [
            spec.keyword_len() > OPTIMAL_KEYWORDS_LEN,
            spec.context_len() > LONG_CONTEXT_LEN,
            spec.complexity.tier() == Complexity::Detailed,
            spec.negative_prompt().is_some(),
        ]
        .into_iter()
        .filter(|&signal| signal)
        .count();

        match signals {
            0 => ReadabilityLevel::Beginner,
            1 | 2 => ReadabilityLevel::Intermediate,
            _ => ReadabilityLevel::Advanced,
        }
    }

    /// Axes scoring at or above the strength threshold
    pub fn strengths(&self, score: &QualityScore) -> Vec<String> {
        score
            .axes()
            .into_iter()
            .filter(|(_, value)| *value >= STRENGTH_THRESHOLD)
            .map(|(axis, value)| {
                let note = match axis {
                    ScoreAxis::Clarity => "palavras-chave claras e objetivas",
                    ScoreAxis::Specificity => "boa quantidade de detalhes específicos",
                    ScoreAxis::Structure => "parâmetros bem combinados entre si",
                    ScoreAxis::Completeness => "campos relevantes preenchidos",
                    ScoreAxis::Effectiveness => "configuração alinhada ao resultado esperado",
                };
                format!("{} ({}/100): {}", capitalize(axis.label()), value, note)
            })
            .collect()
    }

    /// Axes scoring below the improvement threshold
    pub fn improvements(&self, score: &QualityScore) -> Vec<String> {
        score
            .axes()
            .into_iter()
            .filter(|(_, value)| *value < IMPROVEMENT_THRESHOLD)
            .map(|(axis, value)| {
                let advice = match axis {
                    ScoreAxis::Clarity => "torne as palavras-chave mais claras e evite termos vagos",
                    ScoreAxis::Specificity => {
                        "inclua detalhes concretos como tecnologias, estilo ou restrições"
                    }
                    ScoreAxis::Structure => "combine melhor tom, complexidade e tamanho",
                    ScoreAxis::Completeness => "preencha o contexto e os campos opcionais relevantes",
                    ScoreAxis::Effectiveness => {
                        "alinhe complexidade e tamanho e relacione o contexto ao tema"
                    }
                };
                format!("{} ({}/100): {}", capitalize(axis.label()), value, advice)
            })
            .collect()
    }
}

impl Default for QualityAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Tone best suited to each mode
pub fn recommended_tone(mode: Mode) -> Tone {
    match mode {
        Mode::AppCreation | Mode::ProblemSolving | Mode::Coding => Tone::Technical,
        Mode::ImageGeneration | Mode::ContentCreation => Tone::Creative,
        Mode::Instruct | Mode::Explain => Tone::Educational,
    }
}

fn is_well_matched(tone: Tone, mode: Mode) -> bool {
    matches!(
        (tone, mode),
        (Tone::Technical, Mode::AppCreation)
            | (Tone::Technical, Mode::Coding)
            | (Tone::Technical, Mode::ProblemSolving)
            | (Tone::Creative, Mode::ImageGeneration)
            | (Tone::Creative, Mode::ContentCreation)
            | (Tone::Professional, Mode::ContentCreation)
            | (Tone::Professional, Mode::ProblemSolving)
            | (Tone::Educational, Mode::Explain)
            | (Tone::Educational, Mode::Instruct)
            | (Tone::Friendly, Mode::Explain)
            | (Tone::Formal, Mode::Instruct)
    )
}

fn is_mismatched(tone: Tone, mode: Mode) -> bool {
    matches!(
        (tone, mode),
        (Tone::Casual, Mode::AppCreation)
            | (Tone::Casual, Mode::Coding)
            | (Tone::Technical, Mode::ImageGeneration)
            | (Tone::Formal, Mode::ImageGeneration)
    )
}

fn is_aligned(complexity: Complexity, length: Length) -> bool {
    matches!(
        (complexity.tier(), length),
        (Complexity::Detailed, Length::Long)
            | (Complexity::Simple, Length::Short)
            | (Complexity::Moderate, Length::Medium)
    )
}

fn scan_text(spec: &PromptSpec) -> String {
    match spec.context_text() {
        Some(context) => format!("{} {}", spec.keywords_text(), context),
        None => spec.keywords_text().to_string(),
    }
}

fn any_match(patterns: &[Regex], text: &str) -> bool {
    patterns.iter().any(|p| p.is_match(text))
}

fn count_matches(patterns: &[Regex], text: &str) -> usize {
    patterns.iter().filter(|p| p.is_match(text)).count()
}

fn tokens(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() >= 3)
        .map(str::to_lowercase)
        .collect()
}

fn shares_token(keywords: &str, context: &str) -> bool {
    let keyword_tokens = tokens(keywords);
    tokens(context).iter().any(|t| keyword_tokens.contains(t))
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

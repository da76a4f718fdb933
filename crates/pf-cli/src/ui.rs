//! Terminal rendering for reports, generation outcomes and model listings

use colored::*;
use std::fmt::Write;

use pf_core::{
    AnalysisReport, GenerationOutcome, Impact, Issue, ModelInfo, Priority, ReadabilityLevel,
    Severity, Suggestion,
};

const BANNER_WIDTH: usize = 56;

/// Display startup banner
pub fn display_banner() {
    let top_border = format!("┌{}┐", "─".repeat(BANNER_WIDTH - 2));
    let bottom_border = format!("└{}┘", "─".repeat(BANNER_WIDTH - 2));
    let empty_line = format!("│{}│", " ".repeat(BANNER_WIDTH - 2));

    println!();
    println!("{}", top_border.blue());
    let title = "PromptForge";
    println!(
        "{}{}{}{}",
        "│  ".blue(),
        title.blue().bold(),
        " ".repeat(BANNER_WIDTH - title.chars().count() - 5),
        "│".blue()
    );
    let tagline = "Prompts melhores, com ou sem conexão";
    println!(
        "{}{}{}{}",
        "│  ".blue(),
        tagline.dimmed(),
        " ".repeat(BANNER_WIDTH - tagline.chars().count() - 5),
        "│".blue()
    );
    println!("{}", empty_line.blue());
    println!("{}", bottom_border.blue());
    println!();
}

fn score_bar(value: u8) -> String {
    let filled = usize::from(value.min(100)) / 10;
    let bar = format!("{}{}", "█".repeat(filled), "░".repeat(10 - filled));
    match value {
        80..=100 => bar.green().to_string(),
        60..=79 => bar.yellow().to_string(),
        _ => bar.red().to_string(),
    }
}

fn severity_tag(severity: Severity) -> ColoredString {
    match severity {
        Severity::Critical => "CRÍTICO".red().bold(),
        Severity::Warning => "ATENÇÃO".yellow().bold(),
        Severity::Info => "INFO".cyan(),
    }
}

fn impact_label(impact: Impact) -> &'static str {
    match impact {
        Impact::High => "alto",
        Impact::Medium => "médio",
        Impact::Low => "baixo",
    }
}

fn priority_label(priority: Priority) -> &'static str {
    match priority {
        Priority::High => "alta",
        Priority::Medium => "média",
        Priority::Low => "baixa",
    }
}

fn readability_label(level: ReadabilityLevel) -> &'static str {
    match level {
        ReadabilityLevel::Beginner => "iniciante",
        ReadabilityLevel::Intermediate => "intermediário",
        ReadabilityLevel::Advanced => "avançado",
    }
}

fn format_issue(out: &mut String, issue: &Issue) {
    let _ = writeln!(
        out,
        "  [{}] {} (impacto {})",
        severity_tag(issue.severity),
        issue.message,
        impact_label(issue.impact)
    );
    let _ = writeln!(out, "      → {}", issue.suggestion.dimmed());
}

fn format_suggestion(out: &mut String, suggestion: &Suggestion) {
    let _ = writeln!(
        out,
        "  • {} (prioridade {}, confiança {:.0}%)",
        suggestion.title.bold(),
        priority_label(suggestion.priority),
        suggestion.confidence * 100.0
    );
    let _ = writeln!(out, "    {}", suggestion.description);
    if let Some(example) = &suggestion.example {
        let _ = writeln!(out, "    Exemplo: {}", example.italic());
    }
}

/// Render an analysis report for the terminal
pub fn format_report(report: &AnalysisReport) -> String {
    let mut out = String::new();
    let score = &report.score;

    let _ = writeln!(out, "{}", "Qualidade do prompt".bold().underline());
    let _ = writeln!(
        out,
        "  {:<15} {} {:>3}",
        "geral",
        score_bar(score.overall),
        score.overall
    );
    for (axis, value) in score.axes() {
        let _ = writeln!(out, "  {:<15} {} {:>3}", axis.label(), score_bar(value), value);
    }
    let _ = writeln!(
        out,
        "  Legibilidade: {} · Tokens estimados: {}",
        readability_label(report.readability_level),
        report.estimated_tokens
    );

    if !report.strengths.is_empty() {
        let _ = writeln!(out, "\n{}", "Pontos fortes".green().bold());
        for strength in &report.strengths {
            let _ = writeln!(out, "  ✓ {}", strength);
        }
    }

    if !report.improvements.is_empty() {
        let _ = writeln!(out, "\n{}", "A melhorar".yellow().bold());
        for improvement in &report.improvements {
            let _ = writeln!(out, "  ↑ {}", improvement);
        }
    }

    if !report.issues.is_empty() {
        let _ = writeln!(out, "\n{}", "Problemas".red().bold());
        for issue in &report.issues {
            format_issue(&mut out, issue);
        }
    }

    if !report.suggestions.is_empty() {
        let _ = writeln!(out, "\n{}", "Sugestões".cyan().bold());
        for suggestion in &report.suggestions {
            format_suggestion(&mut out, suggestion);
        }
    }

    out
}

/// Render a generation outcome for the terminal
pub fn format_outcome(outcome: &GenerationOutcome) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{}", "Prompt gerado".bold().underline());
    let _ = writeln!(out, "{}", outcome.text);

    if outcome.used_fallback {
        let _ = writeln!(
            out,
            "\n{} {}",
            "⚠".yellow(),
            "Serviço de geração indisponível; prompt montado localmente a partir dos modelos.".yellow()
        );
    }
    if let Some(diagnostics) = &outcome.diagnostics {
        let _ = writeln!(out, "{}", format!("Diagnóstico: {}", diagnostics).dimmed());
    }

    out
}

/// Render the model catalog for the terminal
pub fn format_models(models: &[ModelInfo]) -> String {
    if models.is_empty() {
        return format!("{}\n", "Nenhum modelo disponível.".yellow());
    }

    let mut out = String::new();
    let _ = writeln!(out, "{}", "Modelos disponíveis".bold().underline());
    for model in models {
        let limits = match (model.input_token_limit, model.output_token_limit) {
            (Some(input), Some(output)) => format!(" (entrada {}, saída {})", input, output),
            (Some(input), None) => format!(" (entrada {})", input),
            (None, Some(output)) => format!(" (saída {})", output),
            (None, None) => String::new(),
        };
        let _ = writeln!(out, "  {} · {}{}", model.id.green(), model.display_name, limits.dimmed());
    }
    out
}

pub fn display_report(report: &AnalysisReport) {
    print!("{}", format_report(report));
}

pub fn display_outcome(outcome: &GenerationOutcome) {
    print!("{}", format_outcome(outcome));
}

pub fn display_models(models: &[ModelInfo]) {
    print!("{}", format_models(models));
}

/// Print an error the user can act on
pub fn display_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message.red());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_bar_width() {
        colored::control::set_override(false);
        assert_eq!(score_bar(0), "░░░░░░░░░░");
        assert_eq!(score_bar(75), "███████░░░");
        assert_eq!(score_bar(100), "██████████");
    }

    #[test]
    fn test_score_bar_out_of_range_value() {
        colored::control::set_override(false);
        assert_eq!(score_bar(250), "██████████");
    }

    #[test]
    fn test_format_models_empty() {
        colored::control::set_override(false);
        assert_eq!(format_models(&[]), "Nenhum modelo disponível.\n");
    }
}

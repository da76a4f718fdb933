//! Snapshot tests for analysis, generation and rendering

#[cfg(test)]
mod snapshot_tests {
    use crate::ui::{format_outcome, format_report};
    use crate::{PromptGenerator, QualityAnalyzer};
    use insta::{assert_snapshot, assert_yaml_snapshot};
    use pf_core::{Complexity, Length, Mode, PromptSpec, Tone, UnavailableService};

    #[test]
    fn test_issue_list_snapshot() {
        let spec = PromptSpec::new("app", Mode::AppCreation)
            .with_tone(Tone::Casual)
            .with_complexity(Complexity::Advanced)
            .with_length(Length::Short);
        let issues = QualityAnalyzer::new().detect_issues(&spec);

        assert_yaml_snapshot!(issues, @r###"
        ---
        - severity: critical
          category: clarity
          message: As palavras-chave estão ausentes ou curtas demais para gerar um prompt útil.
          suggestion: Descreva o tema com pelo menos algumas palavras significativas.
          impact: high
          field: keywords
        - severity: warning
          category: completeness
          message: Nenhum contexto foi informado.
          suggestion: "Informe o público-alvo, o objetivo e as restrições do resultado."
          impact: medium
          field: context
        - severity: warning
          category: structure
          message: Tamanho curto conflita com complexidade detalhada.
          suggestion: Use tamanho longo ou reduza a complexidade.
          impact: high
          field: length
        - severity: info
          category: structure
          message: O tom descontraído combina pouco com o modo criação de aplicativo.
          suggestion: Considere o tom técnico para este modo.
          impact: low
          field: tone
        "###);
    }

    #[test]
    fn test_report_rendering_snapshot() {
        colored::control::set_override(false);
        let spec = PromptSpec::new("app de tarefas", Mode::AppCreation);
        let report = QualityAnalyzer::new().analyze(&spec);

        assert_snapshot!(format_report(&report), @r###"
        Qualidade do prompt
          geral           ██████░░░░  62
          clareza         ██████░░░░  60
          especificidade  ████░░░░░░  40
          estrutura       ██████░░░░  65
          completude      ███████░░░  70
          efetividade     ███████░░░  75
          Legibilidade: iniciante · Tokens estimados: 81

        A melhorar
          ↑ Especificidade (40/100): inclua detalhes concretos como tecnologias, estilo ou restrições

        Problemas
          [ATENÇÃO] Nenhum contexto foi informado. (impacto médio)
              → Informe o público-alvo, o objetivo e as restrições do resultado.

        Sugestões
          • Adicione contexto (prioridade média, confiança 70%)
            Informe o público-alvo, o objetivo e as restrições do resultado.
            Exemplo: Público: iniciantes. Objetivo: material de estudo. Restrição: linguagem simples.
        "###);
    }

    #[tokio::test]
    async fn test_offline_outcome_snapshot() {
        colored::control::set_override(false);
        let generator = PromptGenerator::new(UnavailableService);
        let outcome = generator
            .generate(&PromptSpec::new("Crie um app de tarefas", Mode::AppCreation))
            .await
            .unwrap();

        assert_snapshot!(format_outcome(&outcome), @r###"
        Prompt gerado
        Crie um aplicativo focado em app tarefas, descrevendo as funcionalidades principais, o fluxo do usuário e uma arquitetura técnica sugerida. Use um tom profissional, nível de complexidade moderado e uma resposta de tamanho médio.

        ⚠ Serviço de geração indisponível; prompt montado localmente a partir dos modelos.
        Diagnóstico: attempt 1 (structured): Configuration error: no generation service configured; attempt 2 (consolidated): Configuration error: no generation service configured
        "###);
    }
}

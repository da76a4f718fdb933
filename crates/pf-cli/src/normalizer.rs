//! Keyword normalization applied before scoring and generation

use regex::Regex;

/// Imperative and request openers stripped from the start of the keywords
const INSTRUCTION_VERBS: &[&str] = &[
    // pt-BR
    "crie", "criar", "cria", "faça", "faca", "fazer", "gere", "gerar", "construa", "construir",
    "desenvolva", "desenvolver", "escreva", "escrever", "explique", "explicar", "monte", "montar",
    "preciso de", "preciso", "quero", "gostaria de", "me ajude a", "me ajude", "poderia",
    "você pode", "voce pode", "por favor",
    // en
    "create", "build", "make", "generate", "write", "develop", "explain", "design", "i need",
    "i want", "could you", "can you", "please", "help me",
];

/// Filler words removed once an opener has been stripped
const FILLER_WORDS: &[&str] = &[
    "por favor", "um", "uma", "uns", "umas", "o", "a", "os", "as", "de", "do", "da", "dos",
    "das", "para", "pra", "me", "que", "the", "an", "of", "for", "to", "some",
];

/// Common misspellings and their corrections, matched as whole words
const CORRECTIONS: &[(&str, &str)] = &[
    ("progamação", "programação"),
    ("programaçao", "programação"),
    ("programacao", "programação"),
    ("aplicatvo", "aplicativo"),
    ("aplicativ", "aplicativo"),
    ("aplicacao", "aplicação"),
    ("funçao", "função"),
    ("funcao", "função"),
    ("desenvolvimeto", "desenvolvimento"),
    ("inteligencia", "inteligência"),
    ("artifical", "artificial"),
    ("tecnolgia", "tecnologia"),
    ("imagen", "imagem"),
    ("pesoas", "pessoas"),
    ("usuario", "usuário"),
    ("crair", "criar"),
    ("seperate", "separate"),
    ("enviroment", "environment"),
    ("databse", "database"),
    ("fucntion", "function"),
    ("algoritm", "algorithm"),
    ("recieve", "receive"),
    ("definately", "definitely"),
];

/// Cleans raw keyword input.
///
/// Lowercases and trims; when the text opens with an instruction verb, strips
/// it and removes filler words; then applies the misspelling dictionary.
/// Output depends only on the input and the fixed tables above.
///
/// Re-normalizing is usually a no-op, but not always: a correction can turn
/// the first word into an instruction verb (`crair` becomes `criar`), which a
/// second pass then strips.
pub struct KeywordNormalizer {
    verb_patterns: Vec<Regex>,
    filler_patterns: Vec<Regex>,
    corrections: Vec<(Regex, &'static str)>,
}

impl KeywordNormalizer {
    pub fn new() -> Self {
        // Longest first so "preciso de" wins over "preciso"
        let mut verbs: Vec<&str> = INSTRUCTION_VERBS.to_vec();
        verbs.sort_by_key(|v| std::cmp::Reverse(v.chars().count()));

        let verb_patterns = verbs
            .into_iter()
            .filter_map(|v| Regex::new(&format!(r"^{}\b", regex::escape(v))).ok())
            .collect();

        let filler_patterns = FILLER_WORDS
            .iter()
            .filter_map(|w| Regex::new(&format!(r"\b{}\b", regex::escape(w))).ok())
            .collect();

        let corrections = CORRECTIONS
            .iter()
            .filter_map(|(wrong, right)| {
                Regex::new(&format!(r"(?i)\b{}\b", regex::escape(wrong)))
                    .ok()
                    .map(|re| (re, *right))
            })
            .collect();

        Self {
            verb_patterns,
            filler_patterns,
            corrections,
        }
    }

    /// Normalize raw keyword text
    pub fn normalize(&self, raw: &str) -> String {
        let mut text = raw.trim().to_lowercase();

        if let Some(rest) = self.strip_leading_verb(&text) {
            text = rest;
            for pattern in &self.filler_patterns {
                text = pattern.replace_all(&text, " ").into_owned();
            }
            text = collapse_whitespace(&text);
        }

        for (pattern, correction) in &self.corrections {
            text = pattern.replace_all(&text, *correction).into_owned();
        }

        collapse_whitespace(&text)
    }

    /// True when the text opens with an instruction verb
    pub fn starts_with_instruction(&self, raw: &str) -> bool {
        self.strip_leading_verb(&raw.trim().to_lowercase()).is_some()
    }

    fn strip_leading_verb(&self, text: &str) -> Option<String> {
        self.verb_patterns.iter().find_map(|pattern| {
            pattern.find(text).map(|m| {
                text[m.end()..]
                    .trim_start_matches(|c: char| c.is_whitespace() || c == ',' || c == ':')
                    .to_string()
            })
        })
    }
}

impl Default for KeywordNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalize with a freshly built normalizer
pub fn normalize(raw: &str) -> String {
    KeywordNormalizer::new().normalize(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dictionary_correction() {
        assert_eq!(normalize("progamação de app"), "programação de app");
        assert_eq!(normalize("Inteligencia Artifical"), "inteligência artificial");
    }

    #[test]
    fn test_strips_verb_and_fillers() {
        assert_eq!(normalize("Crie um app de tarefas"), "app tarefas");
        assert_eq!(normalize("  Preciso de uma API para pagamentos "), "api pagamentos");
        assert_eq!(normalize("Could you write the story of a dragon"), "write story dragon");
    }

    #[test]
    fn test_fillers_kept_without_verb() {
        assert_eq!(normalize("castelo de areia"), "castelo de areia");
    }

    #[test]
    fn test_whole_word_matching() {
        // "criei" is not the verb "crie"; "ao" contains "a" but is not a filler
        assert_eq!(normalize("criei um app"), "criei um app");
        assert_eq!(normalize("crie banco ao vivo"), "banco ao vivo");
        // "imagens" must not be touched by the "imagen" correction
        assert_eq!(normalize("imagens de gatos"), "imagens de gatos");
    }

    #[test]
    fn test_verb_only_input_becomes_empty() {
        assert_eq!(normalize("crie"), "");
        assert_eq!(normalize("   "), "");
    }

    #[test]
    fn test_renormalizing_is_stable_for_typical_input() {
        let normalizer = KeywordNormalizer::new();
        for raw in ["Crie um app de tarefas", "progamação de app", "dashboard de vendas em react"] {
            let once = normalizer.normalize(raw);
            assert_eq!(normalizer.normalize(&once), once);
        }
    }

    #[test]
    fn test_known_non_idempotent_case() {
        let normalizer = KeywordNormalizer::new();
        let once = normalizer.normalize("crair app");
        assert_eq!(once, "criar app");
        assert_eq!(normalizer.normalize(&once), "app");
    }

    #[test]
    fn test_starts_with_instruction() {
        let normalizer = KeywordNormalizer::new();
        assert!(normalizer.starts_with_instruction("I need a logo"));
        assert!(!normalizer.starts_with_instruction("logo"));
    }
}

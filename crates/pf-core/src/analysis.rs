//! Diagnostics produced for a prompt spec

use serde::{Deserialize, Serialize};

/// Five-axis quality score, each value in [0, 100]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityScore {
    pub clarity: u8,
    pub specificity: u8,
    pub structure: u8,
    pub completeness: u8,
    pub effectiveness: u8,
    /// Rounded mean of the other five
    pub overall: u8,
}

impl QualityScore {
    /// Build a score from raw sub-scores, clamping each to [0, 100]
    pub fn from_parts(
        clarity: i32,
        specificity: i32,
        structure: i32,
        completeness: i32,
        effectiveness: i32,
    ) -> Self {
        let clamp = |v: i32| v.clamp(0, 100) as u8;
        let parts = [
            clamp(clarity),
            clamp(specificity),
            clamp(structure),
            clamp(completeness),
            clamp(effectiveness),
        ];
        let mean = parts.iter().map(|&p| f64::from(p)).sum::<f64>() / parts.len() as f64;

        Self {
            clarity: parts[0],
            specificity: parts[1],
            structure: parts[2],
            completeness: parts[3],
            effectiveness: parts[4],
            overall: mean.round() as u8,
        }
    }

    /// Sub-scores paired with their axis names
    pub fn axes(&self) -> [(ScoreAxis, u8); 5] {
        [
            (ScoreAxis::Clarity, self.clarity),
            (ScoreAxis::Specificity, self.specificity),
            (ScoreAxis::Structure, self.structure),
            (ScoreAxis::Completeness, self.completeness),
            (ScoreAxis::Effectiveness, self.effectiveness),
        ]
    }
}

/// One of the five scoring axes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreAxis {
    Clarity,
    Specificity,
    Structure,
    Completeness,
    Effectiveness,
}

impl ScoreAxis {
    pub fn label(&self) -> &'static str {
        match self {
            ScoreAxis::Clarity => "clareza",
            ScoreAxis::Specificity => "especificidade",
            ScoreAxis::Structure => "estrutura",
            ScoreAxis::Completeness => "completude",
            ScoreAxis::Effectiveness => "efetividade",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Critical,
    Warning,
    Info,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Impact {
    High,
    Medium,
    Low,
}

/// A detected problem with a prompt spec
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub severity: Severity,
    pub category: ScoreAxis,
    pub message: String,
    /// Always non-empty
    pub suggestion: String,
    pub impact: Impact,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionKind {
    Enhancement,
    Optimization,
    Alternative,
    Keyword,
    Context,
    Tone,
    Structure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    /// Priority of a suggestion that addresses an issue of this severity
    pub fn from_severity(severity: Severity) -> Self {
        match severity {
            Severity::Critical => Priority::High,
            Severity::Warning => Priority::Medium,
            Severity::Info => Priority::Low,
        }
    }

    /// Confidence assigned to locally generated suggestions
    pub fn confidence(&self) -> f32 {
        match self {
            Priority::High => 0.9,
            Priority::Medium => 0.7,
            Priority::Low => 0.5,
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

/// An actionable improvement for a prompt spec
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub kind: SuggestionKind,
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
    #[serde(default)]
    pub priority: Priority,
    pub confidence: f32,
    /// Spec field this suggestion targets, used for de-duplication
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl Suggestion {
    pub fn new(
        kind: SuggestionKind,
        title: impl Into<String>,
        description: impl Into<String>,
        priority: Priority,
    ) -> Self {
        Self {
            kind,
            title: title.into(),
            description: description.into(),
            example: None,
            priority,
            confidence: priority.confidence(),
            field: None,
        }
    }

    pub fn with_example(mut self, example: impl Into<String>) -> Self {
        self.example = Some(example.into());
        self
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = confidence.clamp(0.0, 1.0);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadabilityLevel {
    Beginner,
    Intermediate,
    Advanced,
}

/// Full analysis response for a prompt spec
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub score: QualityScore,
    pub issues: Vec<Issue>,
    pub suggestions: Vec<Suggestion>,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    pub readability_level: ReadabilityLevel,
    pub estimated_tokens: u32,
}

use crate::domain::entities::knowledge_row::KnowledgeRow;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerSource {
    KnowledgeBase,
    GenerativeFallback,
}

impl fmt::Display for AnswerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnswerSource::KnowledgeBase => write!(f, "knowledge_base"),
            AnswerSource::GenerativeFallback => write!(f, "generative_fallback"),
        }
    }
}

/// The single reply produced for a query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Answer {
    pub text: String,
    pub source: AnswerSource,
    /// Rows the answer is based on: the trusted row, or the rows placed in the fallback prompt.
    pub used_context: Vec<KnowledgeRow>,
    /// Set when the answer was produced because the fallback was unavailable.
    pub degraded: bool,
    /// Distance of the best retrieval hit, when there was one.
    pub best_score: Option<f32>,
}

impl Answer {
    /// A trusted knowledge-base hit, returned verbatim.
    pub fn from_knowledge(row: KnowledgeRow, score: f32) -> Self {
        Self {
            text: row.text.clone(),
            source: AnswerSource::KnowledgeBase,
            used_context: vec![row],
            degraded: false,
            best_score: Some(score),
        }
    }

    pub fn generated(text: String, context: Vec<KnowledgeRow>, best_score: Option<f32>) -> Self {
        Self {
            text,
            source: AnswerSource::GenerativeFallback,
            used_context: context,
            degraded: false,
            best_score,
        }
    }

    /// Best retrieval hit returned regardless of threshold because the fallback failed.
    pub fn degraded_from(row: KnowledgeRow, score: f32) -> Self {
        Self {
            degraded: true,
            ..Self::from_knowledge(row, score)
        }
    }

    /// Fixed reply used when neither retrieval nor the fallback produced anything.
    pub fn cannot_answer(text: String) -> Self {
        Self {
            text,
            source: AnswerSource::GenerativeFallback,
            used_context: vec![],
            degraded: true,
            best_score: None,
        }
    }

    /// Canned reply that needs neither retrieval nor generation (greetings, blank input).
    pub fn canned(text: String) -> Self {
        Self {
            text,
            source: AnswerSource::KnowledgeBase,
            used_context: vec![],
            degraded: false,
            best_score: None,
        }
    }
}

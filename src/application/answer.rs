use crate::application::prompt::{fallback_prompt, Institution};
use crate::application::retrieve::RetrieveUseCase;
use crate::domain::entities::answer::Answer;
use crate::domain::entities::knowledge_row::KnowledgeRow;
use crate::domain::entities::retrieval_result::RetrievalResult;
use crate::domain::error::{DomainError, FailureKind};
use crate::domain::ports::generation_port::TextGenerator;
use crate::domain::values::normalized_text::NormalizedText;
use crate::domain::values::trust_threshold::TrustThreshold;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Knobs of the answer policy. All fixed at startup.
#[derive(Debug, Clone)]
pub struct AnswerPolicy {
    /// Distance gate for answering straight from the knowledge base.
    pub threshold: TrustThreshold,
    /// Candidates retrieved per query.
    pub top_k: usize,
    /// How many retrieved rows go into the fallback prompt.
    pub context_rows: usize,
    /// Generated replies are cut to this many characters.
    pub max_answer_chars: usize,
    pub institution: Institution,
    /// Reply for greetings; `None` sends greetings through retrieval like any query.
    pub greeting_reply: Option<String>,
}

impl AnswerPolicy {
    pub fn new(threshold: TrustThreshold) -> Self {
        let institution = Institution::default();
        let greeting_reply = Some(format!(
            "Hi! I'm the {} assistant. How can I help you today?",
            institution.name
        ));
        Self {
            threshold,
            top_k: 3,
            context_rows: 3,
            max_answer_chars: 300,
            institution,
            greeting_reply,
        }
    }
}

/// Decides, per query, between a knowledge-base answer and the generative fallback.
///
/// Holds no per-query state; concurrent calls share only the read-only
/// retriever and generator.
pub struct AnswerUseCase {
    retriever: Arc<RetrieveUseCase>,
    generator: Option<Arc<dyn TextGenerator>>,
    policy: AnswerPolicy,
}

impl AnswerUseCase {
    pub fn new(
        retriever: Arc<RetrieveUseCase>,
        generator: Option<Arc<dyn TextGenerator>>,
        policy: AnswerPolicy,
    ) -> Self {
        Self {
            retriever,
            generator,
            policy,
        }
    }

    /// Always produces an answer; retrieval and fallback failures degrade instead of erroring.
    pub async fn answer(&self, query: &str) -> Answer {
        let normalized = NormalizedText::new(query);
        if normalized.is_empty() {
            return Answer::canned(self.policy.institution.ask_for_question());
        }
        if let Some(reply) = &self.policy.greeting_reply {
            if normalized.is_greeting() {
                return Answer::canned(reply.clone());
            }
        }

        let hits = match self.retriever.retrieve(query, self.policy.top_k.max(1)).await {
            Ok(hits) => hits,
            Err(e) => {
                warn!(error = %e, "Retrieval failed, continuing without knowledge-base candidates");
                vec![]
            }
        };

        if let Some(best) = hits.first() {
            if self.policy.threshold.trusts(best.score) {
                debug!(row = best.row.id, score = best.score, "Answering from knowledge base");
                return Answer::from_knowledge(best.row.clone(), best.score);
            }
            debug!(
                row = best.row.id,
                score = best.score,
                threshold = %self.policy.threshold,
                "Best match below trust threshold, using fallback"
            );
        }

        let best_score = hits.first().map(|h| h.score);
        let context: Vec<KnowledgeRow> = hits
            .iter()
            .take(self.policy.context_rows)
            .map(|h| h.row.clone())
            .collect();

        match self.generate(query, &context).await {
            Ok(text) => Answer::generated(text, context, best_score),
            Err(e) => {
                warn!(error = %e, "Fallback unavailable, degrading to best retrieval result");
                self.degrade(hits)
            }
        }
    }

    async fn generate(&self, query: &str, context: &[KnowledgeRow]) -> Result<String, DomainError> {
        let generator = self.generator.as_ref().ok_or_else(|| {
            DomainError::fallback(
                FailureKind::NotConfigured,
                "no text generator configured",
            )
        })?;

        let prompt = fallback_prompt(&self.policy.institution, query, context);
        let text = generator.generate(&prompt).await?;
        let text = truncate_chars(text.trim(), self.policy.max_answer_chars);
        if text.is_empty() {
            return Err(DomainError::fallback(
                FailureKind::Malformed,
                format!("{} returned an empty reply", generator.name()),
            ));
        }
        info!(generator = generator.name(), context_rows = context.len(), "Answered via fallback");
        Ok(text)
    }

    fn degrade(&self, hits: Vec<RetrievalResult>) -> Answer {
        match hits.into_iter().next() {
            Some(best) => Answer::degraded_from(best.row, best.score),
            None => Answer::cannot_answer(self.policy.institution.cannot_answer()),
        }
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => text[..cut].trim_end().to_string(),
        None => text.to_string(),
    }
}

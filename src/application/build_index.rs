use crate::domain::entities::knowledge_index::KnowledgeIndex;
use crate::domain::entities::knowledge_row::{KnowledgeRecord, KnowledgeRow};
use crate::domain::entities::side_table::{IndexHeader, SideTable};
use crate::domain::entities::vector_index::{VectorIndex, METRIC};
use crate::domain::error::DomainError;
use crate::domain::ports::embedding_port::{EmbeddingProvider, InputType};
use crate::domain::ports::index_repository::IndexRepository;
use crate::domain::ports::knowledge_source::KnowledgeSource;
use crate::domain::values::normalized_text::NormalizedText;
use chrono::Utc;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildReport {
    pub indexed: usize,
    pub skipped_empty: usize,
    pub skipped_duplicate: usize,
    pub dimension: usize,
    pub model_id: String,
}

/// Rows ready to embed, plus what was dropped on the way.
struct PreparedRows {
    rows: Vec<KnowledgeRow>,
    embed_texts: Vec<String>,
    skipped_empty: usize,
    skipped_duplicate: usize,
}

/// Drop blank, unmatchable and duplicate records and assign ids by position in what remains.
///
/// Each row is embedded by its normalised match text (the question when the
/// source has one). Duplicates share both match text and answer.
fn prepare(records: Vec<KnowledgeRecord>) -> PreparedRows {
    let mut seen = HashSet::new();
    let mut prepared = PreparedRows {
        rows: Vec::new(),
        embed_texts: Vec::new(),
        skipped_empty: 0,
        skipped_duplicate: 0,
    };

    for (position, mut record) in records.into_iter().enumerate() {
        let trimmed = record.text.trim();
        if trimmed.is_empty() {
            warn!(record = position, "Skipping knowledge record with empty text");
            prepared.skipped_empty += 1;
            continue;
        }
        record.text = trimmed.to_string();

        let key = NormalizedText::new(record.match_text()).into_string();
        if key.is_empty() {
            warn!(record = position, "Skipping knowledge record with nothing to match against");
            prepared.skipped_empty += 1;
            continue;
        }
        let answer = NormalizedText::new(&record.text).into_string();
        if !seen.insert((key.clone(), answer)) {
            debug!(record = position, "Skipping duplicate knowledge record");
            prepared.skipped_duplicate += 1;
            continue;
        }

        let id = prepared.rows.len() as u64;
        prepared.rows.push(KnowledgeRow::from_record(id, record));
        prepared.embed_texts.push(key);
    }

    prepared
}

/// Offline index build: read every record, embed, and persist the pair.
pub struct BuildIndexUseCase {
    source: Arc<dyn KnowledgeSource>,
    embedder: Arc<dyn EmbeddingProvider>,
    repo: Arc<dyn IndexRepository>,
}

impl BuildIndexUseCase {
    pub fn new(
        source: Arc<dyn KnowledgeSource>,
        embedder: Arc<dyn EmbeddingProvider>,
        repo: Arc<dyn IndexRepository>,
    ) -> Self {
        Self {
            source,
            embedder,
            repo,
        }
    }

    /// Full rebuild from the knowledge source. The previous index is replaced only on success.
    pub async fn execute(&self) -> Result<BuildReport, DomainError> {
        let records = self.source.load_records()?;
        let (index, report) = self.build(records).await?;
        self.repo.save(&index)?;
        info!(
            indexed = report.indexed,
            dimension = report.dimension,
            model = %report.model_id,
            "Knowledge index persisted"
        );
        Ok(report)
    }

    /// Build the in-memory index without persisting it.
    pub async fn build(
        &self,
        records: Vec<KnowledgeRecord>,
    ) -> Result<(KnowledgeIndex, BuildReport), DomainError> {
        let prepared = prepare(records);
        if prepared.rows.is_empty() {
            return Err(DomainError::EmptyKnowledgeBase);
        }

        info!(
            rows = prepared.rows.len(),
            skipped_empty = prepared.skipped_empty,
            skipped_duplicate = prepared.skipped_duplicate,
            "Embedding knowledge rows"
        );
        let vectors = self
            .embedder
            .embed(&prepared.embed_texts, InputType::Document)
            .await?;

        if vectors.len() != prepared.rows.len() {
            return Err(DomainError::Embedding(format!(
                "expected {} vectors, provider returned {}",
                prepared.rows.len(),
                vectors.len()
            )));
        }

        let dimension = vectors[0].len();
        if dimension == 0 {
            return Err(DomainError::Embedding(
                "provider returned empty vectors".into(),
            ));
        }
        let declared = self.embedder.dimension();
        if declared > 0 && declared != dimension {
            return Err(DomainError::DimensionMismatch {
                expected: declared,
                actual: dimension,
            });
        }

        // A zero vector sits at the same distance from every unit query.
        if let Some(position) = vectors.iter().position(|v| v.iter().all(|x| *x == 0.0)) {
            return Err(DomainError::Embedding(format!(
                "provider returned a zero vector for row {position}"
            )));
        }

        let vector_index = VectorIndex::from_vectors(
            dimension,
            prepared.rows.iter().map(|r| r.id).zip(vectors),
        )?;

        let model_id = self.embedder.model_id().to_string();
        let header = IndexHeader {
            model_id: model_id.clone(),
            dimension,
            metric: METRIC.to_string(),
            row_count: prepared.rows.len(),
            built_at: Utc::now(),
        };
        let report = BuildReport {
            indexed: prepared.rows.len(),
            skipped_empty: prepared.skipped_empty,
            skipped_duplicate: prepared.skipped_duplicate,
            dimension,
            model_id,
        };
        let index = KnowledgeIndex::new(vector_index, SideTable::new(header, prepared.rows))?;
        Ok((index, report))
    }
}

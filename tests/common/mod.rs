//! Shared test helpers.
#![allow(dead_code)]

use campus_assistant::application::answer::AnswerPolicy;
use campus_assistant::domain::entities::knowledge_index::KnowledgeIndex;
use campus_assistant::domain::entities::knowledge_row::KnowledgeRecord;
use campus_assistant::domain::error::{DomainError, FailureKind};
use campus_assistant::domain::ports::embedding_port::{EmbeddingProvider, InputType};
use campus_assistant::domain::ports::generation_port::TextGenerator;
use campus_assistant::domain::ports::index_repository::IndexRepository;
use campus_assistant::domain::ports::knowledge_source::KnowledgeSource;
use campus_assistant::domain::values::normalized_text::NormalizedText;
use campus_assistant::domain::values::trust_threshold::TrustThreshold;
use campus_assistant::CampusAssistant;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const STUB_MODEL: &str = "stub-v1";

/// Embedder with hand-picked vectors, keyed by normalised text.
/// Texts without an entry map to `fallback`.
pub struct StubEmbedder {
    vectors: HashMap<String, Vec<f32>>,
    fallback: Vec<f32>,
    pub calls: AtomicUsize,
}

impl StubEmbedder {
    pub fn new(entries: &[(&str, Vec<f32>)], fallback: Vec<f32>) -> Self {
        Self {
            vectors: entries
                .iter()
                .map(|(text, v)| (NormalizedText::new(text).into_string(), v.clone()))
                .collect(),
            fallback,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for StubEmbedder {
    async fn embed(&self, texts: &[String], _input_type: InputType) -> Result<Vec<Vec<f32>>, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(texts
            .iter()
            .map(|t| self.vectors.get(t).cloned().unwrap_or_else(|| self.fallback.clone()))
            .collect())
    }

    fn dimension(&self) -> usize {
        self.fallback.len()
    }

    fn model_id(&self) -> &str {
        STUB_MODEL
    }
}

/// Returns a fixed reply and records every prompt it was given.
pub struct EchoGenerator {
    pub reply: String,
    pub prompts: Mutex<Vec<String>>,
}

impl EchoGenerator {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl TextGenerator for EchoGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, DomainError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(self.reply.clone())
    }

    fn name(&self) -> &str {
        "echo"
    }
}

/// Fails the first `failures` calls with `kind`, then answers "recovered".
pub struct FlakyGenerator {
    pub kind: FailureKind,
    pub failures: usize,
    pub calls: AtomicUsize,
}

impl FlakyGenerator {
    pub fn new(kind: FailureKind, failures: usize) -> Self {
        Self {
            kind,
            failures,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn always(kind: FailureKind) -> Self {
        Self::new(kind, usize::MAX)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl TextGenerator for FlakyGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, DomainError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.failures {
            Err(DomainError::fallback(self.kind, format!("scripted failure #{call}")))
        } else {
            Ok("recovered".into())
        }
    }

    fn name(&self) -> &str {
        "flaky"
    }
}

/// Never answers within any reasonable timeout.
pub struct SlowGenerator(pub Duration);

#[async_trait::async_trait]
impl TextGenerator for SlowGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, DomainError> {
        tokio::time::sleep(self.0).await;
        Ok("too late".into())
    }

    fn name(&self) -> &str {
        "slow"
    }
}

/// In-memory index repository that counts loads.
#[derive(Default)]
pub struct MemoryIndexRepository {
    index: Mutex<Option<KnowledgeIndex>>,
    pub loads: AtomicUsize,
}

impl MemoryIndexRepository {
    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

impl IndexRepository for MemoryIndexRepository {
    fn save(&self, index: &KnowledgeIndex) -> Result<(), DomainError> {
        *self.index.lock().unwrap() = Some(index.clone());
        Ok(())
    }

    fn load(&self) -> Result<KnowledgeIndex, DomainError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        self.index
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| DomainError::IndexArtifactMissing(PathBuf::from("memory")))
    }
}

pub const ADMISSIONS: &str = "Admissions open in June";
pub const LIBRARY: &str = "Campus has a central library";

pub fn campus_records() -> Vec<KnowledgeRecord> {
    vec![
        KnowledgeRecord::new(ADMISSIONS).with_meta("department", "Admissions"),
        KnowledgeRecord::new(LIBRARY).with_meta("department", "General"),
    ]
}

/// Row 0 at `e1`, row 1 at `e2`; the admissions question sits next to row 0
/// and anything unknown is far from both.
pub fn campus_embedder() -> Arc<StubEmbedder> {
    Arc::new(StubEmbedder::new(
        &[
            (ADMISSIONS, vec![1.0, 0.0, 0.0]),
            (LIBRARY, vec![0.0, 1.0, 0.0]),
            ("When do admissions open?", vec![0.9, 0.1, 0.0]),
            ("Is there a library?", vec![0.2, 0.8, 0.0]),
        ],
        vec![0.0, 0.0, 1.0],
    ))
}

pub fn policy(threshold: f32) -> AnswerPolicy {
    AnswerPolicy::new(TrustThreshold::new(threshold).unwrap())
}

/// Assistant over the two-row campus store, with a built in-memory index.
pub async fn setup(generator: Option<Arc<dyn TextGenerator>>) -> (CampusAssistant, Arc<MemoryIndexRepository>) {
    setup_with(campus_records(), campus_embedder(), generator).await
}

pub async fn setup_with(
    records: Vec<KnowledgeRecord>,
    embedder: Arc<StubEmbedder>,
    generator: Option<Arc<dyn TextGenerator>>,
) -> (CampusAssistant, Arc<MemoryIndexRepository>) {
    let repo = Arc::new(MemoryIndexRepository::default());
    let source: Arc<dyn KnowledgeSource> = Arc::new(records);
    let assistant = CampusAssistant::with_providers(policy(0.5), embedder, generator, repo.clone(), source);
    assistant.build().await.unwrap();
    (assistant, repo)
}

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

use crate::application::answer::{AnswerPolicy, AnswerUseCase};
use crate::application::build_index::{BuildIndexUseCase, BuildReport};
use crate::application::retrieve::RetrieveUseCase;
use crate::config::Config;
use crate::domain::entities::answer::Answer;
use crate::domain::entities::retrieval_result::RetrievalResult;
use crate::domain::error::DomainError;
use crate::domain::ports::embedding_port::EmbeddingProvider;
use crate::domain::ports::generation_port::TextGenerator;
use crate::domain::ports::index_repository::IndexRepository;
use crate::domain::ports::knowledge_source::KnowledgeSource;
use crate::infrastructure::knowledge::csv_store::CsvKnowledgeStore;
use crate::infrastructure::sqlite::index_repo::FsIndexRepository;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::info;

/// What `info` reports about the loaded index and the answering setup.
#[derive(Debug, Clone, Serialize)]
pub struct AssistantInfo {
    pub rows: usize,
    pub dimension: usize,
    pub metric: String,
    pub index_model: String,
    pub query_model: String,
    pub built_at: DateTime<Utc>,
    pub trust_threshold: f32,
    pub top_k: usize,
    pub generator: Option<String>,
}

/// Index-dependent services, created once the index is loaded.
struct Services {
    retriever: Arc<RetrieveUseCase>,
    answerer: AnswerUseCase,
}

pub struct CampusAssistant {
    embedder: Arc<dyn EmbeddingProvider>,
    generator: Option<Arc<dyn TextGenerator>>,
    repo: Arc<dyn IndexRepository>,
    build_uc: BuildIndexUseCase,
    policy: AnswerPolicy,
    services: OnceCell<Arc<Services>>,
}

impl CampusAssistant {
    pub fn new(config: &Config) -> Result<Self, DomainError> {
        let embedder = config.embedder()?;
        let policy = config.policy_for(embedder.model_id())?;
        let generator = config.generator()?;
        let repo: Arc<dyn IndexRepository> = Arc::new(FsIndexRepository::new(&config.index_dir));
        let source: Arc<dyn KnowledgeSource> =
            Arc::new(CsvKnowledgeStore::new(&config.knowledge_path));

        info!(
            embedder = %embedder.model_id(),
            generator = generator.as_ref().map(|g| g.name()).unwrap_or("none"),
            threshold = %policy.threshold,
            index_dir = %config.index_dir.display(),
            "Campus assistant configured"
        );
        Ok(Self::with_providers(policy, embedder, generator, repo, source))
    }

    pub fn with_providers(
        policy: AnswerPolicy,
        embedder: Arc<dyn EmbeddingProvider>,
        generator: Option<Arc<dyn TextGenerator>>,
        repo: Arc<dyn IndexRepository>,
        source: Arc<dyn KnowledgeSource>,
    ) -> Self {
        Self {
            build_uc: BuildIndexUseCase::new(source, embedder.clone(), repo.clone()),
            embedder,
            generator,
            repo,
            policy,
            services: OnceCell::new(),
        }
    }

    /// Rebuild the persisted index from the knowledge source.
    ///
    /// An index already loaded by this instance keeps serving the old data;
    /// restart (or build with a fresh instance) to pick up the new one.
    pub async fn build(&self) -> Result<BuildReport, DomainError> {
        self.build_uc.execute().await
    }

    /// Load the persisted index now instead of on the first query.
    pub async fn load(&self) -> Result<(), DomainError> {
        self.services().await.map(|_| ())
    }

    async fn services(&self) -> Result<&Arc<Services>, DomainError> {
        self.services
            .get_or_try_init(|| async {
                let index = Arc::new(self.repo.load()?);
                let retriever = Arc::new(RetrieveUseCase::new(self.embedder.clone(), index));
                let answerer = AnswerUseCase::new(
                    retriever.clone(),
                    self.generator.clone(),
                    self.policy.clone(),
                );
                Ok::<_, DomainError>(Arc::new(Services {
                    retriever,
                    answerer,
                }))
            })
            .await
    }

    pub async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<RetrievalResult>, DomainError> {
        self.services().await?.retriever.retrieve(query, k).await
    }

    /// Fails only when the index cannot be loaded; every later problem degrades the answer instead.
    pub async fn answer(&self, query: &str) -> Result<Answer, DomainError> {
        Ok(self.services().await?.answerer.answer(query).await)
    }

    pub async fn info(&self) -> Result<AssistantInfo, DomainError> {
        let services = self.services().await?;
        let header = &services.retriever.index().table().header;
        Ok(AssistantInfo {
            rows: header.row_count,
            dimension: header.dimension,
            metric: header.metric.clone(),
            index_model: header.model_id.clone(),
            query_model: self.embedder.model_id().to_string(),
            built_at: header.built_at,
            trust_threshold: self.policy.threshold.value(),
            top_k: self.policy.top_k,
            generator: self.generator.as_ref().map(|g| g.name().to_string()),
        })
    }
}

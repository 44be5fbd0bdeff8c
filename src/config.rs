use crate::application::answer::AnswerPolicy;
use crate::application::prompt::Institution;
use crate::domain::error::DomainError;
use crate::domain::ports::embedding_port::EmbeddingProvider;
use crate::domain::ports::generation_port::TextGenerator;
use crate::domain::values::trust_threshold::TrustThreshold;
use crate::infrastructure::embeddings::hashing::{HashingEmbedder, DEFAULT_DIMENSION};
use crate::infrastructure::embeddings::ollama::OllamaProvider;
use crate::infrastructure::embeddings::openai::OpenAiProvider;
use crate::infrastructure::embeddings::voyage::VoyageProvider;
use crate::infrastructure::generation::gemini::GeminiGenerator;
use crate::infrastructure::generation::openai_chat::OpenAiChatGenerator;
use crate::infrastructure::generation::resilient::ResilientGenerator;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

pub const DEFAULT_KNOWLEDGE_PATH: &str = "data/college_knowledge.csv";
pub const DEFAULT_INDEX_DIR: &str = "index_store";
pub const DEFAULT_GENERATOR_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingKind {
    Hashing,
    Ollama,
    OpenAi,
    Voyage,
}

impl FromStr for EmbeddingKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hashing" => Ok(EmbeddingKind::Hashing),
            "ollama" => Ok(EmbeddingKind::Ollama),
            "openai" => Ok(EmbeddingKind::OpenAi),
            "voyage" => Ok(EmbeddingKind::Voyage),
            other => Err(DomainError::Config(format!(
                "unknown embedding provider '{other}' (expected hashing, ollama, openai or voyage)"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorKind {
    Gemini,
    OpenAi,
    None,
}

impl FromStr for GeneratorKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gemini" => Ok(GeneratorKind::Gemini),
            "openai" => Ok(GeneratorKind::OpenAi),
            "none" | "off" => Ok(GeneratorKind::None),
            other => Err(DomainError::Config(format!(
                "unknown generator '{other}' (expected gemini, openai or none)"
            ))),
        }
    }
}

/// Process configuration, read once at startup from `CAMPUS_*` environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub knowledge_path: PathBuf,
    pub index_dir: PathBuf,

    pub embedding: EmbeddingKind,
    pub embedding_model: Option<String>,
    pub embedding_api_key: Option<String>,
    pub embedding_url: Option<String>,

    pub generator: GeneratorKind,
    pub generator_model: Option<String>,
    pub generator_api_key: Option<String>,
    pub generator_url: Option<String>,
    pub generator_timeout: Duration,

    /// Explicit override of the per-model threshold table.
    pub trust_threshold: Option<TrustThreshold>,
    pub top_k: usize,
    pub context_rows: usize,
    pub max_answer_chars: usize,

    pub institution: Institution,
    /// `None` disables the greeting short-circuit.
    pub greeting_reply: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, DomainError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, DomainError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let defaults = Institution::default();
        let institution = Institution {
            name: get("CAMPUS_INSTITUTION_NAME").unwrap_or(defaults.name),
            contact: get("CAMPUS_INSTITUTION_CONTACT").unwrap_or(defaults.contact),
            website: get("CAMPUS_INSTITUTION_WEBSITE").unwrap_or(defaults.website),
        };

        let greeting_reply = match lookup("CAMPUS_GREETING_REPLY") {
            // Explicitly set but blank: greetings go through retrieval.
            Some(v) if v.trim().is_empty() => None,
            Some(v) => Some(v.trim().to_string()),
            None => Some(default_greeting(&institution)),
        };

        let trust_threshold = match get("CAMPUS_TRUST_THRESHOLD") {
            Some(raw) => {
                let value: f32 = parse("CAMPUS_TRUST_THRESHOLD", &raw)?;
                Some(TrustThreshold::new(value).map_err(DomainError::Config)?)
            }
            None => None,
        };

        let config = Config {
            knowledge_path: get("CAMPUS_KNOWLEDGE_PATH")
                .unwrap_or_else(|| DEFAULT_KNOWLEDGE_PATH.into())
                .into(),
            index_dir: get("CAMPUS_INDEX_DIR")
                .unwrap_or_else(|| DEFAULT_INDEX_DIR.into())
                .into(),
            embedding: get("CAMPUS_EMBEDDING_PROVIDER")
                .map(|v| v.parse())
                .transpose()?
                .unwrap_or(EmbeddingKind::Hashing),
            embedding_model: get("CAMPUS_EMBEDDING_MODEL"),
            embedding_api_key: get("CAMPUS_EMBEDDING_API_KEY"),
            embedding_url: get("CAMPUS_EMBEDDING_URL"),
            generator: get("CAMPUS_GENERATOR")
                .map(|v| v.parse())
                .transpose()?
                .unwrap_or(GeneratorKind::Gemini),
            generator_model: get("CAMPUS_GENERATOR_MODEL"),
            generator_api_key: get("CAMPUS_GENERATOR_API_KEY").or_else(|| get("GEMINI_API_KEY")),
            generator_url: get("CAMPUS_GENERATOR_URL"),
            generator_timeout: Duration::from_secs(
                get("CAMPUS_GENERATOR_TIMEOUT_SECS")
                    .map(|v| parse("CAMPUS_GENERATOR_TIMEOUT_SECS", &v))
                    .transpose()?
                    .unwrap_or(DEFAULT_GENERATOR_TIMEOUT_SECS),
            ),
            trust_threshold,
            top_k: positive(&get, "CAMPUS_TOP_K", 3)?,
            context_rows: positive(&get, "CAMPUS_CONTEXT_ROWS", 3)?,
            max_answer_chars: positive(&get, "CAMPUS_MAX_ANSWER_CHARS", 300)?,
            institution,
            greeting_reply,
        };
        Ok(config)
    }

    pub fn embedder(&self) -> Result<Arc<dyn EmbeddingProvider>, DomainError> {
        let provider: Arc<dyn EmbeddingProvider> = match self.embedding {
            EmbeddingKind::Hashing => Arc::new(HashingEmbedder::new(DEFAULT_DIMENSION)),
            EmbeddingKind::Ollama => Arc::new(OllamaProvider::new(
                self.embedding_url.clone(),
                self.embedding_model.clone(),
            )?),
            EmbeddingKind::OpenAi => Arc::new(OpenAiProvider::new(
                self.require_embedding_key("openai")?,
                self.embedding_model.clone(),
                self.embedding_url.clone(),
            )?),
            EmbeddingKind::Voyage => Arc::new(VoyageProvider::new(
                self.require_embedding_key("voyage")?,
                self.embedding_model.clone(),
                self.embedding_url.clone(),
            )?),
        };
        Ok(provider)
    }

    fn require_embedding_key(&self, provider: &str) -> Result<String, DomainError> {
        self.embedding_api_key.clone().ok_or_else(|| {
            DomainError::Config(format!(
                "CAMPUS_EMBEDDING_API_KEY is required for the {provider} embedding provider"
            ))
        })
    }

    /// The fallback generator, wrapped with timeout and retry. `None` when
    /// disabled or unconfigured; that only turns off the fallback path.
    pub fn generator(&self) -> Result<Option<Arc<dyn TextGenerator>>, DomainError> {
        let inner: Arc<dyn TextGenerator> = match (self.generator, &self.generator_api_key) {
            (GeneratorKind::None, _) => return Ok(None),
            (GeneratorKind::Gemini, Some(key)) => Arc::new(GeminiGenerator::new(
                key.clone(),
                self.generator_model.clone(),
                self.generator_url.clone(),
                self.generator_timeout,
            )?),
            // Self-hosted OpenAI-compatible servers often need no key.
            (GeneratorKind::OpenAi, key) if key.is_some() || self.generator_url.is_some() => {
                Arc::new(OpenAiChatGenerator::new(
                    key.clone().unwrap_or_default(),
                    self.generator_model.clone(),
                    self.generator_url.clone(),
                    self.generator_timeout,
                )?)
            }
            (kind, _) => {
                warn!(?kind, "No generator API key configured; fallback answers are disabled");
                return Ok(None);
            }
        };
        Ok(Some(Arc::new(ResilientGenerator::new(inner, self.generator_timeout))))
    }

    /// Explicit override, else the tuned value for `model_id`. Unknown models are an error.
    pub fn threshold_for(&self, model_id: &str) -> Result<TrustThreshold, DomainError> {
        self.trust_threshold
            .or_else(|| TrustThreshold::for_model(model_id))
            .ok_or_else(|| {
                DomainError::Config(format!(
                    "no tuned trust threshold for embedding model '{model_id}'; set CAMPUS_TRUST_THRESHOLD"
                ))
            })
    }

    pub fn policy_for(&self, model_id: &str) -> Result<AnswerPolicy, DomainError> {
        let mut policy = AnswerPolicy::new(self.threshold_for(model_id)?);
        policy.top_k = self.top_k;
        policy.context_rows = self.context_rows;
        policy.max_answer_chars = self.max_answer_chars;
        policy.institution = self.institution.clone();
        policy.greeting_reply = self.greeting_reply.clone();
        Ok(policy)
    }
}

fn default_greeting(institution: &Institution) -> String {
    format!(
        "Hi! I'm the {} assistant. How can I help you today?",
        institution.name
    )
}

fn parse<T: FromStr>(key: &str, raw: &str) -> Result<T, DomainError>
where
    T::Err: std::fmt::Display,
{
    raw.parse()
        .map_err(|e| DomainError::Config(format!("{key}={raw}: {e}")))
}

fn positive(
    get: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: usize,
) -> Result<usize, DomainError> {
    match get(key) {
        None => Ok(default),
        Some(raw) => match parse::<usize>(key, &raw)? {
            0 => Err(DomainError::Config(format!("{key} must be greater than zero"))),
            n => Ok(n),
        },
    }
}

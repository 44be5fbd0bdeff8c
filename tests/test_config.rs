use campus_assistant::config::{Config, EmbeddingKind, GeneratorKind};
use campus_assistant::domain::error::DomainError;
use campus_assistant::domain::ports::embedding_port::EmbeddingProvider;
use campus_assistant::domain::ports::generation_port::TextGenerator;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

fn config(vars: &[(&str, &str)]) -> Result<Config, DomainError> {
    let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    Config::from_lookup(|key| vars.get(key).cloned())
}

#[test]
fn test_defaults() {
    let config = config(&[]).unwrap();

    assert_eq!(config.knowledge_path, PathBuf::from("data/college_knowledge.csv"));
    assert_eq!(config.index_dir, PathBuf::from("index_store"));
    assert_eq!(config.embedding, EmbeddingKind::Hashing);
    assert_eq!(config.generator, GeneratorKind::Gemini);
    assert_eq!(config.generator_timeout, Duration::from_secs(15));
    assert_eq!(config.top_k, 3);
    assert_eq!(config.max_answer_chars, 300);
    assert!(config.trust_threshold.is_none());
    assert!(config.greeting_reply.as_deref().unwrap().contains("Siliguri Institute of Technology"));
}

#[test]
fn test_overrides() {
    let config = config(&[
        ("CAMPUS_INDEX_DIR", "/tmp/idx"),
        ("CAMPUS_EMBEDDING_PROVIDER", "Ollama"),
        ("CAMPUS_EMBEDDING_MODEL", "nomic-embed-text"),
        ("CAMPUS_TOP_K", "5"),
        ("CAMPUS_INSTITUTION_NAME", "Example College"),
        ("CAMPUS_GREETING_REPLY", ""),
        ("CAMPUS_GENERATOR_TIMEOUT_SECS", "3"),
    ])
    .unwrap();

    assert_eq!(config.index_dir, PathBuf::from("/tmp/idx"));
    assert_eq!(config.embedding, EmbeddingKind::Ollama);
    assert_eq!(config.top_k, 5);
    assert_eq!(config.institution.name, "Example College");
    assert!(config.greeting_reply.is_none());
    assert_eq!(config.generator_timeout, Duration::from_secs(3));

    let embedder = config.embedder().unwrap();
    assert_eq!(embedder.model_id(), "nomic-embed-text");
    assert_eq!(config.threshold_for(embedder.model_id()).unwrap().value(), 0.6);
}

#[test]
fn test_invalid_values_are_rejected() {
    assert!(matches!(config(&[("CAMPUS_TOP_K", "0")]), Err(DomainError::Config(_))));
    assert!(matches!(config(&[("CAMPUS_TOP_K", "three")]), Err(DomainError::Config(_))));
    assert!(matches!(config(&[("CAMPUS_EMBEDDING_PROVIDER", "bert")]), Err(DomainError::Config(_))));
    assert!(matches!(config(&[("CAMPUS_GENERATOR", "claude")]), Err(DomainError::Config(_))));
    assert!(matches!(config(&[("CAMPUS_TRUST_THRESHOLD", "-1")]), Err(DomainError::Config(_))));
}

#[test]
fn test_unknown_model_needs_explicit_threshold() {
    let config_without = config(&[]).unwrap();
    assert!(matches!(config_without.threshold_for("my-custom-model"), Err(DomainError::Config(_))));
    assert_eq!(config_without.threshold_for("hashing-v2").unwrap().value(), 0.9);

    let config_with = config(&[("CAMPUS_TRUST_THRESHOLD", "0.42")]).unwrap();
    assert_eq!(config_with.threshold_for("my-custom-model").unwrap().value(), 0.42);
    // An explicit value also overrides the tuned table.
    assert_eq!(config_with.threshold_for("hashing-v2").unwrap().value(), 0.42);
}

#[test]
fn test_remote_embedders_need_a_key() {
    let config = config(&[("CAMPUS_EMBEDDING_PROVIDER", "voyage")]).unwrap();
    assert!(matches!(config.embedder(), Err(DomainError::Config(_))));
}

#[test]
fn test_generator_wiring() {
    assert!(config(&[]).unwrap().generator().unwrap().is_none());
    assert!(config(&[("GEMINI_API_KEY", "k")]).unwrap().generator().unwrap().is_some());
    assert!(config(&[("CAMPUS_GENERATOR", "none"), ("GEMINI_API_KEY", "k")])
        .unwrap()
        .generator()
        .unwrap()
        .is_none());
    assert!(config(&[("CAMPUS_GENERATOR", "openai"), ("CAMPUS_GENERATOR_URL", "http://localhost:8080/v1")])
        .unwrap()
        .generator()
        .unwrap()
        .is_some());

    let generator = config(&[("CAMPUS_GENERATOR_API_KEY", "k")]).unwrap().generator().unwrap().unwrap();
    assert_eq!(generator.name(), "gemini");
}

#[test]
fn test_policy_carries_settings() {
    let config = config(&[
        ("CAMPUS_CONTEXT_ROWS", "2"),
        ("CAMPUS_MAX_ANSWER_CHARS", "120"),
        ("CAMPUS_INSTITUTION_CONTACT", "help@example.edu"),
    ])
    .unwrap();

    let policy = config.policy_for("hashing-v2").unwrap();
    assert_eq!(policy.context_rows, 2);
    assert_eq!(policy.max_answer_chars, 120);
    assert_eq!(policy.institution.cannot_answer(), "Please contact: help@example.edu");
}

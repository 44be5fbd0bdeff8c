pub mod embedding_port;
pub mod generation_port;
pub mod index_repository;
pub mod knowledge_source;

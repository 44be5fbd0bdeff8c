pub mod index_repo;
pub mod migrations;
pub mod vector_store;

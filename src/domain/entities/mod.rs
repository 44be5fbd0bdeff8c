pub mod answer;
pub mod knowledge_index;
pub mod knowledge_row;
pub mod retrieval_result;
pub mod side_table;
pub mod vector_index;

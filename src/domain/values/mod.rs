pub mod normalized_text;
pub mod trust_threshold;

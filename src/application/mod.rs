pub mod answer;
pub mod build_index;
pub mod prompt;
pub mod retrieve;

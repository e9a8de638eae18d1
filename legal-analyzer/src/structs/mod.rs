pub mod analyzer_config;
pub mod compliance;
pub mod score;
pub mod text_analysis;

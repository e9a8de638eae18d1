pub mod analyzer_error;

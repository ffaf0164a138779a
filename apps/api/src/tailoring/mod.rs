pub mod advisor;
pub mod assembler;
pub mod content_selector;
pub mod engine;
pub mod error;
pub mod fitting_level;
pub mod gap_classifier;
pub mod handlers;
pub mod prompts;
pub mod relevance;
pub mod validation;
pub mod wording;

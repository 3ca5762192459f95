//! Text processing and analysis module

pub mod text_processor;
pub mod skills;
pub mod tfidf;
pub mod embeddings;
pub mod similarity;
pub mod embedding_manager;
pub mod ats_matcher;
pub mod scaledown;
pub mod analyzer;

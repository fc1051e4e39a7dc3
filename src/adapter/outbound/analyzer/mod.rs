//! Posting analysis adapters.
//!
//! Implements `port::PostingAnalyzer` using an LLM backend.

mod llm;

pub use llm::LlmAnalyzer;

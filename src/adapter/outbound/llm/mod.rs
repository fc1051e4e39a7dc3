//! LLM adapter modules.
//!
//! Provides an implementation of the [`Llm`](crate::port::Llm) trait for
//! the OpenAI chat completions API.

mod openai;

pub use openai::{OpenAi, DEFAULT_MODEL, OPENAI_API_KEY};

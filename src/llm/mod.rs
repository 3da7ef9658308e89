//! LLM integration: chat completion client and prompt templates

pub mod client;
pub mod prompts;

pub use client::GenerationParams;
pub use client::LlmService;
pub use prompts::MbtiPrompts;
pub use prompts::PromptTemplate;

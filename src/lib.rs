pub mod cli;
pub mod config;
pub mod distinctiveness;
pub mod errors;
pub mod llm;
pub mod logging;
pub mod models;
pub mod personality;
pub mod sentiment;
pub mod transcript;

#[cfg(test)]
mod errors_tests;

pub use config::AppConfig;
pub use distinctiveness::compute_word_ratios;
pub use distinctiveness::DistinctivenessReport;
pub use errors::*;
pub use models::ChunkRange;
pub use models::Message;
pub use models::MessageStore;
pub use personality::MbtiPipeline;
pub use personality::MbtiReport;
pub use sentiment::SentimentLexicon;
pub use transcript::read_transcript;
pub use transcript::ChatDialect;

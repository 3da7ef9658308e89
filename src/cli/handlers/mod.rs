//! CLI command handlers module
//!
//! This module is organized by functional domains:
//! - mbti: Personality inference
//! - words: Word distinctiveness
//! - sentiment: Weekly lexicon sentiment
//! - info: Information display (stats, config)

pub mod info;
pub mod mbti;
pub mod sentiment;
pub mod words;

// Re-export all public handlers
pub use info::*;
pub use mbti::*;
pub use sentiment::*;
pub use words::*;

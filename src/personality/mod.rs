//! Personality analysis - MBTI inference from chat transcripts
//!
//! A transcript is cut into balanced chunks, each chunk is labeled by an
//! external classifier, and the per-chunk votes are reduced to one type per
//! participant with a binomial significance check on every axis.

pub mod aggregator;
pub mod cache;
pub mod chunker;
pub mod classifier;
pub mod dispatcher;
pub mod mbti;
pub mod pipeline;
pub mod significance;
pub mod votes;

pub use aggregator::reduce;
pub use aggregator::FinalLabel;
pub use aggregator::VoteAggregator;
pub use cache::cache_path_for;
pub use cache::ChunkCache;
pub use chunker::AdaptiveChunker;
pub use classifier::ChunkClassifier;
pub use classifier::ClassificationRequest;
pub use classifier::LlmClassifier;
pub use dispatcher::ChunkDispatcher;
pub use dispatcher::ChunkOutcome;
pub use dispatcher::DispatchOutcome;
pub use mbti::normalize_type;
pub use mbti::Axis;
pub use mbti::LetterTally;
pub use pipeline::MbtiPipeline;
pub use pipeline::MbtiReport;
pub use pipeline::PipelineOptions;
pub use pipeline::Prediction;
pub use votes::ChunkResponse;
pub use votes::Vote;

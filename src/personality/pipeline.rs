//! End-to-end MBTI inference over a message store

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use futures::future::join_all;
use serde::Deserialize;
use serde::Serialize;
use tracing::info;
use tracing::warn;

use super::aggregator::VoteAggregator;
use super::cache::ChunkCache;
use super::chunker::AdaptiveChunker;
use super::classifier::ChunkClassifier;
use super::dispatcher::ChunkDispatcher;
use super::mbti::traits_for_type;
use super::mbti::Axis;
use super::mbti::LetterTally;
use crate::config::AppConfig;
use crate::models::MessageStore;
use crate::Result;

/// Shown when a description could not be generated
pub const DESCRIPTION_FALLBACK: &str = "Unable to generate description.";

/// Tunables for one pipeline run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineOptions {
    pub target_chunk_count: usize,
    pub min_messages_per_participant: usize,
    pub significance_alpha: f64,
    pub cache_checkpoint_every: usize,
    pub describe: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

impl PipelineOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            target_chunk_count: config.target_chunk_count(),
            min_messages_per_participant: config.min_messages_per_participant(),
            significance_alpha: config.significance_alpha(),
            cache_checkpoint_every: config.analysis.cache_checkpoint_every,
            describe: false,
        }
    }
}

/// Final prediction for one participant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: String,
    pub letter_counts: LetterTally,
    /// Raw per-chunk labels behind the final one
    pub votes: Vec<String>,
    pub uncertain_axes: Vec<Axis>,
    pub traits: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Prediction {
    pub fn is_uncertain(&self, axis: Axis) -> bool {
        self.uncertain_axes.contains(&axis)
    }
}

/// Outcome of a full run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MbtiReport {
    pub predictions: BTreeMap<String, Prediction>,
    /// Roster members that received no usable vote
    pub unlabeled: Vec<String>,
    pub message_counts: BTreeMap<String, usize>,
    pub total_messages: usize,
    pub chunk_count: usize,
    pub cache_hits: usize,
    pub fetched: usize,
    pub failed_chunks: usize,
    pub dropped_votes: usize,
}

impl MbtiReport {
    /// No participant received a label
    pub fn is_empty(&self) -> bool {
        self.predictions.is_empty()
    }
}

/// Chunk, classify, aggregate and reduce
pub struct MbtiPipeline<C: ChunkClassifier> {
    classifier: C,
    options: PipelineOptions,
}

impl<C: ChunkClassifier> MbtiPipeline<C> {
    pub const fn new(classifier: C, options: PipelineOptions) -> Self {
        Self {
            classifier,
            options,
        }
    }

    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    pub const fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Run over `store`, reading and updating `cache`
    ///
    /// # Errors
    /// Only cache persistence failures; classifier failures reduce the vote
    /// count instead.
    pub async fn run(&self, store: &MessageStore, cache: &mut ChunkCache) -> Result<MbtiReport> {
        let chunker = AdaptiveChunker::new(
            self.options.target_chunk_count,
            self.options.min_messages_per_participant,
        );
        let chunks = chunker.chunk(store);
        info!(
            "Split {} messages into {} chunks",
            store.len(),
            chunks.len()
        );

        let dispatch = ChunkDispatcher::new(&self.classifier)
            .with_checkpoint_every(self.options.cache_checkpoint_every)
            .dispatch(store, &chunks, cache)
            .await?;

        let mut aggregator = VoteAggregator::new(store.participants());
        for response in dispatch.responses() {
            aggregator.add_response(response);
        }

        let labels = aggregator.finish(self.options.significance_alpha);
        let mut predictions: BTreeMap<String, Prediction> = labels
            .into_iter()
            .filter_map(|(participant, label)| {
                let tally = aggregator.tally(&participant)?;
                let prediction = Prediction {
                    traits: traits_for_type(&label.label),
                    label: label.label,
                    letter_counts: tally.letters,
                    votes: tally.labels.clone(),
                    uncertain_axes: label.uncertain_axes,
                    description: None,
                };
                Some((participant, prediction))
            })
            .collect();

        if self.options.describe && !predictions.is_empty() {
            self.attach_descriptions(&mut predictions).await;
        }

        let report = MbtiReport {
            unlabeled: aggregator.unlabeled(),
            dropped_votes: aggregator.dropped_votes(),
            predictions,
            message_counts: store.message_counts(),
            total_messages: store.len(),
            chunk_count: chunks.len(),
            cache_hits: dispatch.cache_hits,
            fetched: dispatch.fetched,
            failed_chunks: dispatch.failed,
        };

        if report.is_empty() {
            warn!("No predictions were made");
        } else {
            info!(
                "Labeled {} of {} participants",
                report.predictions.len(),
                report.predictions.len() + report.unlabeled.len()
            );
        }
        Ok(report)
    }

    /// One description request per distinct type
    async fn attach_descriptions(&self, predictions: &mut BTreeMap<String, Prediction>) {
        let types: BTreeSet<String> = predictions.values().map(|p| p.label.clone()).collect();
        let described = join_all(types.into_iter().map(|mbti_type| async move {
            let text = match self.classifier.describe(&mbti_type).await {
                Ok(Some(text)) => text,
                Ok(None) => DESCRIPTION_FALLBACK.to_string(),
                Err(e) => {
                    warn!("Failed to describe {}: {}", mbti_type, e);
                    DESCRIPTION_FALLBACK.to_string()
                }
            };
            (mbti_type, text)
        }))
        .await;
        let described: BTreeMap<String, String> = described.into_iter().collect();

        for prediction in predictions.values_mut() {
            prediction.description = described.get(&prediction.label).cloned();
        }
    }
}

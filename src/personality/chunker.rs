//! Adaptive chunking of a message store
//!
//! Chunks start at a uniform size and grow one message at a time until every
//! participant seen in the chunk has enough messages to be judged, bounded by
//! one extra initial-size worth of messages.

use std::collections::HashMap;

use tracing::debug;

use crate::models::ChunkRange;
use crate::models::MessageStore;

/// Splits a [`MessageStore`] into contiguous, exhaustive chunks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdaptiveChunker {
    pub target_chunk_count: usize,
    pub min_messages_per_participant: usize,
}

impl Default for AdaptiveChunker {
    fn default() -> Self {
        Self {
            target_chunk_count: crate::config::default_target_chunk_count(),
            min_messages_per_participant: crate::config::default_min_messages_per_participant(),
        }
    }
}

impl AdaptiveChunker {
    pub fn new(target_chunk_count: usize, min_messages_per_participant: usize) -> Self {
        Self {
            target_chunk_count,
            min_messages_per_participant,
        }
    }

    /// `max(ceil(total / target), 2 * min)`, never below 1
    pub fn initial_chunk_size(&self, total_messages: usize) -> usize {
        let target = self.target_chunk_count.max(1);
        total_messages
            .div_ceil(target)
            .max(2 * self.min_messages_per_participant)
            .max(1)
    }

    /// Partition `store` into chunk ranges, left to right
    pub fn chunk(&self, store: &MessageStore) -> Vec<ChunkRange> {
        let total = store.len();
        if total == 0 {
            return Vec::new();
        }

        let size = self.initial_chunk_size(total);
        let mut chunks = Vec::with_capacity(total.div_ceil(size));
        let mut start = 0;

        while start < total {
            let mut end = (start + size).min(total);
            let mut counts: HashMap<&str, usize> = HashMap::new();
            for message in store.slice(ChunkRange::new(start, end)) {
                *counts.entry(message.participant.as_str()).or_insert(0) += 1;
            }

            let budget = size.min(total - end);
            let mut extended = 0;
            while extended < budget && !self.is_balanced(&counts) {
                if let Some(message) = store.get(end) {
                    *counts.entry(message.participant.as_str()).or_insert(0) += 1;
                }
                end += 1;
                extended += 1;
            }

            if extended > 0 {
                debug!(start, end, extended, "Extended chunk to balance participants");
            }
            chunks.push(ChunkRange::new(start, end));
            start = end;
        }

        debug!(
            total_messages = total,
            initial_size = size,
            chunks = chunks.len(),
            "Chunked message store"
        );
        chunks
    }

    fn is_balanced(&self, counts: &HashMap<&str, usize>) -> bool {
        counts
            .values()
            .all(|count| *count >= self.min_messages_per_participant)
    }
}

//! Cache-aware concurrent chunk dispatch
//!
//! Cache hits are answered synchronously. Every miss is issued at once and
//! awaited as results arrive; successful responses are inserted into the
//! cache, failures become error sentinels that the aggregator skips.

use std::collections::BTreeMap;

use futures::stream::FuturesUnordered;
use futures::StreamExt;
use tracing::debug;
use tracing::info;
use tracing::warn;

use super::cache::ChunkCache;
use super::classifier::ChunkClassifier;
use super::classifier::ClassificationRequest;
use super::votes::ChunkResponse;
use crate::models::ChunkRange;
use crate::models::MessageStore;
use crate::Result;

/// Prefix of every error sentinel
pub const ERROR_SENTINEL_PREFIX: &str = "API Error: ";

/// Result for one chunk in one run
#[derive(Debug, Clone, PartialEq)]
pub enum ChunkOutcome {
    Labels(ChunkResponse),
    /// Error sentinel, never cached
    Failed(String),
}

impl ChunkOutcome {
    pub fn response(&self) -> Option<&ChunkResponse> {
        match self {
            ChunkOutcome::Labels(response) => Some(response),
            ChunkOutcome::Failed(_) => None,
        }
    }
}

/// Every chunk's outcome, keyed by chunk, plus run counters
#[derive(Debug, Clone, Default)]
pub struct DispatchOutcome {
    pub results: BTreeMap<ChunkRange, ChunkOutcome>,
    pub cache_hits: usize,
    pub fetched: usize,
    pub failed: usize,
}

impl DispatchOutcome {
    pub fn responses(&self) -> impl Iterator<Item = &ChunkResponse> {
        self.results.values().filter_map(ChunkOutcome::response)
    }
}

/// Maps chunks to classifier responses through a [`ChunkCache`]
pub struct ChunkDispatcher<'a, C: ChunkClassifier + ?Sized> {
    classifier: &'a C,
    checkpoint_every: usize,
}

impl<'a, C: ChunkClassifier + ?Sized> ChunkDispatcher<'a, C> {
    pub const fn new(classifier: &'a C) -> Self {
        Self {
            classifier,
            checkpoint_every: 0,
        }
    }

    /// Also persist the cache after every `every` fresh results; 0 disables
    #[must_use]
    pub const fn with_checkpoint_every(mut self, every: usize) -> Self {
        self.checkpoint_every = every;
        self
    }

    /// Resolve every chunk, then write the cache back once
    ///
    /// Classifier failures are contained per chunk. Only cache I/O errors
    /// abort the run.
    pub async fn dispatch(
        &self,
        store: &MessageStore,
        chunks: &[ChunkRange],
        cache: &mut ChunkCache,
    ) -> Result<DispatchOutcome> {
        let mut outcome = DispatchOutcome::default();
        let mut pending = FuturesUnordered::new();

        for &range in chunks {
            if let Some(cached) = cache.get(range) {
                debug!(chunk = %range, "Cache hit");
                outcome.cache_hits += 1;
                outcome
                    .results
                    .insert(range, ChunkOutcome::Labels(cached.clone()));
                continue;
            }

            let request = ClassificationRequest::new(range, store.slice(range));
            let classifier = self.classifier;
            pending.push(async move {
                let result = classifier.classify(&request).await;
                (request.range, result)
            });
        }

        let to_fetch = pending.len();
        if to_fetch > 0 {
            info!(
                "Classifying {} chunks with {} ({} cached)",
                to_fetch,
                self.classifier.name(),
                outcome.cache_hits
            );
        }

        let mut completed = 0;
        while let Some((range, result)) = pending.next().await {
            completed += 1;
            match result {
                Ok(response) => {
                    cache.insert(range, response.clone());
                    outcome.results.insert(range, ChunkOutcome::Labels(response));
                    outcome.fetched += 1;

                    if self.checkpoint_every > 0 && outcome.fetched % self.checkpoint_every == 0 {
                        cache.persist()?;
                    }
                }
                Err(e) => {
                    warn!(chunk = %range, "Chunk classification failed: {}", e);
                    outcome.results.insert(
                        range,
                        ChunkOutcome::Failed(format!("{ERROR_SENTINEL_PREFIX}{e}")),
                    );
                    outcome.failed += 1;
                }
            }
            debug!("Classified {}/{} chunks", completed, to_fetch);
        }

        if cache.is_dirty() {
            cache.persist()?;
        }

        info!(
            "Dispatch finished: {} chunks, {} cached, {} fetched, {} failed",
            chunks.len(),
            outcome.cache_hits,
            outcome.fetched,
            outcome.failed
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering;

    use async_trait::async_trait;
    use chrono::NaiveDate;

    use super::*;
    use crate::models::Message;
    use crate::ChatLensError;

    struct EchoClassifier {
        calls: AtomicUsize,
        fail_on: Option<ChunkRange>,
    }

    #[async_trait]
    impl ChunkClassifier for EchoClassifier {
        async fn classify(&self, request: &ClassificationRequest) -> Result<ChunkResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_on == Some(request.range) {
                return Err(ChatLensError::Llm("timeout".to_string()));
            }
            let who = &request.messages[0].participant;
            Ok(ChunkResponse::FreeText(format!("{who}: INTJ")))
        }

        fn name(&self) -> &str {
            "echo"
        }
    }

    fn store(n: usize) -> MessageStore {
        let ts = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        (0..n)
            .map(|i| Message::new(if i % 2 == 0 { "A" } else { "B" }, "hey", ts))
            .collect::<Vec<_>>()
            .into()
    }

    #[tokio::test]
    async fn test_failures_are_sentinels_and_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = ChunkCache::load(dir.path().join("c.json")).unwrap();
        let classifier = EchoClassifier {
            calls: AtomicUsize::new(0),
            fail_on: Some(ChunkRange::new(6, 12)),
        };
        let chunks = [ChunkRange::new(0, 6), ChunkRange::new(6, 12)];

        let outcome = ChunkDispatcher::new(&classifier)
            .dispatch(&store(12), &chunks, &mut cache)
            .await
            .unwrap();

        assert_eq!(outcome.fetched, 1);
        assert_eq!(outcome.failed, 1);
        match &outcome.results[&chunks[1]] {
            ChunkOutcome::Failed(msg) => assert!(msg.starts_with(ERROR_SENTINEL_PREFIX)),
            other => panic!("expected failure, got {other:?}"),
        }
        assert!(cache.contains(chunks[0]));
        assert!(!cache.contains(chunks[1]));
        assert_eq!(outcome.responses().count(), 1);
    }

    #[tokio::test]
    async fn test_cached_chunks_skip_the_classifier() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("c.json");
        let classifier = EchoClassifier {
            calls: AtomicUsize::new(0),
            fail_on: None,
        };
        let chunks = [ChunkRange::new(0, 6), ChunkRange::new(6, 12)];

        let mut cache = ChunkCache::load(&path).unwrap();
        ChunkDispatcher::new(&classifier)
            .dispatch(&store(12), &chunks, &mut cache)
            .await
            .unwrap();
        assert_eq!(classifier.calls.load(Ordering::SeqCst), 2);

        let mut reloaded = ChunkCache::load(&path).unwrap();
        let outcome = ChunkDispatcher::new(&classifier)
            .dispatch(&store(12), &chunks, &mut reloaded)
            .await
            .unwrap();
        assert_eq!(classifier.calls.load(Ordering::SeqCst), 2);
        assert_eq!(outcome.cache_hits, 2);
        assert_eq!(outcome.fetched, 0);
    }

    #[tokio::test]
    async fn test_checkpoint_writes_before_the_end() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("c.json");
        let mut cache = ChunkCache::load(&path).unwrap();
        let classifier = EchoClassifier {
            calls: AtomicUsize::new(0),
            fail_on: None,
        };
        let chunks = [ChunkRange::new(0, 2), ChunkRange::new(2, 4), ChunkRange::new(4, 6)];

        ChunkDispatcher::new(&classifier)
            .with_checkpoint_every(1)
            .dispatch(&store(6), &chunks, &mut cache)
            .await
            .unwrap();

        assert!(!cache.is_dirty());
        assert_eq!(ChunkCache::load(&path).unwrap().len(), 3);
    }

    /// Holds every call at a barrier sized to the number of misses
    struct RendezvousClassifier {
        barrier: tokio::sync::Barrier,
    }

    #[async_trait]
    impl ChunkClassifier for RendezvousClassifier {
        async fn classify(&self, request: &ClassificationRequest) -> Result<ChunkResponse> {
            self.barrier.wait().await;
            let who = &request.messages[0].participant;
            Ok(ChunkResponse::FreeText(format!("{who}: ENFP")))
        }

        fn name(&self) -> &str {
            "rendezvous"
        }
    }

    #[tokio::test]
    async fn test_misses_are_classified_concurrently() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = ChunkCache::load(dir.path().join("c.json")).unwrap();
        cache.insert(
            ChunkRange::new(0, 2),
            ChunkResponse::FreeText("A: INTJ".to_string()),
        );
        let chunks = [
            ChunkRange::new(0, 2),
            ChunkRange::new(2, 4),
            ChunkRange::new(4, 6),
            ChunkRange::new(6, 8),
        ];
        // three misses; a sequential dispatcher would park on the first call forever
        let classifier = RendezvousClassifier {
            barrier: tokio::sync::Barrier::new(3),
        };

        let outcome = tokio::time::timeout(
            std::time::Duration::from_secs(5),
            ChunkDispatcher::new(&classifier).dispatch(&store(8), &chunks, &mut cache),
        )
        .await
        .expect("dispatch should not serialize classifier calls")
        .unwrap();

        assert_eq!(outcome.cache_hits, 1);
        assert_eq!(outcome.fetched, 3);
        assert_eq!(outcome.failed, 0);
    }
}

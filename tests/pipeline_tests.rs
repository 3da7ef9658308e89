//! Integration tests for the MBTI pipeline
//!
//! A scripted classifier stands in for the LLM so chunking, caching,
//! aggregation and reduction can be checked end to end.

use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use async_trait::async_trait;
use chatlens::models::Message;
use chatlens::personality::Axis;
use chatlens::personality::ChunkCache;
use chatlens::personality::ChunkClassifier;
use chatlens::personality::ChunkResponse;
use chatlens::personality::ClassificationRequest;
use chatlens::personality::MbtiPipeline;
use chatlens::personality::PipelineOptions;
use chatlens::ChatLensError;
use chatlens::MessageStore;
use chatlens::Result;
use chrono::NaiveDate;
use serde_json::Map;
use serde_json::Value;

/// Labels every participant in a chunk with a fixed type
struct ScriptedClassifier {
    calls: AtomicUsize,
    /// Fail chunks whose start index is a multiple of this
    fail_every_start: Option<usize>,
    labels: Vec<(&'static str, &'static str)>,
    structured: bool,
}

impl ScriptedClassifier {
    fn new(labels: Vec<(&'static str, &'static str)>) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail_every_start: None,
            labels,
            structured: true,
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChunkClassifier for ScriptedClassifier {
    async fn classify(&self, request: &ClassificationRequest) -> Result<ChunkResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(every) = self.fail_every_start {
            if request.range.start % every == 0 {
                return Err(ChatLensError::Llm("503 Service Unavailable".to_string()));
            }
        }

        let present: Vec<&(&str, &str)> = self
            .labels
            .iter()
            .filter(|(who, _)| request.messages.iter().any(|m| m.participant == *who))
            .collect();

        if self.structured {
            let map: Map<String, Value> = present
                .iter()
                .map(|(who, label)| (who.to_string(), Value::String(label.to_string())))
                .collect();
            Ok(ChunkResponse::Structured(map))
        } else {
            let text = present
                .iter()
                .map(|(who, label)| format!("{who}: {label}"))
                .collect::<Vec<_>>()
                .join("\n");
            Ok(ChunkResponse::FreeText(text))
        }
    }

    async fn describe(&self, mbti_type: &str) -> Result<Option<String>> {
        if mbti_type == "INTJ" {
            Ok(Some("Plans everything.".to_string()))
        } else {
            Err(ChatLensError::Llm("rate limited".to_string()))
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Alternates labels per chunk so every axis ends in a tie
struct AlternatingClassifier;

#[async_trait]
impl ChunkClassifier for AlternatingClassifier {
    async fn classify(&self, request: &ClassificationRequest) -> Result<ChunkResponse> {
        let label = if (request.range.start / 6) % 2 == 0 {
            "ENTJ"
        } else {
            "ISFP"
        };
        Ok(ChunkResponse::FreeText(format!("A: {label}\nB: {label}")))
    }

    fn name(&self) -> &str {
        "alternating"
    }
}

fn alternating_store(n: usize) -> MessageStore {
    let start = NaiveDate::from_ymd_opt(2024, 7, 29)
        .unwrap()
        .and_hms_opt(9, 0, 0)
        .unwrap();
    (0..n)
        .map(|i| {
            let who = if i % 2 == 0 { "A" } else { "B" };
            Message::new(
                who,
                format!("message number {i}"),
                start + chrono::Duration::minutes(i as i64),
            )
        })
        .collect::<Vec<_>>()
        .into()
}

fn options() -> PipelineOptions {
    PipelineOptions {
        target_chunk_count: 100,
        min_messages_per_participant: 3,
        significance_alpha: 0.05,
        cache_checkpoint_every: 0,
        describe: false,
    }
}

#[tokio::test]
async fn test_every_participant_labeled_despite_failed_chunks() {
    let dir = tempfile::tempdir().unwrap();
    let mut cache = ChunkCache::load(dir.path().join("chat.txt_cache.json")).unwrap();

    let mut classifier = ScriptedClassifier::new(vec![("A", "INTJ"), ("B", "ESFP")]);
    // 5 of the 50 chunks start at a multiple of 60
    classifier.fail_every_start = Some(60);

    let pipeline = MbtiPipeline::new(classifier, options());
    let report = pipeline.run(&alternating_store(300), &mut cache).await.unwrap();

    assert_eq!(report.chunk_count, 50);
    assert_eq!(report.failed_chunks, 5);
    assert_eq!(report.fetched, 45);
    assert_eq!(report.total_messages, 300);

    let a = &report.predictions["A"];
    let b = &report.predictions["B"];
    assert_eq!(a.label, "INTJ");
    assert_eq!(b.label, "ESFP");
    assert_eq!(a.votes.len(), 45);
    assert_eq!(b.votes.len(), 45);
    assert!(a.uncertain_axes.is_empty());
    assert!(report.unlabeled.is_empty());
    assert_eq!(cache.len(), 45);
}

#[tokio::test]
async fn test_second_run_is_served_from_cache() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("chat.txt_cache.json");
    let store = alternating_store(120);

    let pipeline = MbtiPipeline::new(
        ScriptedClassifier::new(vec![("A", "ENFP"), ("B", "ISTJ")]),
        options(),
    );

    let mut cache = ChunkCache::load(&path).unwrap();
    let first = pipeline.run(&store, &mut cache).await.unwrap();
    let calls_after_first = pipeline.classifier().calls();
    assert_eq!(calls_after_first, first.chunk_count);
    assert!(path.exists());

    let mut reloaded = ChunkCache::load(&path).unwrap();
    let second = pipeline.run(&store, &mut reloaded).await.unwrap();

    assert_eq!(pipeline.classifier().calls(), calls_after_first);
    assert_eq!(second.cache_hits, second.chunk_count);
    assert_eq!(second.fetched, 0);
    assert_eq!(second.predictions, first.predictions);
}

#[tokio::test]
async fn test_failed_chunks_are_retried_next_run() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("chat.txt_cache.json");
    let store = alternating_store(60);

    let mut flaky = ScriptedClassifier::new(vec![("A", "ENFP"), ("B", "ISTJ")]);
    flaky.fail_every_start = Some(12);
    let mut cache = ChunkCache::load(&path).unwrap();
    let first = MbtiPipeline::new(flaky, options())
        .run(&store, &mut cache)
        .await
        .unwrap();
    assert_eq!(first.failed_chunks, 5);

    let healthy = MbtiPipeline::new(
        ScriptedClassifier::new(vec![("A", "ENFP"), ("B", "ISTJ")]),
        options(),
    );
    let mut reloaded = ChunkCache::load(&path).unwrap();
    let second = healthy.run(&store, &mut reloaded).await.unwrap();

    assert_eq!(healthy.classifier().calls(), 5);
    assert_eq!(second.cache_hits, 5);
    assert_eq!(second.failed_chunks, 0);
}

#[tokio::test]
async fn test_free_text_responses() {
    let dir = tempfile::tempdir().unwrap();
    let mut cache = ChunkCache::load(dir.path().join("c.json")).unwrap();
    let mut classifier = ScriptedClassifier::new(vec![("A", "infj"), ("B", "ESTP")]);
    classifier.structured = false;

    let report = MbtiPipeline::new(classifier, options())
        .run(&alternating_store(60), &mut cache)
        .await
        .unwrap();

    assert_eq!(report.predictions["A"].label, "INFJ");
    assert_eq!(report.predictions["B"].label, "ESTP");
}

#[tokio::test]
async fn test_even_split_resolves_to_second_letters() {
    let dir = tempfile::tempdir().unwrap();
    let mut cache = ChunkCache::load(dir.path().join("c.json")).unwrap();

    // 20 chunks of 6, half ENTJ and half ISFP
    let report = MbtiPipeline::new(AlternatingClassifier, options())
        .run(&alternating_store(120), &mut cache)
        .await
        .unwrap();

    let a = &report.predictions["A"];
    assert_eq!(report.chunk_count, 20);
    assert_eq!(a.label, "ISFP");
    assert_eq!(a.letter_counts.axis_counts(Axis::EI), (10, 10));
    assert_eq!(a.uncertain_axes, Axis::ALL.to_vec());
}

#[tokio::test]
async fn test_no_usable_votes_reports_empty() {
    let dir = tempfile::tempdir().unwrap();
    let mut cache = ChunkCache::load(dir.path().join("c.json")).unwrap();
    let classifier = ScriptedClassifier::new(vec![("Somebody else", "INTJ")]);

    let report = MbtiPipeline::new(classifier, options())
        .run(&alternating_store(30), &mut cache)
        .await
        .unwrap();

    assert!(report.is_empty());
    assert_eq!(report.unlabeled, vec!["A".to_string(), "B".to_string()]);
}

#[tokio::test]
async fn test_empty_store_makes_no_calls() {
    let dir = tempfile::tempdir().unwrap();
    let mut cache = ChunkCache::load(dir.path().join("c.json")).unwrap();
    let pipeline = MbtiPipeline::new(ScriptedClassifier::new(vec![]), options());

    let report = pipeline.run(&MessageStore::default(), &mut cache).await.unwrap();

    assert_eq!(pipeline.classifier().calls(), 0);
    assert_eq!(report.chunk_count, 0);
    assert!(report.is_empty());
}

#[tokio::test]
async fn test_describe_falls_back_on_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut cache = ChunkCache::load(dir.path().join("c.json")).unwrap();
    let mut opts = options();
    opts.describe = true;

    let report = MbtiPipeline::new(
        ScriptedClassifier::new(vec![("A", "INTJ"), ("B", "ENFP")]),
        opts,
    )
    .run(&alternating_store(60), &mut cache)
    .await
    .unwrap();

    assert_eq!(
        report.predictions["A"].description.as_deref(),
        Some("Plans everything.")
    );
    assert_eq!(
        report.predictions["B"].description.as_deref(),
        Some("Unable to generate description.")
    );
}

#[tokio::test]
async fn test_report_serializes_axes_as_pairs() {
    let dir = tempfile::tempdir().unwrap();
    let mut cache = ChunkCache::load(dir.path().join("c.json")).unwrap();
    let report = MbtiPipeline::new(AlternatingClassifier, options())
        .run(&alternating_store(24), &mut cache)
        .await
        .unwrap();

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["predictions"]["A"]["uncertain_axes"][0], "E/I");
    assert_eq!(json["predictions"]["A"]["letter_counts"]["I"], 2);
}

#[tokio::test]
async fn test_transcript_file_to_report() {
    let dir = tempfile::tempdir().unwrap();
    let transcript = dir.path().join("_chat.txt");
    let mut lines = vec![
        "[7/29/24, 1:46:27 PM] Andrew: \u{200e}Messages and calls are end-to-end encrypted."
            .to_string(),
    ];
    for i in 0..40 {
        let who = if i % 2 == 0 { "Andrew" } else { "Matthieu Huss" };
        lines.push(format!("[7/29/24, 3:{i:02}:05 PM] {who}: see https://example.com now {i}"));
    }
    std::fs::write(&transcript, lines.join("\n")).unwrap();

    let store =
        chatlens::read_transcript(&transcript, chatlens::ChatDialect::WhatsappBracket).unwrap();
    assert_eq!(store.len(), 40);
    assert_eq!(store.participants(), vec!["Andrew", "Matthieu Huss"]);
    assert!(!store.get(0).unwrap().text.contains("https://"));

    let cache_path = chatlens::personality::cache_path_for(&transcript, "_cache.json");
    let mut cache = ChunkCache::load(&cache_path).unwrap();
    let report = MbtiPipeline::new(
        ScriptedClassifier::new(vec![("Andrew", "ENFP"), ("Matthieu Huss", "ISTJ")]),
        options(),
    )
    .run(&store, &mut cache)
    .await
    .unwrap();

    assert_eq!(report.predictions["Andrew"].label, "ENFP");
    assert_eq!(report.predictions["Matthieu Huss"].label, "ISTJ");
    assert!(dir.path().join("_chat.txt_cache.json").exists());
}

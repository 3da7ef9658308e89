//! CLI output formatting utilities
//!
//! This module provides consistent output formatting for the `chatlens` CLI

use std::collections::BTreeMap;

use crate::distinctiveness::DistinctivenessReport;
use crate::models::MessageStore;
use crate::personality::Axis;
use crate::personality::MbtiReport;
use crate::sentiment::WeeklySentiment;
use crate::AppConfig;

/// Safely truncate a string at character boundary (not byte boundary)
///
/// This prevents panics when truncating strings with multi-byte UTF-8 characters (emojis, etc.)
#[must_use]
pub fn truncate_str(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let truncated: String = s.chars().take(max_chars).collect();
        format!("{truncated}...")
    } else {
        s.to_string()
    }
}

/// Print the MBTI report
pub fn print_mbti_report(report: &MbtiReport) {
    println!(
        "🧠 MBTI predictions ({} messages, {} chunks: {} cached, {} fetched, {} failed)",
        report.total_messages,
        report.chunk_count,
        report.cache_hits,
        report.fetched,
        report.failed_chunks
    );
    println!();

    if report.is_empty() {
        print_warning("No predictions were made");
        return;
    }

    for (participant, prediction) in &report.predictions {
        let messages = report.message_counts.get(participant).copied().unwrap_or(0);
        println!(
            "👤 {} - {} ({} votes, {} messages)",
            participant,
            prediction.label,
            prediction.votes.len(),
            messages
        );
        println!("  Letters: {}", prediction.letter_counts);

        for axis in Axis::ALL {
            if prediction.is_uncertain(axis) {
                let (a, b) = prediction.letter_counts.axis_counts(axis);
                println!("  ⚠️  {axis} is not significant ({a} vs {b})");
            }
        }

        println!("  Traits: {}", prediction.traits.join(", "));
        if let Some(description) = &prediction.description {
            println!("  {description}");
        }
        println!();
    }

    if !report.unlabeled.is_empty() {
        print_warning(&format!(
            "No usable votes for: {}",
            report.unlabeled.join(", ")
        ));
    }
    if report.dropped_votes > 0 {
        print_info(&format!(
            "{} votes named people outside the transcript and were ignored",
            report.dropped_votes
        ));
    }
}

/// Print distinctive words per participant
pub fn print_word_report(report: &DistinctivenessReport, top: usize) {
    for participant in report.participants() {
        let stats = report.stats.get(participant).cloned().unwrap_or_default();
        println!(
            "👤 {} ({} messages, {} words, {} unique)",
            participant, stats.messages, stats.total_words, stats.unique_words
        );

        let words = report.top_words(participant, top);
        if words.is_empty() {
            println!("  (no words)");
        }
        for (i, score) in words.iter().enumerate() {
            println!(
                "  {:>3}. {:<24} ratio {:>8.2}  count {}",
                i + 1,
                truncate_str(&score.word, 20),
                score.ratio,
                score.count
            );
        }
        println!();
    }
}

/// Print message counts and time span
pub fn print_message_stats(store: &MessageStore) {
    println!("📊 {} messages", store.len());
    if let Some((first, last)) = store.time_span() {
        println!(
            "  From {} to {}",
            first.format("%Y-%m-%d %H:%M"),
            last.format("%Y-%m-%d %H:%M")
        );
    }
    println!();

    let counts = store.message_counts();
    for participant in store.participants() {
        let count = counts.get(&participant).copied().unwrap_or(0);
        let share = if store.is_empty() {
            0.0
        } else {
            count as f64 * 100.0 / store.len() as f64
        };
        println!("  {:<30} {:>6} ({share:.1}%)", truncate_str(&participant, 27), count);
    }

    let monthly = store.monthly_word_counts();
    if monthly.is_empty() {
        return;
    }
    println!();
    println!("📅 Words per month:");
    for participant in store.participants() {
        let Some(months) = monthly.get(&participant) else {
            continue;
        };
        println!("  👤 {participant}");
        for (month, words) in months {
            println!("    {month}  {words:>8}");
        }
    }
}

/// Print weekly average sentiment per participant
pub fn print_sentiment_report(weekly: &BTreeMap<String, Vec<WeeklySentiment>>) {
    for (participant, series) in weekly {
        println!("👤 {participant}");
        for point in series {
            println!(
                "  {}  {:>+7.2}  ({} messages)",
                point.week, point.average, point.messages
            );
        }
        println!();
    }
}

/// Print configuration
pub fn print_config(config: &AppConfig) {
    println!("📋 ChatLens Configuration:");
    println!();

    println!("📝 Logging:");
    println!("  Level: {}", config.logging.level);
    println!("  Backtrace: {}", config.logging.backtrace);
    println!();

    println!("🤖 LLM:");
    println!("  Endpoint: {}", config.llm_endpoint());
    println!("  Key: {}", mask_key(&config.llm_key()));
    println!("  Model: {}", config.llm_model());
    println!("  Structured output: {}", config.llm.structured_output);
    println!("  Request timeout: {}s", config.llm.request_timeout_secs);
    println!();

    println!("🔍 Analysis:");
    println!("  Target chunk count: {}", config.target_chunk_count());
    println!(
        "  Min messages per participant: {}",
        config.min_messages_per_participant()
    );
    println!("  Significance alpha: {}", config.significance_alpha());
    println!("  Cache suffix: {}", config.analysis.cache_suffix);
    println!(
        "  Cache checkpoint every: {}",
        config.analysis.cache_checkpoint_every
    );
    println!("  Word cloud size ratio: {}", config.analysis.word_cloud_size_ratio);
    println!("  Top words: {}", config.analysis.top_words);
    println!(
        "  Sentiment lexicon: {}",
        config
            .analysis
            .sentiment_lexicon
            .as_ref()
            .map_or_else(|| "(bundled)".to_string(), |p| p.display().to_string())
    );
}

/// Mask an API key for display (keep a short prefix)
fn mask_key(key: &str) -> String {
    if key.is_empty() {
        return "(not set)".to_string();
    }
    let prefix: String = key.chars().take(3).collect();
    format!("{prefix}***")
}

/// Print colored output functions
pub fn print_info(msg: &str) {
    println!("ℹ️  {msg}");
}

pub fn print_success(msg: &str) {
    println!("✅ {msg}");
}

pub fn print_warning(msg: &str) {
    println!("⚠️  {msg}");
}

pub fn print_error(msg: &str) {
    eprintln!("❌ {msg}");
}

//! Word distinctiveness handler

use std::collections::BTreeMap;
use std::path::Path;

use serde::Serialize;

use crate::cli::output::*;
use crate::distinctiveness::compute_word_ratios;
use crate::distinctiveness::ParticipantWordStats;
use crate::distinctiveness::WordScore;
use crate::transcript::read_transcript;
use crate::transcript::ChatDialect;
use crate::AppConfig;
use crate::Result;

#[derive(Debug, Serialize)]
struct ParticipantWords {
    stats: ParticipantWordStats,
    top_words: Vec<WordScore>,
    cloud_weights: BTreeMap<String, f64>,
}

/// Handle words command
pub async fn handle_words_command(
    config: &AppConfig,
    file: &Path,
    format: ChatDialect,
    top: Option<usize>,
    size_ratio: Option<f64>,
    json: bool,
) -> Result<()> {
    let store = read_transcript(file, format)?;
    let report = compute_word_ratios(&store);
    let top = top.unwrap_or(config.analysis.top_words);
    let size_ratio = size_ratio.unwrap_or(config.analysis.word_cloud_size_ratio);

    if json {
        let output: BTreeMap<&String, ParticipantWords> = report
            .participants()
            .map(|participant| {
                let words = ParticipantWords {
                    stats: report.stats.get(participant).cloned().unwrap_or_default(),
                    top_words: report.top_words(participant, top),
                    cloud_weights: report.cloud_weights(participant, size_ratio),
                };
                (participant, words)
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    print_info(&format!(
        "Distinctive words for {} participants (top {top})",
        store.participants().len()
    ));
    println!();
    print_word_report(&report, top);
    Ok(())
}

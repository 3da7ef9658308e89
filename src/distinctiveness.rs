//! Word distinctiveness - which words each participant uses disproportionately
//!
//! For participant `p` and token `w`:
//!
//! ```text
//! ratio(p, w) = (count(p, w) + 1) / (sum of count(q, w) over q != p  + 1)
//! ```
//!
//! Laplace smoothing keeps every ratio strictly positive; a ratio above 1
//! means `p` says `w` more often than everyone else combined.

use std::collections::BTreeMap;
use std::collections::HashMap;

use serde::Deserialize;
use serde::Serialize;

use crate::models::MessageStore;

/// token -> smoothed ratio for one participant
pub type WordRatioTable = BTreeMap<String, f64>;

/// Per-participant vocabulary statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantWordStats {
    pub messages: usize,
    pub total_words: usize,
    pub unique_words: usize,
}

/// A word with its ratio and the participant's own count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordScore {
    pub word: String,
    pub ratio: f64,
    pub count: usize,
}

/// Ratio tables and statistics for every participant
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DistinctivenessReport {
    pub ratios: BTreeMap<String, WordRatioTable>,
    pub stats: BTreeMap<String, ParticipantWordStats>,
    /// Raw token counts per participant, backing `WordScore::count`
    #[serde(default)]
    counts: BTreeMap<String, HashMap<String, usize>>,
}

/// Lower-case, drop everything outside `[a-z0-9\s]`, split on whitespace
pub fn tokenize(text: &str) -> Vec<String> {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace())
        .collect();
    cleaned.split_whitespace().map(str::to_string).collect()
}

/// Build ratio tables for every participant in the store
pub fn compute_word_ratios(store: &MessageStore) -> DistinctivenessReport {
    let mut counts: BTreeMap<String, HashMap<String, usize>> = BTreeMap::new();
    let mut stats: BTreeMap<String, ParticipantWordStats> = BTreeMap::new();

    for message in store {
        let tokens = tokenize(&message.text);
        let participant_stats = stats.entry(message.participant.clone()).or_default();
        participant_stats.messages += 1;
        participant_stats.total_words += tokens.len();

        let participant_counts = counts.entry(message.participant.clone()).or_default();
        for token in tokens {
            *participant_counts.entry(token).or_insert(0) += 1;
        }
    }

    // Corpus-wide totals; everyone else's count is total minus own
    let mut totals: HashMap<&str, usize> = HashMap::new();
    for participant_counts in counts.values() {
        for (word, count) in participant_counts {
            *totals.entry(word.as_str()).or_insert(0) += count;
        }
    }

    let mut ratios = BTreeMap::new();
    for (participant, participant_counts) in &counts {
        let table: WordRatioTable = participant_counts
            .iter()
            .map(|(word, &own)| {
                let others = totals.get(word.as_str()).copied().unwrap_or(own) - own;
                (word.clone(), (own + 1) as f64 / (others + 1) as f64)
            })
            .collect();

        if let Some(participant_stats) = stats.get_mut(participant) {
            participant_stats.unique_words = participant_counts.len();
        }
        ratios.insert(participant.clone(), table);
    }

    DistinctivenessReport {
        ratios,
        stats,
        counts,
    }
}

impl DistinctivenessReport {
    /// Ratio table for one participant; empty when they used no tokens
    pub fn table(&self, participant: &str) -> Option<&WordRatioTable> {
        self.ratios.get(participant)
    }

    pub fn ratio(&self, participant: &str, word: &str) -> Option<f64> {
        self.ratios.get(participant)?.get(word).copied()
    }

    pub fn participants(&self) -> impl Iterator<Item = &String> {
        self.ratios.keys()
    }

    /// Highest-ratio words, ties broken alphabetically
    pub fn top_words(&self, participant: &str, limit: usize) -> Vec<WordScore> {
        let Some(table) = self.ratios.get(participant) else {
            return Vec::new();
        };
        let own_counts = self.counts.get(participant);

        let mut scored: Vec<WordScore> = table
            .iter()
            .map(|(word, &ratio)| WordScore {
                word: word.clone(),
                ratio,
                count: own_counts
                    .and_then(|c| c.get(word))
                    .copied()
                    .unwrap_or_default(),
            })
            .collect();

        scored.sort_by(|a, b| b.ratio.total_cmp(&a.ratio).then_with(|| a.word.cmp(&b.word)));
        scored.truncate(limit);
        scored
    }

    /// Word-cloud weights, `ratio ^ size_ratio`
    ///
    /// Exponents above 1 exaggerate the gap between distinctive and common
    /// words. An empty map means there is nothing to render.
    pub fn cloud_weights(&self, participant: &str, size_ratio: f64) -> BTreeMap<String, f64> {
        self.ratios
            .get(participant)
            .map(|table| {
                table
                    .iter()
                    .map(|(word, ratio)| (word.clone(), ratio.powf(size_ratio)))
                    .collect()
            })
            .unwrap_or_default()
    }
}

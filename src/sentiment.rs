//! Lexicon sentiment scoring per participant and ISO week
//!
//! Each word found in an AFINN-style lexicon contributes its score (-5 to
//! +5); a message scores the sum of its words. Weekly figures are the mean
//! message score, so quiet weeks are not drowned out by busy ones.

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::path::Path;

use lazy_static::lazy_static;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use crate::distinctiveness::tokenize;
use crate::models::MessageStore;
use crate::ChatLensError;
use crate::Result;

// Abridged AFINN word list, loaded at compile time
const AFINN_LEXICON: &str = include_str!("../data/afinn.txt");

lazy_static! {
    /// Bundled AFINN sentiment scores
    static ref AFINN: SentimentLexicon = SentimentLexicon::parse(AFINN_LEXICON);
}

/// Average sentiment of one participant's messages in one ISO week
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklySentiment {
    /// ISO week, `YYYY-Www`
    pub week: String,
    pub messages: usize,
    pub average: f64,
}

/// Word -> integer score lookup
#[derive(Debug, Clone, Default)]
pub struct SentimentLexicon {
    scores: HashMap<String, i8>,
}

impl SentimentLexicon {
    /// The lexicon shipped with the binary
    pub fn bundled() -> &'static SentimentLexicon {
        &AFINN
    }

    /// Parse `word<TAB>score` lines; malformed lines are skipped
    pub fn parse(text: &str) -> Self {
        let mut scores = HashMap::new();
        for line in text.lines() {
            if let Some((word, score_str)) = line.split_once('\t') {
                if let Ok(score) = score_str.trim().parse::<i8>() {
                    scores.insert(word.trim().to_lowercase(), score);
                }
            }
        }
        Self { scores }
    }

    /// Load a full AFINN file (e.g. AFINN-165) in the same format
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let lexicon = Self::parse(&std::fs::read_to_string(path)?);
        if lexicon.is_empty() {
            return Err(ChatLensError::ConfigError(format!(
                "sentiment lexicon {} has no `word<TAB>score` lines",
                path.display()
            )));
        }
        debug!("Loaded {} lexicon entries from {}", lexicon.len(), path.display());
        Ok(lexicon)
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn score(&self, word: &str) -> Option<i8> {
        self.scores.get(word).copied()
    }

    /// Sum of the scores of every known word in `text`
    pub fn score_text(&self, text: &str) -> i32 {
        tokenize(text)
            .iter()
            .filter_map(|word| self.score(word))
            .map(i32::from)
            .sum()
    }

    /// Mean message score per participant per ISO week, weeks ascending
    pub fn weekly_sentiment(&self, store: &MessageStore) -> BTreeMap<String, Vec<WeeklySentiment>> {
        // participant -> week -> (sum, messages)
        let mut totals: BTreeMap<String, BTreeMap<String, (i64, usize)>> = BTreeMap::new();
        for message in store {
            let week = message.timestamp.format("%G-W%V").to_string();
            let entry = totals
                .entry(message.participant.clone())
                .or_default()
                .entry(week)
                .or_insert((0, 0));
            entry.0 += i64::from(self.score_text(&message.text));
            entry.1 += 1;
        }

        totals
            .into_iter()
            .map(|(participant, weeks)| {
                let series = weeks
                    .into_iter()
                    .map(|(week, (sum, messages))| WeeklySentiment {
                        week,
                        messages,
                        average: sum as f64 / messages as f64,
                    })
                    .collect();
                (participant, series)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use chrono::NaiveDateTime;

    use super::*;
    use crate::models::Message;

    fn day(month: u32, day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, month, day)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_bundled_lexicon_loads() {
        let lexicon = SentimentLexicon::bundled();
        assert!(!lexicon.is_empty());
        assert_eq!(lexicon.score("good"), Some(3));
        assert_eq!(lexicon.score("bad"), Some(-3));
        assert_eq!(lexicon.score("apartment"), None);
    }

    #[test]
    fn test_score_text_sums_known_words() {
        let lexicon = SentimentLexicon::parse("good\t3\nbad\t-3\nbroken line\nnice\tx\n");
        assert_eq!(lexicon.len(), 2);
        assert_eq!(lexicon.score_text("Good, GOOD... but bad!"), 3);
        assert_eq!(lexicon.score_text("nothing here"), 0);
    }

    #[test]
    fn test_weekly_averages_per_participant() {
        let lexicon = SentimentLexicon::parse("love\t3\nhate\t-3\n");
        // 2024-07-29 is a Monday, 2024-08-05 starts the next ISO week
        let store = MessageStore::new(vec![
            Message::new("A", "love it", day(7, 29)),
            Message::new("A", "meh", day(8, 4)),
            Message::new("B", "hate mondays", day(7, 29)),
            Message::new("A", "love love", day(8, 5)),
        ]);
        let weekly = lexicon.weekly_sentiment(&store);

        assert_eq!(
            weekly["A"],
            vec![
                WeeklySentiment {
                    week: "2024-W31".to_string(),
                    messages: 2,
                    average: 1.5,
                },
                WeeklySentiment {
                    week: "2024-W32".to_string(),
                    messages: 1,
                    average: 6.0,
                },
            ]
        );
        assert!((weekly["B"][0].average + 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_iso_week_crosses_calendar_year() {
        let lexicon = SentimentLexicon::parse("yes\t1\n");
        let monday = NaiveDate::from_ymd_opt(2024, 12, 30)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let store = MessageStore::new(vec![Message::new("A", "yes", monday)]);
        assert_eq!(lexicon.weekly_sentiment(&store)["A"][0].week, "2025-W01");
    }

    #[test]
    fn test_lexicon_file_without_entries_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("afinn.txt");
        std::fs::write(&path, "not a lexicon\n").unwrap();
        assert!(matches!(
            SentimentLexicon::from_file(&path),
            Err(ChatLensError::ConfigError(_))
        ));
    }
}

use std::collections::BTreeMap;
use std::fmt;
use std::ops::Range;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::distinctiveness::tokenize;

/// One parsed chat message, in transcript order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub participant: String,
    pub text: String,
    pub timestamp: NaiveDateTime, // exports carry local wall-clock time only
}

impl Message {
    pub fn new(
        participant: impl Into<String>,
        text: impl Into<String>,
        timestamp: NaiveDateTime,
    ) -> Self {
        Self {
            participant: participant.into(),
            text: text.into(),
            timestamp,
        }
    }
}

/// Half-open index range `[start, end)` over a [`MessageStore`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ChunkRange {
    pub start: usize,
    pub end: usize,
}

impl ChunkRange {
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Cache key, `"{start}_{end}"`
    pub fn cache_key(&self) -> String {
        format!("{}_{}", self.start, self.end)
    }

    pub const fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub const fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub const fn as_range(&self) -> Range<usize> {
        self.start..self.end
    }
}

impl fmt::Display for ChunkRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Ordered, immutable sequence of parsed messages
///
/// Order is the original transcript order; chunking relies on contiguity, so
/// the store never reorders or mutates its messages after construction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageStore {
    messages: Vec<Message>,
}

impl MessageStore {
    pub fn new(messages: Vec<Message>) -> Self {
        Self { messages }
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Message> {
        self.messages.get(index)
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.messages.iter()
    }

    /// Messages covered by `range`, clamped to the store bounds
    pub fn slice(&self, range: ChunkRange) -> &[Message] {
        let end = range.end.min(self.messages.len());
        let start = range.start.min(end);
        &self.messages[ChunkRange::new(start, end).as_range()]
    }

    /// Sub-store for `[from, to)`, clamped to the store bounds
    #[must_use]
    pub fn sub_range(&self, from: usize, to: Option<usize>) -> Self {
        let to = to.unwrap_or(self.messages.len());
        Self::new(self.slice(ChunkRange::new(from, to)).to_vec())
    }

    /// Participants in order of first appearance
    pub fn participants(&self) -> Vec<String> {
        let mut seen = Vec::new();
        for message in &self.messages {
            if !seen.contains(&message.participant) {
                seen.push(message.participant.clone());
            }
        }
        seen
    }

    /// Number of messages sent by each participant
    pub fn message_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for message in &self.messages {
            *counts.entry(message.participant.clone()).or_insert(0) += 1;
        }
        counts
    }

    /// Words sent per participant per calendar month (`YYYY-MM`)
    ///
    /// Words are counted with the same tokenizer the distinctiveness engine
    /// uses, so URLs and emoji already stripped by the parser never count.
    pub fn monthly_word_counts(&self) -> BTreeMap<String, BTreeMap<String, usize>> {
        let mut counts: BTreeMap<String, BTreeMap<String, usize>> = BTreeMap::new();
        for message in &self.messages {
            let month = message.timestamp.format("%Y-%m").to_string();
            *counts
                .entry(message.participant.clone())
                .or_default()
                .entry(month)
                .or_insert(0) += tokenize(&message.text).len();
        }
        counts
    }

    /// Timestamps of the first and last message
    pub fn time_span(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let first = self.messages.first()?.timestamp;
        let last = self.messages.last()?.timestamp;
        Some((first, last))
    }
}

impl<'a> IntoIterator for &'a MessageStore {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}

impl From<Vec<Message>> for MessageStore {
    fn from(messages: Vec<Message>) -> Self {
        Self::new(messages)
    }
}

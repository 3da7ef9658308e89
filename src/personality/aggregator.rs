//! Vote aggregation and per-axis reduction

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use super::mbti::Axis;
use super::mbti::LetterTally;
use super::significance::is_significant_difference;
use super::votes::ChunkResponse;

/// Reduced label for one participant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalLabel {
    pub label: String,
    /// Axes whose split is not significant at the configured alpha
    pub uncertain_axes: Vec<Axis>,
}

/// Reduce a tally to a four-letter label
///
/// The letter with the strictly greater count wins each axis; ties go to the
/// second letter of the pair (I, S, F, P).
pub fn reduce(tally: &LetterTally, alpha: f64) -> FinalLabel {
    let mut label = String::with_capacity(4);
    let mut uncertain_axes = Vec::new();

    for axis in Axis::ALL {
        let (first, second) = axis.letters();
        let (first_count, second_count) = tally.axis_counts(axis);
        label.push(if first_count > second_count { first } else { second });

        if !is_significant_difference(first_count, second_count, alpha) {
            uncertain_axes.push(axis);
        }
    }

    FinalLabel {
        label,
        uncertain_axes,
    }
}

/// Accumulated votes for one participant
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParticipantTally {
    pub letters: LetterTally,
    /// Every label voted for this participant, in chunk order
    pub labels: Vec<String>,
}

impl ParticipantTally {
    pub fn votes(&self) -> usize {
        self.labels.len()
    }
}

/// Folds chunk responses into per-participant letter tallies
///
/// Names from the classifier are matched against the roster exactly first,
/// then case-insensitively; votes for anyone else are dropped.
#[derive(Debug, Clone)]
pub struct VoteAggregator {
    roster: Vec<String>,
    tallies: BTreeMap<String, ParticipantTally>,
    dropped_votes: usize,
}

impl VoteAggregator {
    pub fn new(roster: impl IntoIterator<Item = String>) -> Self {
        Self {
            roster: roster.into_iter().collect(),
            tallies: BTreeMap::new(),
            dropped_votes: 0,
        }
    }

    fn resolve(&self, name: &str) -> Option<&String> {
        self.roster
            .iter()
            .find(|p| p.as_str() == name)
            .or_else(|| self.roster.iter().find(|p| p.eq_ignore_ascii_case(name)))
    }

    /// Add every vote in one chunk response
    pub fn add_response(&mut self, response: &ChunkResponse) {
        for vote in response.votes() {
            let Some(participant) = self.resolve(&vote.participant).cloned() else {
                debug!(name = %vote.participant, "Dropping vote for unknown participant");
                self.dropped_votes += 1;
                continue;
            };
            let entry = self.tallies.entry(participant).or_default();
            entry.letters.add_label(&vote.label);
            entry.labels.push(vote.label);
        }
    }

    pub fn tally(&self, participant: &str) -> Option<&ParticipantTally> {
        self.tallies.get(participant)
    }

    pub fn tallies(&self) -> &BTreeMap<String, ParticipantTally> {
        &self.tallies
    }

    pub fn dropped_votes(&self) -> usize {
        self.dropped_votes
    }

    /// Roster members that never received a vote, in roster order
    pub fn unlabeled(&self) -> Vec<String> {
        self.roster
            .iter()
            .filter(|p| !self.tallies.contains_key(*p))
            .cloned()
            .collect()
    }

    /// Final label for every participant with at least one vote
    pub fn finish(&self, alpha: f64) -> BTreeMap<String, FinalLabel> {
        self.tallies
            .iter()
            .map(|(participant, tally)| (participant.clone(), reduce(&tally.letters, alpha)))
            .collect()
    }
}

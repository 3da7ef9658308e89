//! MBTI letters, axes and per-participant letter tallies
//!
//! MBTI Dimensions:
//! - E/I: Extraversion vs Introversion
//! - N/S: Intuition vs Sensing
//! - T/F: Thinking vs Feeling
//! - J/P: Judging vs Perceiving

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;

/// The eight MBTI letters in axis order
pub const LETTERS: [char; 8] = ['E', 'I', 'N', 'S', 'T', 'F', 'J', 'P'];

/// One of the four binary trait axes
///
/// The second letter of each pair wins ties when reducing a tally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Axis {
    #[serde(rename = "E/I")]
    EI,
    #[serde(rename = "N/S")]
    NS,
    #[serde(rename = "T/F")]
    TF,
    #[serde(rename = "J/P")]
    JP,
}

impl Axis {
    pub const ALL: [Axis; 4] = [Axis::EI, Axis::NS, Axis::TF, Axis::JP];

    /// `(first, second)` letters of the pair
    pub const fn letters(&self) -> (char, char) {
        match self {
            Axis::EI => ('E', 'I'),
            Axis::NS => ('N', 'S'),
            Axis::TF => ('T', 'F'),
            Axis::JP => ('J', 'P'),
        }
    }

    /// Axis a letter belongs to
    pub fn of(letter: char) -> Option<Axis> {
        let letter = letter.to_ascii_uppercase();
        Axis::ALL.into_iter().find(|axis| {
            let (a, b) = axis.letters();
            letter == a || letter == b
        })
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (a, b) = self.letters();
        write!(f, "{a}/{b}")
    }
}

/// Normalize a label to an upper-case four-letter MBTI type
///
/// Returns `None` unless the label holds exactly one letter from each axis,
/// in axis order (`"enfp"` -> `"ENFP"`, `"EFNP"` -> `None`). A trailing
/// `-A`/`-T` identity marker is dropped.
pub fn normalize_type(label: &str) -> Option<String> {
    let upper = label.trim().to_ascii_uppercase();
    // 16personalities identity suffix: "ENFP-T", "INTJ-A"
    let upper = upper
        .strip_suffix("-A")
        .or_else(|| upper.strip_suffix("-T"))
        .unwrap_or(upper.as_str());
    if upper.chars().count() != 4 {
        return None;
    }
    let valid = upper
        .chars()
        .zip(Axis::ALL)
        .all(|(letter, axis)| Axis::of(letter) == Some(axis));
    valid.then(|| upper.to_string())
}

/// Letter occurrence counts for one participant across all votes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LetterTally {
    counts: [usize; 8],
}

impl LetterTally {
    pub fn new() -> Self {
        Self::default()
    }

    fn index(letter: char) -> Option<usize> {
        let letter = letter.to_ascii_uppercase();
        LETTERS.iter().position(|l| *l == letter)
    }

    /// Count every MBTI letter in the label; other characters are ignored
    pub fn add_label(&mut self, label: &str) {
        for letter in label.chars() {
            if let Some(i) = Self::index(letter) {
                self.counts[i] += 1;
            }
        }
    }

    pub fn get(&self, letter: char) -> usize {
        Self::index(letter).map_or(0, |i| self.counts[i])
    }

    /// Counts of the two letters of `axis`
    pub fn axis_counts(&self, axis: Axis) -> (usize, usize) {
        let (a, b) = axis.letters();
        (self.get(a), self.get(b))
    }

    pub fn is_empty(&self) -> bool {
        self.counts.iter().all(|c| *c == 0)
    }

    pub fn to_map(&self) -> BTreeMap<char, usize> {
        LETTERS.iter().copied().zip(self.counts).collect()
    }
}

impl fmt::Display for LetterTally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = LETTERS
            .iter()
            .zip(self.counts)
            .map(|(letter, count)| format!("{letter}: {count}"))
            .collect();
        write!(f, "{{{}}}", parts.join(", "))
    }
}

impl Serialize for LetterTally {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_map().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for LetterTally {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let map = BTreeMap::<char, usize>::deserialize(deserializer)?;
        let mut tally = LetterTally::new();
        for (letter, count) in map {
            if let Some(i) = Self::index(letter) {
                tally.counts[i] = count;
            }
        }
        Ok(tally)
    }
}

/// Get personality traits for a given MBTI type
pub fn traits_for_type(mbti_type: &str) -> Vec<String> {
    let traits = match mbti_type {
        "INTJ" => vec!["Strategic thinker", "Independent", "Analytical", "Future-focused"],
        "INTP" => vec!["Logical", "Curious", "Theoretical", "Problem solver"],
        "ENTJ" => vec!["Natural leader", "Strategic", "Decisive", "Goal-oriented"],
        "ENTP" => vec!["Innovative", "Debater", "Quick thinker", "Versatile"],
        "INFJ" => vec!["Insightful", "Idealistic", "Compassionate", "Purposeful"],
        "INFP" => vec!["Idealistic", "Empathetic", "Creative", "Value-driven"],
        "ENFJ" => vec!["Charismatic", "Inspiring", "Empathetic", "Persuasive"],
        "ENFP" => vec!["Enthusiastic", "Creative", "Sociable", "Spontaneous"],
        "ISTJ" => vec!["Responsible", "Organized", "Practical", "Reliable"],
        "ISFJ" => vec!["Caring", "Loyal", "Practical", "Supportive"],
        "ESTJ" => vec!["Organized", "Practical", "Direct", "Efficient"],
        "ESFJ" => vec!["Caring", "Social", "Cooperative", "Supportive"],
        "ISTP" => vec!["Practical", "Hands-on", "Logical", "Adaptable"],
        "ISFP" => vec!["Artistic", "Gentle", "Flexible", "Sensitive"],
        "ESTP" => vec!["Energetic", "Action-oriented", "Pragmatic", "Risk-taker"],
        "ESFP" => vec!["Outgoing", "Spontaneous", "Playful", "People-focused"],
        _ => vec!["Unique", "Individual"],
    };

    traits.into_iter().map(String::from).collect()
}

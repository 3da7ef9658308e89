//! Classifier response payloads and vote extraction
//!
//! A classifier answers either with a JSON object (`{"Alice": "ENFP"}`) or
//! with free text holding one `participant: label` pair per line. Both are
//! reduced here to a flat list of votes; anything malformed is dropped.

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;
use tracing::debug;

use super::mbti::normalize_type;

/// Raw classifier payload for one chunk, as stored in the cache file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChunkResponse {
    FreeText(String),
    Structured(Map<String, Value>),
}

/// One participant's label from one chunk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vote {
    pub participant: String,
    pub label: String,
}

impl ChunkResponse {
    /// Interpret model output text, preferring a JSON object when present
    pub fn from_content(content: &str) -> Self {
        match serde_json::from_str::<Value>(strip_code_fence(content)) {
            Ok(Value::Object(map)) => ChunkResponse::Structured(map),
            _ => ChunkResponse::FreeText(content.to_string()),
        }
    }

    /// Every well-formed vote in the payload, in payload order
    pub fn votes(&self) -> Vec<Vote> {
        match self {
            ChunkResponse::Structured(map) => structured_votes(map),
            ChunkResponse::FreeText(text) => text.lines().filter_map(parse_vote_line).collect(),
        }
    }
}

fn structured_votes(map: &Map<String, Value>) -> Vec<Vote> {
    map.iter()
        .filter_map(|(participant, value)| {
            let label = value.as_str().and_then(normalize_type);
            if label.is_none() {
                debug!(participant = %participant, value = %value, "Skipping non-MBTI value");
            }
            Some(Vote {
                participant: participant.trim().to_string(),
                label: label?,
            })
        })
        .filter(|vote| !vote.participant.is_empty())
        .collect()
}

/// Parse a `participant: LABEL` line, tolerating list markers and bold text
pub fn parse_vote_line(line: &str) -> Option<Vote> {
    let line = line.replace("**", "");
    let line = strip_list_marker(line.trim());
    let (participant, rest) = line.split_once(':')?;

    let participant = participant.trim();
    if participant.is_empty() {
        return None;
    }
    let label = rest
        .split_whitespace()
        .next()?
        .trim_matches(|c: char| !c.is_ascii_alphabetic());

    Some(Vote {
        participant: participant.to_string(),
        label: normalize_type(label)?,
    })
}

fn strip_list_marker(line: &str) -> &str {
    if let Some(rest) = line.strip_prefix("- ").or_else(|| line.strip_prefix("* ")) {
        return rest;
    }
    // "1. " / "12) "
    let digits = line.chars().take_while(char::is_ascii_digit).count();
    if digits > 0 {
        let rest = &line[digits..];
        if let Some(rest) = rest.strip_prefix(". ").or_else(|| rest.strip_prefix(") ")) {
            return rest;
        }
    }
    line
}

fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

//! Transcript parsing for the supported chat export dialects
//!
//! The dialect is always chosen by the caller; there is no format sniffing.
//! A header line starts a new message, any other line continues the current
//! one, and lines before the first header are ignored.

pub mod clean;
pub mod dialects;

use std::path::Path;

use tracing::debug;
use tracing::info;
use tracing::warn;

pub use clean::clean_text;
pub use clean::is_system_notice;
pub use dialects::ChatDialect;

use crate::models::Message;
use crate::models::MessageStore;
use crate::ChatLensError;
use crate::Result;

/// Parse raw transcript text into ordered messages
pub fn parse_transcript(text: &str, dialect: ChatDialect) -> Vec<Message> {
    let mut messages = Vec::new();
    let mut current: Option<Message> = None;
    let mut skipped_timestamps = 0usize;

    for raw_line in text.lines() {
        let line = raw_line.trim_start_matches(['\u{200e}', '\u{feff}']);

        match dialect.match_header(line) {
            Some(header) => {
                if let Some(done) = current.take() {
                    push_message(&mut messages, done);
                }

                match dialect.parse_timestamp(header.timestamp) {
                    Some(timestamp) => {
                        current = Some(Message::new(
                            header.sender.trim(),
                            header.text.trim(),
                            timestamp,
                        ));
                    }
                    None => {
                        skipped_timestamps += 1;
                        warn!(
                            timestamp = header.timestamp,
                            "Unparseable timestamp, dropping message"
                        );
                    }
                }
            }
            None => {
                if let Some(message) = current.as_mut() {
                    let continuation = line.trim();
                    if !continuation.is_empty() {
                        message.text.push(' ');
                        message.text.push_str(continuation);
                    }
                }
            }
        }
    }

    if let Some(done) = current.take() {
        push_message(&mut messages, done);
    }

    if skipped_timestamps > 0 {
        warn!("Skipped {} messages with unparseable timestamps", skipped_timestamps);
    }
    debug!("Parsed {} messages as {}", messages.len(), dialect);
    messages
}

fn push_message(messages: &mut Vec<Message>, mut message: Message) {
    if message.participant.is_empty()
        || is_system_notice(&message.participant)
        || is_system_notice(message.text.trim_start_matches('\u{200e}'))
    {
        return;
    }
    message.text = clean_text(&message.text);
    messages.push(message);
}

/// Read a transcript file into a [`MessageStore`]
///
/// Fails with [`ChatLensError::EmptyTranscript`] when nothing could be
/// extracted, so callers never analyse an empty store by accident.
pub fn read_transcript<P: AsRef<Path>>(path: P, dialect: ChatDialect) -> Result<MessageStore> {
    let path = path.as_ref();
    let started = std::time::Instant::now();
    let text = std::fs::read_to_string(path)?;
    info!(
        "Read {} lines from {} in {:.2?}",
        text.lines().count(),
        path.display(),
        started.elapsed()
    );

    let messages = parse_transcript(&text, dialect);
    if messages.is_empty() {
        return Err(ChatLensError::EmptyTranscript(path.display().to_string()));
    }

    let store = MessageStore::new(messages);
    info!(
        "Extracted {} messages from {} participants",
        store.len(),
        store.participants().len()
    );
    Ok(store)
}

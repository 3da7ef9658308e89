//! Message text cleanup applied while parsing

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref URL_PATTERN: Regex = Regex::new(r"(?:https?://|www\.)\S+").expect("valid url regex");
}

/// Sender strings that WhatsApp inserts as system notices
const SYSTEM_NOTICES: &[&str] = &[
    "Messages and calls are end-to-end encrypted.",
    "Les messages et les appels sont chiffrés de bout en bout.",
];

/// Whether a sender field is really a system notice
pub fn is_system_notice(sender: &str) -> bool {
    let sender = sender.trim();
    SYSTEM_NOTICES.iter().any(|notice| sender.starts_with(notice))
}

/// Strip URLs and emoji, then trim
pub fn clean_text(text: &str) -> String {
    let without_urls = URL_PATTERN.replace_all(text, "");
    without_urls
        .chars()
        .filter(|c| !is_emoji(*c))
        .collect::<String>()
        .trim()
        .to_string()
}

fn is_emoji(c: char) -> bool {
    matches!(
        c as u32,
        0x1F600..=0x1F64F // emoticons
            | 0x1F300..=0x1F5FF // symbols & pictographs
            | 0x1F680..=0x1F6FF // transport & map
            | 0x1F1E0..=0x1F1FF // flags
            | 0x1F900..=0x1F9FF // supplemental symbols
            | 0xFE0F // variation selector
            | 0x200D // zero width joiner
    )
}

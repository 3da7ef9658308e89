//! Header-line patterns and timestamp formats of the supported export dialects

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use serde::Serialize;

use crate::ChatLensError;

lazy_static! {
    /// `[7/29/24, 3:06:05 PM] Name: text`
    static ref WHATSAPP_BRACKET: Regex = Regex::new(
        r"^\[(\d{1,2}/\d{1,2}/\d{2,4},\s+\d{1,2}:\d{2}:\d{2}\s*[AaPp]\.?\s?[Mm]\.?)\]\s+([^:]+):\s?(.*)$"
    )
    .expect("valid whatsapp bracket regex");

    /// `29/07/2024, 15:06 - Name: text`
    static ref WHATSAPP_DASH: Regex =
        Regex::new(r"^(\d{1,2}/\d{1,2}/\d{2,4},\s+\d{1,2}:\d{2})\s+-\s+([^:]+):\s?(.*)$")
            .expect("valid whatsapp dash regex");

    /// `2024-07-29, 3:06 p.m. - Name: text`
    static ref WHATSAPP_ISO: Regex = Regex::new(
        r"^(\d{4}-\d{2}-\d{2},\s+\d{1,2}:\d{2}\s*[AaPp]\.?\s?[Mm]\.?)\s+-\s+([^:]+):\s?(.*)$"
    )
    .expect("valid whatsapp iso regex");

    /// `2020-01-06 13:24:32 <Name> text`
    static ref HANGOUTS: Regex =
        Regex::new(r"^(\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2})\s<([^>]+)>\s(.*)$")
            .expect("valid hangouts regex");

    static ref MERIDIEM: Regex =
        Regex::new(r"(?i)\s*([ap])\.?\s?m\.?\s*$").expect("valid meridiem regex");
}

/// Supported transcript export dialects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChatDialect {
    WhatsappBracket,
    WhatsappDash,
    WhatsappIso,
    Hangouts,
}

/// Fields captured from a header line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderLine<'a> {
    pub timestamp: &'a str,
    pub sender: &'a str,
    pub text: &'a str,
}

impl ChatDialect {
    pub const ALL: [ChatDialect; 4] = [
        ChatDialect::WhatsappBracket,
        ChatDialect::WhatsappDash,
        ChatDialect::WhatsappIso,
        ChatDialect::Hangouts,
    ];

    pub const fn name(&self) -> &'static str {
        match self {
            ChatDialect::WhatsappBracket => "whatsapp",
            ChatDialect::WhatsappDash => "whatsapp-dash",
            ChatDialect::WhatsappIso => "whatsapp-iso",
            ChatDialect::Hangouts => "hangouts",
        }
    }

    fn pattern(&self) -> &'static Regex {
        match self {
            ChatDialect::WhatsappBracket => &WHATSAPP_BRACKET,
            ChatDialect::WhatsappDash => &WHATSAPP_DASH,
            ChatDialect::WhatsappIso => &WHATSAPP_ISO,
            ChatDialect::Hangouts => &HANGOUTS,
        }
    }

    /// Split a header line into its fields, `None` for continuation lines
    pub fn match_header<'a>(&self, line: &'a str) -> Option<HeaderLine<'a>> {
        let captures = self.pattern().captures(line)?;
        Some(HeaderLine {
            timestamp: captures.get(1)?.as_str(),
            sender: captures.get(2)?.as_str(),
            text: captures.get(3).map_or("", |m| m.as_str()),
        })
    }

    /// Parse the raw timestamp captured from a header line
    pub fn parse_timestamp(&self, raw: &str) -> Option<NaiveDateTime> {
        let normalized = normalize_spaces(raw);
        match self {
            ChatDialect::WhatsappBracket => {
                let normalized = normalize_meridiem(&normalized);
                let format = if has_four_digit_year(&normalized) {
                    "%m/%d/%Y, %I:%M:%S %p"
                } else {
                    "%m/%d/%y, %I:%M:%S %p"
                };
                NaiveDateTime::parse_from_str(&normalized, format).ok()
            }
            ChatDialect::WhatsappDash => {
                let format = if has_four_digit_year(&normalized) {
                    "%d/%m/%Y, %H:%M"
                } else {
                    "%d/%m/%y, %H:%M"
                };
                NaiveDateTime::parse_from_str(&normalized, format).ok()
            }
            ChatDialect::WhatsappIso => {
                let normalized = normalize_meridiem(&normalized);
                NaiveDateTime::parse_from_str(&normalized, "%Y-%m-%d, %I:%M %p").ok()
            }
            ChatDialect::Hangouts => {
                NaiveDateTime::parse_from_str(&normalized, "%Y-%m-%d %H:%M:%S").ok()
            }
        }
    }
}

impl fmt::Display for ChatDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ChatDialect {
    type Err = ChatLensError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|dialect| dialect.name() == wanted)
            .ok_or_else(|| {
                let known: Vec<&str> = Self::ALL.iter().map(ChatDialect::name).collect();
                ChatLensError::InvalidInput(format!(
                    "unknown transcript format '{s}' (expected one of: {})",
                    known.join(", ")
                ))
            })
    }
}

/// Collapse any run of Unicode whitespace (WhatsApp uses U+202F before AM/PM)
fn normalize_spaces(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// `3:06 p.m.` / `3:06pm` -> `3:06 PM`
fn normalize_meridiem(raw: &str) -> String {
    MERIDIEM
        .replace(raw, |caps: &regex::Captures<'_>| {
            format!(" {}M", caps[1].to_uppercase())
        })
        .into_owned()
}

fn has_four_digit_year(raw: &str) -> bool {
    raw.split(',')
        .next()
        .and_then(|date| date.rsplit('/').next())
        .is_some_and(|year| year.trim().len() == 4)
}

use std::fmt;
use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Tooltip attached to every email detection.
pub const EMAIL_TOOLTIP: &str = "PII - Email Address";

/// Tooltip attached to every health detection.
pub const HEALTH_TOOLTIP: &str = "PHI - Health Data";

/// Type of sensitive data that was detected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PiiType {
    Email,
    Health,
}

impl PiiType {
    /// Name used on the wire and as the persisted classification tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            PiiType::Email => "Email",
            PiiType::Health => "Health",
        }
    }

    pub fn tooltip(&self) -> &'static str {
        match self {
            PiiType::Email => EMAIL_TOOLTIP,
            PiiType::Health => HEALTH_TOOLTIP,
        }
    }

    /// Prefix of the placeholder tokens issued for this type.
    pub fn token_prefix(&self) -> &'static str {
        match self {
            PiiType::Email => "EMAIL_TOKEN_",
            PiiType::Health => "HEALTH_TOKEN_",
        }
    }
}

impl fmt::Display for PiiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PiiType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Email" => Ok(PiiType::Email),
            "Health" => Ok(PiiType::Health),
            other => anyhow::bail!("unknown classification tag: {}", other),
        }
    }
}

/// A located span of sensitive content.
///
/// Offsets count UTF-16 code units into the original, untokenized text, the
/// way browser string indices do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Detection {
    #[serde(rename = "type")]
    pub pii_type: PiiType,
    pub original_value: String,
    pub start_index: usize,
    pub end_index: usize,
    pub tooltip: String,
}

impl Detection {
    pub fn new(pii_type: PiiType, original_value: &str, start: usize, end: usize) -> Self {
        Self {
            pii_type,
            original_value: original_value.to_string(),
            start_index: start,
            end_index: end,
            tooltip: pii_type.tooltip().to_string(),
        }
    }
}

/// Maps byte positions of one text to UTF-16 code unit positions.
///
/// Positions must be passed in ascending order, as regex matches are.
pub(crate) struct Utf16Cursor<'a> {
    text: &'a str,
    byte: usize,
    units: usize,
}

impl<'a> Utf16Cursor<'a> {
    pub(crate) fn new(text: &'a str) -> Self {
        Self {
            text,
            byte: 0,
            units: 0,
        }
    }

    pub(crate) fn advance_to(&mut self, byte: usize) -> usize {
        self.units += self.text[self.byte..byte].encode_utf16().count();
        self.byte = byte;
        self.units
    }

    /// Detection for the byte span `start..end` of the text.
    pub(crate) fn detection(&mut self, pii_type: PiiType, start: usize, end: usize) -> Detection {
        let text = self.text;
        let value = &text[start..end];
        let start = self.advance_to(start);
        let end = self.advance_to(end);
        Detection::new(pii_type, value, start, end)
    }
}

lazy_static! {
    // Deliberately permissive: no validation beyond shape
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"(?i)[a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,}"
    ).unwrap();
}

/// Find every email address in `text`, leftmost-first and non-overlapping,
/// in ascending start order.
pub fn find_emails(text: &str) -> Vec<Detection> {
    let mut cursor = Utf16Cursor::new(text);
    EMAIL_REGEX
        .find_iter(text)
        .map(|mat| cursor.detection(PiiType::Email, mat.start(), mat.end()))
        .collect()
}

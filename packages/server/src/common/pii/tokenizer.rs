use std::ops::Range;

use regex::RegexBuilder;
use uuid::Uuid;

use super::detector::{Detection, PiiType};

/// A classification produced by tokenization, not yet persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewClassification {
    pub tag: PiiType,
    pub token: String,
    pub original_value: String,
}

/// Result of tokenizing one text.
#[derive(Debug, Clone)]
pub struct Tokenized {
    pub tokenized_text: String,
    /// Email entries first, then health entries, each in discovery order.
    pub classifications: Vec<NewClassification>,
}

/// Issue a fresh placeholder such as `{EMAIL_TOKEN_0f3c…}`.
pub fn issue_token(pii_type: PiiType) -> String {
    format!("{{{}{}}}", pii_type.token_prefix(), Uuid::new_v4().simple())
}

/// Replace each detected value with a unique token.
///
/// Emails are substituted first, then health terms. Each detection rewrites
/// the first case-insensitive occurrence of its value that is not inside an
/// already issued token. A detection whose value no longer occurs (because
/// an earlier substitution consumed it) is skipped and produces no
/// classification.
pub fn tokenize(original_text: &str, detections: &[Detection]) -> Tokenized {
    let mut tokenized_text = original_text.to_string();
    let mut classifications: Vec<NewClassification> = Vec::new();
    // Byte ranges of issued tokens within `tokenized_text`
    let mut issued: Vec<Range<usize>> = Vec::new();

    let ordered = detections
        .iter()
        .filter(|d| d.pii_type == PiiType::Email)
        .chain(detections.iter().filter(|d| d.pii_type == PiiType::Health));

    for detection in ordered {
        let Some(range) = find_unconsumed(&tokenized_text, &detection.original_value, &issued)
        else {
            tracing::debug!(
                pii_type = %detection.pii_type,
                start = detection.start_index,
                "Detection already consumed, skipping"
            );
            continue;
        };

        let token = issue_token(detection.pii_type);
        tokenized_text.replace_range(range.clone(), &token);
        shift_after(&mut issued, &range, token.len());
        issued.push(range.start..range.start + token.len());

        classifications.push(NewClassification {
            tag: detection.pii_type,
            token,
            original_value: detection.original_value.clone(),
        });
    }

    Tokenized {
        tokenized_text,
        classifications,
    }
}

/// First case-insensitive occurrence of `value` in `haystack` that does not
/// overlap any `issued` range.
fn find_unconsumed(haystack: &str, value: &str, issued: &[Range<usize>]) -> Option<Range<usize>> {
    if value.is_empty() {
        return None;
    }

    let pattern = RegexBuilder::new(&regex::escape(value))
        .case_insensitive(true)
        .build()
        .ok()?;

    let found = pattern
        .find_iter(haystack)
        .map(|mat| mat.range())
        .find(|r| !issued.iter().any(|p| r.start < p.end && p.start < r.end));
    found
}

/// Move ranges lying after `replaced` to account for the new length.
fn shift_after(ranges: &mut [Range<usize>], replaced: &Range<usize>, new_len: usize) {
    for r in ranges.iter_mut().filter(|r| r.start >= replaced.end) {
        *r = (r.start - replaced.len() + new_len)..(r.end - replaced.len() + new_len);
    }
}

use super::detector::{Detection, PiiType};

/// Tie-break rank when two detections start at the same offset.
fn source_priority(pii_type: PiiType) -> u8 {
    match pii_type {
        PiiType::Email => 0,
        PiiType::Health => 1,
    }
}

/// Merge pattern and classifier detections into one list ordered by start
/// offset, emails first on ties.
///
/// Overlapping spans are kept: detect callers want every candidate, and the
/// tokenizer resolves overlaps against the text it has already rewritten.
pub fn aggregate(emails: Vec<Detection>, health: Vec<Detection>) -> Vec<Detection> {
    let mut merged = emails;
    merged.extend(health);
    merged.sort_by_key(|d| (d.start_index, source_priority(d.pii_type)));
    merged
}

//! Ordering and truncation of matched recipients.
//!
//! Frequency decides which records make the cut; the final list is then put in
//! alphabetical order for display.

use std::cmp::Ordering;

use super::matcher::MatchBucket;
use super::natural::natural_cmp;
use crate::history::RecipientRecord;

/// Most used first, then by name and email.
fn by_usage(a: &RecipientRecord, b: &RecipientRecord) -> Ordering {
    b.use_count
        .cmp(&a.use_count)
        .then_with(|| by_name(a, b))
}

/// By name, then email, in natural case-insensitive order.
///
/// Falls back to exact byte order so that the ordering is total.
fn by_name(a: &RecipientRecord, b: &RecipientRecord) -> Ordering {
    natural_cmp(&a.name, &b.name)
        .then_with(|| natural_cmp(&a.email, &b.email))
        .then_with(|| a.email.cmp(&b.email))
        .then_with(|| a.name.cmp(&b.name))
}

/// Pick at most `max_results` records, boundary matches first.
///
/// Both buckets are ordered by use count. Mid-word matches only fill the quota
/// left over by boundary matches. The returned list is in selection order.
#[must_use]
pub fn select<'a>(bucket: MatchBucket<'a>, max_results: usize) -> Vec<&'a RecipientRecord> {
    let MatchBucket {
        mut boundary,
        mut mid,
        ..
    } = bucket;

    boundary.sort_by(|a, b| by_usage(a, b));
    boundary.truncate(max_results);

    let remaining = max_results - boundary.len();
    let mut selected = boundary;
    if remaining > 0 {
        mid.sort_by(|a, b| by_usage(a, b));
        selected.extend(mid.into_iter().take(remaining));
    }

    selected
}

/// Rank matched records for display.
///
/// Returns nothing when the only match is the full address that was typed.
#[must_use]
pub fn rank<'a>(bucket: MatchBucket<'a>, max_results: usize) -> Vec<&'a RecipientRecord> {
    if bucket.is_lone_exact_email() {
        return Vec::new();
    }

    let mut ranked = select(bucket, max_results);
    ranked.sort_by(|a, b| by_name(a, b));
    ranked
}

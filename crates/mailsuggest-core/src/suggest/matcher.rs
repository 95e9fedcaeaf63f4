//! Substring matching of recipients against typed text.

use std::collections::HashSet;

use crate::history::RecipientRecord;

/// Where in a field the typed text was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchClass {
    /// Match starts a field or follows a space.
    Boundary,
    /// Match starts in the middle of a word.
    Mid,
}

/// Records matching a query, split by match class.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchBucket<'a> {
    /// Lowercased query the bucket was built for.
    pub needle: String,
    /// Records with a match at a word boundary, in history order.
    pub boundary: Vec<&'a RecipientRecord>,
    /// Records matching only inside a word, in history order.
    pub mid: Vec<&'a RecipientRecord>,
}

impl MatchBucket<'_> {
    /// Total number of matched records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.boundary.len() + self.mid.len()
    }

    /// Whether nothing matched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.boundary.is_empty() && self.mid.is_empty()
    }

    /// Whether the only match is the address the user already typed in full.
    #[must_use]
    pub fn is_lone_exact_email(&self) -> bool {
        match (self.boundary.as_slice(), self.mid.as_slice()) {
            ([only], []) => only.email.to_lowercase() == self.needle,
            _ => false,
        }
    }
}

/// Classify how `needle` (already lowercased) matches a record.
///
/// Returns `None` when neither name nor email contains it.
#[must_use]
pub fn classify(needle: &str, record: &RecipientRecord) -> Option<MatchClass> {
    let name = record.name.to_lowercase();
    let email = record.email.to_lowercase();

    let pos_name = name.find(needle);
    let pos_email = email.find(needle);

    if pos_name.is_none() && pos_email.is_none() {
        return None;
    }

    if starts_word(&name, pos_name) || starts_word(&email, pos_email) {
        Some(MatchClass::Boundary)
    } else {
        Some(MatchClass::Mid)
    }
}

fn starts_word(haystack: &str, pos: Option<usize>) -> bool {
    pos.is_some_and(|pos| pos == 0 || haystack[..pos].ends_with(' '))
}

/// Scan `records` for case-insensitive matches of `query`.
///
/// An empty query matches nothing. A record whose email (ignoring case) was
/// already matched earlier in the history is not added again.
#[must_use]
pub fn match_records<'a>(query: &str, records: &'a [RecipientRecord]) -> MatchBucket<'a> {
    let mut bucket = MatchBucket {
        needle: query.to_lowercase(),
        ..MatchBucket::default()
    };
    if query.is_empty() {
        return bucket;
    }

    let mut seen = HashSet::new();
    for record in records {
        let Some(class) = classify(&bucket.needle, record) else {
            continue;
        };
        if !seen.insert(record.email.to_lowercase()) {
            continue;
        }
        match class {
            MatchClass::Boundary => bucket.boundary.push(record),
            MatchClass::Mid => bucket.mid.push(record),
        }
    }

    bucket
}

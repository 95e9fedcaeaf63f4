//! Recipient history: the records, the stores that persist them and the
//! in-memory updates applied before saving.

mod model;
mod repository;
mod store;
pub mod xml;

use std::collections::HashSet;

use chrono::{DateTime, Utc};

pub use model::{OBJECT_TYPE_DIST_LIST, OBJECT_TYPE_MAIL_USER, RecipientKind, RecipientRecord};
pub use repository::SqliteHistoryStore;
pub use store::{MemoryHistoryStore, RecipientStore};
pub use xml::XmlHistoryStore;

/// Drop every record whose email is in `emails`.
///
/// Comparison is exact and case-sensitive, unlike searching.
#[must_use]
pub fn remove_recipients(
    records: Vec<RecipientRecord>,
    emails: &HashSet<String>,
) -> Vec<RecipientRecord> {
    records
        .into_iter()
        .filter(|record| !emails.contains(&record.email))
        .collect()
}

/// Apply one use of a recipient to the history.
///
/// Returns `false` and leaves the history untouched when `email` is blank.
pub fn record_use(
    records: &mut Vec<RecipientRecord>,
    name: &str,
    email: &str,
    kind: RecipientKind,
    now: DateTime<Utc>,
) -> bool {
    let email = email.trim();
    let name = name.trim();
    if email.is_empty() {
        return false;
    }

    let email_lower = email.to_lowercase();
    if let Some(existing) = records
        .iter_mut()
        .find(|record| record.email.to_lowercase() == email_lower)
    {
        existing.use_count = existing.use_count.saturating_add(1);
        existing.last_used = now;
        existing.kind = kind;
        if !name.is_empty() {
            name.clone_into(&mut existing.name);
        }
    } else {
        records.push(RecipientRecord {
            name: name.to_owned(),
            email: email.to_owned(),
            use_count: 1,
            last_used: now,
            kind,
        });
    }

    true
}

//! Recipient suggestions for address autocomplete.

mod format;
mod matcher;
pub mod natural;
mod ranker;

use std::collections::HashSet;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::history::{RecipientKind, RecipientRecord, RecipientStore};
use crate::history::{record_use, remove_recipients};
use crate::{Error, Result};

pub use format::display_label;
pub use matcher::{MatchBucket, MatchClass, classify, match_records};
pub use ranker::{rank, select};

/// Number of suggestions returned when the caller does not say otherwise.
pub const DEFAULT_MAX_RESULTS: usize = 10;

/// Text typed into an address field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    /// Text to search for.
    pub text: String,
    /// Upper bound on the number of suggestions.
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

const fn default_max_results() -> usize {
    DEFAULT_MAX_RESULTS
}

impl Query {
    /// Creates a query returning at most [`DEFAULT_MAX_RESULTS`] suggestions.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            max_results: DEFAULT_MAX_RESULTS,
        }
    }

    /// Sets the maximum number of suggestions.
    #[must_use]
    pub const fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }
}

/// A single autocomplete suggestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    /// Label to show in the list.
    pub display_label: String,
    /// Email address of the recipient.
    pub email: String,
    /// Display name of the recipient.
    pub name: String,
}

impl From<&RecipientRecord> for Suggestion {
    fn from(record: &RecipientRecord) -> Self {
        Self {
            display_label: display_label(record),
            email: record.email.clone(),
            name: record.name.clone(),
        }
    }
}

/// Suggest recipients from a history snapshot.
#[must_use]
pub fn suggest(records: &[RecipientRecord], query: &Query) -> Vec<Suggestion> {
    let bucket = match_records(&query.text, records);
    debug!(
        boundary = bucket.boundary.len(),
        mid = bucket.mid.len(),
        "Matched recipient history"
    );

    rank(bucket, query.max_results)
        .into_iter()
        .map(Suggestion::from)
        .collect()
}

/// Suggestion service over a recipient history store.
pub struct SuggestionEngine<S> {
    store: S,
}

impl<S: RecipientStore> SuggestionEngine<S> {
    /// Creates an engine reading from `store`.
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// The underlying store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Load the history, treating an unreadable store as empty.
    pub async fn history(&self) -> Vec<RecipientRecord> {
        match self.store.load().await {
            Ok(records) => records,
            Err(e) => {
                warn!(error = %e, "Recipient history unavailable, using empty history");
                Vec::new()
            }
        }
    }

    /// Suggest recipients for `query`.
    ///
    /// Never fails: a store error yields no suggestions.
    pub async fn suggest(&self, query: &Query) -> Vec<Suggestion> {
        if query.text.is_empty() {
            return Vec::new();
        }

        let records = self.history().await;
        let suggestions = suggest(&records, query);
        debug!(
            query = %query.text,
            results = suggestions.len(),
            "Recipient suggestions ready"
        );
        suggestions
    }

    /// History with the given addresses removed.
    ///
    /// Nothing is persisted; pass the result to [`Self::save`].
    ///
    /// # Errors
    ///
    /// Returns an error if the history cannot be loaded.
    pub async fn delete_recipients(
        &self,
        emails: &HashSet<String>,
    ) -> Result<Vec<RecipientRecord>> {
        let records = self.history_strict().await?;
        let before = records.len();
        let remaining = remove_recipients(records, emails);
        debug!(removed = before - remaining.len(), "Recipients removed");
        Ok(remaining)
    }

    /// Persist a history.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub async fn save(&self, records: &[RecipientRecord]) -> Result<()> {
        self.store.save(records).await
    }

    /// Remove addresses and persist the result.
    ///
    /// Returns the number of removed records.
    ///
    /// # Errors
    ///
    /// Returns an error if the history cannot be loaded or saved.
    pub async fn delete_and_save(&self, emails: &HashSet<String>) -> Result<usize> {
        let records = self.history_strict().await?;
        let before = records.len();
        let remaining = remove_recipients(records, emails);
        let removed = before - remaining.len();
        if removed > 0 {
            self.save(&remaining).await?;
        }
        Ok(removed)
    }

    /// Record one use of a recipient and persist the history.
    ///
    /// # Errors
    ///
    /// Returns an error if `email` is blank or the history cannot be loaded or saved.
    pub async fn record(&self, name: &str, email: &str, kind: RecipientKind) -> Result<()> {
        let mut records = self.history_strict().await?;
        if !record_use(&mut records, name, email, kind, Utc::now()) {
            return Err(Error::InvalidRecipient("email address is empty".into()));
        }
        self.save(&records).await
    }

    async fn history_strict(&self) -> Result<Vec<RecipientRecord>> {
        self.store.load().await.map_err(|e| match e {
            Error::StoreUnavailable(_) => e,
            other => Error::StoreUnavailable(other.to_string()),
        })
    }
}

//! # mailsuggest-core
//!
//! Recipient autocomplete for the compose form of a webmail client.
//!
//! This crate provides:
//! - **Recipient history** - the list of previously used addresses with usage statistics
//! - **Suggestions** - substring matching, frequency ranking and display labels
//! - **History stores** - `SQLite` and XML document backends behind one trait
//! - **Action module** - the `getRecipientList` / `deleteRecipient` request handler
//!
//! ## Example
//!
//! ```ignore
//! use mailsuggest_core::{MemoryHistoryStore, Query, RecipientRecord, SuggestionEngine};
//!
//! let store = MemoryHistoryStore::new(vec![RecipientRecord::new("Bob Jones", "bob@example.com")]);
//! let engine = SuggestionEngine::new(store);
//!
//! for suggestion in engine.suggest(&Query::new("bob")).await {
//!     println!("{}", suggestion.display_label);
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod error;
pub mod history;
pub mod module;
pub mod suggest;

pub use error::{Error, Result};
pub use history::{
    MemoryHistoryStore, RecipientKind, RecipientRecord, RecipientStore, SqliteHistoryStore,
    XmlHistoryStore, record_use, remove_recipients,
};
pub use module::{Action, Response, handle_action, handle_actions};
pub use suggest::{
    DEFAULT_MAX_RESULTS, MatchBucket, MatchClass, Query, Suggestion, SuggestionEngine,
    display_label, match_records, rank, suggest,
};

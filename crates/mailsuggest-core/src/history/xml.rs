//! Recipient history stored as an XML document.
//!
//! The document layout is the one webmail clients keep in the message store:
//!
//! ```xml
//! <recipients>
//!   <recipient>
//!     <name>Bob Jones</name>
//!     <email>bob@example.com</email>
//!     <count>5</count>
//!     <last_used>1700000000</last_used>
//!     <objecttype>6</objecttype>
//!   </recipient>
//! </recipients>
//! ```
//!
//! Documents are windows-1252 on disk. Files that are valid UTF-8 are read as
//! such, so documents written by UTF-8 tools load too.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use chrono::DateTime;
use encoding_rs::WINDOWS_1252;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::model::{RecipientKind, RecipientRecord};
use super::store::RecipientStore;
use crate::Result;

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename = "recipients")]
struct HistoryDocument {
    #[serde(rename = "recipient", default)]
    recipients: Vec<DocumentEntry>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct DocumentEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    count: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_used: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    objecttype: Option<String>,
}

impl DocumentEntry {
    /// Convert to a record, or `None` when name or email is missing.
    fn into_record(self) -> Option<RecipientRecord> {
        let name = self.name?;
        let email = self.email?;

        let use_count = parse_number(self.count.as_deref()).unwrap_or(0);
        let last_used = parse_number(self.last_used.as_deref())
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .unwrap_or_default();
        let kind = parse_number(self.objecttype.as_deref())
            .map_or(RecipientKind::Person, RecipientKind::from_object_type);

        Some(RecipientRecord {
            name,
            email,
            use_count,
            last_used,
            kind,
        })
    }
}

impl From<&RecipientRecord> for DocumentEntry {
    fn from(record: &RecipientRecord) -> Self {
        Self {
            name: Some(record.name.clone()),
            email: Some(record.email.clone()),
            count: Some(record.use_count.to_string()),
            last_used: Some(record.last_used.timestamp().to_string()),
            objecttype: Some(record.kind.object_type().to_string()),
        }
    }
}

fn parse_number<T: std::str::FromStr>(value: Option<&str>) -> Option<T> {
    value.and_then(|v| v.trim().parse().ok())
}

/// Parse a history document.
///
/// An empty document is an empty history. Entries without a name or an email are
/// skipped.
///
/// # Errors
///
/// Returns an error if the document is not well-formed.
pub fn parse_document(xml: &str) -> Result<Vec<RecipientRecord>> {
    if xml.trim().is_empty() {
        return Ok(Vec::new());
    }

    let document: HistoryDocument = quick_xml::de::from_str(xml)?;
    let total = document.recipients.len();
    let records: Vec<RecipientRecord> = document
        .recipients
        .into_iter()
        .filter_map(DocumentEntry::into_record)
        .collect();

    if records.len() < total {
        warn!(
            skipped = total - records.len(),
            "Skipped malformed recipient history entries"
        );
    }

    Ok(records)
}

/// Render records as a history document.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn render_document(records: &[RecipientRecord]) -> Result<String> {
    let document = HistoryDocument {
        recipients: records.iter().map(DocumentEntry::from).collect(),
    };
    Ok(quick_xml::se::to_string(&document)?)
}

/// Decode the raw bytes of a history document.
///
/// Valid UTF-8 is taken as is; anything else is decoded as windows-1252, which
/// maps every byte to a character.
#[must_use]
pub fn decode_document(bytes: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(bytes) {
        Ok(xml) => Cow::Borrowed(xml),
        Err(_) => {
            debug!("Recipient history is not UTF-8, decoding as windows-1252");
            WINDOWS_1252.decode_without_bom_handling(bytes).0
        }
    }
}

/// Encode a rendered document as windows-1252.
///
/// Characters outside the code page become numeric character references.
#[must_use]
pub fn encode_document(xml: &str) -> Cow<'_, [u8]> {
    let (bytes, _, unmappable) = WINDOWS_1252.encode(xml);
    if unmappable {
        debug!("Recipient history has characters outside windows-1252");
    }
    bytes
}

/// Store that keeps the history in an XML document on disk.
#[derive(Debug, Clone)]
pub struct XmlHistoryStore {
    path: PathBuf,
}

impl XmlHistoryStore {
    /// Creates a store for the document at `path`.
    ///
    /// The file does not need to exist yet.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the history document.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecipientStore for XmlHistoryStore {
    async fn load(&self) -> Result<Vec<RecipientRecord>> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "No recipient history document yet");
            return Ok(Vec::new());
        }

        let bytes = tokio::fs::read(&self.path).await?;
        parse_document(&decode_document(&bytes))
    }

    async fn save(&self, records: &[RecipientRecord]) -> Result<()> {
        let xml = render_document(records)?;

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        // Write next to the target and rename so readers never see a partial file
        let tmp_path = self.path.with_extension("xml.tmp");
        tokio::fs::write(&tmp_path, encode_document(&xml)).await?;
        tokio::fs::rename(&tmp_path, &self.path).await?;

        info!(path = %self.path.display(), count = records.len(), "Recipient history saved");
        Ok(())
    }
}

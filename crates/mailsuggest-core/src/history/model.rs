//! Recipient history model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// MAPI object type of a single mail user.
pub const OBJECT_TYPE_MAIL_USER: u32 = 6;

/// MAPI object type of a distribution list.
pub const OBJECT_TYPE_DIST_LIST: u32 = 8;

/// What kind of addressee a history entry refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecipientKind {
    /// A single person with an email address.
    #[default]
    Person,
    /// A distribution list, shown by name only.
    DistributionList,
}

impl RecipientKind {
    /// Parse from database string representation.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "distribution_list" | "distlist" => Self::DistributionList,
            _ => Self::Person,
        }
    }

    /// Convert to database string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Person => "person",
            Self::DistributionList => "distribution_list",
        }
    }

    /// Map a MAPI object type to a kind.
    ///
    /// Only the mail user type is a person; every other type is treated as a list.
    #[must_use]
    pub const fn from_object_type(object_type: u32) -> Self {
        if object_type == OBJECT_TYPE_MAIL_USER {
            Self::Person
        } else {
            Self::DistributionList
        }
    }

    /// MAPI object type for this kind.
    #[must_use]
    pub const fn object_type(&self) -> u32 {
        match self {
            Self::Person => OBJECT_TYPE_MAIL_USER,
            Self::DistributionList => OBJECT_TYPE_DIST_LIST,
        }
    }
}

/// A previously used recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientRecord {
    /// Display name (may be empty).
    pub name: String,
    /// Email address as it was stored.
    pub email: String,
    /// Number of times this recipient has been used.
    #[serde(default)]
    pub use_count: u32,
    /// When this recipient was last used.
    #[serde(default)]
    pub last_used: DateTime<Utc>,
    /// Person or distribution list.
    #[serde(default)]
    pub kind: RecipientKind,
}

impl RecipientRecord {
    /// Creates a person record that has never been used.
    #[must_use]
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            use_count: 0,
            last_used: DateTime::default(),
            kind: RecipientKind::Person,
        }
    }

    /// Sets the use count.
    #[must_use]
    pub const fn with_use_count(mut self, use_count: u32) -> Self {
        self.use_count = use_count;
        self
    }

    /// Sets the kind.
    #[must_use]
    pub const fn with_kind(mut self, kind: RecipientKind) -> Self {
        self.kind = kind;
        self
    }

    /// Sets the last-used timestamp.
    #[must_use]
    pub const fn with_last_used(mut self, last_used: DateTime<Utc>) -> Self {
        self.last_used = last_used;
        self
    }
}

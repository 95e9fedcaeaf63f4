//! Display labels for suggestions.

use crate::history::{RecipientKind, RecipientRecord};

/// Label shown in the suggestion list.
///
/// People render as `Name <email>`, distribution lists as `[Name]`. The label is
/// plain text; escaping for the rendering context is up to the caller.
#[must_use]
pub fn display_label(record: &RecipientRecord) -> String {
    match record.kind {
        RecipientKind::Person => format!("{} <{}>", record.name, record.email),
        RecipientKind::DistributionList => format!("[{}]", record.name),
    }
}

//! Request handler for the compose form's address autocomplete.
//!
//! The web client sends a batch of actions tagged by `type`:
//!
//! ```json
//! {"type": "getRecipientList", "searchstring": "bob", "returnid": "to"}
//! {"type": "deleteRecipient", "deleteRecipient": "bob@x.com;old@x.com"}
//! ```
//!
//! Every action produces exactly one [`Response`].

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::Result;
use crate::history::RecipientStore;
use crate::suggest::{Query, SuggestionEngine};

/// An action sent by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Action {
    /// Look up suggestions for the text typed into an address field.
    #[serde(rename = "getRecipientList")]
    GetRecipientList {
        /// Typed text.
        searchstring: String,
        /// Identifier of the field, echoed back so the client can route the answer.
        #[serde(default)]
        returnid: String,
    },
    /// Forget one or more addresses.
    #[serde(rename = "deleteRecipient")]
    DeleteRecipient {
        /// Addresses separated by `;`.
        #[serde(rename = "deleteRecipient")]
        addresses: String,
    },
}

/// Answer to a single [`Action`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Response {
    /// Suggestions for a `getRecipientList` action.
    #[serde(rename = "recipientList")]
    RecipientList {
        /// The text the suggestions were computed for.
        searchstring: String,
        /// Field identifier from the request.
        returnid: String,
        /// Display labels in presentation order.
        results: Vec<String>,
    },
    /// Acknowledgement without payload.
    #[serde(rename = "none")]
    Done,
    /// The action could not be carried out.
    #[serde(rename = "error")]
    Error {
        /// Human-readable reason.
        message: String,
    },
}

/// Split a `;`-separated address list.
///
/// Surrounding whitespace is trimmed and empty entries are dropped; letter case
/// is kept.
#[must_use]
pub fn parse_address_list(addresses: &str) -> HashSet<String> {
    addresses
        .split(';')
        .map(str::trim)
        .filter(|address| !address.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Handle a single action.
///
/// # Errors
///
/// Returns an error if a deletion cannot be persisted. Lookups never fail.
pub async fn handle_action<S: RecipientStore>(
    engine: &SuggestionEngine<S>,
    action: Action,
    max_results: usize,
) -> Result<Response> {
    match action {
        Action::GetRecipientList {
            searchstring,
            returnid,
        } => {
            let query = Query::new(searchstring).with_max_results(max_results);
            let results = engine
                .suggest(&query)
                .await
                .into_iter()
                .map(|suggestion| suggestion.display_label)
                .collect();

            Ok(Response::RecipientList {
                searchstring: query.text,
                returnid,
                results,
            })
        }
        Action::DeleteRecipient { addresses } => {
            let emails = parse_address_list(&addresses);
            if emails.is_empty() {
                debug!("Delete request without addresses");
                return Ok(Response::Done);
            }

            let removed = engine.delete_and_save(&emails).await?;
            info!(removed, "Recipients deleted from history");
            Ok(Response::Done)
        }
    }
}

/// Handle a batch of actions in order.
///
/// A failing action is answered with [`Response::Error`] and does not stop the
/// rest of the batch.
pub async fn handle_actions<S: RecipientStore>(
    engine: &SuggestionEngine<S>,
    actions: Vec<Action>,
    max_results: usize,
) -> Vec<Response> {
    let mut responses = Vec::with_capacity(actions.len());
    for action in actions {
        let response = handle_action(engine, action, max_results)
            .await
            .unwrap_or_else(|e| Response::Error {
                message: e.to_string(),
            });
        responses.push(response);
    }
    responses
}

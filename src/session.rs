use crate::Id;
use chrono::{DateTime, Utc};
use serde_derive::{Deserialize, Serialize};

/// A summary of one chat conversation, as returned by the session-listing
/// endpoint. The client only reads these for the history and search views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub struct ChatSession {
    pub id: Id,
    pub created_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>,
    /// BCP-47-ish language code the conversation was held in, e.g. `en` or
    /// `hi`.
    pub language: String,
    pub message_count: u32,
    pub first_message: Option<String>,
}

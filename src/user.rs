use chrono::{DateTime, Utc};
use serde_derive::{Deserialize, Serialize};

/// The signed-in user, as reported by the identity endpoint.
///
/// Cached client-side only; the server remains the source of truth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub email: String,
    pub full_name: String,
    pub created_at: DateTime<Utc>,
}

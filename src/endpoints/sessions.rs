use crate::{ApiClient, ApiError, ChatSession};
use reqwest::Method;

/// Fetch a customer's recent chat sessions for the history and search
/// views, newest first.
pub async fn customer_sessions(
    api: &ApiClient,
    customer_id: &str,
    limit: usize,
) -> Result<Vec<ChatSession>, ApiError> {
    let path = format!("customer/{}/sessions", customer_id);

    let response = api
        .send(Method::GET, &path, |req| req.query(&[("limit", limit)]))
        .await?
        .error_for_status()?;

    let sessions: Vec<ChatSession> = response.json().await?;
    log::debug!("Fetched {} sessions", sessions.len());

    Ok(sessions)
}

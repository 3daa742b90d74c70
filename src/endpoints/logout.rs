use crate::{ApiClient, ApiError};
use reqwest::Method;

/// Tell the server to invalidate the session, logging the user out.
///
/// The local auth state is forgotten even when the server can't be
/// reached, so the UI always comes back to a signed-out view.
pub async fn logout(api: &ApiClient) -> Result<(), ApiError> {
    let result = api.send(Method::POST, "auth/logout", |req| req).await;

    api.store().clear();

    result?.error_for_status()?;

    log::info!("Logged out");
    Ok(())
}

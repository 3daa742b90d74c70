use crate::{ApiClient, ApiError, AuthUser};
use reqwest::Method;

/// Ask the server who the current session belongs to.
///
/// A 401 here is terminal: the session is invalid, the local auth state
/// has already been cleared by the time the error comes back, and no
/// refresh is attempted.
pub async fn me(api: &ApiClient) -> Result<AuthUser, ApiError> {
    let response = api
        .send(Method::GET, super::AUTH_ME_PATH, |req| req)
        .await?
        .error_for_status()?;

    let user: AuthUser = response.json().await?;
    log::debug!("The session belongs to {}", user.email);

    Ok(user)
}

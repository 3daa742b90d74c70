use crate::{ApiClient, ApiError, AuthUser};
use reqwest::{Method, StatusCode};
use serde_derive::{Deserialize, Serialize};

/// Authenticate with the Sehat server and populate the local auth state.
///
/// Sent outside the refresh protocol on purpose: a 401 from this endpoint
/// means the credentials were wrong, not that a session expired, so
/// attempting a refresh would only turn a typo into a forced sign-out.
pub async fn login(
    api: &ApiClient,
    email: &str,
    password: &str,
) -> Result<AuthUser, LoginError> {
    let data = Data { email, password };

    let response = api
        .send_unguarded(Method::POST, "auth/login", |req| req.json(&data))
        .await?;

    let status = response.status();

    if status == StatusCode::UNAUTHORIZED {
        log::info!("The server rejected the credentials for {}", email);
        return Err(LoginError::InvalidCredentials);
    }

    if !status.is_success() {
        let message = match response.json::<ErrorMessage>().await {
            Ok(doc) => doc.error,
            Err(_) => status.to_string(),
        };
        log::error!("Login failed with {}: {}", status, message);
        return Err(LoginError::RejectedByServer { message });
    }

    let user: AuthUser =
        response.json().await.map_err(ApiError::HttpClient)?;
    log::info!("Logged in as {}", user.email);

    api.store().set_auth(&user);

    Ok(user)
}

#[derive(Debug, Copy, Clone, Serialize, Deserialize)]
struct Data<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct ErrorMessage {
    error: String,
}

/// Possible errors that may be returned by [`login()`].
#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    /// The HTTP client encountered an error.
    #[error("Unable to send the login request")]
    Api(#[from] ApiError),
    /// The server didn't accept the email/password combination.
    #[error("The email or password is incorrect")]
    InvalidCredentials,
    /// A catch-all for when the server rejects a login request and we
    /// can't figure out a more specific error.
    #[error("Login was rejected by the server: {}", message)]
    RejectedByServer { message: String },
}

use crate::{ApiClient, ApiError};

/// Eagerly renew the session credential.
///
/// Goes through the same coordinator as the automatic 401 handling, so an
/// explicit renew never races a second refresh call onto the wire.
pub async fn refresh(api: &ApiClient) -> Result<(), ApiError> {
    api.refresh_session().await
}

use crate::{ApiClient, ApiError};
use reqwest::Method;
use serde_derive::{Deserialize, Serialize};

/// Probe the server and find out which of its backing services are up.
pub async fn health(api: &ApiClient) -> Result<HealthStatus, ApiError> {
    let response = api
        .send(Method::GET, "health", |req| req)
        .await?
        .error_for_status()?;

    let status: HealthStatus = response.json().await?;
    log::debug!("Server health: {:?}", status);

    Ok(status)
}

/// The server's own view of its health.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct HealthStatus {
    pub ok: bool,
    pub openai_configured: bool,
    pub services: ServiceStatus,
}

/// Which backing services answered the probe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct ServiceStatus {
    pub rag: bool,
    pub graph: bool,
    pub graph_fallback: bool,
    pub safety: bool,
}

//! The Sehat API's endpoints.

mod chat;
mod health;
mod login;
mod logout;
mod me;
mod refresh;
mod sessions;
mod transcribe;

pub use chat::chat;
pub use health::{health, HealthStatus, ServiceStatus};
pub use login::{login, LoginError};
pub use logout::logout;
pub use me::me;
pub use refresh::refresh;
pub use sessions::customer_sessions;
pub use transcribe::transcribe;

pub(crate) const AUTH_REFRESH_PATH: &str = "auth/refresh";
pub(crate) const AUTH_ME_PATH: &str = "auth/me";

/// Endpoints whose 401s are terminal. When the refresh or identity call
/// itself is unauthorized there is no credential left to renew, so the
/// client must not queue another refresh behind it.
pub(crate) fn is_auth_endpoint(path: &str) -> bool {
    path == AUTH_REFRESH_PATH || path == AUTH_ME_PATH
}

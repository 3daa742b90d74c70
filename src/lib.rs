//! A client-side interface to the Sehat health-assistant API.
//!
//! The crate wraps the backend's REST surface behind an [`ApiClient`] which
//! carries the HTTP-only session cookie on every request and transparently
//! renews an expired session. Individual operations live in the
//! [`endpoints`] module.

#![forbid(unsafe_code)]

#[cfg(test)]
#[macro_use]
extern crate pretty_assertions;

mod chat;
mod client;
pub mod endpoints;
mod id;
mod profile;
mod session;
mod storage;
mod tag;
mod user;

pub use chat::{
    ChatReply, Citation, Contraindication, CrisisGuidance, Fact,
    MentalHealthReport, PregnancyGuidance, PregnancyReport, Route,
    SafeActionSet, SafetyReport,
};
pub use client::{ApiClient, ApiError};
pub use id::Id;
pub use profile::HealthProfile;
pub use session::ChatSession;
pub use storage::{AuthStorage, AuthStore, MemoryStorage, UnavailableStorage};
pub use tag::{is_hashed_session_id, SessionTag};
pub use user::AuthUser;

/// The default user agent to use when communicating with the Sehat server.
pub const DEFAULT_USER_AGENT: &str =
    concat!(env!("CARGO_PKG_NAME"), "-", env!("CARGO_PKG_VERSION"));

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use sha2::{Digest, Sha256};
use std::{
    fmt::{self, Debug, Display, Formatter},
    ops::Deref,
};

/// The salt mixed into every tag. Must stay in sync with the server's
/// hashing secret, otherwise client- and server-derived tags for the same
/// session diverge and shared URLs stop resolving.
const SESSION_TAG_SALT: &str = "healthcare-chatbot-session-hash-v1";

/// A short, URL-safe display token standing in for an internal session
/// UUID.
///
/// Tags are deterministic (the same session always yields the same tag) and
/// non-reversible, which makes them safe to embed in shareable URLs without
/// exposing the raw identifier.
#[derive(Copy, Clone)]
pub struct SessionTag([u8; SessionTag::LEN]);

impl SessionTag {
    pub const LEN: usize = 16;

    /// Derive the display tag for a session identifier.
    ///
    /// Hashes the salted identifier with SHA-256 and base64url-encodes a
    /// prefix of the digest.
    pub fn derive(session_id: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(session_id.as_bytes());
        hasher.update(SESSION_TAG_SALT.as_bytes());
        let digest = hasher.finalize();

        // 12 digest bytes encode to exactly 16 base64 characters
        let encoded = URL_SAFE_NO_PAD.encode(&digest[..12]);
        SessionTag::from_ascii(&encoded)
    }

    /// Derive a tag without a cryptographic digest.
    ///
    /// A rolling integer hash of the salted identifier, padded out with a
    /// fragment of the identifier itself. This is NOT cryptographically
    /// secure and exists only as a last-resort for runtimes without a
    /// SHA-256 primitive; [`SessionTag::derive`] never falls back to it.
    pub fn fallback(session_id: &str) -> Self {
        let mut hash: u32 = 0;
        for byte in session_id.bytes().chain(SESSION_TAG_SALT.bytes()) {
            hash = hash.wrapping_mul(31).wrapping_add(u32::from(byte));
        }

        let mut tag = format!("{:08x}", hash);
        let room = SessionTag::LEN - tag.len();
        tag.extend(
            session_id
                .chars()
                .filter(|c| c.is_ascii_alphanumeric())
                .take(room),
        );
        while tag.len() < SessionTag::LEN {
            tag.push('0');
        }

        SessionTag::from_ascii(&tag)
    }

    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.0)
            .expect("The derivation process only emits ASCII")
    }

    fn from_ascii(s: &str) -> Self {
        let mut tag = [b'0'; SessionTag::LEN];

        for (slot, byte) in tag.iter_mut().zip(s.bytes()) {
            *slot = byte;
        }

        SessionTag(tag)
    }
}

impl Deref for SessionTag {
    type Target = str;

    fn deref(&self) -> &str { self.as_str() }
}

impl AsRef<str> for SessionTag {
    fn as_ref(&self) -> &str { self.as_str() }
}

impl PartialEq for SessionTag {
    fn eq(&self, other: &SessionTag) -> bool { self.0[..] == other.0[..] }
}

impl PartialEq<str> for SessionTag {
    fn eq(&self, other: &str) -> bool { self.as_str() == other }
}

impl Debug for SessionTag {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SessionTag").field(&self.as_str()).finish()
    }
}

impl Display for SessionTag {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(self.as_str(), f)
    }
}

/// Does this string look like a display tag rather than a raw session
/// identifier?
///
/// A structural heuristic, not a validator: raw UUIDs carry exactly four
/// `-` separators, tags are at most 16 characters. A derived tag can itself
/// contain four dashes (the base64url alphabet includes `-`) and would then
/// be misclassified as raw, and a short separator-free identifier passes as
/// a tag. Callers must treat the answer as best-effort.
pub fn is_hashed_session_id(id: &str) -> bool {
    id.matches('-').count() != 4 && id.len() <= SessionTag::LEN
}

#[cfg(test)]
mod tests {
    use super::*;

    const UUID: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";
    const OTHER_UUID: &str = "9b2e1f00-4c1d-4f6a-8a3e-5d7c2b9e0f11";

    #[test]
    fn derived_tags_are_deterministic() {
        let first = SessionTag::derive(UUID);
        let second = SessionTag::derive(UUID);

        assert_eq!(first, second);
        assert_eq!(first.as_str().len(), SessionTag::LEN);
    }

    #[test]
    fn distinct_sessions_get_distinct_tags() {
        let left = SessionTag::derive(UUID);
        let right = SessionTag::derive(OTHER_UUID);

        assert_ne!(left, right);
    }

    #[test]
    fn tags_are_url_safe() {
        let tag = SessionTag::derive(UUID);

        assert!(tag
            .as_str()
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn fallback_tags_are_deterministic_and_sized() {
        let first = SessionTag::fallback(UUID);
        let second = SessionTag::fallback(UUID);

        assert_eq!(first, second);
        assert_eq!(first.as_str().len(), SessionTag::LEN);
        assert_ne!(first, SessionTag::fallback(OTHER_UUID));
    }

    #[test]
    fn uuids_are_not_tags() {
        assert!(!is_hashed_session_id(UUID));
    }

    #[test]
    fn derived_tags_look_hashed() {
        let tag = SessionTag::derive(UUID);

        assert!(is_hashed_session_id(tag.as_str()));
    }

    #[test]
    fn heuristic_misclassifies_dashy_tags() {
        // The heuristic is structural. A 16-character token with exactly
        // four dashes reads as a raw identifier even though no UUID is that
        // short, and a separator-free string reads as a tag even when it
        // was never derived from anything.
        assert!(!is_hashed_session_id("ab-cd-ef-gh-ijkl"));
        assert!(is_hashed_session_id("notarealtag"));
    }
}

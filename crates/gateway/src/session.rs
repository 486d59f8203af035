//! Session issuance, validation and revocation.

use std::{sync::Arc, time::Duration};

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use clock::Clock;
use dashmap::DashMap;
use jiff::Timestamp;
use rand::RngCore;

use crate::error::AuthError;

/// An issued session.
#[derive(Debug, Clone)]
pub struct Session {
    /// The bearer token handed to the client.
    pub token: String,
    /// The client the session belongs to.
    pub client_id: String,
    /// When the session was issued.
    pub issued_at: Timestamp,
    /// When the session stops being valid.
    pub expires_at: Timestamp,
}

/// Issues and validates session tokens.
///
/// Expiry is lazy: nothing runs in the background, an expired session is
/// detected and evicted when it is next presented.
pub struct SessionManager {
    sessions: DashMap<String, Session>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl SessionManager {
    /// Creates a session manager issuing sessions with the given lifetime.
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            sessions: DashMap::new(),
            ttl,
            clock,
        }
    }

    /// Issues a fresh session for an already authenticated client.
    pub fn create_session(&self, client_id: &str) -> Session {
        let issued_at = self.clock.now();
        let expires_at = issued_at.checked_add(self.ttl).unwrap_or(Timestamp::MAX);

        let session = Session {
            token: generate_token(),
            client_id: client_id.to_string(),
            issued_at,
            expires_at,
        };

        self.sessions.insert(session.token.clone(), session.clone());

        session
    }

    /// Resolves a token to its client id.
    ///
    /// An expired session is evicted and reported as [`AuthError::SessionExpired`]
    /// once. Presenting the same token again yields [`AuthError::SessionNotFound`],
    /// the same answer a never-issued token gets.
    pub fn validate_session(&self, token: &str) -> Result<String, AuthError> {
        let now = self.clock.now();

        {
            let Some(session) = self.sessions.get(token) else {
                return Err(AuthError::SessionNotFound);
            };

            // Valid through expires_at inclusive, expired strictly after.
            if now <= session.expires_at {
                return Ok(session.client_id.clone());
            }
        }

        // The read guard must be dropped before removing from the same shard.
        self.sessions.remove(token);
        log::debug!("Evicted expired session");

        Err(AuthError::SessionExpired)
    }

    /// Drops a session. Returns whether one existed; revoking an unknown or
    /// already revoked token is not an error.
    pub fn revoke_session(&self, token: &str) -> bool {
        self.sessions.remove(token).is_some()
    }
}

/// 256 bits from the operating system CSPRNG, URL-safe base64 without
/// padding.
fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut bytes);

    URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clock::ManualClock;

    fn manager(ttl_secs: u64) -> (SessionManager, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::at_epoch());
        let manager = SessionManager::new(Duration::from_secs(ttl_secs), clock.clone());

        (manager, clock)
    }

    #[test]
    fn a_fresh_session_resolves_to_its_client() {
        let (manager, _clock) = manager(3600);
        let session = manager.create_session("demo_client_id_123");

        assert_eq!(Ok("demo_client_id_123".to_string()), manager.validate_session(&session.token));
    }

    #[test]
    fn sessions_expire_after_their_ttl() {
        let (manager, clock) = manager(3600);
        let session = manager.create_session("client");

        clock.advance(Duration::from_secs(3599));
        assert!(manager.validate_session(&session.token).is_ok());

        // Still valid at the boundary itself, expired strictly after.
        clock.advance(Duration::from_secs(1));
        assert!(manager.validate_session(&session.token).is_ok());

        clock.advance(Duration::from_secs(1));
        assert_eq!(Err(AuthError::SessionExpired), manager.validate_session(&session.token));
    }

    #[test]
    fn an_evicted_session_is_indistinguishable_from_an_unknown_one() {
        let (manager, clock) = manager(60);
        let session = manager.create_session("client");

        clock.advance(Duration::from_secs(61));

        assert_eq!(Err(AuthError::SessionExpired), manager.validate_session(&session.token));
        assert_eq!(Err(AuthError::SessionNotFound), manager.validate_session(&session.token));
    }

    #[test]
    fn an_unknown_token_is_not_found() {
        let (manager, _clock) = manager(3600);

        assert_eq!(Err(AuthError::SessionNotFound), manager.validate_session("made-up"));
    }

    #[test]
    fn revocation_takes_effect_immediately_and_is_idempotent() {
        let (manager, _clock) = manager(3600);
        let session = manager.create_session("client");

        assert!(manager.revoke_session(&session.token));
        assert_eq!(Err(AuthError::SessionNotFound), manager.validate_session(&session.token));
        assert!(!manager.revoke_session(&session.token));
    }

    #[test]
    fn each_session_gets_its_own_token() {
        let (manager, _clock) = manager(3600);

        let first = manager.create_session("client");
        let second = manager.create_session("client");

        assert_ne!(first.token, second.token);
        assert!(manager.validate_session(&first.token).is_ok());
        assert!(manager.validate_session(&second.token).is_ok());
    }

    #[test]
    fn tokens_are_url_safe_and_padding_free() {
        let (manager, _clock) = manager(3600);
        let session = manager.create_session("client");

        // 32 bytes of base64 without padding.
        assert_eq!(43, session.token.len());
        assert!(
            session
                .token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }
}

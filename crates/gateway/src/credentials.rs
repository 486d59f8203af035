//! The registered client roster, checked without leaking timing.

use std::collections::{BTreeMap, HashMap};

use rand::RngCore;
use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};

use crate::error::AuthError;

/// Validates client credentials against the roster loaded at startup.
///
/// Secrets are stored and compared as SHA-256 digests. The comparison walks
/// all 32 digest bytes unconditionally, so the time spent on a wrong secret
/// does not depend on how much of it matches. Unknown client ids are
/// compared against a decoy digest to keep their cost in line with known
/// ones.
pub struct CredentialStore {
    digests: HashMap<String, [u8; 32]>,
    decoy: [u8; 32],
}

impl CredentialStore {
    /// Builds the store from the configured roster.
    pub fn new(clients: &BTreeMap<String, SecretString>) -> Self {
        let digests = clients
            .iter()
            .map(|(client_id, secret)| (client_id.clone(), digest(secret.expose_secret().as_bytes())))
            .collect();

        // A digest of random bytes can never equal the digest of any
        // supplied secret.
        let mut noise = [0u8; 32];
        rand::rngs::OsRng.fill_bytes(&mut noise);

        Self {
            digests,
            decoy: digest(&noise),
        }
    }

    /// Checks a client id and secret pair against the roster.
    pub fn validate(&self, client_id: &str, client_secret: &str) -> Result<(), AuthError> {
        let known = self.digests.get(client_id);
        let reference = known.unwrap_or(&self.decoy);
        let supplied = digest(client_secret.as_bytes());

        // The comparison runs before the roster check so unknown ids do the
        // same work as known ones, against the decoy.
        let matches = digests_match(reference, &supplied);

        if known.is_some() && matches {
            return Ok(());
        }

        log::debug!("Credential validation failed for client '{client_id}'");

        Err(AuthError::InvalidCredentials)
    }
}

fn digest(input: &[u8]) -> [u8; 32] {
    Sha256::digest(input).into()
}

fn digests_match(expected: &[u8; 32], supplied: &[u8; 32]) -> bool {
    expected
        .iter()
        .zip(supplied)
        .fold(0u8, |acc, (lhs, rhs)| acc | (lhs ^ rhs))
        == 0
}

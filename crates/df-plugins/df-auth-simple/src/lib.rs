//! # df-auth-simple
//!
//! Argon2-based implementation of `AuthProvider` plus stateless JWT
//! bearer tokens. Token issuance is a collaborator of the ledger, not
//! part of it; this plugin keeps the whole concern behind one port.

use anyhow::Context;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;
use df_core::traits::AuthProvider;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Token lifetime in seconds (7 days, matching the usual session length
/// of the client).
const TOKEN_TTL_SECS: i64 = 7 * 24 * 60 * 60;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// The user id the token was issued for.
    sub: Uuid,
    exp: i64,
    iat: i64,
}

pub struct SimpleAuthProvider {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl SimpleAuthProvider {
    /// Accepts the signing secret (e.g., from an environment variable).
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

#[async_trait]
impl AuthProvider for SimpleAuthProvider {
    /// Hashes a password with a fresh random salt, returning the PHC string.
    fn hash_password(&self, password: &str) -> anyhow::Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("password hashing failed: {e}"))?;
        Ok(hash.to_string())
    }

    /// Verifies a password against a stored Argon2 hash.
    fn verify_password(&self, password: &str, hash: &str) -> bool {
        let parsed_hash = match PasswordHash::new(hash) {
            Ok(p) => p,
            Err(_) => return false,
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }

    fn issue_token(&self, user_id: Uuid) -> anyhow::Result<String> {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims { sub: user_id, exp: now + TOKEN_TTL_SECS, iat: now };
        encode(&Header::default(), &claims, &self.encoding_key).context("token encoding failed")
    }

    fn verify_token(&self, token: &str) -> Option<Uuid> {
        decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .ok()
            .map(|data| data.claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_round_trip() {
        let auth = SimpleAuthProvider::new("test-secret");
        let hash = auth.hash_password("hunter2").unwrap();
        assert!(auth.verify_password("hunter2", &hash));
        assert!(!auth.verify_password("hunter3", &hash));
        assert!(!auth.verify_password("hunter2", "not-a-phc-string"));
    }

    #[test]
    fn token_round_trip() {
        let auth = SimpleAuthProvider::new("test-secret");
        let user_id = Uuid::now_v7();
        let token = auth.issue_token(user_id).unwrap();
        assert_eq!(auth.verify_token(&token), Some(user_id));
    }

    #[test]
    fn token_rejected_with_wrong_secret() {
        let issuer = SimpleAuthProvider::new("secret-a");
        let verifier = SimpleAuthProvider::new("secret-b");
        let token = issuer.issue_token(Uuid::now_v7()).unwrap();
        assert_eq!(verifier.verify_token(&token), None);
        assert_eq!(verifier.verify_token("garbage"), None);
    }
}

//! Admin password checks and session issuance.

use crate::config::AdminSecret;
use crate::party_store::AdminSession;
use rand::Rng;
use rand_distr::Alphanumeric;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::warn;

const TOKEN_LENGTH: usize = 64;

pub fn generate_session_token() -> String {
    let rng = rand::rng();
    rng.sample_iter(&Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

pub fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

pub fn new_admin_session(now: i64, ttl: Duration) -> AdminSession {
    AdminSession {
        token: generate_session_token(),
        created_at: now,
        expires_at: now + ttl.as_secs() as i64,
    }
}

pub fn verify_admin_password(secret: &AdminSecret, candidate: &str) -> bool {
    match secret {
        AdminSecret::Plain(expected) => expected == candidate,
        AdminSecret::Argon2Hash(hash) => match party_argon2::verify(candidate.as_bytes(), hash) {
            Ok(valid) => valid,
            Err(err) => {
                warn!("Configured admin password hash is unusable: {}", err);
                false
            }
        },
    }
}

pub use party_argon2::hash as hash_password;

mod party_argon2 {
    use anyhow::{anyhow, Result};
    use argon2::{
        password_hash::{
            rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
        },
        Argon2,
    };

    /// PHC string with a fresh random salt.
    pub fn hash(plain: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        Ok(Argon2::default()
            .hash_password(plain.as_bytes(), &salt)
            .map_err(|err| anyhow!("{}", err))?
            .to_string())
    }

    pub fn verify<T: AsRef<str>>(plain_pw: &[u8], target_hash: T) -> Result<bool> {
        let password_hash =
            PasswordHash::new(target_hash.as_ref()).map_err(|err| anyhow!("{}", err))?;
        Ok(Argon2::default()
            .verify_password(plain_pw, &password_hash)
            .is_ok())
    }
}

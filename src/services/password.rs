//! Argon2id password hashing.
//!
//! Hashes are stored in PHC string format, so salt and cost parameters travel
//! with each hash and verification always re-derives with the stored values.

use std::sync::Arc;

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};
use tokio::task;
use tracing::error;

use crate::{config::PasswordHashingConfig, error::ServiceError};

/// Password used to build the hash checked when an identifier is unknown.
const DUMMY_PASSWORD: &[u8] = b"unknown-identifier";

/// Hashing and verification entry point shared by credential operations.
#[derive(Clone)]
pub struct PasswordScheme {
    params: Params,
    dummy_hash: Arc<str>,
}

impl PasswordScheme {
    /// Build the scheme from configured costs.
    pub fn new(config: PasswordHashingConfig) -> Result<Self, ServiceError> {
        let params = Params::new(
            config.memory_kib,
            config.iterations,
            config.parallelism,
            None,
        )
        .map_err(|err| ServiceError::Internal(format!("invalid argon2 parameters: {err}")))?;

        let dummy_hash = hash_with(&params, DUMMY_PASSWORD)?;

        Ok(Self {
            params,
            dummy_hash: dummy_hash.into(),
        })
    }

    /// Hash `password` with a fresh random salt on the blocking pool.
    pub async fn hash(&self, password: String) -> Result<String, ServiceError> {
        let params = self.params.clone();
        task::spawn_blocking(move || hash_with(&params, password.as_bytes()))
            .await
            .map_err(|err| ServiceError::Internal(format!("hashing task failed: {err}")))?
    }

    /// Check `password` against `stored`.
    ///
    /// When `stored` is `None` the candidate is checked against a dummy hash so
    /// unknown identifiers cost as much as wrong passwords; the result is then
    /// always `false`.
    pub async fn verify(
        &self,
        password: String,
        stored: Option<String>,
    ) -> Result<bool, ServiceError> {
        let known = stored.is_some();
        let stored = stored.unwrap_or_else(|| self.dummy_hash.to_string());

        let matches = task::spawn_blocking(move || verify_with(password.as_bytes(), &stored))
            .await
            .map_err(|err| ServiceError::Internal(format!("verification task failed: {err}")))??;

        Ok(known && matches)
    }
}

fn hasher(params: &Params) -> Argon2<'static> {
    Argon2::new(Algorithm::Argon2id, Version::V0x13, params.clone())
}

fn hash_with(params: &Params, password: &[u8]) -> Result<String, ServiceError> {
    let salt = SaltString::generate(&mut OsRng);
    hasher(params)
        .hash_password(password, &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| ServiceError::Internal(format!("password hashing failed: {err}")))
}

fn verify_with(password: &[u8], stored: &str) -> Result<bool, ServiceError> {
    let parsed = PasswordHash::new(stored).map_err(|err| {
        error!(error = %err, "stored password hash is malformed");
        ServiceError::Internal("stored password hash is malformed".into())
    })?;

    // Parameters come from the parsed hash, not from the current configuration.
    Ok(Argon2::default().verify_password(password, &parsed).is_ok())
}

#[cfg(test)]
pub(crate) fn cheap_scheme() -> PasswordScheme {
    PasswordScheme::new(PasswordHashingConfig {
        memory_kib: 64,
        iterations: 1,
        parallelism: 1,
    })
    .expect("valid test parameters")
}

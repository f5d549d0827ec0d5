//! Argon2id implementation of the [`PasswordHasher`] port.
//!
//! Hashing and verification are CPU-bound, so both run on Tokio's blocking
//! pool. Stored hashes are PHC strings; the parameters embedded in them are
//! compared with the configured ones to flag hashes that need upgrading.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{
    self, PasswordHash as PhcHash, PasswordHasher as _, PasswordVerifier as _, SaltString,
};
use argon2::{Algorithm, Argon2, Params, Version};
use async_trait::async_trait;
use tracing::warn;
use zeroize::Zeroizing;

use crate::domain::ports::{PasswordHashError, PasswordHasher, PasswordVerification};
use crate::domain::{Password, PasswordHash, UserId};

/// Argon2 cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Argon2Costs {
    /// Memory cost in KiB.
    pub memory_kib: u32,
    /// Number of passes.
    pub iterations: u32,
    /// Degree of parallelism.
    pub parallelism: u32,
}

impl Default for Argon2Costs {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

impl Argon2Costs {
    /// Smallest costs argon2 accepts. Only suitable for tests.
    pub fn minimal() -> Self {
        Self {
            memory_kib: Params::MIN_M_COST,
            iterations: Params::MIN_T_COST,
            parallelism: Params::MIN_P_COST,
        }
    }
}

/// Argon2id hasher with fixed cost parameters.
#[derive(Debug, Clone, Default)]
pub struct Argon2PasswordHasher {
    params: Params,
}

impl Argon2PasswordHasher {
    /// Build a hasher, rejecting costs argon2 considers invalid.
    pub fn new(costs: Argon2Costs) -> Result<Self, PasswordHashError> {
        let params = Params::new(costs.memory_kib, costs.iterations, costs.parallelism, None)
            .map_err(|err| PasswordHashError::hashing(format!("invalid argon2 costs: {err}")))?;
        Ok(Self { params })
    }

    fn engine(params: Params) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
    }
}

/// Whether `hash` was produced with exactly the current algorithm and costs.
fn is_current(hash: &PhcHash<'_>, params: &Params) -> bool {
    if hash.algorithm != Algorithm::Argon2id.ident() {
        return false;
    }
    if hash.version != Some(u32::from(Version::V0x13)) {
        return false;
    }
    Params::try_from(hash).is_ok_and(|stored| {
        stored.m_cost() == params.m_cost()
            && stored.t_cost() == params.t_cost()
            && stored.p_cost() == params.p_cost()
    })
}

fn verify_blocking(
    params: Params,
    stored: &str,
    password: &[u8],
) -> Result<PasswordVerification, password_hash::Error> {
    let parsed = PhcHash::new(stored)?;
    match Argon2PasswordHasher::engine(params.clone()).verify_password(password, &parsed) {
        Ok(()) if is_current(&parsed, &params) => Ok(PasswordVerification::Success),
        Ok(()) => Ok(PasswordVerification::SuccessRehashNeeded),
        Err(password_hash::Error::Password) => Ok(PasswordVerification::Failed),
        Err(err) => Err(err),
    }
}

#[async_trait]
impl PasswordHasher for Argon2PasswordHasher {
    async fn hash(&self, password: &Password) -> Result<PasswordHash, PasswordHashError> {
        let params = self.params.clone();
        let secret = Zeroizing::new(password.expose().to_owned());
        let encoded = tokio::task::spawn_blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            Self::engine(params)
                .hash_password(secret.as_bytes(), &salt)
                .map(|hash| hash.to_string())
        })
        .await
        .map_err(|err| PasswordHashError::worker(err.to_string()))?
        .map_err(|err| PasswordHashError::hashing(err.to_string()))?;

        PasswordHash::new(encoded).map_err(|err| PasswordHashError::hashing(err.to_string()))
    }

    async fn verify(
        &self,
        stored: &PasswordHash,
        password: &Password,
        subject: &UserId,
    ) -> PasswordVerification {
        let params = self.params.clone();
        let stored = stored.as_str().to_owned();
        let secret = Zeroizing::new(password.expose().to_owned());
        let outcome =
            tokio::task::spawn_blocking(move || verify_blocking(params, &stored, secret.as_bytes()))
                .await;

        match outcome {
            Ok(Ok(verification)) => verification,
            Ok(Err(err)) => {
                warn!(user_id = %subject, error = %err, "stored password hash is unusable");
                PasswordVerification::Failed
            }
            Err(err) => {
                warn!(user_id = %subject, error = %err, "password verification worker failed");
                PasswordVerification::Failed
            }
        }
    }
}

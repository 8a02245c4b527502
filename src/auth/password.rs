use std::str::FromStr;

use argon2::{
    password_hash::{
        Error as HashError, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
    },
    Argon2,
};
use rand::rngs::OsRng;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::error;

/// How new password hashes are produced.
///
/// `Sha256` is an unsalted single-round digest kept for compatibility with
/// hashes already stored in that format. It is weak against offline attacks;
/// `Argon2` should be preferred for new deployments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PasswordScheme {
    #[default]
    Sha256,
    Argon2,
}

impl FromStr for PasswordScheme {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sha256" => Ok(Self::Sha256),
            "argon2" => Ok(Self::Argon2),
            other => anyhow::bail!("unknown password scheme: {other}"),
        }
    }
}

impl PasswordScheme {
    pub fn hash(self, plain: &str) -> anyhow::Result<String> {
        match self {
            Self::Sha256 => Ok(sha256_hex(plain)),
            Self::Argon2 => argon2_hash(plain),
        }
    }
}

/// Checks `plain` against a stored digest of either scheme.
pub fn verify_password(plain: &str, stored: &str) -> anyhow::Result<bool> {
    if stored.starts_with("$argon2") {
        return argon2_verify(plain, stored);
    }
    let candidate = sha256_hex(plain);
    Ok(constant_time_eq(candidate.as_bytes(), stored.as_bytes()))
}

fn sha256_hex(plain: &str) -> String {
    hex::encode(Sha256::digest(plain.as_bytes()))
}

fn argon2_hash(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

fn argon2_verify(plain: &str, stored: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(stored).map_err(|e| {
        error!(error = %e, "argon2 parse hash error");
        anyhow::anyhow!(e.to_string())
    })?;
    if parsed.salt.is_none() || parsed.hash.is_none() {
        error!("argon2 hash has no salt or output");
        anyhow::bail!("malformed argon2 hash");
    }
    match Argon2::default().verify_password(plain.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(HashError::Password) => Ok(false),
        Err(e) => {
            error!(error = %e, "argon2 verify error");
            Err(anyhow::anyhow!(e.to_string()))
        }
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

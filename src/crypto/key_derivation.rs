//! Archive key derivation
//!
//! Every encrypted archive gets its own AES-256 key, derived with Argon2id
//! from the backup secret and a salt drawn for that archive. The salt and the
//! cost travel inside the archive envelope, so an archive still opens after
//! the configured cost changes. Costs read back from an envelope are bounded
//! before any memory is committed to them.

use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::error::{PastificioError, PastificioResult};

/// AES-256 key length
pub const KEY_LEN: usize = 32;

/// Largest accepted memory cost, in KiB (1 GiB)
pub const MAX_MEMORY_COST: u32 = 1024 * 1024;

/// Largest accepted number of passes
pub const MAX_TIME_COST: u32 = 16;

/// Largest accepted number of lanes
pub const MAX_PARALLELISM: u32 = 16;

/// Argon2id cost plus the salt of one archive
///
/// In `config.json` the salt is empty: only the cost is configured, and each
/// archive draws its own salt with [`with_fresh_salt`](Self::with_fresh_salt).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyDerivationParams {
    #[serde(default)]
    pub salt: String,
    /// KiB of memory per derivation
    pub memory_cost: u32,
    pub time_cost: u32,
    pub parallelism: u32,
}

impl Default for KeyDerivationParams {
    fn default() -> Self {
        Self {
            salt: String::new(),
            memory_cost: 64 * 1024,
            time_cost: 3,
            parallelism: 4,
        }
    }
}

impl KeyDerivationParams {
    pub fn with_values(salt: String, memory_cost: u32, time_cost: u32, parallelism: u32) -> Self {
        Self {
            salt,
            memory_cost,
            time_cost,
            parallelism,
        }
    }

    /// The same cost with a newly drawn salt
    pub fn with_fresh_salt(&self) -> Self {
        Self {
            salt: SaltString::generate(&mut OsRng).to_string(),
            ..self.clone()
        }
    }

    /// Reject a cost of zero or one above the `MAX_*` bounds
    pub fn check_cost(&self) -> PastificioResult<()> {
        let bounded = [
            ("memory_cost", self.memory_cost, MAX_MEMORY_COST),
            ("time_cost", self.time_cost, MAX_TIME_COST),
            ("parallelism", self.parallelism, MAX_PARALLELISM),
        ];
        for (field, value, max) in bounded {
            if value == 0 || value > max {
                return Err(PastificioError::Validation(format!(
                    "Key derivation {} must be between 1 and {}, got {}",
                    field, max, value
                )));
            }
        }
        Ok(())
    }
}

/// Key material, wiped on drop
pub struct DerivedKey {
    key: [u8; KEY_LEN],
}

impl DerivedKey {
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.key
    }
}

impl Drop for DerivedKey {
    fn drop(&mut self) {
        self.key.zeroize();
    }
}

/// Derive the key for one archive from the backup secret
pub fn derive_key(secret: &str, params: &KeyDerivationParams) -> PastificioResult<DerivedKey> {
    params
        .check_cost()
        .map_err(|e| PastificioError::Encryption(e.to_string()))?;

    let cost = Params::new(
        params.memory_cost,
        params.time_cost,
        params.parallelism,
        Some(KEY_LEN),
    )
    .map_err(|e| PastificioError::Encryption(format!("Invalid Argon2 parameters: {}", e)))?;

    let mut key = [0u8; KEY_LEN];
    Argon2::new(Algorithm::Argon2id, Version::V0x13, cost)
        .hash_password_into(secret.as_bytes(), params.salt.as_bytes(), &mut key)
        .map_err(|e| PastificioError::Encryption(format!("Key derivation failed: {}", e)))?;

    Ok(DerivedKey { key })
}

#[cfg(test)]
pub(crate) fn cheap_params() -> KeyDerivationParams {
    KeyDerivationParams::with_values(String::new(), 64, 1, 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_salt_same_key() {
        let params = cheap_params().with_fresh_salt();
        let first = derive_key("segreto", &params).unwrap();
        let second = derive_key("segreto", &params).unwrap();
        assert_eq!(first.as_bytes(), second.as_bytes());
    }

    #[test]
    fn test_secret_and_salt_both_matter() {
        let params = cheap_params().with_fresh_salt();
        let key = derive_key("segreto", &params).unwrap();

        let other_secret = derive_key("sbagliato", &params).unwrap();
        assert_ne!(key.as_bytes(), other_secret.as_bytes());

        let other_salt = derive_key("segreto", &params.with_fresh_salt()).unwrap();
        assert_ne!(key.as_bytes(), other_salt.as_bytes());
    }

    #[test]
    fn test_fresh_salt_keeps_cost() {
        let base = cheap_params();
        let salted = base.with_fresh_salt();
        assert!(!salted.salt.is_empty());
        assert_eq!(salted.memory_cost, base.memory_cost);
        assert_eq!(salted.time_cost, base.time_cost);
        assert_ne!(salted.salt, base.with_fresh_salt().salt);
    }

    #[test]
    fn test_empty_salt_rejected() {
        let result = derive_key("segreto", &cheap_params());
        assert!(matches!(result, Err(PastificioError::Encryption(_))));
    }

    #[test]
    fn test_cost_bounds() {
        assert!(KeyDerivationParams::default().check_cost().is_ok());
        assert!(cheap_params().check_cost().is_ok());

        let huge = KeyDerivationParams::with_values(String::new(), u32::MAX, 1, 1);
        assert!(huge.check_cost().unwrap_err().is_validation());
        let idle = KeyDerivationParams::with_values(String::new(), 64, 0, 1);
        assert!(idle.check_cost().is_err());
        let wide = KeyDerivationParams::with_values(String::new(), 64, 1, MAX_PARALLELISM + 1);
        assert!(wide.check_cost().is_err());
    }

    #[test]
    fn test_huge_cost_refused_before_deriving() {
        let params = KeyDerivationParams::with_values(String::new(), u32::MAX, 1, 1)
            .with_fresh_salt();
        let result = derive_key("segreto", &params);
        assert!(matches!(result, Err(PastificioError::Encryption(_))));
    }
}

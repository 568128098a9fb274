//! AES-256-GCM encryption/decryption
//!
//! Provides authenticated encryption for archives at rest. Each encryption
//! draws a fresh salt and nonce; both travel with the ciphertext in an
//! [`EncryptedData`] envelope.

use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::{
    aead::{Aead, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};

use crate::error::{PastificioError, PastificioResult};

use super::key_derivation::{derive_key, KeyDerivationParams};

/// Size of the AES-GCM nonce in bytes (96 bits)
const NONCE_SIZE: usize = 12;

/// Current envelope version
const ENVELOPE_VERSION: u8 = 1;

/// Encrypted data with the parameters needed to decrypt it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncryptedData {
    /// Version for future algorithm upgrades
    #[serde(default = "default_version")]
    pub version: u8,
    /// Key derivation parameters, including the per-archive salt
    pub kdf: KeyDerivationParams,
    /// The nonce used for this encryption (base64 encoded)
    pub nonce: String,
    /// The encrypted ciphertext with authentication tag (base64 encoded)
    pub ciphertext: String,
}

fn default_version() -> u8 {
    1
}

impl EncryptedData {
    fn new(kdf: KeyDerivationParams, nonce: &[u8], ciphertext: &[u8]) -> Self {
        Self {
            version: ENVELOPE_VERSION,
            kdf,
            nonce: STANDARD.encode(nonce),
            ciphertext: STANDARD.encode(ciphertext),
        }
    }

    fn decode_nonce(&self) -> PastificioResult<Vec<u8>> {
        STANDARD
            .decode(&self.nonce)
            .map_err(|e| PastificioError::Decryption(format!("Invalid nonce encoding: {}", e)))
    }

    fn decode_ciphertext(&self) -> PastificioResult<Vec<u8>> {
        STANDARD
            .decode(&self.ciphertext)
            .map_err(|e| PastificioError::Decryption(format!("Invalid ciphertext encoding: {}", e)))
    }

    /// Serialize the envelope to bytes
    pub fn to_bytes(&self) -> PastificioResult<Vec<u8>> {
        serde_json::to_vec(self)
            .map_err(|e| PastificioError::Encryption(format!("Failed to serialize envelope: {}", e)))
    }

    /// Parse an envelope from bytes
    pub fn from_bytes(bytes: &[u8]) -> PastificioResult<Self> {
        serde_json::from_slice(bytes)
            .map_err(|e| PastificioError::Decryption(format!("Invalid encryption envelope: {}", e)))
    }
}

/// Encrypt plaintext with a key derived from `passphrase`
///
/// A fresh salt is drawn on top of the cost in `params`.
pub fn encrypt(
    plaintext: &[u8],
    passphrase: &str,
    params: &KeyDerivationParams,
) -> PastificioResult<EncryptedData> {
    let kdf = params.with_fresh_salt();
    let key = derive_key(passphrase, &kdf)?;

    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| PastificioError::Encryption(format!("Failed to create cipher: {}", e)))?;

    let mut nonce_bytes = [0u8; NONCE_SIZE];
    OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, plaintext)
        .map_err(|e| PastificioError::Encryption(format!("Encryption failed: {}", e)))?;

    Ok(EncryptedData::new(kdf, &nonce_bytes, &ciphertext))
}

/// Decrypt an envelope with a key derived from `passphrase`
pub fn decrypt(encrypted: &EncryptedData, passphrase: &str) -> PastificioResult<Vec<u8>> {
    if encrypted.version != ENVELOPE_VERSION {
        return Err(PastificioError::Decryption(format!(
            "Unsupported encryption version: {}",
            encrypted.version
        )));
    }

    // The cost comes from the file, so it is bounded before deriving
    encrypted
        .kdf
        .check_cost()
        .map_err(|e| PastificioError::Decryption(e.to_string()))?;
    let key = derive_key(passphrase, &encrypted.kdf)
        .map_err(|e| PastificioError::Decryption(e.to_string()))?;

    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| PastificioError::Decryption(format!("Failed to create cipher: {}", e)))?;

    let nonce_bytes = encrypted.decode_nonce()?;
    if nonce_bytes.len() != NONCE_SIZE {
        return Err(PastificioError::Decryption(format!(
            "Invalid nonce size: expected {}, got {}",
            NONCE_SIZE,
            nonce_bytes.len()
        )));
    }
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = encrypted.decode_ciphertext()?;

    cipher.decrypt(nonce, ciphertext.as_ref()).map_err(|_| {
        PastificioError::Decryption("Decryption failed: invalid key or corrupted data".to_string())
    })
}

//! Cryptographic functions for the backup pipeline
//!
//! Provides AES-256-GCM encryption with Argon2id key derivation
//! for the optional `.enc` stage of archives.

pub mod encryption;
pub mod key_derivation;
pub mod secure_memory;

pub use encryption::{decrypt, encrypt, EncryptedData};
pub use key_derivation::{derive_key, DerivedKey, KeyDerivationParams};
pub use secure_memory::SecureString;

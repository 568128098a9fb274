//! Byte transform stages applied to archive payloads
//!
//! A pipeline is an ordered list of named stages. Writing folds the bytes
//! forward through the list; reading folds them back through the inverses in
//! reverse order. Each stage owns one filename suffix, and the suffix chain
//! of an archive file is the only record of the stages it went through.

use std::io::{Read, Write};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

use super::BackupOptions;
use crate::crypto::{decrypt, encrypt, EncryptedData, KeyDerivationParams, SecureString};
use crate::error::{PastificioError, PastificioResult};

/// Filename suffix of the gzip stage
pub const GZIP_SUFFIX: &str = ".gz";

/// Filename suffix of the encryption stage
pub const ENCRYPT_SUFFIX: &str = ".enc";

/// A reversible bytes-to-bytes stage
pub trait Transform {
    /// Stage name used in logs
    fn name(&self) -> &'static str;

    /// Filename suffix appended when this stage has run
    fn suffix(&self) -> &'static str;

    fn forward(&self, data: &[u8]) -> PastificioResult<Vec<u8>>;

    fn inverse(&self, data: &[u8]) -> PastificioResult<Vec<u8>>;
}

/// Gzip compression
#[derive(Debug, Clone, Copy)]
pub struct GzipStage {
    level: Compression,
}

impl GzipStage {
    /// Create a gzip stage with the given compression level (1-9)
    pub fn new(level: u32) -> Self {
        Self {
            level: Compression::new(level),
        }
    }
}

impl Default for GzipStage {
    fn default() -> Self {
        Self::new(6)
    }
}

impl Transform for GzipStage {
    fn name(&self) -> &'static str {
        "gzip"
    }

    fn suffix(&self) -> &'static str {
        GZIP_SUFFIX
    }

    fn forward(&self, data: &[u8]) -> PastificioResult<Vec<u8>> {
        let mut encoder = GzEncoder::new(Vec::new(), self.level);
        encoder
            .write_all(data)
            .and_then(|_| encoder.finish())
            .map_err(|e| PastificioError::Io(format!("Gzip compression failed: {}", e)))
    }

    fn inverse(&self, data: &[u8]) -> PastificioResult<Vec<u8>> {
        let mut decoder = GzDecoder::new(data);
        let mut output = Vec::new();
        decoder
            .read_to_end(&mut output)
            .map_err(|e| PastificioError::Io(format!("Gzip decompression failed: {}", e)))?;
        Ok(output)
    }
}

/// AES-256-GCM encryption with an Argon2id-derived key
///
/// The stage output is the JSON [`EncryptedData`] envelope.
#[derive(Debug, Clone)]
pub struct EncryptStage {
    secret: Option<SecureString>,
    kdf: KeyDerivationParams,
}

impl EncryptStage {
    pub fn new(secret: Option<SecureString>, kdf: KeyDerivationParams) -> Self {
        Self { secret, kdf }
    }
}

impl Transform for EncryptStage {
    fn name(&self) -> &'static str {
        "encrypt"
    }

    fn suffix(&self) -> &'static str {
        ENCRYPT_SUFFIX
    }

    fn forward(&self, data: &[u8]) -> PastificioResult<Vec<u8>> {
        let secret = self.secret.as_ref().ok_or_else(|| {
            PastificioError::Config("Encryption requested but no backup key is configured".into())
        })?;
        encrypt(data, secret.as_str(), &self.kdf)?.to_bytes()
    }

    fn inverse(&self, data: &[u8]) -> PastificioResult<Vec<u8>> {
        let secret = self.secret.as_ref().ok_or_else(|| {
            PastificioError::Decryption("Archive is encrypted but no backup key is configured".into())
        })?;
        let envelope = EncryptedData::from_bytes(data)?;
        decrypt(&envelope, secret.as_str())
    }
}

/// Ordered list of stages
pub struct Pipeline {
    stages: Vec<Box<dyn Transform>>,
}

impl Pipeline {
    pub fn new(stages: Vec<Box<dyn Transform>>) -> Self {
        Self { stages }
    }

    /// Stages for writing an archive with `options`: gzip, then encrypt
    ///
    /// Fails before any byte is produced when the level is out of range or
    /// encryption is requested without a key.
    pub fn from_options(
        options: &BackupOptions,
        secret: Option<&SecureString>,
        kdf: &KeyDerivationParams,
    ) -> PastificioResult<Self> {
        if !(1..=9).contains(&options.compression_level) {
            return Err(PastificioError::Validation(format!(
                "Compression level must be between 1 and 9, got {}",
                options.compression_level
            )));
        }

        let mut stages: Vec<Box<dyn Transform>> = Vec::new();
        if options.compress {
            stages.push(Box::new(GzipStage::new(options.compression_level)));
        }
        if options.encrypt {
            if secret.is_none() {
                return Err(PastificioError::Config(
                    "Encryption requested but no backup key is configured".into(),
                ));
            }
            stages.push(Box::new(EncryptStage::new(secret.cloned(), kdf.clone())));
        }
        Ok(Self::new(stages))
    }

    /// Stages an archive went through, inferred from its filename suffixes
    pub fn from_filename(
        filename: &str,
        secret: Option<&SecureString>,
        kdf: &KeyDerivationParams,
    ) -> Self {
        let mut stages: Vec<Box<dyn Transform>> = Vec::new();
        let mut rest = filename;

        if let Some(stripped) = rest.strip_suffix(ENCRYPT_SUFFIX) {
            stages.push(Box::new(EncryptStage::new(secret.cloned(), kdf.clone())));
            rest = stripped;
        }
        if rest.ends_with(GZIP_SUFFIX) {
            stages.push(Box::new(GzipStage::default()));
        }

        // Collected outermost first; forward order is the reverse
        stages.reverse();
        Self::new(stages)
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Stage names in forward order
    pub fn names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Concatenated suffixes in forward order
    pub fn suffix(&self) -> String {
        self.stages.iter().map(|s| s.suffix()).collect()
    }

    pub fn forward(&self, data: Vec<u8>) -> PastificioResult<Vec<u8>> {
        self.stages
            .iter()
            .try_fold(data, |bytes, stage| stage.forward(&bytes))
    }

    pub fn inverse(&self, data: Vec<u8>) -> PastificioResult<Vec<u8>> {
        self.stages
            .iter()
            .rev()
            .try_fold(data, |bytes, stage| stage.inverse(&bytes))
    }
}

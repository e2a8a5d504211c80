//! Incremental SHA-256 checksums

use crate::error::ConfigError;
use core::fmt;
use core::str::FromStr;
use sha2::{Digest as _, Sha256};

/// Length of a SHA-256 digest in bytes
pub const DIGEST_LEN: usize = 32;

/// Running checksum, updated once per transferred byte
#[derive(Clone, Default)]
pub struct Checksum {
    hasher: Sha256,
    count: usize,
}

impl Checksum {
    /// Start an empty checksum
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one byte
    pub fn update_byte(&mut self, byte: u8) {
        self.hasher.update([byte]);
        self.count += 1;
    }

    /// Add a slice of bytes
    pub fn update(&mut self, bytes: &[u8]) {
        self.hasher.update(bytes);
        self.count += bytes.len();
    }

    /// Number of bytes hashed so far
    pub fn count(&self) -> usize {
        self.count
    }

    /// Consume the checksum and produce the digest
    pub fn finalize(self) -> Digest {
        Digest(self.hasher.finalize().into())
    }
}

impl fmt::Debug for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Checksum").field("count", &self.count).finish()
    }
}

/// A finalized SHA-256 digest
///
/// Displays as 64 lowercase hex digits and parses from the same form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Digest([u8; DIGEST_LEN]);

impl Digest {
    /// Digest of a complete byte slice
    pub fn of(bytes: &[u8]) -> Self {
        let mut checksum = Checksum::new();
        checksum.update(bytes);
        checksum.finalize()
    }

    /// Lowercase hex rendering
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Digest {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; DIGEST_LEN];
        hex::decode_to_slice(s.trim(), &mut bytes).map_err(|_| ConfigError::InvalidDigest)?;
        Ok(Self(bytes))
    }
}

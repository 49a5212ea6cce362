#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! SHA-256 integrity verification for liftoff
//!
//! Digests are always computed over the exact bytes received from the
//! network, before anything touches the disk, so the value that gets
//! verified is the value that gets committed.

use liftoff_errors::{ConfigError, Error, NetworkError};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Name reported alongside digests in events and logs
pub const ALGORITHM: &str = "sha256";

/// A SHA-256 hash value
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Hash {
    bytes: [u8; 32],
}

impl Hash {
    /// Create a hash from raw bytes
    #[must_use]
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self { bytes }
    }

    /// Get the raw bytes
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.bytes
    }

    /// Convert to lowercase hex string
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }

    /// Parse from hex string (either case)
    ///
    /// # Errors
    /// Returns an error if the input string is not valid hexadecimal or is not exactly 64 characters (32 bytes).
    pub fn from_hex(s: &str) -> Result<Self, Error> {
        let invalid = || ConfigError::InvalidValue {
            field: ALGORITHM.to_string(),
            value: s.trim().to_string(),
        };
        let bytes = hex::decode(s.trim()).map_err(|_| invalid())?;
        let array: [u8; 32] = bytes.try_into().map_err(|_| invalid())?;
        Ok(Self::from_bytes(array))
    }

    /// Compute hash of a byte slice
    #[must_use]
    pub fn from_data(data: &[u8]) -> Self {
        Self::from_bytes(Sha256::digest(data).into())
    }

    /// Case-insensitive comparison against a caller-supplied hex string
    #[must_use]
    pub fn matches_hex(&self, expected: &str) -> bool {
        self.to_hex().eq_ignore_ascii_case(expected.trim())
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Serialize for Hash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Hash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Result of checking received bytes against an optional expected digest
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    /// An expected digest was supplied and matched
    Verified(Hash),
    /// No digest was supplied; the content is accepted but unverified
    Unverified(Hash),
}

impl Verification {
    /// The digest of the received bytes
    #[must_use]
    pub fn hash(&self) -> &Hash {
        match self {
            Self::Verified(hash) | Self::Unverified(hash) => hash,
        }
    }

    #[must_use]
    pub fn is_verified(&self) -> bool {
        matches!(self, Self::Verified(_))
    }
}

/// Verify bytes against an expected SHA-256 hex digest
///
/// An absent or blank `expected` skips the comparison and yields
/// [`Verification::Unverified`]; callers are expected to surface that as a
/// warning.
///
/// # Errors
/// Returns `NetworkError::ChecksumMismatch` when the digests differ.
pub fn verify(data: &[u8], expected: Option<&str>) -> Result<Verification, Error> {
    let actual = Hash::from_data(data);

    match expected.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(Verification::Unverified(actual)),
        Some(expected) if actual.matches_hex(expected) => Ok(Verification::Verified(actual)),
        Some(expected) => Err(NetworkError::ChecksumMismatch {
            expected: expected.to_string(),
            actual: actual.to_hex(),
        }
        .into()),
    }
}

//! Core types and protocol constants
//!
//! The plot geometry constants are part of the on-disk format and fixed by
//! the mining protocol; changing any of them breaks compatibility with every
//! existing plot file.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Hash output size in bytes (Shabal-256)
pub const HASH_SIZE: usize = 32;

/// Scoop size in bytes: two hash outputs
pub const SCOOP_SIZE: usize = 2 * HASH_SIZE;

/// Number of scoops per nonce
pub const SCOOPS_PER_PLOT: usize = 4096;

/// Generated data per nonce in bytes
pub const PLOT_SIZE: usize = SCOOPS_PER_PLOT * SCOOP_SIZE;

/// Working buffer length of the generator: plot data plus the 16-byte seed
/// tail (account id and nonce, both big-endian)
pub const GEN_SIZE: usize = PLOT_SIZE + 16;

/// Per-round generation signature supplied by the round context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GenerationSignature([u8; HASH_SIZE]);

impl GenerationSignature {
    /// Create from raw bytes
    pub fn new(bytes: [u8; HASH_SIZE]) -> Self {
        Self(bytes)
    }

    /// Get the signature bytes
    pub fn as_bytes(&self) -> &[u8; HASH_SIZE] {
        &self.0
    }

    /// Convert to lowercase hexadecimal
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl FromStr for GenerationSignature {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let bytes = hex::decode(s)
            .map_err(|e| Error::round(format!("invalid generation signature hex: {e}")))?;
        let bytes: [u8; HASH_SIZE] = bytes.try_into().map_err(|_| {
            Error::round(format!(
                "invalid generation signature length: expected {HASH_SIZE} bytes"
            ))
        })?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for GenerationSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Serialize for GenerationSignature {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for GenerationSignature {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        GenerationSignature::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// A mining deadline in seconds; smaller is better
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Deadline(pub u64);

impl Deadline {
    /// Create a new deadline
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Get the deadline value
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Deadline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_constants() {
        assert_eq!(SCOOP_SIZE, 64);
        assert_eq!(PLOT_SIZE, 262144);
        assert_eq!(GEN_SIZE, PLOT_SIZE + 16);
    }

    #[test]
    fn test_gensig_hex_round_trip() {
        let sig = GenerationSignature::new([0xabu8; HASH_SIZE]);
        let parsed: GenerationSignature = sig.to_hex().parse().unwrap();
        assert_eq!(sig, parsed);
    }

    #[test]
    fn test_gensig_rejects_bad_length() {
        assert!("abcd".parse::<GenerationSignature>().is_err());
        assert!("zz".repeat(32).parse::<GenerationSignature>().is_err());
    }

    #[test]
    fn test_deadline_ordering() {
        assert!(Deadline::new(10) < Deadline::new(20));
        assert_eq!(Deadline::new(7).to_string(), "7");
    }
}

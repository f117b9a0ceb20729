//! Digest algorithm definitions.
//!
//! The light token digest algorithm is a configuration value, so algorithms
//! are looked up by their textual name. Names are matched case-insensitively
//! and both the dashed (`SHA-256`) and compact (`SHA256`) spellings resolve.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for algorithm operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AlgorithmError {
    /// The configured name does not match any supported digest.
    #[error("unknown digest algorithm: {0}")]
    Unknown(String),
}

/// Supported digest algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DigestAlgorithm {
    /// SHA-224.
    #[serde(rename = "SHA-224")]
    Sha224,

    /// SHA-256.
    #[serde(rename = "SHA-256")]
    Sha256,

    /// SHA-384.
    #[serde(rename = "SHA-384")]
    Sha384,

    /// SHA-512.
    #[serde(rename = "SHA-512")]
    Sha512,

    /// SHA-512/256.
    #[serde(rename = "SHA-512/256")]
    Sha512_256,

    /// SHA3-256.
    #[serde(rename = "SHA3-256")]
    Sha3_256,

    /// SHA3-384.
    #[serde(rename = "SHA3-384")]
    Sha3_384,

    /// SHA3-512.
    #[serde(rename = "SHA3-512")]
    Sha3_512,
}

impl DigestAlgorithm {
    /// All supported algorithms.
    pub const ALL: [Self; 8] = [
        Self::Sha224,
        Self::Sha256,
        Self::Sha384,
        Self::Sha512,
        Self::Sha512_256,
        Self::Sha3_256,
        Self::Sha3_384,
        Self::Sha3_512,
    ];

    /// Returns the output length in bytes.
    #[must_use]
    pub const fn output_len(self) -> usize {
        match self {
            Self::Sha224 => 28,
            Self::Sha256 | Self::Sha512_256 | Self::Sha3_256 => 32,
            Self::Sha384 | Self::Sha3_384 => 48,
            Self::Sha512 | Self::Sha3_512 => 64,
        }
    }

    /// Returns the canonical algorithm name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Sha224 => "SHA-224",
            Self::Sha256 => "SHA-256",
            Self::Sha384 => "SHA-384",
            Self::Sha512 => "SHA-512",
            Self::Sha512_256 => "SHA-512/256",
            Self::Sha3_256 => "SHA3-256",
            Self::Sha3_384 => "SHA3-384",
            Self::Sha3_512 => "SHA3-512",
        }
    }

    /// Resolves an algorithm from its configured name.
    ///
    /// # Errors
    ///
    /// Returns [`AlgorithmError::Unknown`] when the name matches no
    /// supported algorithm.
    pub fn from_name(name: &str) -> Result<Self, AlgorithmError> {
        let normalized: String = name
            .trim()
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_ascii_uppercase();

        match normalized.as_str() {
            "SHA224" => Ok(Self::Sha224),
            "SHA256" => Ok(Self::Sha256),
            "SHA384" => Ok(Self::Sha384),
            "SHA512" => Ok(Self::Sha512),
            "SHA512/256" => Ok(Self::Sha512_256),
            "SHA3256" => Ok(Self::Sha3_256),
            "SHA3384" => Ok(Self::Sha3_384),
            "SHA3512" => Ok(Self::Sha3_512),
            _ => Err(AlgorithmError::Unknown(name.to_string())),
        }
    }

    pub(crate) fn aws_algorithm(self) -> &'static aws_lc_rs::digest::Algorithm {
        use aws_lc_rs::digest;

        match self {
            Self::Sha224 => &digest::SHA224,
            Self::Sha256 => &digest::SHA256,
            Self::Sha384 => &digest::SHA384,
            Self::Sha512 => &digest::SHA512,
            Self::Sha512_256 => &digest::SHA512_256,
            Self::Sha3_256 => &digest::SHA3_256,
            Self::Sha3_384 => &digest::SHA3_384,
            Self::Sha3_512 => &digest::SHA3_512,
        }
    }
}

impl std::fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for DigestAlgorithm {
    type Err = AlgorithmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
    }
}

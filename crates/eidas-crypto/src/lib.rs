//! # eidas-crypto
//!
//! Cryptographic primitives used by the light token channel, backed by
//! aws-lc-rs.
//!
//! Digest algorithms are named the way node operators write them in
//! configuration (`SHA-256`, `SHA-512`, ...). Digest comparison is always
//! constant-time.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod algorithm;
pub mod hash;
pub mod random;

pub use algorithm::{AlgorithmError, DigestAlgorithm};
pub use hash::{constant_time_eq, digest};
pub use random::generate_token_id;

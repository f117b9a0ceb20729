//! Digest computation and comparison.

use crate::algorithm::DigestAlgorithm;
use aws_lc_rs::{constant_time, digest as aws_digest};

/// Computes a digest of the input data.
#[must_use]
pub fn digest(algorithm: DigestAlgorithm, data: &[u8]) -> Vec<u8> {
    aws_digest::digest(algorithm.aws_algorithm(), data)
        .as_ref()
        .to_vec()
}

/// Compares two byte slices in constant time.
///
/// Running time depends only on the lengths of the inputs, never on where
/// they first differ.
#[must_use]
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    constant_time::verify_slices_are_equal(a, b).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_produces_declared_length() {
        for alg in DigestAlgorithm::ALL {
            assert_eq!(digest(alg, b"test").len(), alg.output_len(), "{alg}");
        }
    }

    #[test]
    fn sha256_known_answer() {
        let result = digest(DigestAlgorithm::Sha256, b"abc");
        let hex: String = result.iter().map(|b| format!("{b:02x}")).collect();
        assert_eq!(
            hex,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn different_inputs_produce_different_digests() {
        let a = digest(DigestAlgorithm::Sha256, b"hello");
        let b = digest(DigestAlgorithm::Sha256, b"world");
        assert_ne!(a, b);
    }

    #[test]
    fn constant_time_eq_matches_equality() {
        assert!(constant_time_eq(b"same", b"same"));
        assert!(!constant_time_eq(b"same", b"sane"));
        assert!(!constant_time_eq(b"short", b"longer"));
        assert!(constant_time_eq(b"", b""));
    }
}

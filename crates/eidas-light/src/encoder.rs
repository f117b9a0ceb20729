//! Light token wire codec.
//!
//! Wire form: `issuer|id|createdOn|base64(digest)` where
//! `digest = H(id|issuer|createdOn|secret)` and `H` is the channel's
//! configured digest algorithm. Only a holder of the channel secret can mint
//! a token that decodes.

use base64::{Engine, engine::general_purpose::STANDARD};
use eidas_crypto::{DigestAlgorithm, constant_time_eq, digest};

use crate::binary::BinaryLightToken;
use crate::error::{LightTokenError, LightTokenResult};
use crate::token::{LightToken, SEPARATOR, parse_created_on};

/// Largest accepted token, in bytes, before or after base64.
pub const MAX_TOKEN_SIZE: usize = 1024;

fn resolve_algorithm(algorithm: &str) -> LightTokenResult<DigestAlgorithm> {
    DigestAlgorithm::from_name(algorithm)
        .map_err(|_| LightTokenError::UnsupportedAlgorithm(algorithm.to_string()))
}

fn compute_digest(
    algorithm: DigestAlgorithm,
    issuer: &str,
    id: &str,
    created_on: &str,
    secret: &str,
) -> Vec<u8> {
    let input = format!("{id}{SEPARATOR}{issuer}{SEPARATOR}{created_on}{SEPARATOR}{secret}");
    digest(algorithm, input.as_bytes())
}

/// Encodes `token` for the channel identified by `secret` and `algorithm`.
///
/// # Errors
///
/// Returns [`LightTokenError::UnsupportedAlgorithm`] if `algorithm` names no
/// supported digest.
pub fn encode(
    token: &LightToken,
    secret: &str,
    algorithm: &str,
) -> LightTokenResult<BinaryLightToken> {
    let algorithm = resolve_algorithm(algorithm)?;
    let created_on = token.formatted_created_on();
    let digest = compute_digest(algorithm, token.issuer(), token.id(), &created_on, secret);

    let encoded = format!(
        "{issuer}{SEPARATOR}{id}{SEPARATOR}{created_on}{SEPARATOR}{digest}",
        issuer = token.issuer(),
        id = token.id(),
        digest = STANDARD.encode(digest),
    );

    BinaryLightToken::new(token.clone(), encoded.into_bytes())
}

/// Decodes and authenticates a raw token.
///
/// # Errors
///
/// - [`LightTokenError::Oversized`] if `bytes` exceeds [`MAX_TOKEN_SIZE`]
/// - [`LightTokenError::Malformed`] if the structure or timestamp is invalid
/// - [`LightTokenError::UnsupportedAlgorithm`] if `algorithm` is unknown
/// - [`LightTokenError::DigestMismatch`] if the token was not minted with
///   `secret`
pub fn decode(bytes: &[u8], secret: &str, algorithm: &str) -> LightTokenResult<BinaryLightToken> {
    check_size(bytes.len())?;

    let text = std::str::from_utf8(bytes)
        .map_err(|_| LightTokenError::Malformed("token is not valid UTF-8".to_string()))?;

    let parts: Vec<&str> = text.split(SEPARATOR).collect();
    let [issuer, id, created_on, digest_b64] = parts.as_slice() else {
        return Err(LightTokenError::Malformed(format!(
            "expected 4 segments, found {}",
            parts.len()
        )));
    };

    if issuer.trim().is_empty() || id.trim().is_empty() {
        return Err(LightTokenError::Malformed(
            "blank issuer or id".to_string(),
        ));
    }

    let created = parse_created_on(created_on).ok_or_else(|| {
        LightTokenError::Malformed("LightToken createdOn timestamp parse failure".to_string())
    })?;

    let presented = STANDARD
        .decode(digest_b64)
        .map_err(|_| LightTokenError::Malformed("digest is not valid base64".to_string()))?;

    let token = LightToken::new(*issuer, *id, created)
        .map_err(|e| LightTokenError::Malformed(e.to_string()))?;

    let algorithm = resolve_algorithm(algorithm)?;
    let expected = compute_digest(
        algorithm,
        token.issuer(),
        token.id(),
        &token.formatted_created_on(),
        secret,
    );

    if !constant_time_eq(&expected, &presented) {
        tracing::debug!(issuer = token.issuer(), id = token.id(), "light token digest mismatch");
        return Err(LightTokenError::DigestMismatch);
    }

    BinaryLightToken::new(token, bytes.to_vec())
}

/// Base64-decodes `input` and then [`decode`]s it.
///
/// # Errors
///
/// As [`decode`]; invalid base64 is reported as
/// [`LightTokenError::Malformed`].
pub fn decode_base64(
    input: &[u8],
    secret: &str,
    algorithm: &str,
) -> LightTokenResult<BinaryLightToken> {
    check_size(input.len())?;

    let raw = STANDARD
        .decode(input)
        .map_err(|_| LightTokenError::Malformed("token is not valid base64".to_string()))?;

    decode(&raw, secret, algorithm)
}

const fn check_size(size: usize) -> LightTokenResult<()> {
    if size > MAX_TOKEN_SIZE {
        return Err(LightTokenError::Oversized {
            size,
            max: MAX_TOKEN_SIZE,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    const VECTOR_TOKEN: &str = "MYSPECIFIC|f5e7e0f5-b9b8-4256-a7d0-4090141b326d|1956-10-23 10:52:01 698|1040jxHfWeTgn98YczCpon3m+zOHdVXgYkdOjyKVaJA=";
    const VECTOR_SECRET: &str = "MYSECRET";
    const SHA_256: &str = "SHA-256";

    const CONNECTOR_REQUEST_BASE64: &str = "c3BlY2lmaWNDb21tdW5pY2F0aW9uRGVmaW5pdGlvbkNvbm5lY3RvclJlcXVlc3R8ODUyYTY0YzAtOGFjMS00NDVmLWIwZTEtOTkyYWRhNDkzMDMzfDIwMTctMTItMTEgMTQ6MTI6MDUgMTQ4fDdNOHArdVA4Q0tYdU1pMklxU2RhMXRnNDUyV2xSdmNPU3d1MGRjaXNTWUU9";
    const CONNECTOR_REQUEST_SECRET: &str = "mySecretConnectorRequest";

    fn vector_token() -> LightToken {
        let created = NaiveDate::from_ymd_opt(1956, 10, 23)
            .and_then(|d| d.and_hms_milli_opt(10, 52, 1, 698))
            .unwrap()
            .and_utc();
        LightToken::new("MYSPECIFIC", "f5e7e0f5-b9b8-4256-a7d0-4090141b326d", created).unwrap()
    }

    #[test]
    fn encode_matches_known_answer() {
        let binary = encode(&vector_token(), VECTOR_SECRET, SHA_256).unwrap();
        assert_eq!(binary.as_bytes(), VECTOR_TOKEN.as_bytes());
    }

    #[test]
    fn decode_known_answer() {
        let binary = decode(VECTOR_TOKEN.as_bytes(), VECTOR_SECRET, SHA_256).unwrap();
        assert_eq!(binary.token(), &vector_token());
        assert_eq!(binary.as_bytes(), VECTOR_TOKEN.as_bytes());
    }

    #[test]
    fn decode_base64_known_answer() {
        let binary = decode_base64(
            CONNECTOR_REQUEST_BASE64.as_bytes(),
            CONNECTOR_REQUEST_SECRET,
            SHA_256,
        )
        .unwrap();
        assert_eq!(binary.token().id(), "852a64c0-8ac1-445f-b0e1-992ada493033");
        assert_eq!(
            binary.token().issuer(),
            "specificCommunicationDefinitionConnectorRequest"
        );
        assert_eq!(binary.token().formatted_created_on(), "2017-12-11 14:12:05 148");
    }

    #[test]
    fn round_trip_across_algorithms() {
        let token = LightToken::now("issuer", "_8b1b2a7c").unwrap();
        for alg in DigestAlgorithm::ALL {
            let binary = encode(&token, "secret", alg.name()).unwrap();
            let decoded = decode(binary.as_bytes(), "secret", alg.name()).unwrap();
            assert_eq!(decoded, binary, "{alg}");
        }
    }

    #[test]
    fn wrong_secret_is_digest_mismatch() {
        assert_eq!(
            decode(VECTOR_TOKEN.as_bytes(), "OTHERSECRET", SHA_256),
            Err(LightTokenError::DigestMismatch)
        );
    }

    #[test]
    fn wrong_algorithm_is_digest_mismatch() {
        assert_eq!(
            decode(VECTOR_TOKEN.as_bytes(), VECTOR_SECRET, "SHA-512"),
            Err(LightTokenError::DigestMismatch)
        );
    }

    #[test]
    fn tampered_digest_byte_is_rejected() {
        let binary = encode(&vector_token(), VECTOR_SECRET, SHA_256).unwrap();
        let bytes = binary.token_bytes();
        let digest_start = bytes.iter().rposition(|b| *b == b'|').unwrap() + 1;
        let raw_digest = STANDARD.decode(&bytes[digest_start..]).unwrap();

        for i in 0..raw_digest.len() {
            let mut flipped = raw_digest.clone();
            flipped[i] ^= 0x01;
            let mut tampered = bytes[..digest_start].to_vec();
            tampered.extend_from_slice(STANDARD.encode(&flipped).as_bytes());
            assert_eq!(
                decode(&tampered, VECTOR_SECRET, SHA_256),
                Err(LightTokenError::DigestMismatch),
                "byte {i}"
            );
        }
    }

    #[test]
    fn tampered_id_is_rejected() {
        let tampered = VECTOR_TOKEN.replace("f5e7e0f5", "f5e7e0f6");
        assert_eq!(
            decode(tampered.as_bytes(), VECTOR_SECRET, SHA_256),
            Err(LightTokenError::DigestMismatch)
        );
    }

    #[test]
    fn oversized_is_rejected_before_parsing() {
        let big = vec![b'|'; MAX_TOKEN_SIZE + 1];
        assert_eq!(
            decode(&big, VECTOR_SECRET, SHA_256),
            Err(LightTokenError::Oversized {
                size: MAX_TOKEN_SIZE + 1,
                max: MAX_TOKEN_SIZE
            })
        );
        assert!(matches!(
            decode_base64(&big, VECTOR_SECRET, SHA_256),
            Err(LightTokenError::Oversized { .. })
        ));

        let padded = format!("{VECTOR_TOKEN}{}", " ".repeat(MAX_TOKEN_SIZE));
        assert!(matches!(
            decode(padded.as_bytes(), VECTOR_SECRET, SHA_256),
            Err(LightTokenError::Oversized { .. })
        ));
    }

    #[test]
    fn wrong_segment_count_is_malformed() {
        for input in ["a|b|c", "a|b|c|d|e", "", "no separators"] {
            assert!(
                matches!(
                    decode(input.as_bytes(), VECTOR_SECRET, SHA_256),
                    Err(LightTokenError::Malformed(_))
                ),
                "{input}"
            );
        }
    }

    #[test]
    fn blank_segments_are_malformed() {
        let input = "| |1956-10-23 10:52:01 698|AAAA";
        assert!(matches!(
            decode(input.as_bytes(), VECTOR_SECRET, SHA_256),
            Err(LightTokenError::Malformed(_))
        ));
    }

    #[test]
    fn bad_timestamp_is_malformed() {
        let input = VECTOR_TOKEN.replace("10:52:01", "29:52:01");
        assert_eq!(
            decode(input.as_bytes(), VECTOR_SECRET, SHA_256),
            Err(LightTokenError::Malformed(
                "LightToken createdOn timestamp parse failure".to_string()
            ))
        );
    }

    #[test]
    fn bad_base64_is_malformed() {
        assert!(matches!(
            decode_base64(b"%%%not base64%%%", VECTOR_SECRET, SHA_256),
            Err(LightTokenError::Malformed(_))
        ));

        let input = VECTOR_TOKEN.replace("1040jx", "10#0jx");
        assert!(matches!(
            decode(input.as_bytes(), VECTOR_SECRET, SHA_256),
            Err(LightTokenError::Malformed(_))
        ));
    }

    #[test]
    fn unknown_algorithm_is_reported() {
        let token = LightToken::new("issuer", "id", Utc::now()).unwrap();
        assert_eq!(
            encode(&token, "secret", "invalidAlgorithm"),
            Err(LightTokenError::UnsupportedAlgorithm(
                "invalidAlgorithm".to_string()
            ))
        );
        assert_eq!(
            decode(VECTOR_TOKEN.as_bytes(), VECTOR_SECRET, "invalidAlgorithm"),
            Err(LightTokenError::UnsupportedAlgorithm(
                "invalidAlgorithm".to_string()
            ))
        );
    }

    #[test]
    fn created_on_format_is_pinned() {
        let binary = encode(&vector_token(), VECTOR_SECRET, SHA_256).unwrap();
        let text = String::from_utf8(binary.token_bytes()).unwrap();
        assert!(text.contains("|1956-10-23 10:52:01 698|"));
    }

    #[test]
    fn rejects_non_canonical_created_on() {
        for created_on in [
            "1956-10-23   10:52:01 698",
            "1956-10-2310:52:01 698",
            "1956-10-23 10:52:1 698",
        ] {
            let altered = VECTOR_TOKEN.replace("1956-10-23 10:52:01 698", created_on);
            assert!(
                matches!(
                    decode(altered.as_bytes(), VECTOR_SECRET, SHA_256),
                    Err(LightTokenError::Malformed(_))
                ),
                "{created_on}"
            );
        }
    }
}

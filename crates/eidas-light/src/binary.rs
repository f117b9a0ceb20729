//! Light token paired with its wire form.

use crate::error::{LightTokenError, LightTokenResult};
use crate::token::LightToken;

/// A [`LightToken`] together with the exact bytes it was encoded to.
///
/// Equality and hashing cover both parts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BinaryLightToken {
    token: LightToken,
    bytes: Vec<u8>,
}

impl BinaryLightToken {
    /// Pairs a token with its encoded bytes.
    ///
    /// # Errors
    ///
    /// Returns [`LightTokenError::InvalidArgument`] if `bytes` is empty.
    pub fn new(token: LightToken, bytes: impl Into<Vec<u8>>) -> LightTokenResult<Self> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(LightTokenError::InvalidArgument(
                "token bytes must not be empty".to_string(),
            ));
        }
        Ok(Self { token, bytes })
    }

    /// The logical token.
    #[must_use]
    pub const fn token(&self) -> &LightToken {
        &self.token
    }

    /// Borrowed view of the encoded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// A fresh copy of the encoded bytes.
    #[must_use]
    pub fn token_bytes(&self) -> Vec<u8> {
        self.bytes.clone()
    }

    /// Splits into the token and its bytes.
    #[must_use]
    pub fn into_parts(self) -> (LightToken, Vec<u8>) {
        (self.token, self.bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn token() -> LightToken {
        LightToken::new("issuer", "id", Utc::now()).unwrap()
    }

    #[test]
    fn rejects_empty_bytes() {
        assert_eq!(
            BinaryLightToken::new(token(), Vec::new()),
            Err(LightTokenError::InvalidArgument(
                "token bytes must not be empty".to_string()
            ))
        );
    }

    #[test]
    fn token_bytes_is_an_independent_copy() {
        let binary = BinaryLightToken::new(token(), b"abc".to_vec()).unwrap();
        let mut copy = binary.token_bytes();
        copy[0] = b'z';
        assert_eq!(binary.as_bytes(), b"abc");
    }

    #[test]
    fn equality_covers_both_parts() {
        let t = token();
        let a = BinaryLightToken::new(t.clone(), b"abc".to_vec()).unwrap();
        let b = BinaryLightToken::new(t.clone(), b"abc".to_vec()).unwrap();
        let c = BinaryLightToken::new(t, b"abd".to_vec()).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}

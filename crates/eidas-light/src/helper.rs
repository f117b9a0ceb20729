//! Convenience operations over the codec for transport code.

use base64::{Engine, engine::general_purpose::STANDARD};
use eidas_crypto::generate_token_id;

use crate::binary::BinaryLightToken;
use crate::encoder;
use crate::error::LightTokenResult;
use crate::token::LightToken;

/// Mints a token with a fresh random id, stamped now.
///
/// # Errors
///
/// Fails if `issuer` is invalid or `algorithm` is unsupported.
pub fn create_binary_light_token(
    issuer: &str,
    secret: &str,
    algorithm: &str,
) -> LightTokenResult<BinaryLightToken> {
    let token = LightToken::now(issuer, generate_token_id())?;
    encoder::encode(&token, secret, algorithm)
}

/// Base64 form of the token's wire bytes, as carried in HTTP parameters.
#[must_use]
pub fn encode_binary_light_token_base64(binary: &BinaryLightToken) -> String {
    STANDARD.encode(binary.as_bytes())
}

/// Authenticates a base64 token and returns its id.
///
/// # Errors
///
/// See [`encoder::decode_base64`].
pub fn get_binary_light_token_id(
    token_base64: &str,
    secret: &str,
    algorithm: &str,
) -> LightTokenResult<String> {
    let binary = encoder::decode_base64(token_base64.as_bytes(), secret, algorithm)?;
    let (token, _) = binary.into_parts();
    Ok(token.id().to_string())
}

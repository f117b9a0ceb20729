//! Random identifier generation.

use uuid::Uuid;

/// Generates a fresh light token identifier.
///
/// Identifiers are random (version 4) UUIDs in their hyphenated form.
#[must_use]
pub fn generate_token_id() -> String {
    Uuid::new_v4().to_string()
}

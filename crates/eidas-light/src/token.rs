//! Light token value type.

use chrono::{DateTime, NaiveDateTime, SubsecRound, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{LightTokenError, LightTokenResult};

/// Separator between the wire segments of an encoded token.
pub const SEPARATOR: char = '|';

/// `createdOn` layout shared by both ends of a channel, e.g.
/// `2017-12-11 14:12:05 148`. Any drift breaks digest recomputation.
pub const CREATED_ON_FORMAT: &str = "%Y-%m-%d %H:%M:%S %3f";

const CREATED_ON_SECONDS_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Opaque reference to a light request or response parked in a cache.
///
/// `created_on` is informational; expiry is the cache's business. The
/// timestamp is held at millisecond precision, the precision of the wire
/// format.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LightToken {
    issuer: String,
    id: String,
    created_on: DateTime<Utc>,
}

impl LightToken {
    /// Creates a token.
    ///
    /// # Errors
    ///
    /// Returns [`LightTokenError::InvalidArgument`] when `issuer` or `id` is
    /// blank or contains the separator.
    pub fn new(
        issuer: impl Into<String>,
        id: impl Into<String>,
        created_on: DateTime<Utc>,
    ) -> LightTokenResult<Self> {
        let issuer = issuer.into();
        let id = id.into();
        check_segment("issuer", &issuer)?;
        check_segment("id", &id)?;

        Ok(Self {
            issuer,
            id,
            created_on: created_on.trunc_subsecs(3),
        })
    }

    /// Creates a token stamped with the current time.
    ///
    /// # Errors
    ///
    /// See [`LightToken::new`].
    pub fn now(issuer: impl Into<String>, id: impl Into<String>) -> LightTokenResult<Self> {
        Self::new(issuer, id, Utc::now())
    }

    /// Name of the party that minted the token.
    #[must_use]
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Token id, also the cache key of the referenced message.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Creation instant.
    #[must_use]
    pub const fn created_on(&self) -> DateTime<Utc> {
        self.created_on
    }

    /// `created_on` rendered in [`CREATED_ON_FORMAT`].
    #[must_use]
    pub fn formatted_created_on(&self) -> String {
        self.created_on.format(CREATED_ON_FORMAT).to_string()
    }
}

fn check_segment(name: &str, value: &str) -> LightTokenResult<()> {
    if value.trim().is_empty() {
        return Err(LightTokenError::InvalidArgument(format!(
            "{name} must not be blank"
        )));
    }
    if value.contains(SEPARATOR) {
        return Err(LightTokenError::InvalidArgument(format!(
            "{name} must not contain '{SEPARATOR}'"
        )));
    }
    Ok(())
}

/// Parses a `createdOn` segment.
///
/// Returns `None` unless the value is exactly `yyyy-MM-dd HH:mm:ss SSS`
/// with a valid calendar date and time of day.
pub(crate) fn parse_created_on(value: &str) -> Option<DateTime<Utc>> {
    let (seconds, millis) = value.rsplit_once(' ')?;
    if millis.len() != 3 || !millis.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let millis: i64 = millis.parse().ok()?;
    let naive = NaiveDateTime::parse_from_str(seconds, CREATED_ON_SECONDS_FORMAT).ok()?;
    let created = naive.and_utc() + TimeDelta::milliseconds(millis);

    // chrono tolerates padding drift; the digest covers the exact text.
    (created.format(CREATED_ON_FORMAT).to_string() == value).then_some(created)
}

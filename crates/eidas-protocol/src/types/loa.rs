//! Level of assurance taxonomy.
//!
//! Notified levels are the three regulated eIDAS values and are totally
//! ordered. Any other absolute URI is a non-notified, member-state level.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ValidationError;

/// Common prefix of the notified LoA URIs.
pub const NOTIFIED_LOA_PREFIX: &str = "http://eidas.europa.eu/LoA/";

/// Regulated eIDAS levels, ordered `Low < Substantial < High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NotifiedLevelOfAssurance {
    /// `http://eidas.europa.eu/LoA/low`
    #[serde(rename = "http://eidas.europa.eu/LoA/low")]
    Low,
    /// `http://eidas.europa.eu/LoA/substantial`
    #[serde(rename = "http://eidas.europa.eu/LoA/substantial")]
    Substantial,
    /// `http://eidas.europa.eu/LoA/high`
    #[serde(rename = "http://eidas.europa.eu/LoA/high")]
    High,
}

impl NotifiedLevelOfAssurance {
    /// All levels, weakest first.
    pub const ALL: [Self; 3] = [Self::Low, Self::Substantial, Self::High];

    /// Returns the URI of this level.
    #[must_use]
    pub const fn uri(self) -> &'static str {
        match self {
            Self::Low => "http://eidas.europa.eu/LoA/low",
            Self::Substantial => "http://eidas.europa.eu/LoA/substantial",
            Self::High => "http://eidas.europa.eu/LoA/high",
        }
    }

    /// Resolves a notified level from its exact URI.
    #[must_use]
    pub fn from_uri(uri: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|level| level.uri() == uri)
    }

    /// Levels strictly stronger than this one.
    pub fn higher_levels(self) -> impl Iterator<Item = Self> {
        Self::ALL.into_iter().filter(move |level| *level > self)
    }
}

impl std::fmt::Display for NotifiedLevelOfAssurance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.uri())
    }
}

/// Whether a LoA is regulated or member-state specific.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LevelOfAssuranceType {
    /// One of the three eIDAS levels.
    Notified,
    /// Any other LoA URI.
    NonNotified,
}

/// A classified LoA value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LevelOfAssurance {
    /// Regulated level.
    Notified(NotifiedLevelOfAssurance),
    /// Member-state specific level, holding its URI.
    NonNotified(String),
}

impl LevelOfAssurance {
    /// Classifies a LoA URI.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidLevelOfAssurance`] when the value is
    /// not an absolute URI, or uses the notified prefix without being one of
    /// the notified levels.
    pub fn parse(uri: &str) -> Result<Self, ValidationError> {
        if let Some(level) = NotifiedLevelOfAssurance::from_uri(uri) {
            return Ok(Self::Notified(level));
        }
        if uri.starts_with(NOTIFIED_LOA_PREFIX) || Url::parse(uri).is_err() {
            return Err(ValidationError::InvalidLevelOfAssurance(uri.to_string()));
        }
        Ok(Self::NonNotified(uri.to_string()))
    }

    /// Returns the URI.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Notified(level) => level.uri(),
            Self::NonNotified(uri) => uri,
        }
    }

    /// Returns the classification.
    #[must_use]
    pub const fn loa_type(&self) -> LevelOfAssuranceType {
        match self {
            Self::Notified(_) => LevelOfAssuranceType::Notified,
            Self::NonNotified(_) => LevelOfAssuranceType::NonNotified,
        }
    }

    /// Returns the notified level, if this is one.
    #[must_use]
    pub const fn notified(&self) -> Option<NotifiedLevelOfAssurance> {
        match self {
            Self::Notified(level) => Some(*level),
            Self::NonNotified(_) => None,
        }
    }
}

impl std::fmt::Display for LevelOfAssurance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

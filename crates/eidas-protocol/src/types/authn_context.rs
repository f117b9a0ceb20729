//! Requested authentication context.

use serde::{Deserialize, Serialize};

/// `Comparison` attribute of a `RequestedAuthnContext`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthnContextComparison {
    /// Exact match required.
    Exact,
    /// Match must be at least as strong.
    Minimum,
    /// Match must be at most as strong.
    Maximum,
    /// Match must be stronger.
    Better,
    /// A value outside the SAML enumeration.
    #[serde(untagged)]
    Other(String),
}

impl AuthnContextComparison {
    /// Parses the attribute value. Unknown values are kept as [`Self::Other`].
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value {
            "exact" => Self::Exact,
            "minimum" => Self::Minimum,
            "maximum" => Self::Maximum,
            "better" => Self::Better,
            other => Self::Other(other.to_string()),
        }
    }

    /// Returns the attribute value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Exact => "exact",
            Self::Minimum => "minimum",
            Self::Maximum => "maximum",
            Self::Better => "better",
            Self::Other(other) => other,
        }
    }
}

/// The LoA list and comparison a service provider asked for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestedAuthnContext {
    /// Comparison method; `None` when the attribute is absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comparison: Option<AuthnContextComparison>,

    /// `AuthnContextClassRef` values, in document order.
    #[serde(default)]
    pub authn_context_class_refs: Vec<String>,
}

impl RequestedAuthnContext {
    /// Creates a context.
    #[must_use]
    pub fn new<I, S>(comparison: Option<AuthnContextComparison>, class_refs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            comparison,
            authn_context_class_refs: class_refs.into_iter().map(Into::into).collect(),
        }
    }
}

//! Attribute definitions and values.

use std::hash::{Hash, Hasher};

use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{ProtocolError, ProtocolResult};

/// Whose attribute this is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PersonType {
    /// The natural person being identified.
    NaturalPerson,
    /// The legal person being identified.
    LegalPerson,
    /// A natural person acting as representative.
    RepvNaturalPerson,
    /// A legal person acting as representative.
    RepvLegalPerson,
}

impl PersonType {
    /// Returns `true` for the two representative types.
    #[must_use]
    pub const fn is_representative(self) -> bool {
        matches!(self, Self::RepvNaturalPerson | Self::RepvLegalPerson)
    }
}

/// How attribute values are carried as text on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueMarshaller {
    /// Plain string.
    String,
    /// ISO date, `yyyy-MM-dd`.
    Date,
    /// Base64 of an address XML fragment.
    Base64Address,
}

const DATE_FORMAT: &str = "%Y-%m-%d";

impl ValueMarshaller {
    /// Reads a wire value.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::InvalidAttribute`] if the value does not fit
    /// the marshaller's format.
    pub fn unmarshal(self, raw: &str) -> ProtocolResult<AttributeValue> {
        match self {
            Self::String => Ok(AttributeValue::String(raw.to_string())),
            Self::Date => NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
                .map(AttributeValue::Date)
                .map_err(|e| ProtocolError::InvalidAttribute(format!("invalid date '{raw}': {e}"))),
            Self::Base64Address => {
                let bytes = STANDARD
                    .decode(raw.trim())
                    .map_err(|e| ProtocolError::InvalidAttribute(format!("invalid address encoding: {e}")))?;
                String::from_utf8(bytes)
                    .map(AttributeValue::Address)
                    .map_err(|_| ProtocolError::InvalidAttribute("address is not UTF-8".to_string()))
            }
        }
    }

    /// Writes a value in wire form.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::InvalidAttribute`] if the value kind does not
    /// belong to this marshaller.
    pub fn marshal(self, value: &AttributeValue) -> ProtocolResult<String> {
        match (self, value) {
            (Self::String, AttributeValue::String(s)) => Ok(s.clone()),
            (Self::Date, AttributeValue::Date(d)) => Ok(d.format(DATE_FORMAT).to_string()),
            (Self::Base64Address, AttributeValue::Address(a)) => Ok(STANDARD.encode(a)),
            _ => Err(ProtocolError::InvalidAttribute(format!(
                "{self:?} marshaller cannot write {value:?}"
            ))),
        }
    }
}

/// A typed attribute value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AttributeValue {
    /// Text value.
    String(String),
    /// Calendar date.
    Date(NaiveDate),
    /// Decoded address XML fragment.
    Address(String),
}

impl AttributeValue {
    /// Returns `true` if the value carries no information.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::String(s) | Self::Address(s) => s.trim().is_empty(),
            Self::Date(_) => false,
        }
    }
}

/// Describes one attribute: its URI name, owner and wire format.
///
/// Definitions are identified by `name_uri`; equality and hashing use it
/// alone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeDefinition {
    name_uri: String,
    friendly_name: String,
    person_type: PersonType,
    required: bool,
    marshaller: ValueMarshaller,
}

impl AttributeDefinition {
    /// Creates a definition.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::InvalidAttribute`] if `name_uri` is not an
    /// absolute URI or `friendly_name` is blank.
    pub fn new(
        name_uri: impl Into<String>,
        friendly_name: impl Into<String>,
        person_type: PersonType,
        required: bool,
        marshaller: ValueMarshaller,
    ) -> ProtocolResult<Self> {
        let name_uri = name_uri.into();
        let friendly_name = friendly_name.into();

        if Url::parse(&name_uri).is_err() {
            return Err(ProtocolError::InvalidAttribute(format!(
                "attribute name is not an absolute URI: {name_uri}"
            )));
        }
        if friendly_name.trim().is_empty() {
            return Err(ProtocolError::InvalidAttribute(format!(
                "blank friendly name for {name_uri}"
            )));
        }

        Ok(Self {
            name_uri,
            friendly_name,
            person_type,
            required,
            marshaller,
        })
    }

    /// URI name.
    #[must_use]
    pub fn name_uri(&self) -> &str {
        &self.name_uri
    }

    /// Short display name.
    #[must_use]
    pub fn friendly_name(&self) -> &str {
        &self.friendly_name
    }

    /// Owner of the attribute.
    #[must_use]
    pub const fn person_type(&self) -> PersonType {
        self.person_type
    }

    /// Whether the attribute belongs to its person type's minimum data set.
    #[must_use]
    pub const fn is_required(&self) -> bool {
        self.required
    }

    /// Wire format of the values.
    #[must_use]
    pub const fn marshaller(&self) -> ValueMarshaller {
        self.marshaller
    }
}

impl PartialEq for AttributeDefinition {
    fn eq(&self, other: &Self) -> bool {
        self.name_uri == other.name_uri
    }
}

impl Eq for AttributeDefinition {}

impl Hash for AttributeDefinition {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name_uri.hash(state);
    }
}

//! Attribute registry.
//!
//! [`AttributeRegistry::eidas`] holds the attributes of the eIDAS SAML
//! attribute profile. Required attributes of a person type form its
//! minimum data set.

use std::collections::HashMap;

use crate::error::{ProtocolError, ProtocolResult};
use crate::types::attribute::{AttributeDefinition, PersonType, ValueMarshaller};

const NATURAL: &str = "http://eidas.europa.eu/attributes/naturalperson/";
const LEGAL: &str = "http://eidas.europa.eu/attributes/legalperson/";
const REPV_NATURAL: &str = "http://eidas.europa.eu/attributes/naturalperson/representative/";
const REPV_LEGAL: &str = "http://eidas.europa.eu/attributes/legalperson/representative/";

/// Natural person attributes: (local name, friendly name, required, format).
const NATURAL_ATTRIBUTES: &[(&str, &str, bool, ValueMarshaller)] = &[
    ("PersonIdentifier", "PersonIdentifier", true, ValueMarshaller::String),
    ("CurrentFamilyName", "FamilyName", true, ValueMarshaller::String),
    ("CurrentGivenName", "FirstName", true, ValueMarshaller::String),
    ("DateOfBirth", "DateOfBirth", true, ValueMarshaller::Date),
    ("BirthName", "BirthName", false, ValueMarshaller::String),
    ("PlaceOfBirth", "PlaceOfBirth", false, ValueMarshaller::String),
    ("CurrentAddress", "CurrentAddress", false, ValueMarshaller::Base64Address),
    ("Gender", "Gender", false, ValueMarshaller::String),
];

/// Legal person attributes.
const LEGAL_ATTRIBUTES: &[(&str, &str, bool, ValueMarshaller)] = &[
    ("LegalPersonIdentifier", "LegalPersonIdentifier", true, ValueMarshaller::String),
    ("LegalName", "LegalName", true, ValueMarshaller::String),
    ("LegalPersonAddress", "LegalAddress", false, ValueMarshaller::Base64Address),
    ("VATRegistrationNumber", "VATRegistration", false, ValueMarshaller::String),
    ("TaxReference", "TaxReference", false, ValueMarshaller::String),
    ("D-2012-17-EUIdentifier", "D-2012-17-EUIdentifier", false, ValueMarshaller::String),
    ("LEI", "LEI", false, ValueMarshaller::String),
    ("EORI", "EORI", false, ValueMarshaller::String),
    ("SEED", "SEED", false, ValueMarshaller::String),
    ("SIC", "SIC", false, ValueMarshaller::String),
];

/// Definitions indexed by name URI and by friendly name.
#[derive(Debug, Clone, Default)]
pub struct AttributeRegistry {
    by_name: HashMap<String, AttributeDefinition>,
    by_friendly_name: HashMap<String, String>,
}

impl AttributeRegistry {
    /// Builds a registry.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::InvalidAttribute`] if two definitions share a
    /// name URI or a friendly name.
    pub fn new<I>(definitions: I) -> ProtocolResult<Self>
    where
        I: IntoIterator<Item = AttributeDefinition>,
    {
        let mut registry = Self::default();
        for definition in definitions {
            let name = definition.name_uri().to_string();
            let friendly = definition.friendly_name().to_string();
            if registry.by_name.contains_key(&name) || registry.by_friendly_name.contains_key(&friendly) {
                return Err(ProtocolError::InvalidAttribute(format!(
                    "duplicate registry entry: {name} ({friendly})"
                )));
            }
            registry.by_friendly_name.insert(friendly, name.clone());
            registry.by_name.insert(name, definition);
        }
        Ok(registry)
    }

    /// The eIDAS attribute profile, including representative variants.
    ///
    /// # Errors
    ///
    /// Fails only if the built-in table is inconsistent.
    pub fn eidas() -> ProtocolResult<Self> {
        let groups = [
            (NATURAL, "", PersonType::NaturalPerson, NATURAL_ATTRIBUTES),
            (LEGAL, "", PersonType::LegalPerson, LEGAL_ATTRIBUTES),
            (REPV_NATURAL, "Representative", PersonType::RepvNaturalPerson, NATURAL_ATTRIBUTES),
            (REPV_LEGAL, "Representative", PersonType::RepvLegalPerson, LEGAL_ATTRIBUTES),
        ];

        let mut definitions = Vec::new();
        for (prefix, friendly_prefix, person_type, rows) in groups {
            for (local, friendly, required, marshaller) in rows {
                definitions.push(AttributeDefinition::new(
                    format!("{prefix}{local}"),
                    format!("{friendly_prefix}{friendly}"),
                    person_type,
                    *required,
                    *marshaller,
                )?);
            }
        }
        Self::new(definitions)
    }

    /// Looks up a definition by name URI.
    #[must_use]
    pub fn get(&self, name_uri: &str) -> Option<&AttributeDefinition> {
        self.by_name.get(name_uri)
    }

    /// Looks up a definition by friendly name.
    #[must_use]
    pub fn get_by_friendly_name(&self, friendly_name: &str) -> Option<&AttributeDefinition> {
        self.by_friendly_name
            .get(friendly_name)
            .and_then(|name| self.by_name.get(name))
    }

    /// Required definitions of `person_type`, sorted by name URI.
    #[must_use]
    pub fn minimum_data_set(&self, person_type: PersonType) -> Vec<&AttributeDefinition> {
        let mut set: Vec<_> = self
            .by_name
            .values()
            .filter(|d| d.is_required() && d.person_type() == person_type)
            .collect();
        set.sort_by(|a, b| a.name_uri().cmp(b.name_uri()));
        set
    }

    /// Number of definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    /// Returns `true` if the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eidas_registry_has_all_groups() {
        let registry = AttributeRegistry::eidas().unwrap();
        assert_eq!(registry.len(), 2 * (NATURAL_ATTRIBUTES.len() + LEGAL_ATTRIBUTES.len()));

        let dob = registry
            .get("http://eidas.europa.eu/attributes/naturalperson/DateOfBirth")
            .unwrap();
        assert_eq!(dob.marshaller(), ValueMarshaller::Date);
        assert!(dob.is_required());

        let repv = registry.get_by_friendly_name("RepresentativeLegalName").unwrap();
        assert_eq!(repv.person_type(), PersonType::RepvLegalPerson);
        assert_eq!(
            repv.name_uri(),
            "http://eidas.europa.eu/attributes/legalperson/representative/LegalName"
        );
    }

    #[test]
    fn minimum_data_sets() {
        let registry = AttributeRegistry::eidas().unwrap();
        let natural: Vec<_> = registry
            .minimum_data_set(PersonType::NaturalPerson)
            .into_iter()
            .map(AttributeDefinition::friendly_name)
            .collect();
        assert_eq!(natural, vec!["FamilyName", "FirstName", "DateOfBirth", "PersonIdentifier"]);

        assert_eq!(registry.minimum_data_set(PersonType::LegalPerson).len(), 2);
        assert_eq!(registry.minimum_data_set(PersonType::RepvNaturalPerson).len(), 4);
    }

    #[test]
    fn rejects_duplicates() {
        let registry = AttributeRegistry::eidas().unwrap();
        let gender = registry.get_by_friendly_name("Gender").unwrap().clone();
        assert!(AttributeRegistry::new([gender.clone(), gender]).is_err());
    }
}

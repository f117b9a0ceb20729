//! Immutable attribute map.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::{ProtocolError, ProtocolResult};
use crate::types::attribute::{AttributeDefinition, AttributeValue, PersonType};

#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry {
    definition: AttributeDefinition,
    values: BTreeSet<AttributeValue>,
}

/// Attributes keyed by definition, each with a set of values.
///
/// Built once through [`ImmutableAttributeMap::from_entries`] and never
/// modified afterwards. Iteration follows name URI order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImmutableAttributeMap {
    entries: BTreeMap<String, Entry>,
}

impl ImmutableAttributeMap {
    /// Creates an empty map.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a map from definitions and their values.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::InvalidAttribute`] if two entries share a
    /// name URI.
    pub fn from_entries<I>(entries: I) -> ProtocolResult<Self>
    where
        I: IntoIterator<Item = (AttributeDefinition, Vec<AttributeValue>)>,
    {
        let mut map = BTreeMap::new();
        for (definition, values) in entries {
            let name = definition.name_uri().to_string();
            if map.contains_key(&name) {
                return Err(ProtocolError::InvalidAttribute(format!(
                    "duplicate attribute definition: {name}"
                )));
            }
            map.insert(
                name,
                Entry {
                    definition,
                    values: values.into_iter().collect(),
                },
            );
        }
        Ok(Self { entries: map })
    }

    /// Number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the map holds no attribute.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `true` if an attribute named `name_uri` is present.
    #[must_use]
    pub fn contains(&self, name_uri: &str) -> bool {
        self.entries.contains_key(name_uri)
    }

    /// Values of the attribute named `name_uri`.
    #[must_use]
    pub fn values(&self, name_uri: &str) -> Option<&BTreeSet<AttributeValue>> {
        self.entries.get(name_uri).map(|e| &e.values)
    }

    /// All definitions.
    pub fn definitions(&self) -> impl Iterator<Item = &AttributeDefinition> {
        self.entries.values().map(|e| &e.definition)
    }

    /// All definitions with their values.
    pub fn iter(&self) -> impl Iterator<Item = (&AttributeDefinition, &BTreeSet<AttributeValue>)> {
        self.entries.values().map(|e| (&e.definition, &e.values))
    }

    /// Returns `true` if any attribute belongs to `person_type`.
    #[must_use]
    pub fn has_person_type(&self, person_type: PersonType) -> bool {
        self.definitions().any(|d| d.person_type() == person_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::attribute::ValueMarshaller;

    fn definition(name: &str) -> AttributeDefinition {
        AttributeDefinition::new(
            format!("http://eidas.europa.eu/attributes/naturalperson/{name}"),
            name,
            PersonType::NaturalPerson,
            true,
            ValueMarshaller::String,
        )
        .unwrap()
    }

    #[test]
    fn rejects_duplicate_definitions() {
        let result = ImmutableAttributeMap::from_entries([
            (definition("CurrentFamilyName"), vec![]),
            (definition("CurrentFamilyName"), vec![]),
        ]);
        assert!(matches!(result, Err(ProtocolError::InvalidAttribute(_))));
    }

    #[test]
    fn values_are_deduplicated() {
        let map = ImmutableAttributeMap::from_entries([(
            definition("CurrentGivenName"),
            vec![
                AttributeValue::String("Javier".into()),
                AttributeValue::String("Javier".into()),
            ],
        )])
        .unwrap();

        let name = "http://eidas.europa.eu/attributes/naturalperson/CurrentGivenName";
        assert_eq!(map.values(name).map(BTreeSet::len), Some(1));
        assert!(map.contains(name));
        assert!(map.has_person_type(PersonType::NaturalPerson));
        assert!(!map.has_person_type(PersonType::LegalPerson));
    }
}

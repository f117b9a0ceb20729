//! Mandatory-attribute and representation checks.

use crate::types::{AttributeDefinition, AttributeRegistry, ImmutableAttributeMap, PersonType};

/// Returns `true` if every required attribute present in `map` carries at
/// least one non-empty value.
///
/// Required attributes absent from the map are not considered here; see
/// [`missing_mandatory_attributes`].
#[must_use]
pub fn check_mandatory_attributes(map: &ImmutableAttributeMap) -> bool {
    map.iter()
        .filter(|(definition, _)| definition.is_required())
        .all(|(_, values)| values.iter().any(|v| !v.is_empty()))
}

/// Lists, comma separated, the friendly names of minimum-data-set attributes
/// missing for each person type that appears in `map`.
///
/// Returns an empty string when nothing is missing.
#[must_use]
pub fn missing_mandatory_attributes(map: &ImmutableAttributeMap, registry: &AttributeRegistry) -> String {
    missing_for_present_types(map, registry)
        .iter()
        .map(|d| d.friendly_name())
        .collect::<Vec<_>>()
        .join(", ")
}

fn missing_for_present_types<'r>(
    map: &ImmutableAttributeMap,
    registry: &'r AttributeRegistry,
) -> Vec<&'r AttributeDefinition> {
    [
        PersonType::NaturalPerson,
        PersonType::LegalPerson,
        PersonType::RepvNaturalPerson,
        PersonType::RepvLegalPerson,
    ]
    .into_iter()
    .filter(|person_type| map.has_person_type(*person_type))
    .flat_map(|person_type| registry.minimum_data_set(person_type))
    .filter(|definition| !map.contains(definition.name_uri()))
    .collect()
}

/// Minimum-data-set rule for requests.
///
/// The map must cover the natural or the legal person, and every person type
/// it touches, representatives included, must carry its full minimum data
/// set.
#[must_use]
pub fn check_minimum_data_set(map: &ImmutableAttributeMap, registry: &AttributeRegistry) -> bool {
    let natural_or_legal =
        map.has_person_type(PersonType::NaturalPerson) || map.has_person_type(PersonType::LegalPerson);
    if !natural_or_legal {
        tracing::info!("neither natural person nor legal person attributes requested");
        return false;
    }

    let missing = missing_for_present_types(map, registry);
    if !missing.is_empty() {
        tracing::info!(
            missing = %missing.iter().map(|d| d.name_uri()).collect::<Vec<_>>().join(","),
            "minimum data set incomplete"
        );
    }
    missing.is_empty()
}

/// Returns `false` if any representative attribute is requested.
#[must_use]
pub fn check_representative_attributes(map: &ImmutableAttributeMap) -> bool {
    !map.definitions().any(|d| d.person_type().is_representative())
}

/// Representation rule for responses.
///
/// A response either carries no representative attributes, or carries both
/// the represented person's attributes and the representative's complete
/// minimum data set.
#[must_use]
pub fn check_representation_response(map: &ImmutableAttributeMap, registry: &AttributeRegistry) -> bool {
    let representatives: Vec<PersonType> = [PersonType::RepvNaturalPerson, PersonType::RepvLegalPerson]
        .into_iter()
        .filter(|person_type| map.has_person_type(*person_type))
        .collect();

    if representatives.is_empty() {
        return true;
    }

    let represented =
        map.has_person_type(PersonType::NaturalPerson) || map.has_person_type(PersonType::LegalPerson);
    if !represented {
        return false;
    }

    representatives.into_iter().all(|person_type| {
        registry
            .minimum_data_set(person_type)
            .into_iter()
            .all(|definition| {
                map.values(definition.name_uri())
                    .is_some_and(|values| values.iter().any(|v| !v.is_empty()))
            })
    })
}

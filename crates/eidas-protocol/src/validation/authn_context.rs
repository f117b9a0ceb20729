//! `RequestedAuthnContext` rules.

use std::collections::HashSet;

use crate::error::ValidationError;
use crate::types::{AuthnContextComparison, LevelOfAssurance, NotifiedLevelOfAssurance, RequestedAuthnContext};

/// Checks the LoA list and comparison of a requested authentication context.
///
/// Rules apply in this order:
///
/// 1. the context must be present
/// 2. every value must be a notified level or a non-notified absolute URI
/// 3. no value may repeat
/// 4. `exact` and `minimum` need at least one value
/// 5. `minimum` takes a single notified level and nothing else
/// 6. `exact` with a notified level must list every stronger notified
///    level, and must carry at least one non-notified value
/// 7. `better`, `maximum` and unknown comparisons are rejected
///
/// An absent comparison only gets rules 1 to 3.
///
/// # Errors
///
/// Returns the [`ValidationError`] of the first rule that fails.
pub fn validate_requested_authn_context(
    context: Option<&RequestedAuthnContext>,
) -> Result<(), ValidationError> {
    let context = context.ok_or(ValidationError::NoContext)?;
    let refs = &context.authn_context_class_refs;

    let mut notified = Vec::new();
    let mut non_notified = 0_usize;
    for uri in refs {
        match LevelOfAssurance::parse(uri)? {
            LevelOfAssurance::Notified(level) => notified.push(level),
            LevelOfAssurance::NonNotified(_) => non_notified += 1,
        }
    }

    let mut seen = HashSet::with_capacity(refs.len());
    if !refs.iter().all(|uri| seen.insert(uri.as_str())) {
        return Err(ValidationError::Duplicates);
    }

    let Some(comparison) = &context.comparison else {
        return Ok(());
    };

    match comparison {
        AuthnContextComparison::Minimum => {
            if refs.is_empty() {
                return Err(ValidationError::NoLoaFound);
            }
            if notified.len() > 1 {
                return Err(ValidationError::MinimumMoreThanOne);
            }
            if non_notified > 0 {
                return Err(ValidationError::MinimumContainsNonNotified);
            }
            Ok(())
        }
        AuthnContextComparison::Exact => {
            if refs.is_empty() {
                return Err(ValidationError::NoLoaFound);
            }
            if let Some(weakest) = notified.iter().min() {
                if weakest.higher_levels().any(|level| !notified.contains(&level)) {
                    return Err(ValidationError::ExactNotifiedMissingHigherLevels);
                }
                if non_notified == 0 {
                    return Err(ValidationError::ExactContainsOnlyNotified);
                }
            }
            Ok(())
        }
        AuthnContextComparison::Better
        | AuthnContextComparison::Maximum
        | AuthnContextComparison::Other(_) => Err(ValidationError::ComparisonNotSupported),
    }
}

/// Weakest notified level in a list, if any.
#[must_use]
pub fn lowest_notified_level(levels: &[LevelOfAssurance]) -> Option<NotifiedLevelOfAssurance> {
    levels.iter().filter_map(LevelOfAssurance::notified).min()
}

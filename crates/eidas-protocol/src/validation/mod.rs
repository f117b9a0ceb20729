//! Request and response validation rules.

mod attributes;
mod authn_context;
mod sanity;

pub use attributes::{
    check_mandatory_attributes, check_minimum_data_set, check_representation_response,
    check_representative_attributes, missing_mandatory_attributes,
};
pub use authn_context::{lowest_notified_level, validate_requested_authn_context};
pub use sanity::check_request_sanity;

//! eIDAS protocol types.
//!
//! Levels of assurance, attributes, and the request and response messages
//! in their wire and validated forms.

mod attribute;
mod attribute_map;
mod authn_context;
mod authn_request;
mod loa;
mod registry;
mod response;

pub use attribute::*;
pub use attribute_map::*;
pub use authn_context::*;
pub use authn_request::*;
pub use loa::*;
pub use registry::*;
pub use response::*;

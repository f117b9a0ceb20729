//! eIDAS protocol validation.
//!
//! This crate holds the rules that gate every cross-border exchange:
//!
//! - **Level of assurance** - notified and non-notified LoA taxonomy and
//!   the `RequestedAuthnContext` comparison rules
//! - **Attributes** - definitions, the eIDAS registry, typed values and
//!   the minimum-data-set and representation checks
//! - **Request reading** - extraction of the fields the validators need from
//!   raw AuthnRequest XML
//! - **Processing** - the [`processor::ProtocolProcessor`] boundary that
//!   validates domain objects on their way to and from the wire
//!
//! XML canonicalization and signature computation are not performed here;
//! they are supplied through the [`processor::ProtocolSigner`] and
//! [`processor::MessageMarshaller`] collaborators.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod processor;
pub mod reader;
pub mod types;
pub mod validation;

pub use error::{ProtocolError, ProtocolResult, ValidationError};
pub use types::*;

//! # eidas-light
//!
//! Light tokens and the Node/Specific exchange.
//!
//! A light token is the opaque `issuer|id|createdOn|digest` reference that
//! travels between the generic eIDAS Node and a Specific module in place of
//! the light request or response it points to. The digest binds the token
//! to a shared secret, so only a holder of the secret can mint one.
//!
//! - [`LightToken`] and [`BinaryLightToken`] - the token and its wire bytes
//! - [`encoder`] - encoding, authenticated decoding, size limits
//! - [`helper`] - minting and base64 transport shortcuts
//! - [`LightRequest`] and [`LightResponse`] - the parked messages
//! - [`SpecificCommunicationService`] - parks messages in the cache and
//!   redeems tokens exactly once

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod binary;
pub mod communication;
pub mod encoder;
pub mod error;
pub mod helper;
pub mod request;
pub mod response;
pub mod token;

pub use binary::BinaryLightToken;
pub use communication::SpecificCommunicationService;
pub use error::{
    CommunicationError, CommunicationResult, LightMessageError, LightTokenError, LightTokenResult,
};
pub use request::LightRequest;
pub use response::LightResponse;
pub use token::LightToken;

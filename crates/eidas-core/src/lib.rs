//! # eidas-core
//!
//! Core utilities, configuration, and error handling for the eIDAS Node.
//!
//! This crate provides the foundational types shared by the token codec,
//! the cache gates and the protocol validators:
//!
//! - [`config`] - recognised configuration keys, immutable snapshots and
//!   the reloadable accessor used to resolve light token channels
//! - [`error`] - the top-level error type
//! - [`event`] - structured audit events emitted through `tracing`

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod event;

pub use config::{
    ConfigSnapshot, ConfigurationAccessor, ConfigurationKey, Direction, LightTokenChannel,
    NodeSide, ReloadableConfiguration, StaticConfiguration,
};
pub use error::{Error, Result};

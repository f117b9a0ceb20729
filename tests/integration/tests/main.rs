//! End-to-end tests of the eIDAS Node crates.
//!
//! These tests run the token exchange, the replay gate and request
//! validation together against the in-memory cache.

mod common;
mod light_exchange;
mod replay;
mod request_validation;

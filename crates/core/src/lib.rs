//! Seasons Core - Shared types library.
//!
//! This crate provides common types used across all Seasons components:
//! - `storefront` - The client-side marketplace core (local persistence +
//!   session synchronization)
//! - `integration-tests` - End-to-end tests against a mocked remote service
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails, and
//!   domain enums

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;

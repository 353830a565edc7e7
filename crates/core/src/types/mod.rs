//! Core types for Seasons.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod kinds;
pub mod price;

pub use email::{Email, EmailError};
pub use id::*;
pub use kinds::{ParseThemeModeError, ThemeMode, UserType};
pub use price::{CurrencyCode, Price};

//! Seasons storefront client core.
//!
//! This crate holds the two pieces of the Seasons marketplace client that own
//! real state: the local persistence store (cart, wishlist, recent products,
//! search history, preferences, theme) and the session/profile synchronizer
//! that reconciles a remote identity session with the locally cached profile.
//!
//! Page rendering, routing, and the hosted backend itself live elsewhere; UI
//! views consume [`storage::LocalStore`] and [`auth::AuthContext`] and nothing
//! in here opens a port or renders markup.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod auth;
pub mod config;
pub mod models;
pub mod remote;
pub mod storage;

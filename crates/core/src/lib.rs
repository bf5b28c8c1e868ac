//! Grillpoint Core - Shared domain types.
//!
//! This crate provides the validated identity types used across the
//! Grillpoint services:
//! - `api` - The order-taking HTTP backend
//! - `integration-tests` - End-to-end tests against the API
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for usernames and email addresses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;

//! Core types for Grillpoint.
//!
//! Validated newtype wrappers around the identity fields that flow
//! through the credential and session subsystem. Parsing happens once
//! at the edge; everything downstream works with the validated type.

mod email;
mod username;

pub use email::{Email, EmailError};
pub use username::{Username, UsernameError};

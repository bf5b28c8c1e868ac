//! User domain types.

use serde::Serialize;

use grillpoint_core::{Email, Username};

/// A user's public profile.
///
/// This is the shape returned by `GET /api/profile`; the password hash
/// never appears here.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct UserProfile {
    /// Login name (primary key of the credential store).
    pub username: Username,
    /// Contact email address.
    pub email: Email,
    /// Informational bonus-point balance.
    pub bonus: i64,
}

//! Domain models.

pub mod cart;
pub mod session;
pub mod user;

pub use cart::{Cart, CartItem};
pub use session::{AuthContext, CartIdentity};
pub use user::UserProfile;

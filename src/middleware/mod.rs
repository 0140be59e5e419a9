pub mod auth;
pub mod roles;

pub use auth::require_auth;
pub use auth::CurrentUser;
pub use roles::*;

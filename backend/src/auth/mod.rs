//! Authentication module
//!
//! Provides JWT-based session credentials with bcrypt password hashing.

mod jwt;
mod middleware;
mod password;

pub use jwt::{Claims, TokenConfig, TokenError, TokenService};
pub use middleware::{protect, restrict_to, CurrentUser};
pub use password::PasswordService;

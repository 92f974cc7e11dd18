//! Business logic services
//!
//! Services encapsulate business logic and coordinate between
//! repositories and the credential machinery.

pub mod auth;

pub use auth::{AuthService, SignedSession};

//! Database repositories
//!
//! Provides data access layer for database operations.

pub mod session;
pub mod todo;
pub mod user;

pub use session::SessionStore;
pub use todo::{NewTodo, TodoPriority, TodoRecord, TodoRepository, TodoStatus, UpdateTodo};
pub use user::{NewUser, PublicUser, Role, UserRecord, UserRepository};

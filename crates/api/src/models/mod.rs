//! Domain models for the API.
//!
//! These types represent validated domain objects separate from database row
//! types and from the JSON request/response bodies.

pub mod store;
pub mod user;

pub use store::{NewStore, Store, StoreItem};
pub use user::{AuthUser, User, UserProfile};

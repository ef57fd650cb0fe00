//! Business logic services.
//!
//! # Services
//!
//! - `auth` - Password signup/login and bearer token issuance
//! - `stores` - Store CRUD with ownership checks
//! - `completion` - AI text completion proxy
//! - `payments` - Stripe payment intent proxy
//!
//! Services borrow their repositories from [`crate::state::AppState`] for the
//! duration of one request and hold no state of their own.

pub mod auth;
pub mod completion;
pub mod payments;
pub mod stores;

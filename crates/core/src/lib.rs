//! DreamNex Core - Shared types library.
//!
//! This crate provides the domain types used across the DreamNex components:
//! - `api` - JSON API server (auth, stores, AI and payment proxies)
//! - `cli` - Command-line tools for migrations
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices and normalized emails

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;

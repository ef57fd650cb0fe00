//! DreamNex API library.
//!
//! This crate provides the API server as a library, allowing the router to be
//! built and exercised in tests without binding a socket.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod response;
pub mod routes;
pub mod services;
pub mod state;

pub use routes::app;
pub use state::AppState;

//! The `donelist` library crate.
//!
//! Core business logic for the todo API: domain models, the JWT session
//! lifecycle (login, refresh, password reset), ownership-scoped CRUD routes,
//! error handling, and a retrying HTTP client. The binary in `main.rs` wires
//! these together into a running server.

pub mod auth;
pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;

pub use client::ApiClient;
pub use config::Config;
pub use error::AppError;

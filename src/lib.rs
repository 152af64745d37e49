#![deny(missing_docs)]

//! Core library for the student directory service.

/// HTTP routing and REST handlers.
pub mod api;
/// Environment-driven configuration management.
pub mod config;
/// Structured logging and tracing setup.
pub mod logging;
/// Student record persistence backends.
pub mod store;
/// Student record types and request coercion.
pub mod students;

//! Driven adapters implementing the domain ports.
//!
//! - **memory**: mutex-guarded in-process repositories for development and tests
//! - **persistence**: PostgreSQL repositories using Diesel
//! - **security**: Argon2id password hashing and HS256 access tokens
//! - **metrics**: Prometheus exporters (feature-gated)
//!
//! Adapters translate between domain types and their backing representation
//! and hold no business rules.

pub mod memory;
#[cfg(feature = "metrics")]
pub mod metrics;
pub mod persistence;
pub mod security;

//! Cinescope Common Library
//!
//! Shared code for the Cinescope services including:
//! - Database entities and the repository pattern
//! - Error types and handling
//! - Configuration management
//! - JWT authentication and group authorization
//! - Metrics and observability

pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod metrics;

// Re-export commonly used types
pub use config::AppConfig;
pub use db::Repository;
pub use errors::{AppError, Result};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! # fk_migrations Core
//!
//! Core types, traits, and error handling for fk_migrations.
//!
//! This crate provides the foundational building blocks used throughout
//! the workspace, including:
//!
//! - **Types**: SQL dialects and referential actions
//! - **Traits**: `Validatable`
//! - **Errors**: Unified error handling with `MigrationError` and `MigrationResult`
//!

pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used items at crate root
pub use error::{MigrationError, MigrationResult, ResultExt};
pub use traits::Validatable;
pub use types::{Dialect, ReferentialAction};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");

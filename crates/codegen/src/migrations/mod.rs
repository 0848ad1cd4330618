//! # Migration Scripts
//!
//! Renders a finished migration step as a pair of SQL files.
//!
//! ## Generated Files
//!
//! Each migration document produces a directory named:
//! ```text
//! migrations/{YYYYMMDDHHMMSS}_{name}/up.sql
//! migrations/{YYYYMMDDHHMMSS}_{name}/down.sql
//! ```
//!
//! ## Features
//!
//! - Header comment naming the migration and target dialect
//! - `down.sql` undoes `up.sql` in reverse order
//! - Timestamps offset per document so a batch keeps its input order

pub mod script;

pub use script::{MigrationScript, migration_version, sanitize_name};

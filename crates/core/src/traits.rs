//! Core traits for fk_migrations
//!
//! This module defines the traits shared across the workspace so that
//! constraints, table definitions and schema documents check themselves the
//! same way.

use crate::error::MigrationResult;

// ============================================================================
// Validatable Trait
// ============================================================================

/// Trait for types that can be validated
///
/// Types implementing this trait can check their internal consistency
/// and return validation errors if the state is invalid.
///
/// # Example
///
/// ```rust,ignore
/// use fkm_core::{MigrationError, MigrationResult, Validatable};
///
/// struct Column {
///     table: String,
///     name: String,
/// }
///
/// impl Validatable for Column {
///     fn validate(&self) -> MigrationResult<()> {
///         if self.name.is_empty() {
///             return Err(MigrationError::invalid_constraint(&self.table, "column name is empty"));
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Validatable {
    /// Validate the current state of the object
    ///
    /// Returns `Ok(())` if valid, or a `MigrationError` describing the problem.
    fn validate(&self) -> MigrationResult<()>;

    /// Check if the object is valid without returning error details
    fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Get all validation errors (for types that can have multiple errors)
    fn validation_errors(&self) -> Vec<String> {
        match self.validate() {
            Ok(()) => vec![],
            Err(e) => vec![e.to_string()],
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

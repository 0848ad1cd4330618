//! The seam between declarations and DDL text
//!
//! Table definitions and migration steps never format SQL themselves. They
//! hand constraints to a [`ForeignKeyDdl`] implementation that is injected by
//! the caller, and keep the resulting [`EmittedConstraint`] records so a step
//! can be reversed.

use crate::constraint::ForeignKeyConstraint;
use fkm_core::{Dialect, MigrationResult};
use serde::Serialize;

// ============================================================================
// ForeignKeyDdl Trait
// ============================================================================

/// Turns foreign key constraints into DDL statements
pub trait ForeignKeyDdl {
    /// Dialect the statements are written for
    fn dialect(&self) -> Dialect;

    /// Constraint name as it will appear in the emitted DDL
    fn resolve_name(&self, constraint: &ForeignKeyConstraint) -> MigrationResult<String>;

    /// `ALTER TABLE ... ADD CONSTRAINT ...` for the constraint
    fn generate(&self, constraint: &ForeignKeyConstraint) -> MigrationResult<String>;

    /// Statement that drops the constraint again
    fn generate_drop(&self, constraint: &ForeignKeyConstraint) -> MigrationResult<String>;

    /// Generate both directions and take ownership of the constraint
    fn emit(&self, constraint: ForeignKeyConstraint) -> MigrationResult<EmittedConstraint> {
        Ok(EmittedConstraint {
            name: self.resolve_name(&constraint)?,
            up: self.generate(&constraint)?,
            down: self.generate_drop(&constraint)?,
            constraint,
        })
    }
}

// ============================================================================
// EmittedConstraint
// ============================================================================

/// A constraint together with the DDL generated for it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmittedConstraint {
    /// The declared constraint
    pub constraint: ForeignKeyConstraint,

    /// Resolved constraint name (may be truncated)
    pub name: String,

    /// Statement adding the constraint
    pub up: String,

    /// Statement dropping the constraint
    pub down: String,
}

// ============================================================================
// Change
// ============================================================================

/// One schema change recorded by a migration step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "constraint", rename_all = "snake_case")]
pub enum Change {
    /// A foreign key was added
    Added(EmittedConstraint),
    /// A foreign key was removed
    Removed(EmittedConstraint),
}

impl Change {
    /// Statement applying the change
    pub fn up(&self) -> &str {
        match self {
            Change::Added(emitted) => &emitted.up,
            Change::Removed(emitted) => &emitted.down,
        }
    }

    /// Statement reverting the change
    pub fn down(&self) -> &str {
        match self {
            Change::Added(emitted) => &emitted.down,
            Change::Removed(emitted) => &emitted.up,
        }
    }

    /// The emitted constraint this change is about
    pub fn emitted(&self) -> &EmittedConstraint {
        match self {
            Change::Added(emitted) | Change::Removed(emitted) => emitted,
        }
    }

    /// Check if this change adds a constraint
    pub fn is_addition(&self) -> bool {
        matches!(self, Change::Added(_))
    }
}

// ============================================================================
// Test support
// ============================================================================

/// Minimal unquoted generator used by this crate's unit tests
#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use fkm_core::MigrationError;

    pub(crate) struct PlainDdl {
        pub(crate) limit: usize,
    }

    impl Default for PlainDdl {
        fn default() -> Self {
            Self { limit: 63 }
        }
    }

    impl ForeignKeyDdl for PlainDdl {
        fn dialect(&self) -> Dialect {
            Dialect::PostgreSQL
        }

        fn resolve_name(&self, constraint: &ForeignKeyConstraint) -> MigrationResult<String> {
            if constraint.name().len() > self.limit {
                return Err(MigrationError::identifier_too_long(
                    constraint.name(),
                    self.limit,
                ));
            }
            Ok(constraint.name().to_string())
        }

        fn generate(&self, constraint: &ForeignKeyConstraint) -> MigrationResult<String> {
            Ok(format!(
                "ALTER TABLE {} ADD CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} ({})",
                constraint.from_table(),
                self.resolve_name(constraint)?,
                constraint.from_column(),
                constraint.to_table(),
                constraint.to_column(),
            ))
        }

        fn generate_drop(&self, constraint: &ForeignKeyConstraint) -> MigrationResult<String> {
            Ok(format!(
                "ALTER TABLE {} DROP CONSTRAINT {}",
                constraint.from_table(),
                self.resolve_name(constraint)?,
            ))
        }
    }
}

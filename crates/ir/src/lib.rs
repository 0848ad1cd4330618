//! # fk_migrations IR
//!
//! The foreign key model and the declaration surface migration authors use.
//!
//! ## Core Concepts
//!
//! - **ForeignKeyConstraint**: one immutable constraint from a table column to
//!   another table's column
//! - **TableDefinition**: collects constraints while a table is defined and
//!   flushes them once the table exists
//! - **MigrationStep**: holds the injected DDL generator and records every
//!   change so it can be reversed
//! - **MigrationDocument**: the same declarations written down as JSON or TOML
//!

// Module declarations
pub mod constraint;
pub mod document;
pub mod emit;
pub mod migration;
pub mod naming;
pub mod table;

// Re-export commonly used types at crate root
pub use constraint::{ForeignKeyConstraint, ForeignKeyOptions};
pub use document::{
    AlterDocument, ColumnDocument, DocumentFormat, ForeignKeyDocument, MigrationDocument,
    TableDocument, apply_document, is_document_file, load_document, load_document_from_str,
};
pub use emit::{Change, EmittedConstraint, ForeignKeyDdl};
pub use migration::MigrationStep;
pub use table::{ColumnOptions, References, TableDefinition, TableState};

// Re-export core types that are commonly used with IR
pub use fkm_core::{Dialect, MigrationError, MigrationResult, ReferentialAction, Validatable};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Prelude Module
// ============================================================================

/// Convenient re-exports for migration authors
pub mod prelude {
    pub use crate::{
        ColumnOptions, Dialect, ForeignKeyConstraint, ForeignKeyDdl, ForeignKeyOptions,
        MigrationError, MigrationResult, MigrationStep, ReferentialAction, References,
        TableDefinition,
    };
}

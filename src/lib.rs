//! # fk_migrations
//!
//! Foreign key aware table definitions and DDL generation for schema
//! migrations.
//!
//! Migration code declares foreign keys while defining a table; once the
//! table exists the pending constraints are flushed through an injected
//! [`DdlGenerator`] as `ALTER TABLE ... ADD CONSTRAINT` statements. Every
//! emitted constraint keeps its inverse so the migration can be reverted.
//!
//! ## Crates
//!
//! - [`fkm_core`]: errors, dialects and referential actions
//! - [`fkm_ir`]: constraint model, table definitions, migration steps, documents
//! - [`fkm_codegen`]: dialect-specific DDL and migration scripts
//!
//! ## Usage
//!
//! ```rust,ignore
//! use fk_migrations::prelude::*;
//!
//! let ddl = DdlGenerator::new(GeneratorConfig::new(Dialect::PostgreSQL))?;
//! let mut step = MigrationStep::new("create_posts", &ddl);
//!
//! let mut posts = step.create_table("posts");
//! posts.declare_foreign_key("author_id", "authors", ForeignKeyOptions::new())?;
//! step.finish_table(&mut posts)?;
//!
//! assert_eq!(
//!     step.up(),
//!     ["ALTER TABLE posts ADD CONSTRAINT fk_posts_author_id FOREIGN KEY (author_id) REFERENCES authors (id)"]
//! );
//! ```

pub use fkm_codegen as codegen;
pub use fkm_core as core;
pub use fkm_ir as ir;

pub use fkm_codegen::{
    DdlGenerator, GeneratedMigrations, Generator, GeneratorConfig, MigrationScript, generate,
    generate_drop,
};
pub use fkm_core::{Dialect, MigrationError, MigrationResult, ReferentialAction};
pub use fkm_ir::{
    ColumnOptions, ForeignKeyConstraint, ForeignKeyDdl, ForeignKeyOptions, MigrationDocument,
    MigrationStep, References, TableDefinition, TableState,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Everything a migration author needs in scope
pub mod prelude {
    pub use fkm_codegen::{DdlGenerator, GeneratorConfig};
    pub use fkm_ir::prelude::*;
}

// ============================================================================
// Tests
// ============================================================================

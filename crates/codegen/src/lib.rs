//! # fk_migrations Codegen
//!
//! DDL generation for foreign key constraints.
//!
//! This crate turns the constraints declared through `fkm_ir` into
//! dialect-specific SQL and renders whole migration steps as files.
//!
//! ## Features
//!
//! - **DDL Generation**: `ADD CONSTRAINT` / `DROP CONSTRAINT` per dialect
//! - **Identifier Limits**: deterministic truncated+hashed fallback names
//! - **Migration Scripts**: `up.sql` / `down.sql` per migration document
//!

// ============================================================================
// Modules
// ============================================================================

pub mod ddl;
pub mod generator;
pub mod identifier;
pub mod migrations;

// ============================================================================
// Re-exports
// ============================================================================

pub use ddl::{DdlGenerator, generate, generate_drop};
pub use generator::{GenerationSummary, Generator, summarize};
pub use identifier::truncate_identifier;
pub use migrations::MigrationScript;

use fkm_core::{Dialect, MigrationError, MigrationResult, ReferentialAction};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Smallest identifier limit that still leaves room for a hashed suffix
pub const MIN_IDENTIFIER_LIMIT: usize = 16;

// ============================================================================
// GeneratorConfig
// ============================================================================

/// Configuration for the DDL generator, supplied once at construction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Target dialect
    pub dialect: Dialect,

    /// Identifier length limit (defaults to the dialect's limit)
    pub identifier_limit: Option<usize>,

    /// On delete action for constraints that do not declare one
    pub on_delete: ReferentialAction,

    /// On update action for constraints that do not declare one
    pub on_update: ReferentialAction,

    /// Whether to quote identifiers with the dialect's delimiters
    pub quote_identifiers: bool,

    /// Whether to shorten over-long names instead of failing
    pub truncate_long_names: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            dialect: Dialect::default(),
            identifier_limit: None,
            on_delete: ReferentialAction::None,
            on_update: ReferentialAction::None,
            quote_identifiers: false,
            truncate_long_names: true,
        }
    }
}

impl GeneratorConfig {
    /// Create a configuration for a dialect with default values
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            ..Self::default()
        }
    }

    /// Create a configuration from a dialect identifier such as `"postgres"`
    pub fn for_dialect(dialect: &str) -> MigrationResult<Self> {
        Ok(Self::new(dialect.parse()?))
    }

    /// Override the identifier length limit
    pub fn with_identifier_limit(mut self, limit: usize) -> Self {
        self.identifier_limit = Some(limit);
        self
    }

    /// Set the default on delete action
    pub fn with_on_delete(mut self, action: ReferentialAction) -> Self {
        self.on_delete = action;
        self
    }

    /// Set the default on update action
    pub fn with_on_update(mut self, action: ReferentialAction) -> Self {
        self.on_update = action;
        self
    }

    /// Quote identifiers in generated DDL
    pub fn quoted(mut self) -> Self {
        self.quote_identifiers = true;
        self
    }

    /// Fail with `IdentifierTooLong` instead of truncating
    pub fn without_truncation(mut self) -> Self {
        self.truncate_long_names = false;
        self
    }

    /// Effective identifier length limit
    pub fn identifier_limit(&self) -> usize {
        self.identifier_limit
            .unwrap_or_else(|| self.dialect.identifier_limit())
    }

    /// Check the configuration for values the generator cannot honour
    pub fn validate(&self) -> MigrationResult<()> {
        let limit = self.identifier_limit();
        if limit < MIN_IDENTIFIER_LIMIT {
            return Err(MigrationError::config(format!(
                "identifier limit {limit} is below the minimum of {MIN_IDENTIFIER_LIMIT}"
            )));
        }
        if limit > self.dialect.identifier_limit() {
            return Err(MigrationError::config(format!(
                "identifier limit {limit} exceeds the {} maximum of {}",
                self.dialect,
                self.dialect.identifier_limit()
            )));
        }

        for (clause, action) in [("on_delete", self.on_delete), ("on_update", self.on_update)] {
            if !self.dialect.supports_action(action) {
                return Err(MigrationError::config(format!(
                    "default {clause} action {action} is not supported by {}",
                    self.dialect
                )));
            }
        }

        Ok(())
    }
}

// ============================================================================
// GeneratedFile
// ============================================================================

/// Represents a single generated file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    /// Relative path from output directory
    pub path: PathBuf,

    /// File content
    pub content: String,
}

impl GeneratedFile {
    /// Create a SQL migration file
    pub fn sql(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

// ============================================================================
// GeneratedMigrations
// ============================================================================

/// Everything produced for a batch of migration documents
#[derive(Debug, Clone, Default)]
pub struct GeneratedMigrations {
    /// One script per document, in input order
    pub scripts: Vec<MigrationScript>,

    /// Rendered migration files
    pub files: Vec<GeneratedFile>,

    /// Warnings collected during generation
    pub warnings: Vec<String>,
}

impl GeneratedMigrations {
    /// Create an empty output
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file
    pub fn add_file(&mut self, file: GeneratedFile) {
        self.files.push(file);
    }

    /// Add a warning
    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// Get the number of files
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Total number of forward statements across all scripts
    pub fn statement_count(&self) -> usize {
        self.scripts.iter().map(MigrationScript::statement_count).sum()
    }

    /// Check if there are any warnings
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Write all files below `base_dir`
    ///
    /// Existing files are left untouched unless `overwrite` is set.
    pub fn write_to_disk(&self, base_dir: impl AsRef<Path>, overwrite: bool) -> MigrationResult<()> {
        let base_dir = base_dir.as_ref();

        for file in &self.files {
            let full_path = base_dir.join(&file.path);

            if full_path.exists() && !overwrite {
                return Err(MigrationError::FileWrite {
                    path: full_path,
                    message: "file already exists".to_string(),
                });
            }

            // Create parent directories
            if let Some(parent) = full_path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| MigrationError::DirectoryCreate {
                    path: parent.to_path_buf(),
                    message: e.to_string(),
                })?;
            }

            std::fs::write(&full_path, &file.content).map_err(|e| MigrationError::FileWrite {
                path: full_path.clone(),
                message: e.to_string(),
            })?;
        }

        tracing::info!(
            output_dir = %base_dir.display(),
            files = self.files.len(),
            "migration files written",
        );

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

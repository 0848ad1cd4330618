//! Declarative migration documents
//!
//! A migration document describes the tables a migration creates or alters
//! and the foreign keys they carry, in JSON or TOML. Loading a document and
//! applying it to a [`MigrationStep`] is equivalent to making the same
//! declarations by hand.
//!
//! ```toml
//! name = "create_blog"
//!
//! [primary_keys]
//! legacy_users = "user_no"
//!
//! [[tables]]
//! name = "posts"
//! columns = [
//!     { name = "author_id", on_delete = "cascade" },
//!     { name = "reviewer", references = "legacy_users" },
//!     { name = "title" },
//! ]
//!
//! [[alter]]
//! table = "comments"
//! add_columns = [{ name = "post_id" }]
//! ```

use crate::constraint::ForeignKeyOptions;
use crate::migration::MigrationStep;
use crate::naming;
use crate::table::{ColumnOptions, References};
use fkm_core::{MigrationError, MigrationResult, Validatable};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

// ============================================================================
// Formats
// ============================================================================

/// On-disk format of a migration document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentFormat {
    Json,
    Toml,
}

impl DocumentFormat {
    /// Detect the format from a file extension
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        let ext = path.as_ref().extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(DocumentFormat::Json),
            "toml" => Some(DocumentFormat::Toml),
            _ => None,
        }
    }

    /// File extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            DocumentFormat::Json => "json",
            DocumentFormat::Toml => "toml",
        }
    }
}

// ============================================================================
// Document types
// ============================================================================

/// A column declared in a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDocument {
    /// Column name
    pub name: String,

    /// Referenced table; inferred from the name when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub references: Option<String>,

    /// Set to `false` to suppress the foreign key for an `_id` column
    #[serde(default = "default_true")]
    pub foreign_key: bool,

    /// Foreign key settings
    #[serde(flatten)]
    pub options: ForeignKeyOptions,
}

impl ColumnDocument {
    /// Column options equivalent to this declaration
    pub fn to_column_options(&self) -> ColumnOptions {
        let references = match (&self.references, self.foreign_key) {
            (_, false) => References::None,
            (Some(table), true) => References::table(table),
            (None, true) => References::Infer,
        };
        ColumnOptions::new()
            .references(references)
            .with_foreign_key(self.options.clone())
    }
}

/// An explicit foreign key declared in a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKeyDocument {
    /// Foreign key column
    pub column: String,

    /// Referenced table
    pub references: String,

    /// Foreign key settings
    #[serde(flatten)]
    pub options: ForeignKeyOptions,
}

/// A table created by the migration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDocument {
    /// Table name
    pub name: String,

    /// Primary key column
    #[serde(default = "default_primary_key")]
    pub primary_key: String,

    /// Columns, in declaration order
    #[serde(default)]
    pub columns: Vec<ColumnDocument>,

    /// Foreign keys declared explicitly
    #[serde(default)]
    pub foreign_keys: Vec<ForeignKeyDocument>,
}

/// Changes to a table that already exists
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlterDocument {
    /// Table name
    pub table: String,

    /// Columns added to the table
    #[serde(default)]
    pub add_columns: Vec<ColumnDocument>,

    /// Foreign keys added to the table
    #[serde(default)]
    pub add_foreign_keys: Vec<ForeignKeyDocument>,

    /// Foreign keys removed from the table
    #[serde(default)]
    pub remove_foreign_keys: Vec<ForeignKeyDocument>,
}

/// A whole migration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationDocument {
    /// Migration name (defaults to the file stem)
    #[serde(default)]
    pub name: String,

    /// Primary keys of tables referenced but not created here
    #[serde(default)]
    pub primary_keys: BTreeMap<String, String>,

    /// Tables created by this migration
    #[serde(default)]
    pub tables: Vec<TableDocument>,

    /// Existing tables altered by this migration
    #[serde(default)]
    pub alter: Vec<AlterDocument>,

    /// File the document was loaded from
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

fn default_true() -> bool {
    true
}

fn default_primary_key() -> String {
    naming::DEFAULT_PRIMARY_KEY.to_string()
}

impl MigrationDocument {
    /// Number of tables created or altered
    pub fn table_count(&self) -> usize {
        self.tables.len() + self.alter.len()
    }

    fn invalid(&self, message: impl Into<String>) -> MigrationError {
        MigrationError::InvalidDocument {
            path: self
                .source
                .clone()
                .unwrap_or_else(|| PathBuf::from("<inline>")),
            message: message.into(),
        }
    }
}

impl Validatable for MigrationDocument {
    fn validate(&self) -> MigrationResult<()> {
        if self.name.trim().is_empty() {
            return Err(self.invalid("migration name is empty"));
        }

        let mut seen = HashSet::new();
        for table in &self.tables {
            if table.name.trim().is_empty() {
                return Err(self.invalid("table name is empty"));
            }
            if !seen.insert(table.name.as_str()) {
                return Err(self.invalid(format!("table '{}' is created twice", table.name)));
            }
            if table.columns.iter().any(|c| c.name.trim().is_empty()) {
                return Err(self.invalid(format!(
                    "table '{}' has a column with an empty name",
                    table.name
                )));
            }
        }

        if self.alter.iter().any(|a| a.table.trim().is_empty()) {
            return Err(self.invalid("alter block has an empty table name"));
        }

        Ok(())
    }
}

// ============================================================================
// Load Functions
// ============================================================================

/// Load a migration document from a `.json` or `.toml` file
///
/// The migration name defaults to the file stem.
pub fn load_document(path: impl AsRef<Path>) -> MigrationResult<MigrationDocument> {
    let path = path.as_ref();
    let format = DocumentFormat::from_path(path).ok_or_else(|| MigrationError::InvalidDocument {
        path: path.to_path_buf(),
        message: "expected a .json or .toml file".to_string(),
    })?;

    let text = std::fs::read_to_string(path).map_err(|e| MigrationError::FileRead {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let mut document =
        load_document_from_str(&text, format).map_err(|e| MigrationError::InvalidDocument {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    document.source = Some(path.to_path_buf());
    if document.name.is_empty() {
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            document.name = stem.to_string();
        }
    }

    document.validate()?;
    Ok(document)
}

/// Parse a migration document from text
///
/// The document is not validated; [`apply_document`] validates before
/// applying.
pub fn load_document_from_str(
    text: &str,
    format: DocumentFormat,
) -> MigrationResult<MigrationDocument> {
    let document = match format {
        DocumentFormat::Json => serde_json::from_str(text)?,
        DocumentFormat::Toml => toml::from_str(text)?,
    };
    Ok(document)
}

/// Check if a path looks like a migration document
pub fn is_document_file(path: impl AsRef<Path>) -> bool {
    DocumentFormat::from_path(path).is_some()
}

// ============================================================================
// Apply
// ============================================================================

/// Replay a document's declarations on a migration step
///
/// Tables are created in document order, then alterations are applied.
pub fn apply_document(document: &MigrationDocument, step: &mut MigrationStep<'_>) -> MigrationResult<()> {
    document.validate()?;

    for (table, column) in &document.primary_keys {
        step.register_primary_key(table, column);
    }

    for table_doc in &document.tables {
        let mut table = step.create_table_with_primary_key(&table_doc.name, &table_doc.primary_key);

        for column in &table_doc.columns {
            table.column(&column.name, column.to_column_options())?;
        }
        for fk in &table_doc.foreign_keys {
            table.declare_foreign_key(&fk.column, &fk.references, fk.options.clone())?;
        }

        step.finish_table(&mut table)?;
    }

    for alter in &document.alter {
        for fk in &alter.remove_foreign_keys {
            step.remove_foreign_key(&alter.table, &fk.column, &fk.references, fk.options.clone())?;
        }
        for column in &alter.add_columns {
            step.add_column(&alter.table, &column.name, column.to_column_options())?;
        }
        for fk in &alter.add_foreign_keys {
            step.add_foreign_key(&alter.table, &fk.column, &fk.references, fk.options.clone())?;
        }
    }

    tracing::info!(
        migration = %document.name,
        tables = document.table_count(),
        changes = step.changes().len(),
        "applied migration document",
    );

    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

//! Error types for fk_migrations
//!
//! This module provides unified error handling across the workspace: invalid
//! constraint declarations, dialect configuration problems, identifier length
//! violations, table-definition lifecycle misuse, and the IO / serialization
//! errors raised while loading schema documents.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for fk_migrations
#[derive(Debug, Error)]
pub enum MigrationError {
    // ========================================================================
    // Declaration Errors
    // ========================================================================
    /// A foreign key declaration has a bad shape (empty column, duplicate name, ...)
    #[error("Invalid foreign key constraint '{constraint}': {message}")]
    InvalidConstraint { constraint: String, message: String },

    /// A foreign key was declared on a table whose constraints were already flushed
    #[error("Constraints for table '{table}' were already flushed")]
    AlreadyFlushed { table: String },

    // ========================================================================
    // Dialect Errors
    // ========================================================================
    /// The dialect identifier is not one this library generates DDL for
    #[error("Unsupported SQL dialect: '{0}'")]
    UnsupportedDialect(String),

    /// A generated identifier exceeds the dialect's length limit
    #[error("Identifier '{name}' is {length} bytes long, exceeding the limit of {limit}")]
    IdentifierTooLong {
        name: String,
        length: usize,
        limit: usize,
    },

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Schema document is structurally invalid
    #[error("Invalid schema document '{path}': {message}")]
    InvalidDocument { path: PathBuf, message: String },

    // ========================================================================
    // IO Errors
    // ========================================================================
    /// File IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// File read error
    #[error("Failed to read file '{path}': {message}")]
    FileRead { path: PathBuf, message: String },

    /// File write error
    #[error("Failed to write file '{path}': {message}")]
    FileWrite { path: PathBuf, message: String },

    /// Directory creation failed
    #[error("Failed to create directory '{path}': {message}")]
    DirectoryCreate { path: PathBuf, message: String },

    // ========================================================================
    // Serialization Errors
    // ========================================================================
    /// JSON (de)serialization error
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML deserialization error
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    // ========================================================================
    // Generic Errors
    // ========================================================================
    /// Generic error with context
    #[error("{context}: {message}")]
    WithContext { context: String, message: String },
}

impl MigrationError {
    /// Create an invalid constraint error
    pub fn invalid_constraint(constraint: impl Into<String>, msg: impl Into<String>) -> Self {
        MigrationError::InvalidConstraint {
            constraint: constraint.into(),
            message: msg.into(),
        }
    }

    /// Create an already-flushed error for a table
    pub fn already_flushed(table: impl Into<String>) -> Self {
        MigrationError::AlreadyFlushed {
            table: table.into(),
        }
    }

    /// Create an unsupported dialect error
    pub fn unsupported_dialect(dialect: impl Into<String>) -> Self {
        MigrationError::UnsupportedDialect(dialect.into())
    }

    /// Create an identifier-too-long error
    pub fn identifier_too_long(name: impl Into<String>, limit: usize) -> Self {
        let name = name.into();
        MigrationError::IdentifierTooLong {
            length: name.len(),
            name,
            limit,
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        MigrationError::InvalidConfig(msg.into())
    }

    /// Create an error with context
    pub fn with_context(context: impl Into<String>, msg: impl Into<String>) -> Self {
        MigrationError::WithContext {
            context: context.into(),
            message: msg.into(),
        }
    }

    /// Whether the caller can recover from this error without author intervention.
    ///
    /// Only over-long identifiers qualify: the generator substitutes a
    /// deterministic truncated name.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, MigrationError::IdentifierTooLong { .. })
    }

    /// Whether this error must abort the current migration step
    pub fn is_fatal(&self) -> bool {
        !self.is_recoverable()
    }

    /// Check if this error stems from configuration rather than declarations
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            MigrationError::UnsupportedDialect(_)
                | MigrationError::InvalidConfig(_)
                | MigrationError::InvalidDocument { .. }
        )
    }

    /// Check if this error is an IO error
    pub fn is_io(&self) -> bool {
        matches!(
            self,
            MigrationError::Io(_)
                | MigrationError::FileRead { .. }
                | MigrationError::FileWrite { .. }
                | MigrationError::DirectoryCreate { .. }
        )
    }
}

/// Result type alias using MigrationError
pub type MigrationResult<T> = Result<T, MigrationError>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn with_context<C: Into<String>>(self, context: C) -> MigrationResult<T>;
}

impl<T, E: Into<MigrationError>> ResultExt<T> for Result<T, E> {
    fn with_context<C: Into<String>>(self, context: C) -> MigrationResult<T> {
        self.map_err(|e| {
            let err: MigrationError = e.into();
            MigrationError::WithContext {
                context: context.into(),
                message: err.to_string(),
            }
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

//! Core type definitions for fk_migrations
//!
//! This module contains the SQL dialects DDL is generated for and the
//! referential actions a foreign key can carry.

use crate::error::MigrationError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

// ============================================================================
// Dialects
// ============================================================================

/// SQL dialects foreign-key DDL can be generated for
///
/// SQLite is deliberately absent: it cannot add a constraint to an existing
/// table, so `"sqlite"` parses to [`MigrationError::UnsupportedDialect`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(try_from = "String", into = "String")]
pub enum Dialect {
    #[default]
    PostgreSQL,
    MySQL,
    SqlServer,
}

impl Dialect {
    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            Dialect::PostgreSQL => "PostgreSQL",
            Dialect::MySQL => "MySQL",
            Dialect::SqlServer => "SQL Server",
        }
    }

    /// Canonical lowercase identifier, as accepted by [`FromStr`]
    pub fn identifier(&self) -> &'static str {
        match self {
            Dialect::PostgreSQL => "postgresql",
            Dialect::MySQL => "mysql",
            Dialect::SqlServer => "sqlserver",
        }
    }

    /// Maximum identifier length in bytes
    pub fn identifier_limit(&self) -> usize {
        match self {
            // NAMEDATALEN - 1
            Dialect::PostgreSQL => 63,
            Dialect::MySQL => 64,
            Dialect::SqlServer => 128,
        }
    }

    /// Quote an identifier using the dialect's delimiter
    pub fn quote(&self, ident: &str) -> String {
        match self {
            Dialect::PostgreSQL => format!("\"{}\"", ident.replace('"', "\"\"")),
            Dialect::MySQL => format!("`{}`", ident.replace('`', "``")),
            Dialect::SqlServer => format!("[{}]", ident.replace(']', "]]")),
        }
    }

    /// Keyword used to drop a foreign key from a table
    pub fn drop_foreign_key_keyword(&self) -> &'static str {
        match self {
            Dialect::MySQL => "FOREIGN KEY",
            Dialect::PostgreSQL | Dialect::SqlServer => "CONSTRAINT",
        }
    }

    /// Whether `DEFERRABLE INITIALLY DEFERRED` may follow a constraint
    pub fn supports_deferrable(&self) -> bool {
        matches!(self, Dialect::PostgreSQL)
    }

    /// Whether the dialect accepts the given referential action
    pub fn supports_action(&self, action: ReferentialAction) -> bool {
        match self {
            // InnoDB rejects SET DEFAULT
            Dialect::MySQL => action != ReferentialAction::SetDefault,
            Dialect::PostgreSQL | Dialect::SqlServer => true,
        }
    }

    /// SQL keyword for a referential action in this dialect
    pub fn action_keyword(&self, action: ReferentialAction) -> Option<&'static str> {
        match (self, action) {
            // T-SQL has no RESTRICT; NO ACTION rejects the change the same way
            (Dialect::SqlServer, ReferentialAction::Restrict) => Some("NO ACTION"),
            _ => action.to_sql(),
        }
    }

    /// Get all dialects
    pub fn all() -> &'static [Dialect] {
        &[Dialect::PostgreSQL, Dialect::MySQL, Dialect::SqlServer]
    }
}

impl FromStr for Dialect {
    type Err = MigrationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgresql" | "postgres" | "pg" => Ok(Dialect::PostgreSQL),
            "mysql" | "mariadb" => Ok(Dialect::MySQL),
            "sqlserver" | "mssql" | "tsql" => Ok(Dialect::SqlServer),
            _ => Err(MigrationError::unsupported_dialect(s)),
        }
    }
}

impl TryFrom<String> for Dialect {
    type Error = MigrationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Dialect> for String {
    fn from(dialect: Dialect) -> Self {
        dialect.identifier().to_string()
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// ============================================================================
// Referential Actions
// ============================================================================

/// Actions for foreign key constraints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReferentialAction {
    /// Emit no clause; the database default applies
    #[default]
    None,
    /// Delete or update related rows along with the parent
    Cascade,
    /// Prevent the change if related rows exist
    Restrict,
    /// Set the foreign key column to NULL
    #[serde(alias = "nullify")]
    SetNull,
    /// Explicit NO ACTION
    NoAction,
    /// Set the foreign key column to its default
    SetDefault,
}

impl ReferentialAction {
    /// Get SQL keyword, `None` when no clause should be emitted
    pub fn to_sql(&self) -> Option<&'static str> {
        match self {
            ReferentialAction::None => None,
            ReferentialAction::Cascade => Some("CASCADE"),
            ReferentialAction::Restrict => Some("RESTRICT"),
            ReferentialAction::SetNull => Some("SET NULL"),
            ReferentialAction::NoAction => Some("NO ACTION"),
            ReferentialAction::SetDefault => Some("SET DEFAULT"),
        }
    }

    /// Whether this action emits a clause
    pub fn is_none(&self) -> bool {
        matches!(self, ReferentialAction::None)
    }

    /// Get all referential actions
    pub fn all() -> &'static [ReferentialAction] {
        &[
            ReferentialAction::None,
            ReferentialAction::Cascade,
            ReferentialAction::Restrict,
            ReferentialAction::SetNull,
            ReferentialAction::NoAction,
            ReferentialAction::SetDefault,
        ]
    }
}

impl FromStr for ReferentialAction {
    type Err = MigrationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "none" | "" => Ok(ReferentialAction::None),
            "cascade" => Ok(ReferentialAction::Cascade),
            "restrict" => Ok(ReferentialAction::Restrict),
            "set_null" | "setnull" | "nullify" => Ok(ReferentialAction::SetNull),
            "no_action" | "noaction" => Ok(ReferentialAction::NoAction),
            "set_default" | "setdefault" => Ok(ReferentialAction::SetDefault),
            _ => Err(MigrationError::config(format!(
                "unknown referential action '{s}'"
            ))),
        }
    }
}

impl std::fmt::Display for ReferentialAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_sql().unwrap_or("NONE"))
    }
}

// ============================================================================
// Tests
// ============================================================================

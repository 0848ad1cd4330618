//! Foreign key constraint model
//!
//! This module contains the `ForeignKeyConstraint` value type and the
//! `ForeignKeyOptions` used to declare one. A constraint is validated when it
//! is constructed and never changes afterwards; dialect-specific checks such
//! as identifier length are left to the DDL generator.

use crate::naming;
use fkm_core::{MigrationError, MigrationResult, ReferentialAction, Validatable};
use serde::{Deserialize, Serialize};

// ============================================================================
// ForeignKeyOptions
// ============================================================================

/// Optional settings for a foreign key declaration
///
/// Unset referential actions inherit the generator's configured defaults;
/// an explicit [`ReferentialAction::None`] suppresses the clause.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKeyOptions {
    /// Referenced column (defaults to the target's primary key)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_column: Option<String>,

    /// Constraint name (defaults to `fk_{table}_{column}`)
    #[serde(
        default,
        rename = "constraint_name",
        skip_serializing_if = "Option::is_none"
    )]
    pub name: Option<String>,

    /// Referential action on delete
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_delete: Option<ReferentialAction>,

    /// Referential action on update
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_update: Option<ReferentialAction>,

    /// Defer the check to commit time (PostgreSQL only)
    #[serde(default)]
    pub deferrable: bool,
}

impl ForeignKeyOptions {
    /// Create options with every setting left to its default
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the referenced column
    pub fn with_to_column(mut self, column: impl Into<String>) -> Self {
        self.to_column = Some(column.into());
        self
    }

    /// Set an explicit constraint name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the on delete action
    pub fn on_delete(mut self, action: ReferentialAction) -> Self {
        self.on_delete = Some(action);
        self
    }

    /// Set the on update action
    pub fn on_update(mut self, action: ReferentialAction) -> Self {
        self.on_update = Some(action);
        self
    }

    /// Mark the constraint as deferrable
    pub fn deferrable(mut self) -> Self {
        self.deferrable = true;
        self
    }

    /// Fill in the referenced column if the author left it unset
    pub(crate) fn or_to_column(mut self, column: &str) -> Self {
        if self.to_column.is_none() {
            self.to_column = Some(column.to_string());
        }
        self
    }
}

// ============================================================================
// ForeignKeyConstraint
// ============================================================================

/// A single foreign key constraint
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ForeignKeyConstraint {
    name: String,
    from_table: String,
    from_column: String,
    to_table: String,
    to_column: String,
    on_delete: Option<ReferentialAction>,
    on_update: Option<ReferentialAction>,
    deferrable: bool,
}

impl ForeignKeyConstraint {
    /// Construct a constraint from `from_table.from_column` to `to_table`
    ///
    /// # Errors
    ///
    /// Returns [`MigrationError::InvalidConstraint`] when a table or column is
    /// empty, or when an explicit name is empty.
    pub fn new(
        from_table: impl Into<String>,
        from_column: impl Into<String>,
        to_table: impl Into<String>,
        options: ForeignKeyOptions,
    ) -> MigrationResult<Self> {
        let from_table = from_table.into();
        let from_column = from_column.into();

        let name = options
            .name
            .unwrap_or_else(|| naming::default_constraint_name(&from_table, &from_column));

        let constraint = Self {
            name,
            to_column: options
                .to_column
                .unwrap_or_else(|| naming::DEFAULT_PRIMARY_KEY.to_string()),
            from_table,
            from_column,
            to_table: to_table.into(),
            on_delete: options.on_delete,
            on_update: options.on_update,
            deferrable: options.deferrable,
        };

        constraint.validate()?;
        Ok(constraint)
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Constraint name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Table holding the foreign key column
    pub fn from_table(&self) -> &str {
        &self.from_table
    }

    /// Foreign key column
    pub fn from_column(&self) -> &str {
        &self.from_column
    }

    /// Referenced table
    pub fn to_table(&self) -> &str {
        &self.to_table
    }

    /// Referenced column
    pub fn to_column(&self) -> &str {
        &self.to_column
    }

    /// Declared on delete action, `None` if it inherits the default
    pub fn on_delete(&self) -> Option<ReferentialAction> {
        self.on_delete
    }

    /// Declared on update action, `None` if it inherits the default
    pub fn on_update(&self) -> Option<ReferentialAction> {
        self.on_update
    }

    /// Whether the check is deferred to commit time
    pub fn is_deferrable(&self) -> bool {
        self.deferrable
    }

    /// Check if the constraint references its own table
    pub fn is_self_referencing(&self) -> bool {
        self.from_table == self.to_table
    }

    /// Human-readable `from -> to` label
    pub fn display_label(&self) -> String {
        format!(
            "{}.{} -> {}.{}",
            self.from_table, self.from_column, self.to_table, self.to_column
        )
    }
}

impl Validatable for ForeignKeyConstraint {
    fn validate(&self) -> MigrationResult<()> {
        let checks = [
            (&self.name, "constraint name is empty"),
            (&self.from_table, "from table is empty"),
            (&self.from_column, "from column is empty"),
            (&self.to_table, "to table is empty"),
            (&self.to_column, "to column is empty"),
        ];

        for (value, message) in checks {
            if value.trim().is_empty() {
                return Err(MigrationError::invalid_constraint(&self.name, message));
            }
        }

        Ok(())
    }
}

impl std::fmt::Display for ForeignKeyConstraint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.display_label())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_constraint_defaults() {
        let fk =
            ForeignKeyConstraint::new("posts", "author_id", "authors", ForeignKeyOptions::new())
                .unwrap();

        assert_eq!(fk.name(), "fk_posts_author_id");
        assert_eq!(fk.from_table(), "posts");
        assert_eq!(fk.from_column(), "author_id");
        assert_eq!(fk.to_table(), "authors");
        assert_eq!(fk.to_column(), "id");
        assert_eq!(fk.on_delete(), None);
        assert_eq!(fk.on_update(), None);
        assert!(!fk.is_deferrable());
        assert!(!fk.is_self_referencing());
    }

    #[test]
    fn test_constraint_options() {
        let options = ForeignKeyOptions::new()
            .with_to_column("uid")
            .with_name("posts_owner")
            .on_delete(ReferentialAction::Cascade)
            .on_update(ReferentialAction::None)
            .deferrable();

        let fk = ForeignKeyConstraint::new("posts", "owner", "users", options).unwrap();

        assert_eq!(fk.name(), "posts_owner");
        assert_eq!(fk.to_column(), "uid");
        assert_eq!(fk.on_delete(), Some(ReferentialAction::Cascade));
        assert_eq!(fk.on_update(), Some(ReferentialAction::None));
        assert!(fk.is_deferrable());
    }

    #[test]
    fn test_self_referencing_is_valid() {
        let fk = ForeignKeyConstraint::new(
            "categories",
            "parent_id",
            "categories",
            ForeignKeyOptions::new(),
        )
        .unwrap();
        assert!(fk.is_self_referencing());
    }

    #[test]
    fn test_empty_from_column_rejected() {
        let err = ForeignKeyConstraint::new("posts", "", "authors", ForeignKeyOptions::new())
            .unwrap_err();
        assert!(matches!(err, MigrationError::InvalidConstraint { .. }));
        assert!(err.to_string().contains("from column is empty"));
    }

    #[test]
    fn test_empty_to_column_rejected() {
        let err = ForeignKeyConstraint::new(
            "posts",
            "author_id",
            "authors",
            ForeignKeyOptions::new().with_to_column("  "),
        )
        .unwrap_err();
        assert!(err.to_string().contains("to column is empty"));
    }

    #[test]
    fn test_empty_name_rejected() {
        let err = ForeignKeyConstraint::new(
            "posts",
            "author_id",
            "authors",
            ForeignKeyOptions::new().with_name(""),
        )
        .unwrap_err();
        assert!(err.to_string().contains("constraint name is empty"));
    }

    #[test]
    fn test_long_name_accepted_at_construction() {
        let long = "x".repeat(200);
        let fk = ForeignKeyConstraint::new(
            "posts",
            "author_id",
            "authors",
            ForeignKeyOptions::new().with_name(&long),
        )
        .unwrap();
        assert_eq!(fk.name().len(), 200);
    }

    #[test]
    fn test_options_deserialize() {
        let options: ForeignKeyOptions =
            serde_json::from_str(r#"{"to_column": "uid", "on_delete": "set_null"}"#).unwrap();
        assert_eq!(options.to_column.as_deref(), Some("uid"));
        assert_eq!(options.on_delete, Some(ReferentialAction::SetNull));
        assert!(!options.deferrable);
    }

    #[test]
    fn test_display() {
        let fk =
            ForeignKeyConstraint::new("posts", "author_id", "authors", ForeignKeyOptions::new())
                .unwrap();
        assert_eq!(
            fk.to_string(),
            "fk_posts_author_id (posts.author_id -> authors.id)"
        );
    }
}

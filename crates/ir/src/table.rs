//! Table definition extension
//!
//! A `TableDefinition` collects foreign key declarations while a table is
//! being defined. Nothing is emitted until the host framework has created the
//! table and calls [`TableDefinition::flush_constraints`].
//!
//! ## Lifecycle
//!
//! ```text
//! Empty ──declare──► Declaring ──flush──► Flushed
//!   └────────────────flush─────────────────┘
//! ```
//!
//! Declaring or flushing again once `Flushed` fails with
//! [`MigrationError::AlreadyFlushed`].

use crate::constraint::{ForeignKeyConstraint, ForeignKeyOptions};
use crate::emit::{EmittedConstraint, ForeignKeyDdl};
use crate::naming;
use fkm_core::{MigrationError, MigrationResult};
use std::collections::{BTreeMap, HashSet};

// ============================================================================
// TableState
// ============================================================================

/// Where a table definition is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TableState {
    /// Nothing declared yet
    #[default]
    Empty,
    /// At least one column or foreign key declared
    Declaring,
    /// Pending constraints handed to the generator (terminal)
    Flushed,
}

// ============================================================================
// Column declarations
// ============================================================================

/// What a declared column references
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum References {
    /// Infer the target from the column name
    #[default]
    Infer,
    /// Reference an explicit table, and optionally a column
    To {
        table: String,
        column: Option<String>,
    },
    /// Declare no foreign key for this column
    None,
}

impl References {
    /// Reference an explicit table by its primary key
    pub fn table(table: impl Into<String>) -> Self {
        References::To {
            table: table.into(),
            column: None,
        }
    }

    /// Reference an explicit table and column
    pub fn column(table: impl Into<String>, column: impl Into<String>) -> Self {
        References::To {
            table: table.into(),
            column: Some(column.into()),
        }
    }
}

/// Options for a declared column
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnOptions {
    /// Foreign key target
    pub references: References,
    /// Settings for the foreign key, if one is declared
    pub foreign_key: ForeignKeyOptions,
}

impl ColumnOptions {
    /// Infer the foreign key from the column name
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the foreign key target
    pub fn references(mut self, references: References) -> Self {
        self.references = references;
        self
    }

    /// Suppress foreign key inference
    pub fn without_foreign_key(mut self) -> Self {
        self.references = References::None;
        self
    }

    /// Set the foreign key options
    pub fn with_foreign_key(mut self, options: ForeignKeyOptions) -> Self {
        self.foreign_key = options;
        self
    }
}

/// Resolve a column declaration into a foreign key target, if any
///
/// An explicit referenced column is moved into the returned options; an
/// unset one is left for the caller to default.
pub(crate) fn resolve_column_reference(
    table: &str,
    column: &str,
    options: ColumnOptions,
) -> Option<(String, ForeignKeyOptions)> {
    let (to_table, to_column) = match options.references {
        References::None => return None,
        References::To { table, column } => (table, column),
        References::Infer => (naming::infer_referenced_table(table, column)?, None),
    };

    let fk_options = match to_column {
        Some(to_column) => options.foreign_key.with_to_column(to_column),
        None => options.foreign_key,
    };

    Some((to_table, fk_options))
}

/// Primary key a reference from `table` to `to_table` points at by default
pub(crate) fn default_primary_key(
    table: &str,
    own_primary_key: &str,
    to_table: &str,
    primary_keys: &BTreeMap<String, String>,
) -> String {
    if to_table == table {
        return own_primary_key.to_string();
    }
    primary_keys
        .get(to_table)
        .cloned()
        .unwrap_or_else(|| naming::DEFAULT_PRIMARY_KEY.to_string())
}

// ============================================================================
// TableDefinition
// ============================================================================

/// A table being defined, with its pending foreign key constraints
#[derive(Debug, Clone)]
pub struct TableDefinition {
    name: String,
    primary_key: String,
    columns: Vec<String>,
    pending: Vec<ForeignKeyConstraint>,
    state: TableState,
    primary_keys: BTreeMap<String, String>,
}

impl TableDefinition {
    /// Start defining a table with the default `id` primary key
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            primary_key: naming::DEFAULT_PRIMARY_KEY.to_string(),
            columns: Vec::new(),
            pending: Vec::new(),
            state: TableState::Empty,
            primary_keys: BTreeMap::new(),
        }
    }

    /// Set the table's primary key column
    pub fn with_primary_key(mut self, column: impl Into<String>) -> Self {
        self.primary_key = column.into();
        self
    }

    /// Provide the primary keys of tables this one may reference
    pub fn with_known_primary_keys(mut self, primary_keys: BTreeMap<String, String>) -> Self {
        self.primary_keys = primary_keys;
        self
    }

    // ========================================================================
    // Query methods
    // ========================================================================

    /// Table name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Primary key column
    pub fn primary_key(&self) -> &str {
        &self.primary_key
    }

    /// Columns declared so far, in declaration order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Constraints waiting for the table to exist
    pub fn pending(&self) -> &[ForeignKeyConstraint] {
        &self.pending
    }

    /// Current lifecycle state
    pub fn state(&self) -> TableState {
        self.state
    }

    /// Check if the constraints were already flushed
    pub fn is_flushed(&self) -> bool {
        self.state == TableState::Flushed
    }

    // ========================================================================
    // Declarations
    // ========================================================================

    /// Declare a foreign key from `from_column` to `to_table`
    ///
    /// The constraint is only queued; no DDL is produced until
    /// [`flush_constraints`](Self::flush_constraints).
    pub fn declare_foreign_key(
        &mut self,
        from_column: impl Into<String>,
        to_table: impl Into<String>,
        options: ForeignKeyOptions,
    ) -> MigrationResult<&ForeignKeyConstraint> {
        self.ensure_open()?;

        let to_table = to_table.into();
        let default_pk =
            default_primary_key(&self.name, &self.primary_key, &to_table, &self.primary_keys);
        let constraint = ForeignKeyConstraint::new(
            self.name.clone(),
            from_column,
            to_table,
            options.or_to_column(&default_pk),
        )?;

        if self.pending.iter().any(|c| c.name() == constraint.name()) {
            return Err(MigrationError::invalid_constraint(
                constraint.name(),
                format!("name already declared on table '{}'", self.name),
            ));
        }

        tracing::debug!(
            table = %self.name,
            column = constraint.from_column(),
            references = constraint.to_table(),
            name = constraint.name(),
            "declared foreign key",
        );

        self.state = TableState::Declaring;
        self.pending.push(constraint);
        Ok(&self.pending[self.pending.len() - 1])
    }

    /// Declare a column, inferring its foreign key from the name
    ///
    /// Returns the declared constraint, or `None` when the column references
    /// nothing.
    pub fn column(
        &mut self,
        name: impl Into<String>,
        options: ColumnOptions,
    ) -> MigrationResult<Option<&ForeignKeyConstraint>> {
        self.ensure_open()?;

        let name = name.into();
        if name.trim().is_empty() {
            return Err(MigrationError::invalid_constraint(
                &self.name,
                "column name is empty",
            ));
        }

        self.columns.push(name.clone());
        self.state = TableState::Declaring;

        match resolve_column_reference(&self.name, &name, options) {
            Some((to_table, fk_options)) => self
                .declare_foreign_key(name, to_table, fk_options)
                .map(Some),
            None => Ok(None),
        }
    }

    /// Declare `<stem>_id` referencing the pluralized `<stem>` table
    pub fn references(
        &mut self,
        stem: &str,
        options: ForeignKeyOptions,
    ) -> MigrationResult<&ForeignKeyConstraint> {
        let column = naming::foreign_key_column_for(stem);
        let table = naming::table_name_for(stem);
        let options = ColumnOptions::new()
            .references(References::table(table))
            .with_foreign_key(options);

        self.column(column, options)?
            .ok_or_else(|| MigrationError::invalid_constraint(stem, "reference was not declared"))
    }

    // ========================================================================
    // Flushing
    // ========================================================================

    /// Hand the pending constraints to `ddl` and clear the list
    ///
    /// On error nothing is consumed and the table stays in its previous state.
    pub fn flush_constraints(
        &mut self,
        ddl: &dyn ForeignKeyDdl,
    ) -> MigrationResult<Vec<EmittedConstraint>> {
        let emitted = self.emit_pending(ddl)?;
        self.commit_flush(ddl, &emitted);
        Ok(emitted)
    }

    /// Generate DDL for every pending constraint without changing state
    pub(crate) fn emit_pending(
        &self,
        ddl: &dyn ForeignKeyDdl,
    ) -> MigrationResult<Vec<EmittedConstraint>> {
        self.ensure_open()?;

        let mut emitted = Vec::with_capacity(self.pending.len());
        let mut names = HashSet::new();
        for constraint in &self.pending {
            let record = ddl.emit(constraint.clone())?;
            if !names.insert(record.name.clone()) {
                return Err(MigrationError::invalid_constraint(
                    &record.name,
                    format!("name emitted twice for table '{}'", self.name),
                ));
            }
            emitted.push(record);
        }

        Ok(emitted)
    }

    /// Clear the pending list once `emitted` has been accepted
    pub(crate) fn commit_flush(&mut self, ddl: &dyn ForeignKeyDdl, emitted: &[EmittedConstraint]) {
        self.pending.clear();
        self.state = TableState::Flushed;

        tracing::info!(
            table = %self.name,
            constraints = emitted.len(),
            dialect = %ddl.dialect(),
            "flushed foreign keys",
        );
    }

    fn ensure_open(&self) -> MigrationResult<()> {
        if self.is_flushed() {
            return Err(MigrationError::already_flushed(&self.name));
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

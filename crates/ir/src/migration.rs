//! Migration steps
//!
//! A `MigrationStep` is the object a migration author works with. It is
//! constructed with the DDL generator it should use, hands out
//! [`TableDefinition`]s for new tables, and records every foreign key it adds
//! or removes so the step can be replayed forwards (`up`) or backwards
//! (`down`).
//!
//! ```rust,ignore
//! let mut step = MigrationStep::new("create_posts", &generator);
//!
//! let mut posts = step.create_table("posts");
//! posts.declare_foreign_key("author_id", "authors", ForeignKeyOptions::new())?;
//! step.finish_table(&mut posts)?;
//!
//! for statement in step.up() {
//!     println!("{statement};");
//! }
//! ```

use crate::constraint::{ForeignKeyConstraint, ForeignKeyOptions};
use crate::emit::{Change, EmittedConstraint, ForeignKeyDdl};
use crate::naming;
use crate::table::{self, ColumnOptions, TableDefinition};
use fkm_core::{Dialect, MigrationError, MigrationResult};
use std::collections::{BTreeMap, HashSet};

/// One migration's worth of foreign key changes
pub struct MigrationStep<'g> {
    name: String,
    ddl: &'g dyn ForeignKeyDdl,
    primary_keys: BTreeMap<String, String>,
    changes: Vec<Change>,
    live_names: HashSet<String>,
}

impl std::fmt::Debug for MigrationStep<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MigrationStep")
            .field("name", &self.name)
            .field("dialect", &self.ddl.dialect())
            .field("primary_keys", &self.primary_keys)
            .field("changes", &self.changes.len())
            .finish()
    }
}

impl<'g> MigrationStep<'g> {
    /// Create a step that emits DDL through `ddl`
    pub fn new(name: impl Into<String>, ddl: &'g dyn ForeignKeyDdl) -> Self {
        Self {
            name: name.into(),
            ddl,
            primary_keys: BTreeMap::new(),
            changes: Vec::new(),
            live_names: HashSet::new(),
        }
    }

    // ========================================================================
    // Query methods
    // ========================================================================

    /// Step name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Dialect of the injected generator
    pub fn dialect(&self) -> Dialect {
        self.ddl.dialect()
    }

    /// Changes in the order they were made
    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    /// Consume the step, keeping its changes
    pub fn into_changes(self) -> Vec<Change> {
        self.changes
    }

    /// Check if the step changed nothing
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Statements applying the step, in order
    pub fn up(&self) -> Vec<&str> {
        self.changes.iter().map(Change::up).collect()
    }

    /// Statements reverting the step, newest change first
    pub fn down(&self) -> Vec<&str> {
        self.changes.iter().rev().map(Change::down).collect()
    }

    // ========================================================================
    // Primary keys
    // ========================================================================

    /// Record the primary key of a table that is referenced but not created here
    pub fn register_primary_key(&mut self, table: impl Into<String>, column: impl Into<String>) {
        self.primary_keys.insert(table.into(), column.into());
    }

    /// Primary key a reference to `table` points at by default
    pub fn primary_key_of(&self, table: &str) -> &str {
        self.primary_keys
            .get(table)
            .map(String::as_str)
            .unwrap_or(naming::DEFAULT_PRIMARY_KEY)
    }

    // ========================================================================
    // New tables
    // ========================================================================

    /// Start defining a new table with the default primary key
    pub fn create_table(&self, name: impl Into<String>) -> TableDefinition {
        TableDefinition::new(name).with_known_primary_keys(self.primary_keys.clone())
    }

    /// Start defining a new table with an explicit primary key
    pub fn create_table_with_primary_key(
        &self,
        name: impl Into<String>,
        primary_key: impl Into<String>,
    ) -> TableDefinition {
        self.create_table(name).with_primary_key(primary_key)
    }

    /// Flush a table created through [`create_table`](Self::create_table)
    ///
    /// Call this once the host framework has emitted the `CREATE TABLE`.
    /// Returns the number of constraints added. On error neither the table
    /// nor the step is changed.
    pub fn finish_table(&mut self, table: &mut TableDefinition) -> MigrationResult<usize> {
        let emitted = table.emit_pending(self.ddl)?;

        if let Some(clash) = emitted.iter().find(|record| self.live_names.contains(&record.name)) {
            return Err(self.name_clash(&clash.name));
        }

        table.commit_flush(self.ddl, &emitted);
        self.primary_keys
            .insert(table.name().to_string(), table.primary_key().to_string());

        let count = emitted.len();
        for record in emitted {
            self.record_addition(record)?;
        }

        Ok(count)
    }

    // ========================================================================
    // Existing tables
    // ========================================================================

    /// Add a foreign key to an existing table
    pub fn add_foreign_key(
        &mut self,
        table: impl Into<String>,
        column: impl Into<String>,
        to_table: impl Into<String>,
        options: ForeignKeyOptions,
    ) -> MigrationResult<&EmittedConstraint> {
        let constraint = self.build_constraint(table.into(), column.into(), to_table.into(), options)?;
        let record = self.ddl.emit(constraint)?;
        self.record_addition(record)?;
        Ok(self.changes[self.changes.len() - 1].emitted())
    }

    /// Foreign key for a column added to an existing table
    ///
    /// Follows the same inference rules as [`TableDefinition::column`];
    /// returns `None` when the column references nothing.
    pub fn add_column(
        &mut self,
        table: impl Into<String>,
        column: impl Into<String>,
        options: ColumnOptions,
    ) -> MigrationResult<Option<&EmittedConstraint>> {
        let table = table.into();
        let column = column.into();

        match table::resolve_column_reference(&table, &column, options) {
            Some((to_table, fk_options)) => self
                .add_foreign_key(table, column, to_table, fk_options)
                .map(Some),
            None => Ok(None),
        }
    }

    /// Remove a foreign key from an existing table
    ///
    /// The full declaration is needed so that `down` can add it back.
    pub fn remove_foreign_key(
        &mut self,
        table: impl Into<String>,
        column: impl Into<String>,
        to_table: impl Into<String>,
        options: ForeignKeyOptions,
    ) -> MigrationResult<&EmittedConstraint> {
        let constraint = self.build_constraint(table.into(), column.into(), to_table.into(), options)?;
        let record = self.ddl.emit(constraint)?;
        self.live_names.remove(&record.name);

        tracing::debug!(
            step = %self.name,
            name = %record.name,
            "removing foreign key",
        );

        self.changes.push(Change::Removed(record));
        Ok(self.changes[self.changes.len() - 1].emitted())
    }

    fn build_constraint(
        &self,
        table: String,
        column: String,
        to_table: String,
        options: ForeignKeyOptions,
    ) -> MigrationResult<ForeignKeyConstraint> {
        let own_pk = self.primary_key_of(&table).to_string();
        let default_pk = table::default_primary_key(&table, &own_pk, &to_table, &self.primary_keys);
        ForeignKeyConstraint::new(table, column, to_table, options.or_to_column(&default_pk))
    }

    fn name_clash(&self, name: &str) -> MigrationError {
        MigrationError::invalid_constraint(name, format!("name already used in migration '{}'", self.name))
    }

    fn record_addition(&mut self, record: EmittedConstraint) -> MigrationResult<()> {
        if !self.live_names.insert(record.name.clone()) {
            return Err(self.name_clash(&record.name));
        }

        tracing::debug!(
            step = %self.name,
            name = %record.name,
            table = record.constraint.from_table(),
            "adding foreign key",
        );

        self.changes.push(Change::Added(record));
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emit::testing::PlainDdl;
    use crate::table::{References, TableState};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_create_table_then_reverse() {
        let ddl = PlainDdl::default();
        let mut step = MigrationStep::new("create_posts", &ddl);

        let mut posts = step.create_table("posts");
        posts
            .declare_foreign_key("author_id", "authors", ForeignKeyOptions::new())
            .unwrap();
        assert_eq!(step.finish_table(&mut posts).unwrap(), 1);

        assert_eq!(
            step.up(),
            vec![
                "ALTER TABLE posts ADD CONSTRAINT fk_posts_author_id FOREIGN KEY (author_id) REFERENCES authors (id)"
            ]
        );
        assert_eq!(
            step.down(),
            vec!["ALTER TABLE posts DROP CONSTRAINT fk_posts_author_id"]
        );
    }

    #[test]
    fn test_down_reverses_order() {
        let ddl = PlainDdl::default();
        let mut step = MigrationStep::new("create_blog", &ddl);

        let mut posts = step.create_table("posts");
        posts.column("author_id", ColumnOptions::new()).unwrap();
        posts.column("category_id", ColumnOptions::new()).unwrap();
        step.finish_table(&mut posts).unwrap();

        let down = step.down();
        assert!(down[0].ends_with("fk_posts_category_id"));
        assert!(down[1].ends_with("fk_posts_author_id"));
    }

    #[test]
    fn test_created_table_primary_key_is_remembered() {
        let ddl = PlainDdl::default();
        let mut step = MigrationStep::new("create_users", &ddl);

        let mut users = step.create_table_with_primary_key("users", "uid");
        step.finish_table(&mut users).unwrap();

        let mut posts = step.create_table("posts");
        let fk = posts
            .column("owner_id", ColumnOptions::new().references(References::table("users")))
            .unwrap()
            .cloned()
            .unwrap();
        assert_eq!(fk.to_column(), "uid");
    }

    #[test]
    fn test_names_unique_across_step() {
        let ddl = PlainDdl::default();
        let mut step = MigrationStep::new("clash", &ddl);

        step.add_foreign_key(
            "posts",
            "author_id",
            "authors",
            ForeignKeyOptions::new().with_name("fk_shared"),
        )
        .unwrap();

        let err = step
            .add_foreign_key(
                "comments",
                "author_id",
                "authors",
                ForeignKeyOptions::new().with_name("fk_shared"),
            )
            .unwrap_err();
        assert!(matches!(err, MigrationError::InvalidConstraint { .. }));
        assert_eq!(step.changes().len(), 1);
    }

    #[test]
    fn test_finish_table_clash_leaves_step_and_table_untouched() {
        let ddl = PlainDdl::default();
        let mut step = MigrationStep::new("clash", &ddl);

        step.add_foreign_key(
            "posts",
            "author_id",
            "authors",
            ForeignKeyOptions::new().with_name("fk_x"),
        )
        .unwrap();

        let mut comments = step.create_table("comments");
        comments
            .declare_foreign_key("post_id", "posts", ForeignKeyOptions::new())
            .unwrap();
        comments
            .declare_foreign_key("author_id", "authors", ForeignKeyOptions::new().with_name("fk_x"))
            .unwrap();

        let err = step.finish_table(&mut comments).unwrap_err();
        assert!(matches!(err, MigrationError::InvalidConstraint { .. }));
        assert_eq!(step.changes().len(), 1);
        assert_eq!(step.up().len(), 1);
        assert_eq!(comments.state(), TableState::Declaring);
        assert_eq!(comments.pending().len(), 2);
        assert_eq!(step.primary_key_of("comments"), "id");
    }

    #[test]
    fn test_remove_then_readd_same_name() {
        let ddl = PlainDdl::default();
        let mut step = MigrationStep::new("retarget", &ddl);
        step.add_foreign_key("posts", "author_id", "authors", ForeignKeyOptions::new())
            .unwrap();
        step.remove_foreign_key("posts", "author_id", "authors", ForeignKeyOptions::new())
            .unwrap();
        step.add_foreign_key("posts", "author_id", "users", ForeignKeyOptions::new())
            .unwrap();

        let up = step.up();
        assert_eq!(up.len(), 3);
        assert_eq!(up[1], "ALTER TABLE posts DROP CONSTRAINT fk_posts_author_id");
        assert!(up[2].contains("REFERENCES users (id)"));

        let down = step.down();
        assert_eq!(down[0], "ALTER TABLE posts DROP CONSTRAINT fk_posts_author_id");
        assert!(down[1].contains("REFERENCES authors (id)"));
    }

    #[test]
    fn test_add_column_inference() {
        let ddl = PlainDdl::default();
        let mut step = MigrationStep::new("add_editor", &ddl);
        step.register_primary_key("editors", "editor_no");

        let added = step
            .add_column("posts", "editor_id", ColumnOptions::new())
            .unwrap()
            .cloned()
            .unwrap();
        assert_eq!(added.constraint.to_table(), "editors");
        assert_eq!(added.constraint.to_column(), "editor_no");

        let none = step
            .add_column("posts", "subtitle", ColumnOptions::new())
            .unwrap();
        assert!(none.is_none());
        assert_eq!(step.changes().len(), 1);
    }

    #[test]
    fn test_finish_flushed_table_fails() {
        let ddl = PlainDdl::default();
        let mut step = MigrationStep::new("twice", &ddl);

        let mut posts = step.create_table("posts");
        posts.flush_constraints(&ddl).unwrap();
        let err = step.finish_table(&mut posts).unwrap_err();
        assert!(matches!(err, MigrationError::AlreadyFlushed { .. }));
    }
}

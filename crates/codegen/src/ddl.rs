//! # Foreign Key DDL
//!
//! [`DdlGenerator`] renders `ALTER TABLE ... ADD CONSTRAINT` statements and
//! their inverse for one dialect. It is the production implementation of
//! [`ForeignKeyDdl`], injected into table definitions and migration steps.
//!
//! ## Output
//!
//! ```text
//! ALTER TABLE posts ADD CONSTRAINT fk_posts_author_id FOREIGN KEY (author_id) REFERENCES authors (id)
//! ALTER TABLE posts DROP CONSTRAINT fk_posts_author_id
//! ```
//!
//! MySQL drops with `DROP FOREIGN KEY`. `ON DELETE` / `ON UPDATE` clauses are
//! appended when the constraint or the generator defaults ask for them.

use std::collections::HashMap;

use fkm_core::{Dialect, MigrationError, MigrationResult, ReferentialAction};
use fkm_ir::{EmittedConstraint, ForeignKeyConstraint, ForeignKeyDdl};

use crate::GeneratorConfig;
use crate::identifier::truncate_identifier;

// ============================================================================
// DdlGenerator
// ============================================================================

/// Dialect-aware foreign key DDL generator
#[derive(Debug, Clone)]
pub struct DdlGenerator {
    config: GeneratorConfig,
}

impl DdlGenerator {
    /// Create a generator, rejecting configurations it cannot honour
    pub fn new(config: GeneratorConfig) -> MigrationResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Generator with default settings for a dialect identifier
    pub fn for_dialect(dialect: &str) -> MigrationResult<Self> {
        Self::new(GeneratorConfig::for_dialect(dialect)?)
    }

    /// Get the configuration
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Effective identifier length limit
    pub fn identifier_limit(&self) -> usize {
        self.config.identifier_limit()
    }

    /// Generate `ADD CONSTRAINT` statements for a batch
    ///
    /// Fails if two constraints resolve to the same name, which can happen
    /// when explicit names clash.
    pub fn generate_all(&self, constraints: &[ForeignKeyConstraint]) -> MigrationResult<Vec<String>> {
        let mut seen: HashMap<String, &ForeignKeyConstraint> = HashMap::new();
        let mut statements = Vec::with_capacity(constraints.len());

        for constraint in constraints {
            let name = self.resolve_name(constraint)?;
            if let Some(other) = seen.get(&name) {
                return Err(MigrationError::invalid_constraint(
                    &name,
                    format!(
                        "{} and {} resolve to the same name",
                        other.display_label(),
                        constraint.display_label()
                    ),
                ));
            }
            statements.push(self.render_add(constraint, &name)?);
            seen.insert(name, constraint);
        }

        Ok(statements)
    }

    // ========================================================================
    // Rendering
    // ========================================================================

    /// Name checked against the limit, without logging
    fn checked_name(&self, constraint: &ForeignKeyConstraint) -> MigrationResult<String> {
        let name = constraint.name();
        let limit = self.identifier_limit();

        if name.len() <= limit {
            return Ok(name.to_string());
        }

        let err = MigrationError::identifier_too_long(name, limit);
        if self.config.truncate_long_names && err.is_recoverable() {
            Ok(truncate_identifier(name, limit))
        } else {
            Err(err)
        }
    }

    fn render_add(&self, constraint: &ForeignKeyConstraint, name: &str) -> MigrationResult<String> {
        let mut sql = format!(
            "ALTER TABLE {} ADD CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} ({})",
            self.table(constraint.from_table()),
            self.ident(name),
            self.ident(constraint.from_column()),
            self.table(constraint.to_table()),
            self.ident(constraint.to_column()),
        );

        let delete = self.action_clause(
            constraint,
            "ON DELETE",
            constraint.on_delete(),
            self.config.on_delete,
        )?;
        let update = self.action_clause(
            constraint,
            "ON UPDATE",
            constraint.on_update(),
            self.config.on_update,
        )?;

        for clause in [delete, update].into_iter().flatten() {
            sql.push(' ');
            sql.push_str(&clause);
        }

        if constraint.is_deferrable() {
            if self.dialect().supports_deferrable() {
                sql.push_str(" DEFERRABLE INITIALLY DEFERRED");
            } else {
                tracing::warn!(
                    constraint = %name,
                    dialect = %self.dialect(),
                    "deferrable constraints are not supported, option ignored",
                );
            }
        }

        Ok(sql)
    }

    fn render_drop(&self, constraint: &ForeignKeyConstraint, name: &str) -> String {
        format!(
            "ALTER TABLE {} DROP {} {}",
            self.table(constraint.from_table()),
            self.dialect().drop_foreign_key_keyword(),
            self.ident(name),
        )
    }

    fn action_clause(
        &self,
        constraint: &ForeignKeyConstraint,
        clause: &str,
        declared: Option<ReferentialAction>,
        default: ReferentialAction,
    ) -> MigrationResult<Option<String>> {
        let action = declared.unwrap_or(default);
        let dialect = self.dialect();

        if !dialect.supports_action(action) {
            return Err(MigrationError::invalid_constraint(
                constraint.name(),
                format!("{clause} {action} is not supported by {dialect}"),
            ));
        }

        Ok(dialect
            .action_keyword(action)
            .map(|keyword| format!("{clause} {keyword}")))
    }

    fn ident(&self, ident: &str) -> String {
        if self.config.quote_identifiers {
            self.dialect().quote(ident)
        } else {
            ident.to_string()
        }
    }

    /// Table names may be schema-qualified; each part is quoted separately
    fn table(&self, table: &str) -> String {
        if !self.config.quote_identifiers {
            return table.to_string();
        }
        table
            .split('.')
            .map(|part| self.dialect().quote(part))
            .collect::<Vec<_>>()
            .join(".")
    }
}

impl ForeignKeyDdl for DdlGenerator {
    fn dialect(&self) -> Dialect {
        self.config.dialect
    }

    fn resolve_name(&self, constraint: &ForeignKeyConstraint) -> MigrationResult<String> {
        let name = self.checked_name(constraint)?;
        if name != constraint.name() {
            tracing::warn!(
                constraint = constraint.name(),
                truncated = %name,
                limit = self.identifier_limit(),
                "constraint name exceeds identifier limit, using hashed name",
            );
        }
        Ok(name)
    }

    fn generate(&self, constraint: &ForeignKeyConstraint) -> MigrationResult<String> {
        let name = self.resolve_name(constraint)?;
        self.render_add(constraint, &name)
    }

    fn generate_drop(&self, constraint: &ForeignKeyConstraint) -> MigrationResult<String> {
        let name = self.checked_name(constraint)?;
        Ok(self.render_drop(constraint, &name))
    }

    fn emit(&self, constraint: ForeignKeyConstraint) -> MigrationResult<EmittedConstraint> {
        let name = self.resolve_name(&constraint)?;
        Ok(EmittedConstraint {
            up: self.render_add(&constraint, &name)?,
            down: self.render_drop(&constraint, &name),
            name,
            constraint,
        })
    }
}

// ============================================================================
// Free functions
// ============================================================================

/// Generate the `ADD CONSTRAINT` statement for a dialect identifier
///
/// # Errors
///
/// [`MigrationError::UnsupportedDialect`] for unknown dialects, and
/// [`MigrationError::InvalidConstraint`] for actions the dialect lacks.
pub fn generate(constraint: &ForeignKeyConstraint, dialect: &str) -> MigrationResult<String> {
    DdlGenerator::for_dialect(dialect)?.generate(constraint)
}

/// Generate the statement dropping `constraint` for a dialect identifier
pub fn generate_drop(constraint: &ForeignKeyConstraint, dialect: &str) -> MigrationResult<String> {
    DdlGenerator::for_dialect(dialect)?.generate_drop(constraint)
}

// ============================================================================
// Tests
// ============================================================================

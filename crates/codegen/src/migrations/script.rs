use chrono::{DateTime, Duration, Utc};
use fkm_core::{Dialect, MigrationError, MigrationResult};
use fkm_ir::{Change, MigrationStep};
use heck::ToSnakeCase;
use serde::Serialize;

use crate::GeneratedFile;

/// Statements of one migration, ready to render
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationScript {
    /// Migration name
    pub name: String,

    /// Dialect the statements target
    pub dialect: Dialect,

    /// Forward statements, without terminators
    pub up: Vec<String>,

    /// Reverse statements, without terminators
    pub down: Vec<String>,

    /// Declared names that were shortened, as `(declared, emitted)`
    pub renamed: Vec<(String, String)>,
}

impl MigrationScript {
    /// Capture the statements of a finished step
    pub fn from_step(step: &MigrationStep<'_>) -> Self {
        let renamed = step
            .changes()
            .iter()
            .filter(|change| change.is_addition())
            .map(Change::emitted)
            .filter(|emitted| emitted.name != emitted.constraint.name())
            .map(|emitted| (emitted.constraint.name().to_string(), emitted.name.clone()))
            .collect();

        Self {
            name: step.name().to_string(),
            dialect: step.dialect(),
            up: step.up().into_iter().map(String::from).collect(),
            down: step.down().into_iter().map(String::from).collect(),
            renamed,
        }
    }

    /// Number of forward statements
    pub fn statement_count(&self) -> usize {
        self.up.len()
    }

    /// Check if the migration changes nothing
    pub fn is_empty(&self) -> bool {
        self.up.is_empty()
    }

    /// Contents of `up.sql`
    pub fn render_up(&self) -> String {
        self.render("up", &self.up)
    }

    /// Contents of `down.sql`
    pub fn render_down(&self) -> String {
        self.render("down", &self.down)
    }

    /// Both files under `migrations/{version}_{name}/`
    pub fn to_files(&self, version: &str) -> Vec<GeneratedFile> {
        let dir = format!("migrations/{}_{}", version, sanitize_name(&self.name));
        vec![
            GeneratedFile::sql(format!("{dir}/up.sql"), self.render_up()),
            GeneratedFile::sql(format!("{dir}/down.sql"), self.render_down()),
        ]
    }

    fn render(&self, direction: &str, statements: &[String]) -> String {
        let mut out = String::new();
        out.push_str(&format!("-- Migration: {}\n", self.name));
        out.push_str(&format!("-- Dialect: {}\n", self.dialect));
        out.push_str(&format!("-- Direction: {direction}\n"));

        for (declared, emitted) in &self.renamed {
            out.push_str(&format!("-- Renamed: {declared} -> {emitted}\n"));
        }
        out.push('\n');

        if statements.is_empty() {
            out.push_str("-- No foreign key changes\n");
        }
        for statement in statements {
            out.push_str(statement);
            out.push_str(";\n");
        }

        out
    }
}

/// Version prefix for the `index`-th migration generated at `timestamp`
///
/// Each index adds one second so directory names sort in generation order.
pub fn migration_version(timestamp: DateTime<Utc>, index: usize) -> MigrationResult<String> {
    i64::try_from(index)
        .ok()
        .and_then(Duration::try_seconds)
        .and_then(|offset| timestamp.checked_add_signed(offset))
        .map(|at| at.format("%Y%m%d%H%M%S").to_string())
        .ok_or_else(|| MigrationError::config(format!("migration index {index} is out of range")))
}

/// Migration name safe for use in a directory name
pub fn sanitize_name(name: &str) -> String {
    let snake = name.to_snake_case();
    if snake.is_empty() {
        "migration".to_string()
    } else {
        snake
    }
}

// ============================================================================
// Tests
// ============================================================================

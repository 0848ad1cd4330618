//! Naming conventions for foreign keys
//!
//! This module derives constraint names and infers referenced tables from
//! column names, so that a column such as `author_id` is understood to point
//! at `authors (id)` without the migration author spelling it out.
//!
//! ## Inference rules
//!
//! - `parent_id` references the table being defined (self-reference)
//! - `<stem>_id` references the pluralized snake_case `<stem>` table
//! - any other column name infers nothing

use heck::ToSnakeCase;

// ============================================================================
// Constants
// ============================================================================

/// Primary key column assumed for tables that have not registered one
pub const DEFAULT_PRIMARY_KEY: &str = "id";

/// Suffix marking a column as a foreign key candidate
pub const FOREIGN_KEY_SUFFIX: &str = "_id";

/// Column that references its own table
pub const PARENT_COLUMN: &str = "parent_id";

/// Prefix of generated constraint names
pub const CONSTRAINT_PREFIX: &str = "fk";

// ============================================================================
// Constraint Names
// ============================================================================

/// Generate the default constraint name for a foreign key
///
/// Schema qualifiers are dropped from the table so the name stays a single
/// identifier.
///
/// # Examples
///
/// - ("posts", "author_id") -> "fk_posts_author_id"
/// - ("public.posts", "author_id") -> "fk_posts_author_id"
pub fn default_constraint_name(table: &str, column: &str) -> String {
    format!("{}_{}_{}", CONSTRAINT_PREFIX, unqualified(table), column)
}

/// Strip a schema qualifier from a table name
pub fn unqualified(table: &str) -> &str {
    table.rsplit('.').next().unwrap_or(table)
}

// ============================================================================
// Reference Inference
// ============================================================================

/// Table name for a referenced entity stem
///
/// Only the last underscore-separated word is pluralized.
///
/// # Examples
///
/// - "author" -> "authors"
/// - "BlogPost" -> "blog_posts"
/// - "category" -> "categories"
pub fn table_name_for(stem: &str) -> String {
    let snake = stem.to_snake_case();
    match snake.rsplit_once('_') {
        Some((head, last)) => format!("{}_{}", head, pluralize(last)),
        None => pluralize(&snake),
    }
}

/// Foreign key column for a referenced entity stem
///
/// # Examples
///
/// - "author" -> "author_id"
/// - "BlogPost" -> "blog_post_id"
pub fn foreign_key_column_for(stem: &str) -> String {
    format!("{}{}", stem.to_snake_case(), FOREIGN_KEY_SUFFIX)
}

/// Infer the table a column references from its name
///
/// Returns `None` when the column does not follow the `_id` convention.
pub fn infer_referenced_table(table: &str, column: &str) -> Option<String> {
    if column == PARENT_COLUMN {
        return Some(table.to_string());
    }

    let stem = column.strip_suffix(FOREIGN_KEY_SUFFIX)?;
    if stem.is_empty() || stem.ends_with('_') {
        return None;
    }

    Some(table_name_for(stem))
}

fn pluralize(word: &str) -> String {
    pluralizer::pluralize(word, 2, false)
}

// ============================================================================
// Tests
// ============================================================================

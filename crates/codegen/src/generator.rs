//! # Migration Generator Orchestrator
//!
//! The `Generator` is the top-level entry point for turning migration
//! documents into SQL. It owns a [`DdlGenerator`], replays each document on a
//! fresh [`MigrationStep`], and renders the result as migration files.
//!
//! ## Pipeline
//!
//! ```text
//! MigrationDocument(s) + GeneratorConfig
//!         │
//!         ▼
//!   MigrationStep::new(name, &DdlGenerator)
//!         │
//!         ├──► apply_document()            → Vec<Change>
//!         ├──► MigrationScript::from_step() → up / down statements
//!         │
//!         ▼
//!   GeneratedMigrations { scripts, files, warnings }
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use fkm_codegen::{Generator, GeneratorConfig};
//!
//! let document = fkm_ir::load_document("migrations/create_blog.toml")?;
//! let output = Generator::new(GeneratorConfig::default())?.generate(&[document])?;
//!
//! println!("Generated {} files", output.file_count());
//! output.write_to_disk("db", false)?;
//! ```

use chrono::{DateTime, Utc};
use fkm_core::{MigrationResult, ResultExt};
use fkm_ir::{MigrationDocument, MigrationStep, apply_document};

use crate::migrations::{MigrationScript, migration_version};
use crate::{DdlGenerator, GeneratedMigrations, GeneratorConfig};

// ============================================================================
// Generator
// ============================================================================

/// Top-level generator for batches of migration documents.
#[derive(Debug, Clone)]
pub struct Generator {
    ddl: DdlGenerator,
}

impl Generator {
    // ====================================================================
    // Construction
    // ====================================================================

    /// Create a generator with the given configuration.
    pub fn new(config: GeneratorConfig) -> MigrationResult<Self> {
        Ok(Self {
            ddl: DdlGenerator::new(config)?,
        })
    }

    /// Get the current configuration.
    pub fn config(&self) -> &GeneratorConfig {
        self.ddl.config()
    }

    /// The DDL generator injected into every step.
    pub fn ddl(&self) -> &DdlGenerator {
        &self.ddl
    }

    // ====================================================================
    // Generation
    // ====================================================================

    /// Replay one document and capture its statements.
    pub fn generate_script(&self, document: &MigrationDocument) -> MigrationResult<MigrationScript> {
        let mut step = MigrationStep::new(&document.name, &self.ddl);
        apply_document(document, &mut step)?;
        Ok(MigrationScript::from_step(&step))
    }

    /// Generate scripts and files for a batch, timestamped now.
    pub fn generate(&self, documents: &[MigrationDocument]) -> MigrationResult<GeneratedMigrations> {
        self.generate_at(documents, Utc::now())
    }

    /// Generate scripts and files for a batch with a fixed timestamp.
    ///
    /// The first failing document aborts the whole batch.
    pub fn generate_at(
        &self,
        documents: &[MigrationDocument],
        timestamp: DateTime<Utc>,
    ) -> MigrationResult<GeneratedMigrations> {
        let mut output = GeneratedMigrations::new();

        for (index, document) in documents.iter().enumerate() {
            let script = self
                .generate_script(document)
                .with_context(format!("migration '{}'", document.name))?;

            if script.is_empty() {
                output.add_warning(format!(
                    "Migration '{}' declares no foreign key changes.",
                    script.name
                ));
            }
            for (declared, emitted) in &script.renamed {
                output.add_warning(format!(
                    "Constraint '{declared}' exceeds the {}-character limit and was renamed to '{emitted}'.",
                    self.ddl.identifier_limit(),
                ));
            }

            let version = migration_version(timestamp, index)?;
            for file in script.to_files(&version) {
                output.add_file(file);
            }
            output.scripts.push(script);
        }

        tracing::info!(
            dialect = %self.config().dialect,
            migrations = output.scripts.len(),
            statements = output.statement_count(),
            warnings = output.warnings.len(),
            "migration generation complete",
        );

        Ok(output)
    }
}

// ============================================================================
// GenerationSummary
// ============================================================================

/// A human-readable summary of a completed generation run.
#[derive(Debug, Clone)]
pub struct GenerationSummary {
    /// Number of migrations generated.
    pub migrations: usize,
    /// Number of forward statements.
    pub statements: usize,
    /// Number of SQL files rendered.
    pub sql_files: usize,
    /// Number of constraints whose names were shortened.
    pub renamed: usize,
    /// Number of warnings.
    pub warning_count: usize,
    /// Total bytes of generated content.
    pub total_bytes: usize,
}

impl GenerationSummary {
    /// Build a summary from generated migrations.
    pub fn from_output(output: &GeneratedMigrations) -> Self {
        Self {
            migrations: output.scripts.len(),
            statements: output.statement_count(),
            sql_files: output.file_count(),
            renamed: output.scripts.iter().map(|s| s.renamed.len()).sum(),
            warning_count: output.warnings.len(),
            total_bytes: output.files.iter().map(|f| f.content.len()).sum(),
        }
    }

    /// Format the summary as a human-readable string.
    pub fn display(&self) -> String {
        let mut out = String::with_capacity(512);

        out.push_str("╔══════════════════════════════════════════════════╗\n");
        out.push_str("║         Migration Generation Complete            ║\n");
        out.push_str("╠══════════════════════════════════════════════════╣\n");
        out.push_str(&format!("║  Migrations:  {:<35}║\n", self.migrations));
        out.push_str(&format!("║  Statements:  {:<35}║\n", self.statements));
        out.push_str(&format!("║  SQL Files:   {:<35}║\n", self.sql_files));
        out.push_str(&format!("║  Renamed:     {:<35}║\n", self.renamed));
        out.push_str(&format!("║  Warnings:    {:<35}║\n", self.warning_count));

        let size_str = if self.total_bytes < 1024 {
            format!("{} B", self.total_bytes)
        } else {
            format!("{:.1} KB", self.total_bytes as f64 / 1024.0)
        };
        out.push_str(&format!("║  Total Size:  {:<35}║\n", size_str));
        out.push_str("╚══════════════════════════════════════════════════╝\n");

        out
    }
}

impl std::fmt::Display for GenerationSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}

/// Produce a [`GenerationSummary`] from [`GeneratedMigrations`].
pub fn summarize(output: &GeneratedMigrations) -> GenerationSummary {
    GenerationSummary::from_output(output)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use fkm_core::{Dialect, MigrationError};
    use fkm_ir::{DocumentFormat, load_document_from_str};
    use pretty_assertions::assert_eq;

    const BLOG: &str = r#"
name = "create_blog"

[[tables]]
name = "posts"
columns = [{ name = "author_id" }, { name = "title" }]

[[alter]]
table = "comments"
add_foreign_keys = [{ column = "post_id", references = "posts", on_delete = "cascade" }]
"#;

    fn blog() -> MigrationDocument {
        load_document_from_str(BLOG, DocumentFormat::Toml).unwrap()
    }

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_generate_script() {
        let generator = Generator::new(GeneratorConfig::default()).unwrap();
        let script = generator.generate_script(&blog()).unwrap();

        assert_eq!(
            script.up,
            vec![
                "ALTER TABLE posts ADD CONSTRAINT fk_posts_author_id FOREIGN KEY (author_id) REFERENCES authors (id)",
                "ALTER TABLE comments ADD CONSTRAINT fk_comments_post_id FOREIGN KEY (post_id) REFERENCES posts (id) ON DELETE CASCADE",
            ]
        );
        assert_eq!(
            script.down,
            vec![
                "ALTER TABLE comments DROP CONSTRAINT fk_comments_post_id",
                "ALTER TABLE posts DROP CONSTRAINT fk_posts_author_id",
            ]
        );
    }

    #[test]
    fn test_generate_batch_files() {
        let generator = Generator::new(GeneratorConfig::new(Dialect::MySQL)).unwrap();
        let mut second = blog();
        second.name = "second".to_string();

        let output = generator.generate_at(&[blog(), second], at()).unwrap();
        assert_eq!(output.scripts.len(), 2);
        assert_eq!(output.file_count(), 4);
        assert_eq!(output.statement_count(), 4);

        let paths: Vec<_> = output
            .files
            .iter()
            .map(|f| f.path.to_string_lossy().to_string())
            .collect();
        assert_eq!(paths[0], "migrations/20261015120000_create_blog/up.sql");
        assert_eq!(paths[3], "migrations/20261015120001_second/down.sql");
        assert!(output.files[1].content.contains("DROP FOREIGN KEY fk_posts_author_id;"));
        assert!(!output.has_warnings());
    }

    #[test]
    fn test_empty_document_warns() {
        let generator = Generator::new(GeneratorConfig::default()).unwrap();
        let document = MigrationDocument {
            name: "noop".to_string(),
            ..Default::default()
        };

        let output = generator.generate_at(&[document], at()).unwrap();
        assert_eq!(output.warnings.len(), 1);
        assert!(output.warnings[0].contains("noop"));
    }

    #[test]
    fn test_renamed_constraint_warns() {
        let generator = Generator::new(GeneratorConfig::default().with_identifier_limit(16)).unwrap();
        let output = generator.generate_at(&[blog()], at()).unwrap();

        assert_eq!(output.warnings.len(), 2);
        assert!(output.warnings[0].contains("fk_posts_author_id"));
        assert_eq!(summarize(&output).renamed, 2);
    }

    #[test]
    fn test_failing_document_aborts_batch() {
        let generator = Generator::new(GeneratorConfig::default().without_truncation()).unwrap();
        let document = load_document_from_str(
            r#"
name = "too_long"

[[alter]]
table = "customer_subscription_billing_adjustments"
add_columns = [{ name = "subscription_plan_revision_id" }]
"#,
            DocumentFormat::Toml,
        )
        .unwrap();

        let err = generator.generate_at(&[blog(), document], at()).unwrap_err();
        match err {
            MigrationError::WithContext { context, message } => {
                assert_eq!(context, "migration 'too_long'");
                assert!(message.contains("exceeding the limit of 63"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_summary_display() {
        let generator = Generator::new(GeneratorConfig::default()).unwrap();
        let output = generator.generate_at(&[blog()], at()).unwrap();
        let summary = summarize(&output);

        assert_eq!(summary.migrations, 1);
        assert_eq!(summary.statements, 2);
        assert_eq!(summary.sql_files, 2);
        assert!(summary.to_string().contains("Migration Generation Complete"));
    }
}

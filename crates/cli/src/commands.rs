//! Command implementations
//!
//! Each command loads migration documents from files or directories, runs
//! them through a [`Generator`], and writes a report to the given writer.
//! SQL goes out as-is; warnings are emitted as SQL comments so the output
//! stays runnable.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use colored::Colorize;
use fkm_codegen::{Generator, GeneratorConfig, MigrationScript, summarize};
use fkm_ir::{MigrationDocument, is_document_file, load_document};
use walkdir::WalkDir;

// ============================================================================
// Document discovery
// ============================================================================

/// Load every migration document named by `paths`
///
/// Directories are walked recursively in file name order and only `.json`
/// and `.toml` files are picked up. Files named explicitly are always loaded.
pub fn collect_documents(paths: &[PathBuf]) -> anyhow::Result<Vec<MigrationDocument>> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_dir() {
            for entry in WalkDir::new(path).sort_by_file_name() {
                let entry = entry.with_context(|| format!("failed to walk {}", path.display()))?;
                if entry.file_type().is_file() && is_document_file(entry.path()) {
                    files.push(entry.into_path());
                }
            }
        } else {
            files.push(path.clone());
        }
    }

    if files.is_empty() {
        bail!("no migration documents found");
    }

    files
        .iter()
        .map(|file| {
            tracing::debug!(path = %file.display(), "loading migration document");
            load_document(file).map_err(anyhow::Error::from)
        })
        .collect()
}

// ============================================================================
// Commands
// ============================================================================

/// `fkm generate`
pub fn generate(
    config: GeneratorConfig,
    paths: &[PathBuf],
    output: Option<&Path>,
    overwrite: bool,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let documents = collect_documents(paths)?;
    let generated = Generator::new(config)?.generate(&documents)?;

    match output {
        Some(dir) => {
            generated.write_to_disk(dir, overwrite)?;
            for file in &generated.files {
                writeln!(out, "{} {}", "created".green(), dir.join(&file.path).display())?;
            }
            for warning in &generated.warnings {
                writeln!(out, "{} {}", "warning:".yellow().bold(), warning)?;
            }
            write!(out, "{}", summarize(&generated))?;
        }
        None => {
            for warning in &generated.warnings {
                writeln!(out, "-- warning: {warning}")?;
            }
            for script in &generated.scripts {
                print_statements(out, script, &script.up)?;
            }
        }
    }

    Ok(())
}

/// `fkm drop`
///
/// Documents are reverted newest first.
pub fn drop_statements(config: GeneratorConfig, paths: &[PathBuf], out: &mut dyn Write) -> anyhow::Result<()> {
    let documents = collect_documents(paths)?;
    let generator = Generator::new(config)?;

    let mut scripts = Vec::with_capacity(documents.len());
    for document in &documents {
        scripts.push(generator.generate_script(document)?);
    }

    for script in scripts.iter().rev() {
        print_statements(out, script, &script.down)?;
    }

    Ok(())
}

/// `fkm check`
pub fn check(config: GeneratorConfig, paths: &[PathBuf], out: &mut dyn Write) -> anyhow::Result<()> {
    let documents = collect_documents(paths)?;
    let generator = Generator::new(config)?;

    for document in &documents {
        let script = generator
            .generate_script(document)
            .with_context(|| format!("migration '{}' failed", document.name))?;

        writeln!(
            out,
            "{} {} ({} foreign keys, {})",
            "ok".green().bold(),
            script.name,
            script.statement_count(),
            script.dialect,
        )?;
        for (declared, emitted) in &script.renamed {
            writeln!(
                out,
                "  {} '{declared}' will be emitted as '{emitted}'",
                "renamed:".yellow(),
            )?;
        }
    }

    Ok(())
}

fn print_statements(
    out: &mut dyn Write,
    script: &MigrationScript,
    statements: &[String],
) -> anyhow::Result<()> {
    writeln!(out, "-- {}", script.name)?;
    for statement in statements {
        writeln!(out, "{statement};")?;
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

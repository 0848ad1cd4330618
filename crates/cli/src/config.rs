//! Configuration loading
//!
//! Generator settings come from the `[generator]` table of `fkm.toml`, then
//! command-line flags override individual values.
//!
//! ```toml
//! [generator]
//! dialect = "mysql"
//! on_delete = "cascade"
//! quote_identifiers = true
//! ```

use std::path::Path;

use anyhow::Context;
use fkm_codegen::GeneratorConfig;
use serde::Deserialize;

use crate::GeneratorArgs;

/// Config file picked up from the working directory
pub const DEFAULT_CONFIG_FILE: &str = "fkm.toml";

/// Contents of `fkm.toml`
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Generator settings
    pub generator: GeneratorConfig,
}

impl FileConfig {
    /// Read and parse a config file
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("invalid config file {}", path.display()))
    }
}

impl GeneratorArgs {
    /// Apply flag overrides on top of file settings
    pub fn apply(&self, mut config: GeneratorConfig) -> GeneratorConfig {
        if let Some(dialect) = self.dialect {
            config.dialect = dialect;
        }
        if let Some(limit) = self.identifier_limit {
            config.identifier_limit = Some(limit);
        }
        if let Some(action) = self.on_delete {
            config.on_delete = action;
        }
        if let Some(action) = self.on_update {
            config.on_update = action;
        }
        if self.quote {
            config.quote_identifiers = true;
        }
        if self.no_truncate {
            config.truncate_long_names = false;
        }
        config
    }
}

/// Resolve the generator configuration
///
/// An explicit `path` must exist. Without one, `fkm.toml` in the working
/// directory is used when present.
pub fn load_config(path: Option<&Path>, args: &GeneratorArgs) -> anyhow::Result<GeneratorConfig> {
    let file = match path {
        Some(path) => FileConfig::from_file(path)?,
        None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
            FileConfig::from_file(Path::new(DEFAULT_CONFIG_FILE))?
        }
        None => FileConfig::default(),
    };

    let config = args.apply(file.generator);
    config.validate()?;
    Ok(config)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use fkm_core::{Dialect, ReferentialAction};
    use tempfile::TempDir;

    #[test]
    fn test_file_config_parse() {
        let config: FileConfig = toml::from_str(
            r#"
[generator]
dialect = "mysql"
identifier_limit = 40
on_update = "cascade"
"#,
        )
        .unwrap();

        assert_eq!(config.generator.dialect, Dialect::MySQL);
        assert_eq!(config.generator.identifier_limit(), 40);
        assert_eq!(config.generator.on_update, ReferentialAction::Cascade);
    }

    #[test]
    fn test_unknown_keys_rejected() {
        assert!(toml::from_str::<FileConfig>("[generatr]\ndialect = \"mysql\"").is_err());
        assert!(toml::from_str::<FileConfig>("[generator]\ndialect = \"sqlite\"").is_err());
    }

    #[test]
    fn test_flags_override_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("custom.toml");
        std::fs::write(&path, "[generator]\ndialect = \"mysql\"\non_delete = \"cascade\"\n").unwrap();

        let args = GeneratorArgs {
            dialect: Some(Dialect::SqlServer),
            no_truncate: true,
            ..Default::default()
        };
        let config = load_config(Some(&path), &args).unwrap();

        assert_eq!(config.dialect, Dialect::SqlServer);
        assert_eq!(config.on_delete, ReferentialAction::Cascade);
        assert!(!config.truncate_long_names);
    }

    #[test]
    fn test_missing_explicit_config_fails() {
        let temp = TempDir::new().unwrap();
        let err = load_config(Some(&temp.path().join("nope.toml")), &GeneratorArgs::default())
            .unwrap_err();
        assert!(err.to_string().contains("failed to read config file"));
    }

    #[test]
    fn test_invalid_limit_rejected() {
        let args = GeneratorArgs {
            dialect: Some(Dialect::PostgreSQL),
            identifier_limit: Some(200),
            ..Default::default()
        };
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("empty.toml");
        std::fs::write(&path, "").unwrap();

        assert!(load_config(Some(&path), &args).is_err());
    }
}

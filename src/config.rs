//! Engine configuration.
//!
//! Sources, lowest priority first:
//! - built-in defaults
//! - `barrelmcd.toml`, `.barrelmcd.toml`, `config/barrelmcd.toml`
//! - `<user config dir>/barrelmcd.toml`
//! - an explicit file (`--config`)
//! - environment variables (`BARRELMCD__SQL__DIALECT=mysql`)
//!
//! ```toml
//! [sql]
//! dialect = "postgresql"
//! header = true
//! allow_errors = false
//!
//! [transform]
//! inheritance = "joined"
//! ```

use std::path::Path;

use config_crate::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ConfigError, Result};
use crate::sql::Dialect;
use crate::transform::TransformOptions;

const FILE_NAME: &str = "barrelmcd.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub sql: SqlConfig,
    #[serde(default)]
    pub transform: TransformOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SqlConfig {
    /// Kept as text; parsed by [`EngineConfig::dialect`].
    #[serde(default = "default_dialect")]
    pub dialect: String,
    /// Prepend the comment header to rendered scripts.
    #[serde(default = "default_true")]
    pub header: bool,
    /// Generate SQL even when validation reports errors.
    #[serde(default)]
    pub allow_errors: bool,
}

fn default_dialect() -> String {
    Dialect::PostgreSql.name().to_string()
}

fn default_true() -> bool {
    true
}

impl Default for SqlConfig {
    fn default() -> Self {
        Self {
            dialect: default_dialect(),
            header: true,
            allow_errors: false,
        }
    }
}

impl EngineConfig {
    /// Load configuration from default locations
    pub fn load() -> std::result::Result<Self, ConfigError> {
        Self::load_from(None)
    }

    pub fn load_from(path: Option<&Path>) -> std::result::Result<Self, ConfigError> {
        let mut builder = Config::builder();

        for location in ["barrelmcd", ".barrelmcd", "config/barrelmcd"] {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        if let Some(dirs) = directories::ProjectDirs::from("dev", "barrelmcd", "barrelmcd") {
            let user_file = dirs.config_dir().join(FILE_NAME);
            if user_file.exists() {
                debug!(path = %user_file.display(), "loading user configuration");
                builder = builder.add_source(File::from(user_file).required(false));
            }
        }

        if let Some(path) = path {
            debug!(path = %path.display(), "loading configuration file");
            builder = builder.add_source(File::from(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix("BARRELMCD")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        Ok(builder.build()?.try_deserialize()?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(ConfigError::from)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn dialect(&self) -> std::result::Result<Dialect, ConfigError> {
        self.sql.dialect.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::InheritanceStrategy;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.dialect().unwrap(), Dialect::PostgreSql);
        assert!(config.sql.header);
        assert!(!config.sql.allow_errors);
        assert_eq!(config.transform.inheritance, InheritanceStrategy::Joined);
    }

    #[test]
    fn test_serialize_config() {
        let toml_str = toml::to_string_pretty(&EngineConfig::default()).unwrap();
        assert!(toml_str.contains("[sql]"));
        assert!(toml_str.contains("dialect = \"postgresql\""));
        assert!(toml_str.contains("inheritance = \"joined\""));
    }

    #[test]
    fn test_load_explicit_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[sql]\ndialect = \"mysql\"\n\n[transform]\ninheritance = \"single_table\""
        )
        .unwrap();

        let config = EngineConfig::load_from(Some(file.path())).unwrap();
        assert_eq!(config.dialect().unwrap(), Dialect::MySql);
        assert!(config.sql.header);
        assert_eq!(config.transform.inheritance, InheritanceStrategy::SingleTable);
    }

    #[test]
    fn test_missing_explicit_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = EngineConfig::load_from(Some(&dir.path().join("absent.toml")));
        assert!(matches!(result, Err(ConfigError::Load(_))));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(FILE_NAME);
        let mut config = EngineConfig::default();
        config.sql.dialect = "sqlite".to_string();
        config.transform.inheritance = InheritanceStrategy::TablePerClass;
        config.save(&path).unwrap();

        assert_eq!(EngineConfig::load_from(Some(&path)).unwrap(), config);
    }

    #[test]
    fn test_unsupported_dialect() {
        let mut config = EngineConfig::default();
        config.sql.dialect = "db2".to_string();
        assert!(matches!(config.dialect(), Err(ConfigError::UnsupportedDialect(d)) if d == "db2"));
    }
}

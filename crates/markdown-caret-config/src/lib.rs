use markdown_caret_engine::{MonospaceMetrics, NavTuning};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid navigation tuning in {config_path}: {reason}")]
    InvalidTuning {
        config_path: PathBuf,
        reason: String,
    },
}

/// Settings for the terminal viewer. Every section is optional in the file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Markdown file opened when none is given on the command line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_path: Option<PathBuf>,
    pub navigation: NavTuning,
    pub layout: MonospaceMetrics,
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let mut config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        config
            .validate()
            .map_err(|reason| ConfigError::InvalidTuning {
                config_path: config_path.to_path_buf(),
                reason,
            })?;

        config.document_path = config
            .document_path
            .map(|path| Self::expand_path(&path).unwrap_or(path));

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/markdown-caret");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        shellexpand::full(&path_str)
            .ok()
            .map(|expanded| PathBuf::from(expanded.as_ref()))
    }

    /// Rejects values that would stop vertical movement from ever accepting
    /// a geometry candidate.
    fn validate(&self) -> Result<(), String> {
        let nav = &self.navigation;
        if !(nav.jump_guard_line_heights > 0.0) {
            return Err("jump_guard_line_heights must be positive".to_string());
        }
        if nav.line_merge_tolerance < 0.0 || nav.line_start_epsilon < 0.0 {
            return Err("tolerances must not be negative".to_string());
        }
        if nav.probe_x_jitter.is_empty() {
            return Err("probe_x_jitter needs at least one offset".to_string());
        }
        if !(self.layout.line_height > 0.0) || !(self.layout.cell_width > 0.0) {
            return Err("layout cells must have a positive size".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::env;
    use tempfile::TempDir;

    #[test]
    fn test_config_path() {
        let config_path = Config::config_path();
        let path_str = config_path.to_string_lossy();

        assert!(!path_str.starts_with('~'));
        assert!(path_str.ends_with(".config/markdown-caret/config.toml"));
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(&config_file, "").unwrap();

        let config = Config::load_from_path(&config_file).unwrap().unwrap();

        assert_eq!(config, Config::default());
        assert_eq!(config.navigation.max_probe_steps, 6);
    }

    #[test]
    fn test_partial_tuning_keeps_other_defaults() {
        let config: Config = toml::from_str(
            r#"
[navigation]
jump_guard_line_heights = 2.0

[layout]
wrap_columns = 40
"#,
        )
        .unwrap();

        assert_eq!(config.navigation.jump_guard_line_heights, 2.0);
        assert_eq!(config.navigation.line_merge_tolerance, 3.0);
        assert_eq!(config.layout.wrap_columns, 40);
        assert_eq!(config.layout.line_height, 16.0);
    }

    #[test]
    fn test_invalid_tuning_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(&config_file, "[navigation]\nprobe_x_jitter = []\n").unwrap();

        let err = Config::load_from_path(&config_file).unwrap_err();

        assert!(matches!(err, ConfigError::InvalidTuning { .. }));
    }

    #[test]
    fn test_malformed_file_reports_path() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(&config_file, "navigation = 3").unwrap();

        let err = Config::load_from_path(&config_file).unwrap_err();

        assert!(matches!(err, ConfigError::ConfigParseError { .. }));
        assert!(err.to_string().contains("config.toml"));
    }

    #[test]
    fn test_expand_path_with_env_var() {
        unsafe {
            env::set_var("CARET_DOCS", "/test/docs");
        }

        let expanded = Config::expand_path(Path::new("$CARET_DOCS/notes.md"));

        assert_eq!(expanded, Some(PathBuf::from("/test/docs/notes.md")));

        unsafe {
            env::remove_var("CARET_DOCS");
        }
    }

    #[test]
    fn test_load_config_file_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("nonexistent.toml");

        assert!(Config::load_from_path(&missing).unwrap().is_none());
    }

    #[test]
    fn test_save_and_load_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("nested/config.toml");
        let mut config = Config {
            document_path: Some(PathBuf::from("/tmp/notes.md")),
            ..Config::default()
        };
        config.navigation.max_probe_steps = 3;
        config.layout.wrap_columns = 60;

        config.save_to_path(&config_file).unwrap();
        let loaded = Config::load_from_path(&config_file).unwrap().unwrap();

        assert_eq!(loaded, config);
    }
}

//! Configuration management for enex2md.
//!
//! Parses `enex2md.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! `output.dir` supports environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override output directory.
    pub output_dir: Option<PathBuf>,
    /// Override attachment extraction.
    pub extract_attachments: Option<bool>,
    /// Override body rendering.
    pub render_enabled: Option<bool>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "enex2md.toml";

/// Default output directory, relative to the config file or working directory.
const DEFAULT_OUTPUT_DIR: &str = "notes";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Output configuration (paths are relative strings from TOML).
    output: OutputConfigRaw,
    /// Rendering configuration.
    pub render: RenderConfig,

    /// Resolved output configuration (set after loading).
    #[serde(skip)]
    pub output_resolved: OutputConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Raw output configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
struct OutputConfigRaw {
    dir: Option<String>,
    extract_attachments: Option<bool>,
}

/// Resolved output configuration with an absolute directory.
#[derive(Debug, Default)]
pub struct OutputConfig {
    /// Root directory for converted notes.
    pub dir: PathBuf,
    /// Whether attachments are decoded and written next to notes.
    pub extract_attachments: bool,
}

/// Rendering configuration.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    /// Render ENML bodies to markdown. When false, bodies are written raw.
    pub enabled: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`output.dir`").
        field: String,
        /// Error message (e.g., "${`NOTES_DIR`} not set").
        message: String,
    },
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `enex2md.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(dir) = &settings.output_dir {
            self.output_resolved.dir.clone_from(dir);
        }
        if let Some(extract) = settings.extract_attachments {
            self.output_resolved.extract_attachments = extract;
        }
        if let Some(enabled) = settings.render_enabled {
            self.render.enabled = enabled;
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    fn default_with_base(base: &Path) -> Self {
        Self {
            output: OutputConfigRaw::default(),
            render: RenderConfig::default(),
            output_resolved: OutputConfig {
                dir: base.join(DEFAULT_OUTPUT_DIR),
                extract_attachments: true,
            },
            config_path: None,
        }
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;
        config.validate()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if `output.dir` is set but empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(dir) = &self.output.dir
            && dir.trim().is_empty()
        {
            return Err(ConfigError::Validation(
                "output.dir cannot be empty".to_owned(),
            ));
        }
        Ok(())
    }

    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(ref dir) = self.output.dir {
            self.output.dir = Some(expand::expand_env(dir, "output.dir")?);
        }
        Ok(())
    }

    /// Resolve the output directory against the config file's directory.
    ///
    /// Absolute paths are kept as-is.
    fn resolve_paths(&mut self, config_dir: &Path) {
        self.output_resolved = OutputConfig {
            dir: config_dir.join(self.output.dir.as_deref().unwrap_or(DEFAULT_OUTPUT_DIR)),
            extract_attachments: self.output.extract_attachments.unwrap_or(true),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default_with_base(Path::new("/test"));
        assert_eq!(config.output_resolved.dir, PathBuf::from("/test/notes"));
        assert!(config.output_resolved.extract_attachments);
        assert!(config.render.enabled);
        assert!(config.config_path.is_none());
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.output.dir.is_none());
        assert!(config.render.enabled);
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[output]
dir = "markdown"
extract_attachments = false

[render]
enabled = false
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.output.dir.as_deref(), Some("markdown"));
        assert_eq!(config.output.extract_attachments, Some(false));
        assert!(!config.render.enabled);
    }

    #[test]
    fn test_parse_unknown_field() {
        let result = toml::from_str::<Config>("[output]\ndirectory = \"x\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_resolve_paths() {
        let mut config: Config = toml::from_str("[output]\ndir = \"out/md\"\n").unwrap();
        config.resolve_paths(Path::new("/project"));

        assert_eq!(config.output_resolved.dir, PathBuf::from("/project/out/md"));
        assert!(config.output_resolved.extract_attachments);
    }

    #[test]
    fn test_resolve_absolute_path() {
        let mut config: Config = toml::from_str("[output]\ndir = \"/srv/notes\"\n").unwrap();
        config.resolve_paths(Path::new("/project"));

        assert_eq!(config.output_resolved.dir, PathBuf::from("/srv/notes"));
    }

    #[test]
    fn test_resolve_default_dir() {
        let mut config: Config = toml::from_str("").unwrap();
        config.resolve_paths(Path::new("/project"));

        assert_eq!(config.output_resolved.dir, PathBuf::from("/project/notes"));
    }

    #[test]
    fn test_apply_cli_settings() {
        let mut config = Config::default_with_base(Path::new("/test"));

        config.apply_cli_settings(&CliSettings {
            output_dir: Some(PathBuf::from("/custom")),
            extract_attachments: Some(false),
            render_enabled: Some(false),
        });

        assert_eq!(config.output_resolved.dir, PathBuf::from("/custom"));
        assert!(!config.output_resolved.extract_attachments);
        assert!(!config.render.enabled);
    }

    #[test]
    fn test_apply_cli_settings_empty() {
        let mut config = Config::default_with_base(Path::new("/test"));

        config.apply_cli_settings(&CliSettings::default());

        assert_eq!(config.output_resolved.dir, PathBuf::from("/test/notes"));
        assert!(config.output_resolved.extract_attachments);
        assert!(config.render.enabled);
    }

    #[test]
    fn test_validate_empty_dir() {
        let config: Config = toml::from_str("[output]\ndir = \" \"\n").unwrap();
        let err = config.validate().unwrap_err();
        assert_eq!(err.to_string(), "Configuration error: output.dir cannot be empty");
    }

    #[test]
    fn test_expand_env_vars_output_dir() {
        // SAFETY: variable name is unique to this test
        unsafe {
            std::env::set_var("ENEX_TEST_OUTPUT_ROOT", "/data");
        }

        let mut config: Config =
            toml::from_str("[output]\ndir = \"${ENEX_TEST_OUTPUT_ROOT}/notes\"\n").unwrap();
        config.expand_env_vars().unwrap();

        assert_eq!(config.output.dir.as_deref(), Some("/data/notes"));

        unsafe {
            std::env::remove_var("ENEX_TEST_OUTPUT_ROOT");
        }
    }

    #[test]
    fn test_load_from_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILENAME);
        std::fs::write(
            &path,
            "[output]\ndir = \"converted\"\nextract_attachments = false\n",
        )
        .unwrap();

        let config = Config::load(Some(&path), None).unwrap();

        assert_eq!(config.output_resolved.dir, temp.path().join("converted"));
        assert!(!config.output_resolved.extract_attachments);
        assert_eq!(config.config_path, Some(path));
    }

    #[test]
    fn test_load_with_cli_settings() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "[render]\nenabled = true\n").unwrap();

        let settings = CliSettings {
            output_dir: Some(PathBuf::from("/override")),
            ..Default::default()
        };
        let config = Config::load(Some(&path), Some(&settings)).unwrap();

        assert_eq!(config.output_resolved.dir, PathBuf::from("/override"));
        assert!(config.render.enabled);
    }

    #[test]
    fn test_load_missing_file() {
        let result = Config::load(Some(Path::new("/nonexistent/enex2md.toml")), None);
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_load_invalid_toml() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "[output\n").unwrap();

        let result = Config::load(Some(&path), None);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }
}

//! Configuration management for keynote.
//!
//! Parses `site.yaml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `server.host`
//! - `site.link`
//! - `site.logo`

use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override server host.
    pub host: Option<String>,
    /// Override server port.
    pub port: Option<u16>,
    /// Override content source directory.
    pub source_dir: Option<PathBuf>,
    /// Override frozen (no refresh) mode.
    pub frozen: Option<bool>,
    /// Override static export output directory.
    pub output_dir: Option<PathBuf>,
    /// Override static export base path.
    pub base_path: Option<String>,
}

/// Configuration filename to search for.
pub const CONFIG_FILENAME: &str = "site.yaml";

/// Default classification descriptor filename.
pub const DEFAULT_DESCRIPTOR: &str = ".folder.yaml";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Site branding.
    pub site: SiteConfig,
    /// Server configuration.
    pub server: ServerConfig,
    /// Content configuration (paths are relative strings from YAML).
    content: ContentConfigRaw,
    /// Refresh configuration.
    pub refresh: RefreshConfig,
    /// Extra files or directories exposed at the site root.
    static_paths: Vec<String>,
    /// Static export configuration (paths are relative strings from YAML).
    export: ExportConfigRaw,

    /// Resolved content configuration (set after loading).
    #[serde(skip)]
    pub content_resolved: ContentConfig,
    /// Resolved static paths (set after loading).
    #[serde(skip)]
    pub static_resolved: Vec<StaticPath>,
    /// Resolved export configuration (set after loading).
    #[serde(skip)]
    pub export_resolved: ExportConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Site branding shown on the home page and content pages.
///
/// Every field is optional in YAML and defaults to an empty string.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct SiteConfig {
    /// Short site name.
    pub name: String,
    /// Page title.
    pub title: String,
    /// Logo image URL.
    pub logo: String,
    /// Link target for the logo.
    pub link: String,
    /// Favicon URL.
    pub icon: String,
    /// Author name.
    pub author: String,
    /// Meta description.
    pub description: String,
    /// Summary line shown under the title.
    pub summary: String,
    /// Copyright holder shown in the footer.
    pub copyright: String,
}

/// Server configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 8000,
        }
    }
}

/// Snapshot refresh configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RefreshConfig {
    /// Seconds between content rescans.
    pub interval_secs: u64,
    /// Load content once and never refresh.
    pub frozen: bool,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval_secs: 30,
            frozen: false,
        }
    }
}

impl RefreshConfig {
    /// Refresh period, or `None` in frozen mode.
    #[must_use]
    pub fn interval(&self) -> Option<Duration> {
        (!self.frozen).then(|| Duration::from_secs(self.interval_secs))
    }
}

/// Raw content configuration as parsed from YAML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ContentConfigRaw {
    source_dir: Option<String>,
    descriptor: Option<String>,
}

/// Resolved content configuration with absolute paths.
#[derive(Debug, Default)]
pub struct ContentConfig {
    /// Root directory of the content tree.
    pub source_dir: PathBuf,
    /// Per-directory classification descriptor filename.
    pub descriptor: String,
}

/// Raw export configuration as parsed from YAML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ExportConfigRaw {
    output_dir: Option<String>,
    base_path: Option<String>,
}

/// Resolved static export configuration.
#[derive(Debug, Default)]
pub struct ExportConfig {
    /// Directory receiving the generated site.
    pub output_dir: PathBuf,
    /// URL path the exported site is served under (always ends with `/`).
    pub base_path: String,
}

/// An extra file or directory exposed at the site root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StaticPath {
    /// Name as written in config, used as the URL segment (e.g. `assets`).
    pub name: String,
    /// Absolute filesystem location.
    pub path: PathBuf,
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
    /// YAML parsing error.
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`server.host`").
        field: String,
        /// Error message (e.g., "${`KN_HOST`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Only the `site` section, used when reloading branding on refresh.
#[derive(Deserialize, Default)]
#[serde(default)]
struct SiteSection {
    site: SiteConfig,
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `site.yaml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or the resulting configuration is invalid.
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

        config.validate()?;
        Ok(config)
    }

    /// Re-read only the `site` section of a config file.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read, parsed, or expanded.
    pub fn load_site(path: &Path) -> Result<SiteConfig, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut section: SiteSection = parse_yaml(&content)?;
        expand_site(&mut section.site)?;
        Ok(section.site)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(host) = &settings.host {
            self.server.host.clone_from(host);
        }
        if let Some(port) = settings.port {
            self.server.port = port;
        }
        if let Some(source_dir) = &settings.source_dir {
            self.content_resolved.source_dir.clone_from(source_dir);
        }
        if let Some(frozen) = settings.frozen {
            self.refresh.frozen = frozen;
        }
        if let Some(output_dir) = &settings.output_dir {
            self.export_resolved.output_dir.clone_from(output_dir);
        }
        if let Some(base_path) = &settings.base_path {
            self.export_resolved.base_path = normalize_base_path(base_path);
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

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            site: SiteConfig::default(),
            server: ServerConfig::default(),
            content: ContentConfigRaw::default(),
            refresh: RefreshConfig::default(),
            static_paths: Vec::new(),
            export: ExportConfigRaw::default(),
            content_resolved: ContentConfig {
                source_dir: base.join("src"),
                descriptor: DEFAULT_DESCRIPTOR.to_owned(),
            },
            static_resolved: Vec::new(),
            export_resolved: ExportConfig {
                output_dir: base.join("public"),
                base_path: "/".to_owned(),
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = parse_yaml(&content)?;

        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_refresh()?;
        self.validate_export()?;
        self.validate_static_paths()?;
        Ok(())
    }

    fn validate_server(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.server.host, "server.host")?;

        if self.server.port == 0 {
            return Err(ConfigError::Validation(
                "server.port cannot be 0".to_owned(),
            ));
        }

        Ok(())
    }

    fn validate_refresh(&self) -> Result<(), ConfigError> {
        if self.refresh.interval_secs == 0 {
            return Err(ConfigError::Validation(
                "refresh.interval_secs must be greater than 0".to_owned(),
            ));
        }
        Ok(())
    }

    fn validate_export(&self) -> Result<(), ConfigError> {
        if !self.export_resolved.base_path.starts_with('/') {
            return Err(ConfigError::Validation(
                "export.base_path must start with /".to_owned(),
            ));
        }
        Ok(())
    }

    fn validate_static_paths(&self) -> Result<(), ConfigError> {
        for name in &self.static_paths {
            require_non_empty(name, "static_paths")?;
            let relative = Path::new(name)
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
            if !relative {
                return Err(ConfigError::Validation(format!(
                    "static_paths entry {name:?} must be a relative path without .."
                )));
            }
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        expand_fields([("server.host", &mut self.server.host)])?;
        expand_site(&mut self.site)
    }

    /// Resolve relative paths to absolute paths based on config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let resolve = |path: Option<&str>, default: &str| config_dir.join(path.unwrap_or(default));

        self.content_resolved = ContentConfig {
            source_dir: resolve(self.content.source_dir.as_deref(), "src"),
            descriptor: self
                .content
                .descriptor
                .clone()
                .unwrap_or_else(|| DEFAULT_DESCRIPTOR.to_owned()),
        };

        self.static_resolved = self
            .static_paths
            .iter()
            .map(|name| StaticPath {
                name: name.trim_matches('/').to_owned(),
                path: config_dir.join(name),
            })
            .collect();

        self.export_resolved = ExportConfig {
            output_dir: resolve(self.export.output_dir.as_deref(), "public"),
            base_path: normalize_base_path(self.export.base_path.as_deref().unwrap_or("/")),
        };
    }
}

fn parse_yaml<T>(content: &str) -> Result<T, ConfigError>
where
    T: for<'de> Deserialize<'de> + Default,
{
    // An empty YAML document deserializes to unit, not to an empty map.
    if content.trim().is_empty() {
        return Ok(T::default());
    }
    Ok(serde_yaml::from_str(content)?)
}

fn expand_site(site: &mut SiteConfig) -> Result<(), ConfigError> {
    expand_fields([("site.link", &mut site.link), ("site.logo", &mut site.logo)])
}

/// Expand `${VAR}` references in place.
///
/// Values without `${` are left untouched, so a bare `$` in a URL survives.
fn expand_fields<'a>(
    fields: impl IntoIterator<Item = (&'a str, &'a mut String)>,
) -> Result<(), ConfigError> {
    for (field, value) in fields {
        if !value.contains("${") {
            continue;
        }
        let expanded = shellexpand::env_with_context(value.as_str(), |var| {
            std::env::var(var).map(Some)
        })
        .map_err(|e| ConfigError::EnvVar {
            field: field.to_owned(),
            message: format!("${{{}}} not set", e.var_name),
        })?;
        *value = expanded.into_owned();
    }
    Ok(())
}

/// Ensure a base path ends with a single trailing slash.
fn normalize_base_path(base_path: &str) -> String {
    let trimmed = base_path.trim_end_matches('/');
    format!("{trimmed}/")
}

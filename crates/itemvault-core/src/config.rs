//! Configuration management for itemvault.
//!
//! Configuration is loaded from multiple sources and merged:
//! 1. Global config: `~/.config/itemvault/config.json`
//! 2. Project config: `itemvault.jsonc` or `itemvault.json` in the working directory
//! 3. Environment overrides: `ITEMVAULT_*` variables
//!
//! Command-line flags are applied on top by the binary.
//!
//! Config files may contain comments and `{env:VAR_NAME}` / `{file:path}`
//! substitutions.

use crate::error::{ConfigError, CoreResult};
use itemvault_source::DEFAULT_PORTAL_URL;
use itemvault_util::LogLevel;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Static regex for variable substitution, compiled once.
static VAR_REGEX: OnceLock<regex::Regex> = OnceLock::new();

/// Get the variable substitution regex, compiling it once on first use.
fn var_regex() -> &'static regex::Regex {
    VAR_REGEX.get_or_init(|| {
        regex::Regex::new(r"\{(env|file):([^}]+)\}")
            .expect("Invalid regex pattern - this is a compile-time constant")
    })
}

/// Environment variable for the portal username.
pub const ENV_USERNAME: &str = "ITEMVAULT_USERNAME";
/// Environment variable for the portal token.
pub const ENV_TOKEN: &str = "ITEMVAULT_TOKEN";
/// Environment variable for the portal URL.
pub const ENV_PORTAL_URL: &str = "ITEMVAULT_PORTAL_URL";
/// Environment variable for the log level.
pub const ENV_LOG_LEVEL: &str = "ITEMVAULT_LOG_LEVEL";

/// Default snapshot file extension.
const DEFAULT_EXTENSION: &str = "json";

/// Main configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// JSON Schema reference.
    #[serde(rename = "$schema", skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Working directory holding the `archive/` tree.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archive_dir: Option<PathBuf>,

    /// Snapshot file extension.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,

    /// Portal base URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub portal_url: Option<String>,

    /// Portal username.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Portal token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Log level.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<LogLevel>,
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// Loading order (later sources override earlier):
    /// 1. Global config from `~/.config/itemvault/`
    /// 2. Project config from `project_dir`
    /// 3. `ITEMVAULT_*` environment variables
    ///
    /// Returns the config and the files it was read from.
    pub async fn load(project_dir: Option<&Path>) -> CoreResult<(Self, Vec<PathBuf>)> {
        let global_dir = itemvault_util::path::config_dir();
        let (config, sources) = Self::load_from(global_dir.as_deref(), project_dir).await?;
        Ok((config.with_env_overrides(|name| std::env::var(name).ok()), sources))
    }

    /// Load and merge the global and project config files only.
    pub async fn load_from(
        global_dir: Option<&Path>,
        project_dir: Option<&Path>,
    ) -> CoreResult<(Self, Vec<PathBuf>)> {
        let mut config = Config::default();
        let mut sources = Vec::new();

        if let Some(dir) = global_dir {
            for name in &["config.json", "itemvault.jsonc", "itemvault.json"] {
                let path = dir.join(name);
                if path.exists() {
                    let loaded = Self::load_file(&path).await?;
                    config = config.merge(loaded);
                    sources.push(path);
                    break;
                }
            }
        }

        if let Some(dir) = project_dir {
            for name in &["itemvault.jsonc", "itemvault.json"] {
                let path = dir.join(name);
                if path.exists() {
                    let loaded = Self::load_file(&path).await?;
                    config = config.merge(loaded);
                    sources.push(path);
                    break;
                }
            }
        }

        Ok((config, sources))
    }

    /// Load configuration from a file.
    pub async fn load_file(path: &Path) -> CoreResult<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        let content = Self::substitute_variables(&content, path)?;
        Self::parse_jsonc(&content, &path.display().to_string())
    }

    /// Apply `ITEMVAULT_*` overrides from an environment lookup.
    ///
    /// Unparseable log levels are ignored with a warning.
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.is_empty());

        if let Some(username) = non_empty(ENV_USERNAME) {
            self.username = Some(username);
        }
        if let Some(token) = non_empty(ENV_TOKEN) {
            self.token = Some(token);
        }
        if let Some(url) = non_empty(ENV_PORTAL_URL) {
            self.portal_url = Some(url);
        }
        if let Some(level) = non_empty(ENV_LOG_LEVEL) {
            match LogLevel::parse(&level) {
                Some(level) => self.log_level = Some(level),
                None => tracing::warn!(value = %level, "Ignoring invalid {}", ENV_LOG_LEVEL),
            }
        }
        self
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(mut self, other: Self) -> Self {
        if other.schema.is_some() {
            self.schema = other.schema;
        }
        if other.archive_dir.is_some() {
            self.archive_dir = other.archive_dir;
        }
        if other.extension.is_some() {
            self.extension = other.extension;
        }
        if other.portal_url.is_some() {
            self.portal_url = other.portal_url;
        }
        if other.username.is_some() {
            self.username = other.username;
        }
        if other.token.is_some() {
            self.token = other.token;
        }
        if other.log_level.is_some() {
            self.log_level = other.log_level;
        }
        self
    }

    /// Snapshot file extension, `json` unless configured.
    pub fn extension(&self) -> &str {
        self.extension.as_deref().unwrap_or(DEFAULT_EXTENSION)
    }

    /// Portal URL, ArcGIS Online unless configured.
    pub fn portal_url(&self) -> &str {
        self.portal_url.as_deref().unwrap_or(DEFAULT_PORTAL_URL)
    }

    /// Configured username, or an error naming where to set it.
    pub fn require_username(&self) -> Result<&str, ConfigError> {
        self.username.as_deref().ok_or_else(|| ConfigError::Missing {
            name: "username".to_string(),
            env: ENV_USERNAME.to_string(),
        })
    }

    /// Configured token, or an error naming where to set it.
    pub fn require_token(&self) -> Result<&str, ConfigError> {
        self.token.as_deref().ok_or_else(|| ConfigError::Missing {
            name: "token".to_string(),
            env: ENV_TOKEN.to_string(),
        })
    }

    /// Parse JSONC (JSON with comments).
    fn parse_jsonc(content: &str, source: &str) -> CoreResult<Self> {
        let stripped = strip_comments(content);

        serde_json::from_str(&stripped).map_err(|e| {
            ConfigError::InvalidJson {
                path: source.to_string(),
                message: e.to_string(),
            }
            .into()
        })
    }

    /// Substitute `{env:NAME}` and `{file:path}` references.
    ///
    /// File references are resolved relative to the config file.
    fn substitute_variables(content: &str, config_path: &Path) -> CoreResult<String> {
        let config_dir = config_path.parent().unwrap_or(Path::new("."));
        let mut result = content.to_string();

        for cap in var_regex().captures_iter(content) {
            let (Some(full_match), Some(kind), Some(value)) = (cap.get(0), cap.get(1), cap.get(2))
            else {
                continue;
            };

            let replacement = match kind.as_str() {
                "env" => std::env::var(value.as_str()).map_err(|_| ConfigError::EnvVarNotFound {
                    name: value.as_str().to_string(),
                })?,
                "file" => {
                    let file_path = config_dir.join(value.as_str());
                    std::fs::read_to_string(&file_path)
                        .map(|v| v.trim().to_string())
                        .map_err(|_| ConfigError::FileRefNotFound {
                            path: file_path.display().to_string(),
                        })?
                }
                _ => continue,
            };

            result = result.replace(full_match.as_str(), &replacement);
        }

        Ok(result)
    }
}

/// Strip `//` and `/* */` comments outside of strings, keeping newlines.
fn strip_comments(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut in_string = false;
    let mut escape_next = false;

    while let Some(c) = chars.next() {
        if in_string {
            result.push(c);
            if escape_next {
                escape_next = false;
            } else if c == '\\' {
                escape_next = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match (c, chars.peek().copied()) {
            ('"', _) => {
                in_string = true;
                result.push(c);
            }
            ('/', Some('/')) => {
                for c in chars.by_ref() {
                    if c == '\n' {
                        result.push('\n');
                        break;
                    }
                }
            }
            ('/', Some('*')) => {
                chars.next();
                let mut prev = ' ';
                for c in chars.by_ref() {
                    if prev == '*' && c == '/' {
                        break;
                    }
                    if c == '\n' {
                        result.push('\n');
                    }
                    prev = c;
                }
            }
            _ => result.push(c),
        }
    }

    result
}

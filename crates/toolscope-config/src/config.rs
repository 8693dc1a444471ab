// crates/toolscope-config/src/config.rs
// ============================================================================
// Module: Tool Scope Configuration
// Description: Configuration loading and validation for the gateway.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! Invalid configuration fails closed. Toolsets are declared as an ordered
//! array of tables so declaration order survives parsing; that order decides
//! which tool wins when the synthesized `all` toolset deduplicates by name.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;
use std::time::SystemTime;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "toolscope.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "TOOLSCOPE_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Default session idle timeout in seconds.
pub const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 120;
/// Maximum session idle timeout in seconds (one day).
pub(crate) const MAX_IDLE_TIMEOUT_SECS: u64 = 86_400;
/// Maximum number of declared toolsets.
pub(crate) const MAX_TOOLSETS: usize = 128;
/// Maximum toolset name length.
pub(crate) const MAX_TOOLSET_NAME_LENGTH: usize = 64;
/// Maximum tool references per toolset.
pub(crate) const MAX_TOOLSET_ENTRIES: usize = 1024;
/// Maximum length of a fully-qualified tool name.
pub(crate) const MAX_TOOL_NAME_LENGTH: usize = 256;

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Tool Scope Gateway configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToolscopeConfig {
    /// Session lifecycle configuration.
    #[serde(default)]
    pub sessions: SessionsConfig,
    /// Session audit logging configuration.
    #[serde(default)]
    pub audit: AuditConfig,
    /// Declared toolsets, in declaration order.
    #[serde(default)]
    pub toolsets: Vec<ToolsetConfig>,
    /// Optional config source metadata (not serialized).
    #[serde(skip)]
    pub source_modified_at: Option<SystemTime>,
}

impl ToolscopeConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// Resolution order: explicit `path`, then [`CONFIG_ENV_VAR`], then
    /// `toolscope.toml` in the working directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let mut config = Self::from_toml_str(content)?;
        config.source_modified_at = fs::metadata(&resolved).and_then(|meta| meta.modified()).ok();
        Ok(config)
    }

    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        if content.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.sessions.validate()?;
        self.audit.validate()?;
        if self.toolsets.len() > MAX_TOOLSETS {
            return Err(ConfigError::Invalid("too many toolsets".to_string()));
        }
        let mut seen = BTreeSet::new();
        for toolset in &self.toolsets {
            toolset.validate()?;
            if !seen.insert(toolset.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate toolset name: {}",
                    toolset.name
                )));
            }
        }
        Ok(())
    }
}

/// Session lifecycle configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionsConfig {
    /// Idle timeout in seconds before an unread session is evicted.
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            idle_timeout_secs: default_idle_timeout_secs(),
        }
    }
}

impl SessionsConfig {
    /// Returns the idle timeout as a [`Duration`].
    #[must_use]
    pub const fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    /// Validates session settings.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.idle_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "sessions.idle_timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.idle_timeout_secs > MAX_IDLE_TIMEOUT_SECS {
            return Err(ConfigError::Invalid(
                "sessions.idle_timeout_secs exceeds max".to_string(),
            ));
        }
        Ok(())
    }
}

/// Audit sink selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AuditSinkKind {
    /// JSON lines on stderr.
    #[default]
    Stderr,
    /// JSON lines appended to a file.
    File,
    /// Discard audit events.
    None,
}

/// Session audit logging configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuditConfig {
    /// Sink used for session audit events.
    #[serde(default)]
    pub sink: AuditSinkKind,
    /// Output path (required for the file sink).
    #[serde(default)]
    pub path: Option<String>,
}

impl AuditConfig {
    /// Validates audit settings.
    fn validate(&self) -> Result<(), ConfigError> {
        match self.sink {
            AuditSinkKind::File => {
                let path = self.path.as_deref().ok_or_else(|| {
                    ConfigError::Invalid("audit.path is required for the file sink".to_string())
                })?;
                validate_path_string("audit.path", path)
            }
            AuditSinkKind::Stderr | AuditSinkKind::None => Ok(()),
        }
    }
}

/// A declared toolset: a scope name and the fully-qualified tools it grants.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ToolsetConfig {
    /// Scope name (for example `admin`).
    pub name: String,
    /// Fully-qualified tool names (`service.operation`).
    #[serde(default)]
    pub tools: Vec<String>,
}

impl ToolsetConfig {
    /// Builds a toolset declaration.
    #[must_use]
    pub fn new<I, S>(name: impl Into<String>, tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            tools: tools.into_iter().map(Into::into).collect(),
        }
    }

    /// Validates a toolset declaration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::Invalid("toolset name must be non-empty".to_string()));
        }
        if self.name.len() > MAX_TOOLSET_NAME_LENGTH {
            return Err(ConfigError::Invalid(format!("toolset name too long: {}", self.name)));
        }
        if self.tools.len() > MAX_TOOLSET_ENTRIES {
            return Err(ConfigError::Invalid(format!(
                "too many tools in toolset: {}",
                self.name
            )));
        }
        for tool in &self.tools {
            if tool.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "toolset {} contains an empty tool name",
                    self.name
                )));
            }
            if tool.len() > MAX_TOOL_NAME_LENGTH {
                return Err(ConfigError::Invalid(format!(
                    "toolset {} contains a tool name that is too long",
                    self.name
                )));
            }
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from CLI or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against security limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        let component_value = component.as_os_str().to_string_lossy();
        if component_value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Default idle timeout in seconds.
pub(crate) const fn default_idle_timeout_secs() -> u64 {
    DEFAULT_IDLE_TIMEOUT_SECS
}

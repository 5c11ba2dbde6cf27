//! Project configuration module.
//!
//! Handles loading, validating, and merging the optional `webext.toml` file at
//! the project root. Stock defaults describe the conventional extension layout;
//! the user file only needs the keys it wants to change.
//!
//! ## Config File Location
//!
//! ```text
//! my-extension/
//! ├── webext.toml              # Project config (optional, overrides stock defaults)
//! ├── .env.toml                # Environment source (required, defines NODE_ENV)
//! ├── package.json             # Package metadata (description, version)
//! ├── secrets.development.js   # Optional per-profile secrets module
//! └── src/
//!     ├── manifest.json        # Manifest template
//!     ├── popup.html
//!     └── js/
//!         └── popup.js
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! source_dir = "src"                  # Source root, relative to the project root
//! output_dir = "build"                # Bundle output directory
//! bundle_pattern = "[name].bundle.js" # Output naming pattern per entry point
//! env_file = ".env.toml"              # Environment source
//! package_file = "package.json"       # Package metadata source
//! clean = true                        # Clean the output directory before a build
//!
//! [secrets]
//! module = "secrets"                  # Symbolic module name consumers import
//! extension = "js"                    # secrets.<profile>.<extension>
//!
//! [assets]
//! loose_extensions = ["jpg", "jpeg", "png", "gif", "eot", "otf", "svg", "ttf", "woff", "woff2"]
//! exclude_dir = "node_modules"
//!
//! [dev_server]
//! port = 9000
//! compress = true
//! debug = true
//! source_map = "cheap-module-eval-source-map"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::fs;
use std::path::{Component, Path};
use thiserror::Error;

/// Name of the project config file looked up at the project root.
pub const CONFIG_FILENAME: &str = "webext.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Project configuration loaded from `webext.toml`.
///
/// All fields have defaults matching the conventional extension layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectConfig {
    /// Source root, relative to the project root.
    pub source_dir: String,
    /// Directory the bundling engine writes into.
    pub output_dir: String,
    /// Output filename pattern; `[name]` is replaced by the entry name.
    pub bundle_pattern: String,
    /// Environment source file, relative to the project root.
    pub env_file: String,
    /// Package metadata file, relative to the project root.
    pub package_file: String,
    /// Whether the output directory is cleaned before each build.
    pub clean: bool,
    /// Secrets module aliasing.
    pub secrets: SecretsConfig,
    /// Asset rule parameters.
    pub assets: AssetsConfig,
    /// Development server and source map settings.
    pub dev_server: DevServerConfig,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            source_dir: "src".to_string(),
            output_dir: "build".to_string(),
            bundle_pattern: "[name].bundle.js".to_string(),
            env_file: ".env.toml".to_string(),
            package_file: "package.json".to_string(),
            clean: true,
            secrets: SecretsConfig::default(),
            assets: AssetsConfig::default(),
            dev_server: DevServerConfig::default(),
        }
    }
}

impl ProjectConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.source_dir.trim().is_empty() {
            return Err(ConfigError::Validation(
                "source_dir must not be empty".into(),
            ));
        }
        if self.output_dir.trim().is_empty() {
            return Err(ConfigError::Validation(
                "output_dir must not be empty".into(),
            ));
        }
        // The output directory is removed wholesale when cleaning.
        let output = match project_relative(&self.output_dir) {
            Some(parts) if !parts.is_empty() => parts,
            _ => {
                return Err(ConfigError::Validation(format!(
                    "output_dir must be a subdirectory of the project root, got {:?}",
                    self.output_dir
                )));
            }
        };
        if project_relative(&self.source_dir).is_some_and(|source| source.starts_with(&output)) {
            return Err(ConfigError::Validation(format!(
                "output_dir {:?} must not contain source_dir {:?}",
                self.output_dir, self.source_dir
            )));
        }
        if !self.bundle_pattern.contains(crate::naming::NAME_PLACEHOLDER) {
            return Err(ConfigError::Validation(
                "bundle_pattern must contain [name]".into(),
            ));
        }
        if self.secrets.module.is_empty() || self.secrets.extension.is_empty() {
            return Err(ConfigError::Validation(
                "secrets.module and secrets.extension must not be empty".into(),
            ));
        }
        if self.assets.loose_extensions.is_empty() {
            return Err(ConfigError::Validation(
                "assets.loose_extensions must not be empty".into(),
            ));
        }
        if let Some(bad) = self
            .assets
            .loose_extensions
            .iter()
            .find(|ext| ext.is_empty() || ext.contains('.'))
        {
            return Err(ConfigError::Validation(format!(
                "assets.loose_extensions entries must be bare extensions, got {bad:?}"
            )));
        }
        if self.dev_server.port == 0 {
            return Err(ConfigError::Validation(
                "dev_server.port must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

/// Normal components of a relative path, `.` dropped.
///
/// `None` for absolute paths and paths with `..`.
fn project_relative(dir: &str) -> Option<Vec<&OsStr>> {
    Path::new(dir)
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .map(|c| match c {
            Component::Normal(part) => Some(part),
            _ => None,
        })
        .collect()
}

/// Secrets module aliasing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SecretsConfig {
    /// Symbolic module name redirected to the per-profile file.
    pub module: String,
    /// Extension of `secrets.<profile>.<extension>`.
    pub extension: String,
}

impl Default for SecretsConfig {
    fn default() -> Self {
        Self {
            module: "secrets".to_string(),
            extension: "js".to_string(),
        }
    }
}

/// Asset rule parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AssetsConfig {
    /// Binary media extensions copied through with their original names.
    pub loose_extensions: Vec<String>,
    /// Dependency directory every rule excludes.
    pub exclude_dir: String,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            loose_extensions: [
                "jpg", "jpeg", "png", "gif", "eot", "otf", "svg", "ttf", "woff", "woff2",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            exclude_dir: "node_modules".to_string(),
        }
    }
}

/// Development-only settings. Ignored by every profile except `development`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DevServerConfig {
    pub port: u16,
    /// Response compression.
    pub compress: bool,
    pub debug: bool,
    /// Source mapping strategy handed to the engine.
    pub source_map: String,
}

impl Default for DevServerConfig {
    fn default() -> Self {
        Self {
            port: 9000,
            compress: true,
            debug: true,
            source_map: "cheap-module-eval-source-map".to_string(),
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(ProjectConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `webext.toml` from the project root as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(root: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = root.join(CONFIG_FILENAME);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<ProjectConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: ProjectConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the project config from the given root.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(root: &Path) -> Result<ProjectConfig, ConfigError> {
    let overlay = load_raw_config(root)?;
    if overlay.is_none() {
        tracing::debug!(root = %root.display(), "no {}, using stock defaults", CONFIG_FILENAME);
    }
    resolve_config(stock_defaults_value(), overlay)
}

/// Returns a fully-commented stock `webext.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# webext-pack Configuration
# =========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# Source root, relative to the project root. Entry points live in
# <source_dir>/js/<name>.js, HTML templates in <source_dir>/<name>.html and
# the manifest template in <source_dir>/manifest.json.
source_dir = "src"

# Directory the bundles, HTML shells and manifest are written to.
output_dir = "build"

# Output filename per entry point. [name] is the entry name.
bundle_pattern = "[name].bundle.js"

# Environment source. Must define NODE_ENV.
env_file = ".env.toml"

# Package metadata. Its description and version seed the manifest.
package_file = "package.json"

# Remove the output directory before each build.
clean = true

# ---------------------------------------------------------------------------
# Secrets module
# ---------------------------------------------------------------------------
[secrets]
# Importing this module name resolves to secrets.<profile>.<extension>
# when that file exists at the project root.
module = "secrets"
extension = "js"

# ---------------------------------------------------------------------------
# Asset rules
# ---------------------------------------------------------------------------
[assets]
# Image and font formats copied through with their original file names.
loose_extensions = ["jpg", "jpeg", "png", "gif", "eot", "otf", "svg", "ttf", "woff", "woff2"]

# Files under this directory are never matched by any rule.
exclude_dir = "node_modules"

# ---------------------------------------------------------------------------
# Development profile only
# ---------------------------------------------------------------------------
[dev_server]
port = 9000
compress = true
debug = true
source_map = "cheap-module-eval-source-map"
"##
}

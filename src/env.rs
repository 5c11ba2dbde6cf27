//! Environment profile resolution.
//!
//! The environment source is a small TOML file at the project root (default
//! `.env.toml`) holding flat key/value pairs. `NODE_ENV` names the active
//! profile:
//!
//! ```toml
//! NODE_ENV = "development"
//! API_HOST = "localhost"
//! VERBOSE = true
//! RETRIES = 3
//! ```
//!
//! Resolution produces a [`Profile`]: the profile name plus every key of the
//! source. The profile is immutable and passed by reference to every stage
//! that needs it; nothing is written to the process environment.

use indexmap::IndexMap;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Key whose value names the active profile.
pub const PROFILE_KEY: &str = "NODE_ENV";

/// Profile name that turns on the development build mode.
pub const DEVELOPMENT: &str = "development";

#[derive(Error, Debug)]
pub enum EnvError {
    #[error("Configuration missing: {0}")]
    ConfigurationMissing(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Unsupported value for environment key {0}: only strings, booleans and numbers are allowed")]
    UnsupportedValue(String),
}

/// A single environment value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EnvValue {
    String(String),
    Bool(bool),
    Integer(i64),
    Float(f64),
}

impl fmt::Display for EnvValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnvValue::String(s) => f.write_str(s),
            EnvValue::Bool(b) => write!(f, "{b}"),
            EnvValue::Integer(i) => write!(f, "{i}"),
            EnvValue::Float(x) => write!(f, "{x}"),
        }
    }
}

impl From<&str> for EnvValue {
    fn from(value: &str) -> Self {
        EnvValue::String(value.to_string())
    }
}

impl TryFrom<(&str, toml::Value)> for EnvValue {
    type Error = EnvError;

    fn try_from((key, value): (&str, toml::Value)) -> Result<Self, Self::Error> {
        match value {
            toml::Value::String(s) => Ok(EnvValue::String(s)),
            toml::Value::Boolean(b) => Ok(EnvValue::Bool(b)),
            toml::Value::Integer(i) => Ok(EnvValue::Integer(i)),
            toml::Value::Float(x) => Ok(EnvValue::Float(x)),
            _ => Err(EnvError::UnsupportedValue(key.to_string())),
        }
    }
}

/// Raw key/value mapping as read from the environment source, in source order.
pub type EnvSource = IndexMap<String, EnvValue>;

/// Parse environment source text.
pub fn parse_env_source(content: &str) -> Result<EnvSource, EnvError> {
    let table: toml::Table = toml::from_str(content)?;
    table
        .into_iter()
        .map(|(key, value)| -> Result<(String, EnvValue), EnvError> {
            let value = EnvValue::try_from((key.as_str(), value))?;
            Ok((key, value))
        })
        .collect()
}

/// Read the environment source at `path`.
///
/// Returns `Ok(None)` when the file does not exist; [`Profile::resolve`]
/// turns that into a fatal `ConfigurationMissing`.
pub fn load_env_source(path: &Path) -> Result<Option<EnvSource>, EnvError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    parse_env_source(&content).map(Some)
}

/// The active environment profile. Exactly one per build invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Profile {
    name: String,
    vars: EnvSource,
}

impl Profile {
    /// Resolve the profile from an environment source.
    ///
    /// A missing source, or one without `NODE_ENV`, is fatal: there is no
    /// default profile.
    pub fn resolve(source: Option<EnvSource>) -> Result<Self, EnvError> {
        let vars = source.ok_or_else(|| {
            EnvError::ConfigurationMissing("no environment source was provided".into())
        })?;
        let name = vars
            .get(PROFILE_KEY)
            .map(|v| v.to_string())
            .ok_or_else(|| {
                EnvError::ConfigurationMissing(format!("environment source does not define {PROFILE_KEY}"))
            })?;
        tracing::info!(profile = %name, keys = vars.len(), "resolved environment profile");
        Ok(Self { name, vars })
    }

    /// Load the source at `path` and resolve it in one step.
    pub fn load(path: &Path) -> Result<Self, EnvError> {
        let source = load_env_source(path)?;
        if source.is_none() {
            return Err(EnvError::ConfigurationMissing(format!(
                "environment source {} not found",
                path.display()
            )));
        }
        Self::resolve(source)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Every key of the environment source, `NODE_ENV` included.
    pub fn vars(&self) -> &EnvSource {
        &self.vars
    }

    pub fn get(&self, key: &str) -> Option<&EnvValue> {
        self.vars.get(key)
    }

    pub fn is_development(&self) -> bool {
        self.name == DEVELOPMENT
    }

    /// Compile-time constants substituted into the bundles.
    ///
    /// Only the profile name is exposed: `process.env.NODE_ENV` maps to the
    /// JSON string literal of the name.
    pub fn defines(&self) -> BTreeMap<String, String> {
        let literal = serde_json::Value::String(self.name.clone()).to_string();
        BTreeMap::from([(format!("process.env.{PROFILE_KEY}"), literal)])
    }
}

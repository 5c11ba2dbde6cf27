//! Manifest synthesis.
//!
//! The packaged `manifest.json` is derived from two sources:
//!
//! 1. **Template**: the static `<source root>/manifest.json`
//! 2. **Package metadata**: `description` and `version` from `package.json`
//!
//! ## Precedence
//!
//! The merge starts from the metadata fields and overlays every template
//! field on top. **The template always wins.** Metadata only fills in
//! `description`/`version` when the template leaves them out:
//!
//! ```text
//! metadata  {"description": "An extension", "version": "1.2.0"}
//! template  {"description": "Override", "manifest_version": 2}
//! result    {"description": "Override", "version": "1.2.0", "manifest_version": 2}
//! ```
//!
//! The merge is shallow: nested template objects are copied as-is, never
//! merged field by field. Metadata keys come first in the output, template
//! keys follow in template order.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Filename of the template under the source root and of the emitted manifest.
pub const MANIFEST_FILENAME: &str = "manifest.json";

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("Manifest template {path} is invalid: {reason}")]
    ManifestInvalid { path: PathBuf, reason: String },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum PackageError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Package metadata {path} is not valid JSON: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// The two package fields that seed the manifest.
///
/// Either may be absent; an absent field is left out of the manifest rather
/// than written as `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PackageMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl PackageMetadata {
    pub fn new(description: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            description: Some(description.into()),
            version: Some(version.into()),
        }
    }

    /// Read `description` and `version` from a `package.json`.
    ///
    /// A missing file yields empty metadata; other fields are ignored.
    pub fn load(path: &Path) -> Result<Self, PackageError> {
        if !path.exists() {
            tracing::warn!(path = %path.display(), "package metadata not found, manifest gets no description/version defaults");
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|source| PackageError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| PackageError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    fn as_object(&self) -> Map<String, Value> {
        let mut map = Map::new();
        if let Some(description) = &self.description {
            map.insert("description".into(), Value::String(description.clone()));
        }
        if let Some(version) = &self.version {
            map.insert("version".into(), Value::String(version.clone()));
        }
        map
    }
}

/// Merge `template` over `metadata`. Template fields always win.
pub fn synthesize(template: &Map<String, Value>, metadata: &PackageMetadata) -> Map<String, Value> {
    let mut merged = metadata.as_object();
    for (key, value) in template {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

/// Parse template bytes into a JSON object.
fn parse_template(content: &[u8], path: &Path) -> Result<Map<String, Value>, ManifestError> {
    let invalid = |reason: String| ManifestError::ManifestInvalid {
        path: path.to_path_buf(),
        reason,
    };
    match serde_json::from_slice::<Value>(content) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(invalid(format!(
            "expected a JSON object, found {}",
            json_kind(&other)
        ))),
        Err(e) => Err(invalid(e.to_string())),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn read_template(path: &Path) -> Result<Vec<u8>, ManifestError> {
    fs::read(path).map_err(|e| ManifestError::ManifestInvalid {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Read and parse the template at `path`.
pub fn load_template(path: &Path) -> Result<Map<String, Value>, ManifestError> {
    parse_template(&read_template(path)?, path)
}

/// Parse `content` as the template at `path` and synthesize compact JSON bytes.
fn synthesize_template(
    content: &[u8],
    path: &Path,
    metadata: &PackageMetadata,
) -> Result<Vec<u8>, ManifestError> {
    let template = parse_template(content, path)?;
    Ok(serde_json::to_vec(&synthesize(&template, metadata))?)
}

/// Synthesize the manifest from raw template bytes into compact JSON bytes.
pub fn synthesize_bytes(content: &[u8], metadata: &PackageMetadata) -> Result<Vec<u8>, ManifestError> {
    synthesize_template(content, Path::new(MANIFEST_FILENAME), metadata)
}

/// The copy-and-transform step the engine runs for the manifest.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ManifestTransform {
    /// Template location.
    pub from: PathBuf,
    /// Emitted filename, relative to the output directory.
    pub to: String,
    pub metadata: PackageMetadata,
}

impl ManifestTransform {
    pub fn new(source_root: &Path, metadata: PackageMetadata) -> Self {
        Self {
            from: source_root.join(MANIFEST_FILENAME),
            to: MANIFEST_FILENAME.to_string(),
            metadata,
        }
    }

    /// `(content, path) → bytes` transform applied to the template file.
    pub fn apply(&self, content: &[u8], path: &Path) -> Result<Vec<u8>, ManifestError> {
        synthesize_template(content, path, &self.metadata)
    }

    /// Load the template from disk and produce the manifest bytes.
    pub fn run(&self) -> Result<Vec<u8>, ManifestError> {
        self.apply(&read_template(&self.from)?, &self.from)
    }

    /// Check that the template can be loaded, without producing output.
    pub fn validate(&self) -> Result<(), ManifestError> {
        load_template(&self.from).map(|_| ())
    }

    /// Write the synthesized manifest into `output_dir`.
    pub fn write(&self, output_dir: &Path) -> Result<PathBuf, ManifestError> {
        let bytes = self.run()?;
        fs::create_dir_all(output_dir)?;
        let path = output_dir.join(&self.to);
        fs::write(&path, bytes)?;
        tracing::debug!(path = %path.display(), "wrote manifest");
        Ok(path)
    }
}

//! Entry point registry.
//!
//! The extension has three independently bundled surfaces. Each entry name is
//! the join key between the bundle (`<name>.bundle.js`), its HTML shell
//! (`<name>.html`) and the source file `<source root>/js/<name>.js`.
//!
//! The registry is a static declaration; there is no discovery. Adding a
//! surface means adding a name to [`ENTRY_NAMES`].

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::path::{Path, PathBuf};

/// Registered entry names, in declaration order.
pub const ENTRY_NAMES: [&str; 3] = ["popup", "options", "background"];

/// Directory under the source root holding entry scripts.
pub const SCRIPT_DIR: &str = "js";

#[derive(Debug, Clone, PartialEq)]
pub struct EntryPoint {
    pub name: String,
    pub source: PathBuf,
}

/// Source file for an entry: `<source root>/js/<name>.js`.
pub fn entry_source(source_root: &Path, name: &str) -> PathBuf {
    source_root.join(SCRIPT_DIR).join(format!("{name}.js"))
}

/// Ordered, name-unique set of entry points.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryRegistry {
    entries: Vec<EntryPoint>,
}

impl EntryRegistry {
    pub fn new(source_root: &Path) -> Self {
        let entries = ENTRY_NAMES
            .iter()
            .map(|name| EntryPoint {
                name: name.to_string(),
                source: entry_source(source_root, name),
            })
            .collect();
        Self { entries }
    }

    pub fn iter(&self) -> impl Iterator<Item = &EntryPoint> {
        self.entries.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    pub fn get(&self, name: &str) -> Option<&EntryPoint> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Serializes as an ordered `name → source path` map.
impl Serialize for EntryRegistry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            map.serialize_entry(&entry.name, &entry.source)?;
        }
        map.end()
    }
}

//! Optional per-profile secrets module.
//!
//! Consumers import the symbolic module name (`secrets` by default). When
//! `secrets.<profile>.<ext>` exists at the project root, the alias map
//! redirects that import to the file. When it does not exist nothing is
//! registered; a missing secrets file is a normal state, not an error.

use crate::config::SecretsConfig;
use crate::env::Profile;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

/// Module alias map handed to the engine's module resolution phase.
pub type AliasMap = BTreeMap<String, PathBuf>;

/// A symbolic module name redirected to a concrete file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alias {
    pub name: String,
    pub path: PathBuf,
}

/// Candidate secrets file for a profile: `<root>/secrets.<profile>.<ext>`.
pub fn secrets_path(root: &Path, profile: &str, extension: &str) -> PathBuf {
    root.join(format!("secrets.{profile}.{extension}"))
}

/// Whether `name` can be spliced into a file name at the project root.
///
/// Separators, `.` and `..` would move the lookup out of the root.
fn is_plain_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    !name.contains(['/', '\\'])
        && matches!(components.next(), Some(Component::Normal(_)))
        && components.next().is_none()
        && !name.contains("..")
}

/// Look for the profile's secrets file and build the alias if it exists.
///
/// Profile names that are not a plain file name component are never looked up.
pub fn resolve_secrets_alias(
    root: &Path,
    profile: &Profile,
    config: &SecretsConfig,
) -> Option<Alias> {
    if !is_plain_name(profile.name()) {
        tracing::warn!(profile = profile.name(), "profile name is not a plain file name, secrets alias skipped");
        return None;
    }
    let path = secrets_path(root, profile.name(), &config.extension);
    if path.is_file() {
        tracing::debug!(module = %config.module, path = %path.display(), "secrets alias registered");
        Some(Alias {
            name: config.module.clone(),
            path,
        })
    } else {
        tracing::debug!(path = %path.display(), "no secrets file for profile, alias skipped");
        None
    }
}

/// Collect the aliases for a build into the map the engine consumes.
pub fn alias_map(aliases: impl IntoIterator<Item = Alias>) -> AliasMap {
    aliases.into_iter().map(|a| (a.name, a.path)).collect()
}

//! Shared test utilities for the webext-pack test suite.
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_project("development");
//! let build = compose_project(tmp.path()).unwrap();
//! let reports = check_sources(&build, &tmp.path().join("src")).unwrap();
//! let popup = find_report(&reports, "js/popup.js");
//! ```

use std::path::Path;
use tempfile::TempDir;

use crate::compose::AssetReport;

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/project/` to a temp directory and select a profile.
///
/// The fixture's `.env.toml` is rewritten so `NODE_ENV` names `profile`;
/// every other key is kept.
pub fn setup_project(profile: &str) -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/project");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    write_env(tmp.path(), profile);
    tmp
}

/// Overwrite `NODE_ENV` in the project's `.env.toml`.
pub fn write_env(root: &Path, profile: &str) {
    let path = root.join(".env.toml");
    let mut table: toml::Table = std::fs::read_to_string(&path)
        .ok()
        .and_then(|s| toml::from_str(&s).ok())
        .unwrap_or_default();
    table.insert("NODE_ENV".into(), toml::Value::String(profile.into()));
    std::fs::write(&path, toml::to_string(&table).unwrap()).unwrap();
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

// =========================================================================
// Lookups, panicking with a clear message on miss
// =========================================================================

/// Find a check report by path relative to the source root. Panics if not found.
pub fn find_report<'a>(reports: &'a [AssetReport], relative: &str) -> &'a AssetReport {
    reports
        .iter()
        .find(|r| r.path == Path::new(relative))
        .unwrap_or_else(|| {
            let paths: Vec<String> = reports.iter().map(|r| r.path.display().to_string()).collect();
            panic!("report for '{relative}' not found. Available: {paths:?}")
        })
}

//! Build configuration composition.
//!
//! Runs every stage in dependency order and assembles the single
//! [`BuildConfiguration`] the bundling engine consumes:
//!
//! ```text
//! .env.toml ──► Profile ──┬──► secrets alias
//!                         ├──► build mode (dev server, source maps)
//!                         └──► defines
//! webext.toml ──► entries ──► html jobs
//!             └─► asset rules
//! package.json + src/manifest.json ──► manifest transform
//! ```
//!
//! Composition is all-or-nothing. A missing environment source or a broken
//! manifest template aborts before anything is returned, so no renderer or
//! engine ever sees a partial configuration.

use crate::config::{self, ProjectConfig};
use crate::entries::EntryRegistry;
use crate::env::{self, Profile};
use crate::html::{self, HtmlJob, RenderError};
use crate::manifest::{self, ManifestTransform, PackageMetadata};
use crate::mode::BuildMode;
use crate::rules::{self, AssetRule};
use crate::secrets::{self, AliasMap};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ComposeError {
    #[error(transparent)]
    Env(#[from] env::EnvError),
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error(transparent)]
    Manifest(#[from] manifest::ManifestError),
    #[error(transparent)]
    Package(#[from] manifest::PackageError),
    #[error("Render error: {0}")]
    Render(#[from] RenderError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Refusing to clean {}: it contains the source root", .0.display())]
    UnsafeClean(PathBuf),
}

/// Where and how bundles are emitted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputSpec {
    pub path: PathBuf,
    /// Naming pattern, e.g. `[name].bundle.js`.
    pub filename: String,
}

/// The composed configuration handed to the bundling engine.
///
/// Built once per invocation and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildConfiguration {
    pub profile: String,
    pub entry: EntryRegistry,
    pub output: OutputSpec,
    pub rules: Vec<AssetRule>,
    pub alias: AliasMap,
    pub define: BTreeMap<String, String>,
    /// Directories removed before the build.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub clean: Vec<PathBuf>,
    pub html: Vec<HtmlJob>,
    pub manifest: ManifestTransform,
    #[serde(flatten)]
    pub mode: BuildMode,
}

/// Everything composition reads, resolved against the project root.
#[derive(Debug, Clone)]
pub struct ProjectLayout {
    pub root: PathBuf,
    pub source_root: PathBuf,
    pub output_dir: PathBuf,
    pub env_file: PathBuf,
    pub package_file: PathBuf,
}

impl ProjectLayout {
    pub fn new(root: &Path, config: &ProjectConfig) -> Self {
        Self {
            root: root.to_path_buf(),
            source_root: root.join(&config.source_dir),
            output_dir: root.join(&config.output_dir),
            env_file: root.join(&config.env_file),
            package_file: root.join(&config.package_file),
        }
    }
}

/// Load the project config and compose from the files on disk.
pub fn compose_project(root: &Path) -> Result<BuildConfiguration, ComposeError> {
    let config = config::load_config(root)?;
    let layout = ProjectLayout::new(root, &config);
    let profile = Profile::load(&layout.env_file)?;
    let metadata = PackageMetadata::load(&layout.package_file)?;
    compose(&layout, &config, &profile, metadata)
}

/// Compose a configuration from an already resolved profile and metadata.
pub fn compose(
    layout: &ProjectLayout,
    config: &ProjectConfig,
    profile: &Profile,
    metadata: PackageMetadata,
) -> Result<BuildConfiguration, ComposeError> {
    let alias = secrets::alias_map(secrets::resolve_secrets_alias(
        &layout.root,
        profile,
        &config.secrets,
    ));
    let mode = BuildMode::for_profile(profile, &layout.output_dir, &config.dev_server);

    let entry = EntryRegistry::new(&layout.source_root);
    let html = html::html_jobs(&entry, &layout.source_root);
    let rules = rules::asset_rules(&config.assets);

    let manifest = ManifestTransform::new(&layout.source_root, metadata);
    manifest.validate()?;

    let clean = if config.clean {
        vec![layout.output_dir.clone()]
    } else {
        Vec::new()
    };

    tracing::info!(
        profile = profile.name(),
        mode = mode.label(),
        entries = entry.len(),
        aliases = alias.len(),
        "composed build configuration"
    );

    Ok(BuildConfiguration {
        profile: profile.name().to_string(),
        entry,
        output: OutputSpec {
            path: layout.output_dir.clone(),
            filename: config.bundle_pattern.clone(),
        },
        rules,
        alias,
        define: profile.defines(),
        clean,
        html,
        manifest,
        mode,
    })
}

/// Files written by [`render`].
#[derive(Debug, Clone, Default)]
pub struct RenderReport {
    pub cleaned: Vec<PathBuf>,
    pub manifest: PathBuf,
    pub shells: Vec<PathBuf>,
}

/// Derive the manifest and HTML shell artifacts into the output directory.
///
/// With `clean` set, the output directory is removed first, whatever the
/// configured `clean` list says. A directory that contains the manifest
/// template, and so the source root, is never removed.
pub fn render(build: &BuildConfiguration, clean: bool) -> Result<RenderReport, ComposeError> {
    let mut report = RenderReport::default();
    let output_dir = &build.output.path;
    if clean && output_dir.is_dir() {
        let target = fs::canonicalize(output_dir)?;
        let template = fs::canonicalize(&build.manifest.from)
            .unwrap_or_else(|_| build.manifest.from.clone());
        if template.starts_with(&target) {
            return Err(ComposeError::UnsafeClean(output_dir.clone()));
        }
        fs::remove_dir_all(output_dir)?;
        tracing::info!(dir = %output_dir.display(), "cleaned output directory");
        report.cleaned.push(output_dir.clone());
    }
    report.manifest = build.manifest.write(output_dir)?;
    report.shells = html::write_shells(&build.html, &build.output.filename, output_dir)?;
    Ok(report)
}

/// How the engine will treat one file under the source root.
#[derive(Debug, Clone, PartialEq)]
pub enum AssetRole {
    Entry(String),
    Template(String),
    Manifest,
    Rule { loader: String, output: Option<String> },
    Unhandled,
}

/// One classified source file, path relative to the source root.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetReport {
    pub path: PathBuf,
    pub role: AssetRole,
}

/// Walk the source root and classify every file against the configuration.
///
/// Entry scripts, shell templates and the manifest template are reported by
/// role; everything else by the first asset rule that applies. Files under
/// an excluded directory are skipped entirely.
pub fn check_sources(
    build: &BuildConfiguration,
    source_root: &Path,
) -> Result<Vec<AssetReport>, ComposeError> {
    let excluded: Vec<&str> = build.rules.iter().map(|r| r.exclude.as_str()).collect();
    let walker = WalkDir::new(source_root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            e.depth() == 0
                || !e
                    .file_name()
                    .to_str()
                    .is_some_and(|name| excluded.contains(&name))
        });

    let mut reports = Vec::new();
    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let relative = path.strip_prefix(source_root).unwrap_or(path).to_path_buf();
        reports.push(AssetReport {
            role: classify_source(build, path),
            path: relative,
        });
    }
    Ok(reports)
}

fn classify_source(build: &BuildConfiguration, path: &Path) -> AssetRole {
    if let Some(entry) = build.entry.iter().find(|e| e.source == path) {
        return AssetRole::Entry(entry.name.clone());
    }
    if let Some(job) = build.html.iter().find(|j| j.template == path) {
        return AssetRole::Template(job.filename.clone());
    }
    if build.manifest.from == path {
        return AssetRole::Manifest;
    }
    match rules::classify(&build.rules, path) {
        Some(rule) => AssetRole::Rule {
            loader: rule.pipeline.loader(),
            output: rule.output_name(path),
        },
        None => AssetRole::Unhandled,
    }
}

/// Entry sources and HTML templates the configuration points at but which
/// do not exist on disk.
pub fn missing_inputs(build: &BuildConfiguration) -> Vec<PathBuf> {
    build
        .entry
        .iter()
        .map(|e| e.source.clone())
        .chain(build.html.iter().map(|j| j.template.clone()))
        .filter(|p| !p.is_file())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use serde_json::Value;

    #[test]
    fn compose_production_fixture() {
        let tmp = setup_project("production");
        let build = compose_project(tmp.path()).unwrap();

        assert_eq!(build.profile, "production");
        assert_eq!(build.mode, BuildMode::Production);
        assert!(build.alias.is_empty());
        assert_eq!(build.output.filename, "[name].bundle.js");
        assert_eq!(build.output.path, tmp.path().join("build"));
        assert_eq!(build.clean, vec![tmp.path().join("build")]);
        assert_eq!(build.rules.len(), 3);
        assert_eq!(build.define["process.env.NODE_ENV"], "\"production\"");
    }

    #[test]
    fn compose_development_fixture_wires_secrets_and_server() {
        let tmp = setup_project("development");
        let build = compose_project(tmp.path()).unwrap();

        assert_eq!(
            build.alias.get("secrets"),
            Some(&tmp.path().join("secrets.development.js"))
        );
        let server = build.mode.dev_server().expect("dev server");
        assert_eq!(server.port, 9000);
        assert!(server.compress);
        assert_eq!(server.content_base, tmp.path().join("build"));
    }

    #[test]
    fn entries_and_jobs_share_names() {
        let tmp = setup_project("production");
        let build = compose_project(tmp.path()).unwrap();
        let entry_names: Vec<&str> = build.entry.names().collect();
        let chunk_names: Vec<&str> = build.html.iter().map(|j| j.chunks[0].as_str()).collect();
        assert_eq!(entry_names, chunk_names);
        assert_eq!(entry_names, vec!["popup", "options", "background"]);
    }

    #[test]
    fn missing_env_source_is_fatal() {
        let tmp = setup_project("production");
        fs::remove_file(tmp.path().join(".env.toml")).unwrap();
        let err = compose_project(tmp.path()).unwrap_err();
        assert!(matches!(
            err,
            ComposeError::Env(env::EnvError::ConfigurationMissing(_))
        ));
    }

    #[test]
    fn broken_manifest_template_is_fatal() {
        let tmp = setup_project("production");
        fs::write(tmp.path().join("src/manifest.json"), "{ broken").unwrap();
        let err = compose_project(tmp.path()).unwrap_err();
        assert!(matches!(
            err,
            ComposeError::Manifest(manifest::ManifestError::ManifestInvalid { .. })
        ));
    }

    #[test]
    fn missing_manifest_template_is_fatal() {
        let tmp = setup_project("development");
        fs::remove_file(tmp.path().join("src/manifest.json")).unwrap();
        assert!(compose_project(tmp.path()).is_err());
    }

    #[test]
    fn project_config_overrides_layout() {
        let tmp = setup_project("production");
        fs::write(
            tmp.path().join("webext.toml"),
            "output_dir = \"dist\"\nclean = false\n",
        )
        .unwrap();
        let build = compose_project(tmp.path()).unwrap();
        assert_eq!(build.output.path, tmp.path().join("dist"));
        assert!(build.clean.is_empty());
    }

    #[test]
    fn production_json_has_no_dev_server() {
        let tmp = setup_project("production");
        let build = compose_project(tmp.path()).unwrap();
        let json = serde_json::to_value(&build).unwrap();
        assert_eq!(json["mode"], "production");
        assert!(json.get("dev_server").is_none());
        assert!(json.get("source_map").is_none());
    }

    #[test]
    fn json_keeps_declaration_order() {
        let tmp = setup_project("development");
        let build = compose_project(tmp.path()).unwrap();
        let json = serde_json::to_value(&build).unwrap();
        let entry_keys: Vec<&String> = json["entry"].as_object().unwrap().keys().collect();
        assert_eq!(entry_keys, vec!["popup", "options", "background"]);
        assert_eq!(json["rules"][0]["loader"], "style-loader!css-loader");
        assert_eq!(json["html"][2]["filename"], "background.html");
        assert_eq!(json["dev_server"]["port"], 9000);
    }

    #[test]
    fn render_writes_manifest_and_shells() {
        let tmp = setup_project("production");
        let build = compose_project(tmp.path()).unwrap();
        let report = render(&build, true).unwrap();

        assert_eq!(report.shells.len(), 3);
        let manifest: Value =
            serde_json::from_slice(&fs::read(&report.manifest).unwrap()).unwrap();
        assert_eq!(manifest["version"], "1.2.0");
        assert_eq!(manifest["description"], "An extension");
        assert_eq!(manifest["manifest_version"], 2);

        let popup = fs::read_to_string(tmp.path().join("build/popup.html")).unwrap();
        assert!(popup.contains(r#"src="popup.bundle.js""#));
    }

    #[test]
    fn render_cleans_stale_output() {
        let tmp = setup_project("production");
        let stale = tmp.path().join("build/stale.js");
        fs::create_dir_all(stale.parent().unwrap()).unwrap();
        fs::write(&stale, "old").unwrap();

        let build = compose_project(tmp.path()).unwrap();
        let report = render(&build, true).unwrap();
        assert_eq!(report.cleaned, vec![tmp.path().join("build")]);
        assert!(!stale.exists());
    }

    #[test]
    fn render_without_clean_keeps_output() {
        let tmp = setup_project("production");
        let stale = tmp.path().join("build/stale.js");
        fs::create_dir_all(stale.parent().unwrap()).unwrap();
        fs::write(&stale, "old").unwrap();

        let build = compose_project(tmp.path()).unwrap();
        let report = render(&build, false).unwrap();
        assert!(report.cleaned.is_empty());
        assert!(stale.exists());
    }

    #[test]
    fn render_clean_flag_overrides_config() {
        let tmp = setup_project("production");
        fs::write(tmp.path().join("webext.toml"), "clean = false\n").unwrap();
        let stale = tmp.path().join("build/stale.js");
        fs::create_dir_all(stale.parent().unwrap()).unwrap();
        fs::write(&stale, "old").unwrap();

        let build = compose_project(tmp.path()).unwrap();
        assert!(build.clean.is_empty());
        let report = render(&build, true).unwrap();
        assert_eq!(report.cleaned, vec![tmp.path().join("build")]);
        assert!(!stale.exists());
        assert!(tmp.path().join("build/manifest.json").is_file());
    }

    #[test]
    fn output_dir_over_project_is_rejected() {
        for dir in [".", "src", ".."] {
            let tmp = setup_project("production");
            fs::write(
                tmp.path().join("webext.toml"),
                format!("output_dir = {dir:?}\n"),
            )
            .unwrap();
            let err = compose_project(tmp.path()).unwrap_err();
            assert!(matches!(err, ComposeError::Config(config::ConfigError::Validation(_))));
            assert!(tmp.path().join(".env.toml").is_file());
            assert!(tmp.path().join("src/manifest.json").is_file());
        }
    }

    #[test]
    fn render_refuses_to_clean_source_root() {
        for dir in [".", "src"] {
            let tmp = setup_project("production");
            let config = ProjectConfig {
                output_dir: dir.into(),
                ..ProjectConfig::default()
            };
            let layout = ProjectLayout::new(tmp.path(), &config);
            let profile = Profile::load(&layout.env_file).unwrap();
            let build = compose(&layout, &config, &profile, PackageMetadata::default()).unwrap();

            let err = render(&build, true).unwrap_err();
            assert!(matches!(err, ComposeError::UnsafeClean(_)), "output_dir {dir:?}");
            assert!(tmp.path().join(".env.toml").is_file());
            assert!(tmp.path().join("src/js/popup.js").is_file());
        }
    }

    #[test]
    fn check_classifies_fixture_sources() {
        let tmp = setup_project("production");
        fs::create_dir_all(tmp.path().join("src/node_modules/lib")).unwrap();
        fs::write(tmp.path().join("src/node_modules/lib/x.css"), "").unwrap();

        let build = compose_project(tmp.path()).unwrap();
        let reports = check_sources(&build, &tmp.path().join("src")).unwrap();

        assert_eq!(
            find_report(&reports, "js/popup.js").role,
            AssetRole::Entry("popup".into())
        );
        assert_eq!(
            find_report(&reports, "options.html").role,
            AssetRole::Template("options.html".into())
        );
        assert_eq!(find_report(&reports, "manifest.json").role, AssetRole::Manifest);
        assert_eq!(
            find_report(&reports, "css/popup.css").role,
            AssetRole::Rule {
                loader: "style-loader!css-loader".into(),
                output: None
            }
        );
        assert_eq!(
            find_report(&reports, "img/icon-48.png").role,
            AssetRole::Rule {
                loader: "file-loader?name=[name].[ext]".into(),
                output: Some("icon-48.png".into())
            }
        );
        assert_eq!(find_report(&reports, "js/util.js").role, AssetRole::Unhandled);
        assert!(reports.iter().all(|r| !r.path.starts_with("node_modules")));
    }

    #[test]
    fn missing_inputs_reports_absent_sources() {
        let tmp = setup_project("production");
        fs::remove_file(tmp.path().join("src/js/options.js")).unwrap();
        let build = compose_project(tmp.path()).unwrap();
        assert_eq!(missing_inputs(&build), vec![tmp.path().join("src/js/options.js")]);
    }
}

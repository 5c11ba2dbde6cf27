//! CLI output formatting.
//!
//! Output leads with what the build *is* (profile, entries, shells) and shows
//! file paths as indented context lines, so a composed configuration reads as
//! an inventory of the extension.
//!
//! # Output Format
//!
//! ## Compose
//!
//! ```text
//! Profile development
//!     Mode: development (source map: cheap-module-eval-source-map)
//!     Dev server: :9000 serving build/ (compress, debug)
//!
//! Entries
//! 001 popup → popup.bundle.js
//!     Source: src/js/popup.js
//!     Shell: popup.html
//!
//! Rules
//! 001 \.css$ → style-loader!css-loader
//!
//! Aliases
//!     secrets → secrets.development.js
//!
//! Manifest
//!     src/manifest.json → manifest.json
//! ```
//!
//! ## Check
//!
//! ```text
//! css/popup.css → style-loader!css-loader
//! img/icon-48.png → file-loader?name=[name].[ext] (icon-48.png)
//! js/popup.js → entry popup
//!
//! Unhandled
//!     js/util.js
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::compose::{AssetReport, AssetRole, BuildConfiguration, RenderReport};
use crate::naming;
use std::path::Path;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Show `path` relative to `root` when it lives under it.
fn display_path(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}

// ============================================================================
// Compose
// ============================================================================

/// Format a summary of the composed configuration.
pub fn format_compose_output(build: &BuildConfiguration, root: &Path) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push(format!("Profile {}", build.profile));
    match build.mode.source_map() {
        Some(map) => lines.push(format!(
            "{}Mode: {} (source map: {})",
            indent(1),
            build.mode.label(),
            map
        )),
        None => lines.push(format!("{}Mode: {}", indent(1), build.mode.label())),
    }
    if let Some(server) = build.mode.dev_server() {
        let mut flags = Vec::new();
        if server.compress {
            flags.push("compress");
        }
        if server.debug {
            flags.push("debug");
        }
        let flags = if flags.is_empty() {
            String::new()
        } else {
            format!(" ({})", flags.join(", "))
        };
        lines.push(format!(
            "{}Dev server: :{} serving {}/{}",
            indent(1),
            server.port,
            display_path(&server.content_base, root),
            flags
        ));
    }

    lines.push(String::new());
    lines.push("Entries".to_string());
    for (i, entry) in build.entry.iter().enumerate() {
        lines.push(format!(
            "{} {} \u{2192} {}",
            format_index(i + 1),
            entry.name,
            naming::bundle_filename(&build.output.filename, &entry.name)
        ));
        lines.push(format!(
            "{}Source: {}",
            indent(1),
            display_path(&entry.source, root)
        ));
        for job in build.html.iter().filter(|j| j.chunks.contains(&entry.name)) {
            lines.push(format!("{}Shell: {}", indent(1), job.filename));
        }
    }

    lines.push(String::new());
    lines.push("Rules".to_string());
    for (i, rule) in build.rules.iter().enumerate() {
        lines.push(format!(
            "{} {} \u{2192} {}",
            format_index(i + 1),
            rule.test_pattern(),
            rule.pipeline.loader()
        ));
    }

    if !build.alias.is_empty() {
        lines.push(String::new());
        lines.push("Aliases".to_string());
        for (name, path) in &build.alias {
            lines.push(format!(
                "{}{} \u{2192} {}",
                indent(1),
                name,
                display_path(path, root)
            ));
        }
    }

    lines.push(String::new());
    lines.push("Manifest".to_string());
    lines.push(format!(
        "{}{} \u{2192} {}",
        indent(1),
        display_path(&build.manifest.from, root),
        build.manifest.to
    ));

    lines
}

/// Print the compose summary to stdout.
pub fn print_compose_output(build: &BuildConfiguration, root: &Path) {
    for line in format_compose_output(build, root) {
        println!("{}", line);
    }
}

// ============================================================================
// Render
// ============================================================================

/// Format the list of written artifacts.
pub fn format_render_output(report: &RenderReport, root: &Path) -> Vec<String> {
    let mut lines = Vec::new();
    for dir in &report.cleaned {
        lines.push(format!("Cleaned {}/", display_path(dir, root)));
    }
    lines.push(format!("Manifest \u{2192} {}", display_path(&report.manifest, root)));
    for (i, shell) in report.shells.iter().enumerate() {
        lines.push(format!(
            "{} Shell \u{2192} {}",
            format_index(i + 1),
            display_path(shell, root)
        ));
    }
    lines.push(format!(
        "Rendered 1 manifest, {} HTML shells",
        report.shells.len()
    ));
    lines
}

/// Print render results to stdout.
pub fn print_render_output(report: &RenderReport, root: &Path) {
    for line in format_render_output(report, root) {
        println!("{}", line);
    }
}

// ============================================================================
// Check
// ============================================================================

/// Format source classification, with unhandled files and missing inputs last.
pub fn format_check_output(
    reports: &[AssetReport],
    missing: &[std::path::PathBuf],
    root: &Path,
) -> Vec<String> {
    let mut lines = Vec::new();
    let mut unhandled = Vec::new();

    for report in reports {
        let path = report.path.display();
        match &report.role {
            AssetRole::Entry(name) => lines.push(format!("{} \u{2192} entry {}", path, name)),
            AssetRole::Template(filename) => {
                lines.push(format!("{} \u{2192} shell {}", path, filename))
            }
            AssetRole::Manifest => lines.push(format!("{} \u{2192} manifest", path)),
            AssetRole::Rule {
                loader,
                output: Some(out),
            } => lines.push(format!("{} \u{2192} {} ({})", path, loader, out)),
            AssetRole::Rule {
                loader,
                output: None,
            } => lines.push(format!("{} \u{2192} {}", path, loader)),
            AssetRole::Unhandled => unhandled.push(path.to_string()),
        }
    }

    if !unhandled.is_empty() {
        lines.push(String::new());
        lines.push("Unhandled".to_string());
        for path in unhandled {
            lines.push(format!("{}{}", indent(1), path));
        }
    }

    if !missing.is_empty() {
        lines.push(String::new());
        lines.push("Missing".to_string());
        for path in missing {
            lines.push(format!("{}{}", indent(1), display_path(path, root)));
        }
    }

    lines
}

/// Print source classification to stdout.
pub fn print_check_output(reports: &[AssetReport], missing: &[std::path::PathBuf], root: &Path) {
    for line in format_check_output(reports, missing, root) {
        println!("{}", line);
    }
}

//! HTML shell generation.
//!
//! Every entry point gets one HTML document: the template
//! `<source root>/<name>.html`, emitted as `<name>.html`, with the entry's
//! compiled bundle attached. Jobs come out in registry order so logs and
//! snapshots are reproducible.
//!
//! ## Rendering
//!
//! [`render_shell`] derives the final document from a template the same way
//! the engine's HTML plugin does: one `<script>` tag per attached chunk,
//! inserted right before `</body>`.
//!
//! ```text
//! src/popup.html                     build/popup.html
//! <body>                             <body>
//!   <div id="app"></div>      →        <div id="app"></div>
//! </body>                            <script src="popup.bundle.js"></script></body>
//! ```
//!
//! Script tags are rendered with [maud](https://maud.lambda.xyz/), so chunk
//! file names are escaped like any other interpolation.

use crate::entries::EntryRegistry;
use crate::naming;
use maud::{Markup, html};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("IO error reading template {path}: {source}")]
    Template {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// One HTML document to build.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HtmlJob {
    pub template: PathBuf,
    pub filename: String,
    /// Entry names whose bundles get attached, in attachment order.
    pub chunks: Vec<String>,
}

/// The shell job for a single entry point.
pub fn shell_job(source_root: &Path, name: &str) -> HtmlJob {
    HtmlJob {
        template: source_root.join(format!("{name}.html")),
        filename: format!("{name}.html"),
        chunks: vec![name.to_string()],
    }
}

/// One shell job per registered entry, in registry order.
pub fn html_jobs(registry: &EntryRegistry, source_root: &Path) -> Vec<HtmlJob> {
    registry.names().map(|name| shell_job(source_root, name)).collect()
}

/// Script tags for a job's chunks.
fn chunk_scripts(job: &HtmlJob, bundle_pattern: &str) -> Markup {
    html! {
        @for chunk in &job.chunks {
            script type="text/javascript" src=(naming::bundle_filename(bundle_pattern, chunk)) {}
        }
    }
}

/// Inject the job's bundles into template markup.
///
/// Tags go before the last `</body>` (matched case-insensitively). Templates
/// without a body close tag get the tags appended.
pub fn render_shell(job: &HtmlJob, template: &str, bundle_pattern: &str) -> String {
    let scripts = chunk_scripts(job, bundle_pattern).into_string();
    match template.to_ascii_lowercase().rfind("</body>") {
        Some(pos) => {
            let mut out = String::with_capacity(template.len() + scripts.len());
            out.push_str(&template[..pos]);
            out.push_str(&scripts);
            out.push_str(&template[pos..]);
            out
        }
        None => format!("{template}{scripts}"),
    }
}

/// Read the job's template and render it.
pub fn render_job(job: &HtmlJob, bundle_pattern: &str) -> Result<String, RenderError> {
    let template = fs::read_to_string(&job.template).map_err(|source| RenderError::Template {
        path: job.template.clone(),
        source,
    })?;
    Ok(render_shell(job, &template, bundle_pattern))
}

/// Render every job into `output_dir`. Returns the written paths in job order.
pub fn write_shells(
    jobs: &[HtmlJob],
    bundle_pattern: &str,
    output_dir: &Path,
) -> Result<Vec<PathBuf>, RenderError> {
    fs::create_dir_all(output_dir)?;
    let mut written = Vec::with_capacity(jobs.len());
    for job in jobs {
        let document = render_job(job, bundle_pattern)?;
        let path = output_dir.join(&job.filename);
        fs::write(&path, document)?;
        tracing::debug!(path = %path.display(), chunks = ?job.chunks, "wrote html shell");
        written.push(path);
    }
    Ok(written)
}

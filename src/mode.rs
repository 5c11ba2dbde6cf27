//! Build mode switch.
//!
//! Only the `development` profile gets debugging support: a fast-rebuild
//! source map strategy and a local preview server serving the output
//! directory. Every other profile name, `staging` included, builds like
//! production and carries no dev-server data at all.

use crate::config::DevServerConfig;
use crate::env::Profile;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Local preview server settings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DevServer {
    /// Directory the server serves, i.e. the build output.
    pub content_base: PathBuf,
    pub port: u16,
    pub debug: bool,
    pub compress: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum BuildMode {
    Development {
        source_map: String,
        dev_server: DevServer,
    },
    Production,
}

impl BuildMode {
    pub fn for_profile(profile: &Profile, output_dir: &Path, config: &DevServerConfig) -> Self {
        if !profile.is_development() {
            return BuildMode::Production;
        }
        BuildMode::Development {
            source_map: config.source_map.clone(),
            dev_server: DevServer {
                content_base: output_dir.to_path_buf(),
                port: config.port,
                debug: config.debug,
                compress: config.compress,
            },
        }
    }

    pub fn is_development(&self) -> bool {
        matches!(self, BuildMode::Development { .. })
    }

    pub fn dev_server(&self) -> Option<&DevServer> {
        match self {
            BuildMode::Development { dev_server, .. } => Some(dev_server),
            BuildMode::Production => None,
        }
    }

    pub fn source_map(&self) -> Option<&str> {
        match self {
            BuildMode::Development { source_map, .. } => Some(source_map),
            BuildMode::Production => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BuildMode::Development { .. } => "development",
            BuildMode::Production => "production",
        }
    }
}

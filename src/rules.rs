//! Asset rule set.
//!
//! Three rules, declared once and handed to the engine unchanged, in this order:
//!
//! | Files | Pipeline | Loader chain |
//! |-------|----------|--------------|
//! | `*.css` | style injection | `style-loader!css-loader` |
//! | images and fonts | pass-through copy, original name kept | `file-loader?name=[name].[ext]` |
//! | `*.html` | HTML parsing | `html-loader` |
//!
//! Every rule excludes the dependency directory (`node_modules`). The engine
//! decides first-match semantics; [`classify`] mirrors it for diagnostics only.

use crate::config::AssetsConfig;
use crate::naming;
use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::path::{Component, Path};

/// Transformation pipeline a rule routes matching files through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pipeline {
    /// Parse the stylesheet and inject it into the page at runtime.
    StyleInject,
    /// Copy the file to the output, named by `name_pattern`.
    PassThrough { name_pattern: String },
    /// Parse markup, resolving referenced assets.
    Html,
}

impl Pipeline {
    /// Loader chain identifier as the engine spells it.
    pub fn loader(&self) -> String {
        match self {
            Pipeline::StyleInject => "style-loader!css-loader".to_string(),
            Pipeline::PassThrough { name_pattern } => format!("file-loader?name={name_pattern}"),
            Pipeline::Html => "html-loader".to_string(),
        }
    }
}

/// One (match, pipeline, exclusion) declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetRule {
    /// File extensions this rule matches, without the dot.
    pub extensions: Vec<String>,
    pub pipeline: Pipeline,
    /// Directory name excluded at any depth.
    pub exclude: String,
}

impl AssetRule {
    fn new(extensions: &[&str], pipeline: Pipeline, exclude: &str) -> Self {
        Self {
            extensions: extensions.iter().map(|e| e.to_string()).collect(),
            pipeline,
            exclude: exclude.to_string(),
        }
    }

    /// Match pattern as regex source, e.g. `\.css$` or `\.(jpg|png)$`.
    pub fn test_pattern(&self) -> String {
        match self.extensions.as_slice() {
            [single] => format!(r"\.{single}$"),
            many => format!(r"\.({})$", many.join("|")),
        }
    }

    /// Exclusion pattern as regex source.
    pub fn exclude_pattern(&self) -> String {
        self.exclude.clone()
    }

    /// Whether the rule would pick up `path`.
    ///
    /// The extension is compared exactly (case-sensitive, like the engine's
    /// pattern). Any path component equal to the excluded directory rejects it.
    pub fn applies_to(&self, path: &Path) -> bool {
        let excluded = path
            .components()
            .any(|c| matches!(c, Component::Normal(s) if s == self.exclude.as_str()));
        if excluded {
            return false;
        }
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|e| e == ext))
    }

    /// Name the output file will get, when the pipeline emits one.
    pub fn output_name(&self, path: &Path) -> Option<String> {
        match &self.pipeline {
            Pipeline::PassThrough { name_pattern } => {
                let filename = path.file_name()?.to_str()?;
                let (stem, ext) = naming::split_filename(filename);
                Some(naming::expand_pattern(name_pattern, stem, ext))
            }
            _ => None,
        }
    }
}

/// Serializes in the engine's `{ test, loader, exclude }` shape.
impl Serialize for AssetRule {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut rule = serializer.serialize_struct("AssetRule", 3)?;
        rule.serialize_field("test", &self.test_pattern())?;
        rule.serialize_field("loader", &self.pipeline.loader())?;
        rule.serialize_field("exclude", &self.exclude_pattern())?;
        rule.end()
    }
}

/// Build the rule set in declaration order: styles, loose files, markup.
pub fn asset_rules(config: &AssetsConfig) -> Vec<AssetRule> {
    let loose: Vec<&str> = config.loose_extensions.iter().map(String::as_str).collect();
    vec![
        AssetRule::new(&["css"], Pipeline::StyleInject, &config.exclude_dir),
        AssetRule::new(
            &loose,
            Pipeline::PassThrough {
                name_pattern: naming::PRESERVE_NAME_PATTERN.to_string(),
            },
            &config.exclude_dir,
        ),
        AssetRule::new(&["html"], Pipeline::Html, &config.exclude_dir),
    ]
}

/// First rule that applies to `path`, if any.
pub fn classify<'a>(rules: &'a [AssetRule], path: &Path) -> Option<&'a AssetRule> {
    rules.iter().find(|r| r.applies_to(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> Vec<AssetRule> {
        asset_rules(&AssetsConfig::default())
    }

    #[test]
    fn three_rules_in_declaration_order() {
        let rules = rules();
        assert_eq!(rules.len(), 3);
        assert_eq!(rules[0].pipeline, Pipeline::StyleInject);
        assert!(matches!(rules[1].pipeline, Pipeline::PassThrough { .. }));
        assert_eq!(rules[2].pipeline, Pipeline::Html);
    }

    #[test]
    fn loader_chains() {
        let loaders: Vec<String> = rules().iter().map(|r| r.pipeline.loader()).collect();
        assert_eq!(
            loaders,
            vec![
                "style-loader!css-loader",
                "file-loader?name=[name].[ext]",
                "html-loader"
            ]
        );
    }

    #[test]
    fn test_patterns() {
        let rules = rules();
        assert_eq!(rules[0].test_pattern(), r"\.css$");
        assert_eq!(
            rules[1].test_pattern(),
            r"\.(jpg|jpeg|png|gif|eot|otf|svg|ttf|woff|woff2)$"
        );
        assert_eq!(rules[2].test_pattern(), r"\.html$");
    }

    #[test]
    fn all_rules_exclude_node_modules() {
        for rule in rules() {
            assert_eq!(rule.exclude_pattern(), "node_modules");
        }
    }

    #[test]
    fn classify_by_extension() {
        let rules = rules();
        let css = classify(&rules, Path::new("src/css/popup.css")).unwrap();
        assert_eq!(css.pipeline, Pipeline::StyleInject);
        let font = classify(&rules, Path::new("src/fonts/icons.woff2")).unwrap();
        assert!(matches!(font.pipeline, Pipeline::PassThrough { .. }));
        let html = classify(&rules, Path::new("src/popup.html")).unwrap();
        assert_eq!(html.pipeline, Pipeline::Html);
    }

    #[test]
    fn woff_does_not_swallow_woff2() {
        let rules = rules();
        assert!(rules[1].applies_to(Path::new("a.woff")));
        assert!(rules[1].applies_to(Path::new("a.woff2")));
        assert!(!rules[1].applies_to(Path::new("a.woff3")));
    }

    #[test]
    fn node_modules_excluded_at_any_depth() {
        let rules = rules();
        assert!(classify(&rules, Path::new("node_modules/lib/style.css")).is_none());
        assert!(classify(&rules, Path::new("src/vendor/node_modules/x.png")).is_none());
    }

    #[test]
    fn unmatched_files() {
        let rules = rules();
        assert!(classify(&rules, Path::new("src/js/popup.js")).is_none());
        assert!(classify(&rules, Path::new("src/manifest.json")).is_none());
        assert!(classify(&rules, Path::new("README")).is_none());
    }

    #[test]
    fn pass_through_preserves_filename() {
        let rules = rules();
        assert_eq!(
            rules[1].output_name(Path::new("src/img/icon-48.png")),
            Some("icon-48.png".to_string())
        );
        assert_eq!(rules[0].output_name(Path::new("src/a.css")), None);
    }

    #[test]
    fn serializes_engine_shape() {
        let json = serde_json::to_value(&rules()[0]).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "test": r"\.css$",
                "loader": "style-loader!css-loader",
                "exclude": "node_modules"
            })
        );
    }

    #[test]
    fn configured_extensions() {
        let config = AssetsConfig {
            loose_extensions: vec!["webp".into()],
            exclude_dir: "vendor".into(),
        };
        let rules = asset_rules(&config);
        assert_eq!(rules[1].test_pattern(), r"\.webp$");
        assert!(classify(&rules, Path::new("vendor/a.css")).is_none());
    }
}

//! Output naming patterns.
//!
//! The bundling engine names its artifacts with bracketed placeholders:
//! `[name].bundle.js` for entry bundles and `[name].[ext]` for copied assets.
//! This module expands those patterns the same way so HTML shells and CLI
//! output can refer to the files the engine will produce.
//!
//! - `"[name].bundle.js"` with name `popup` → `"popup.bundle.js"`
//! - `"[name].[ext]"` with `icon.png` → `"icon.png"`
//! - `"static/[name].js"` with name `options` → `"static/options.js"`

pub const NAME_PLACEHOLDER: &str = "[name]";
pub const EXT_PLACEHOLDER: &str = "[ext]";

/// Pattern the pass-through asset pipeline uses to keep original file names.
pub const PRESERVE_NAME_PATTERN: &str = "[name].[ext]";

/// Expand `[name]` and `[ext]` in a pattern. Unknown placeholders are kept verbatim.
pub fn expand_pattern(pattern: &str, name: &str, ext: &str) -> String {
    pattern
        .replace(NAME_PLACEHOLDER, name)
        .replace(EXT_PLACEHOLDER, ext)
}

/// Filename of the compiled bundle for an entry point.
pub fn bundle_filename(pattern: &str, entry: &str) -> String {
    expand_pattern(pattern, entry, "js")
}

/// Split a file name into `(stem, extension)` the way `[name]`/`[ext]` see it.
///
/// Only the last dot separates the extension; dotfiles have no extension.
/// - `"icon.png"` → `("icon", "png")`
/// - `"font.woff2"` → `("font", "woff2")`
/// - `"archive.tar.gz"` → `("archive.tar", "gz")`
/// - `".env"` → `(".env", "")`
pub fn split_filename(filename: &str) -> (&str, &str) {
    match filename.rfind('.') {
        Some(0) | None => (filename, ""),
        Some(pos) => (&filename[..pos], &filename[pos + 1..]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundle_pattern_expands_name() {
        assert_eq!(bundle_filename("[name].bundle.js", "popup"), "popup.bundle.js");
    }

    #[test]
    fn bundle_pattern_in_subdirectory() {
        assert_eq!(bundle_filename("static/[name].js", "options"), "static/options.js");
    }

    #[test]
    fn preserve_name_pattern_keeps_filename() {
        let (stem, ext) = split_filename("icon-128.png");
        assert_eq!(expand_pattern(PRESERVE_NAME_PATTERN, stem, ext), "icon-128.png");
    }

    #[test]
    fn unknown_placeholder_kept() {
        assert_eq!(
            expand_pattern("[name].[hash].js", "background", "js"),
            "background.[hash].js"
        );
    }

    #[test]
    fn split_multi_dot() {
        assert_eq!(split_filename("archive.tar.gz"), ("archive.tar", "gz"));
    }

    #[test]
    fn split_no_extension() {
        assert_eq!(split_filename("LICENSE"), ("LICENSE", ""));
    }

    #[test]
    fn split_dotfile() {
        assert_eq!(split_filename(".env"), (".env", ""));
    }
}

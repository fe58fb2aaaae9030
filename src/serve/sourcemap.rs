// src/serve/sourcemap.rs

//! Sourcemap comment rewriting for served text assets.
//!
//! Transforms that emit sourcemaps write an absolute-path
//! `sourceMappingURL` comment into their output. When serving, that
//! comment is rewritten to reference the map by basename, which is what a
//! browser next to the asset expects.

use std::sync::LazyLock;

use regex::Regex;

static SOURCEMAP_COMMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^(?://#|/\*#)\s*sourceMappingURL=\S+?(?:\s*\*/)?\s*$")
        .expect("sourcemap comment pattern is valid")
});

/// The comment form appropriate for the asset type.
pub fn sourcemap_comment(map_url: &str, ext: &str) -> String {
    if ext == "css" {
        format!("/*# sourceMappingURL={map_url} */")
    } else {
        format!("//# sourceMappingURL={map_url}")
    }
}

/// Replace any existing sourcemap comment in `data` with one pointing at
/// `map_url`. Content without such a comment passes through unchanged.
pub fn rewrite_sourcemap_comment(data: &str, map_url: &str, ext: &str) -> String {
    SOURCEMAP_COMMENT
        .replace_all(data, sourcemap_comment(map_url, ext).as_str())
        .into_owned()
}

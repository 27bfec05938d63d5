//! Route and URL helpers.
//!
//! Every page-facing path in the build (the `location.pathname` handed to
//! templates, hydrate-group `insert_pages`, search index `path`) is derived
//! through [`route_pathname`], so the three always agree.

use std::path::Path;

/// Render a path with forward slashes regardless of host conventions.
#[inline]
pub fn to_slash(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Derive the URL pathname of a file under `base`.
///
/// Strips the `base` prefix, then a trailing `index.<ext>` or `.<ext>`.
/// The result always starts with `/`.
///
/// ```text
/// dist/index.html        -> /
/// dist/about/index.html  -> /about/
/// dist/blog/post.html    -> /blog/post
/// ```
pub fn route_pathname(file: &Path, base: &Path, ext: &str) -> String {
    let file = to_slash(file);
    let base = to_slash(base);
    let base = base.trim_end_matches('/');

    let relative = match file.strip_prefix(base) {
        Some(rest) if !base.is_empty() && (rest.is_empty() || rest.starts_with('/')) => rest,
        _ => file.as_str(),
    };

    let index = format!("index.{ext}");
    let suffix = format!(".{ext}");
    let trimmed = if relative == index {
        ""
    } else if let Some(rest) = relative.strip_suffix(&format!("/{index}")) {
        // keep the directory slash: `/about/index.html` -> `/about/`
        &relative[..rest.len() + 1]
    } else {
        relative.strip_suffix(&suffix).unwrap_or(relative)
    };

    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

/// Check if a link is external (has a URL scheme like http:, mailto:, etc.)
///
/// A valid scheme must:
/// - Have at least 1 character before the colon
/// - Only contain ASCII alphanumeric or `+`, `-`, `.`
#[inline]
pub fn is_external_link(link: &str) -> bool {
    link.starts_with("//")
        || link.find(':').is_some_and(|pos| {
            pos > 0
                && link[..pos]
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        })
}

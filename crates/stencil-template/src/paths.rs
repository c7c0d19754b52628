//! Link and asset path rewriting.
//!
//! A designer page is authored as a flat, standalone file; once it is served
//! from a nested site location its relative links break. This module rewrites
//! every `href`/`src` reference to a root-absolute form, after first chopping
//! recognized directory-index filenames off links.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

/// Recognized directory-index filenames.
const DIRECTORY_INDEXES: &[&str] = &["index.html"];

/// Pattern matching every double-quoted `href`/`src` attribute value.
static URL_ATTRIBUTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\s+(href|src)="([^"]+)""#).expect("invalid URL attribute regex"));

/// Pattern for `href` values that are exactly a directory index.
static HREF_INDEX_EXACT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r#"(\s+)(href)="({})""#, index_alternatives()))
        .expect("invalid directory index regex")
});

/// Pattern for `href` values ending in a directory-index segment.
static HREF_INDEX_TRAILING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r#"(\s+)(href)="([^"]*)/({})""#, index_alternatives()))
        .expect("invalid directory index regex")
});

fn index_alternatives() -> String {
    DIRECTORY_INDEXES
        .iter()
        .map(|name| regex::escape(name))
        .collect::<Vec<_>>()
        .join("|")
}

/// Chop trailing directory-index filenames from `href` links.
///
/// `href="index.html"` becomes `href="./"`, and `href="a/b/index.html"`
/// becomes `href="a/b/"`. Only `href` attributes are touched (`src` never
/// names a directory index) and surrounding whitespace is preserved.
#[must_use]
pub fn chop_directory_index(html: &str) -> String {
    let html = HREF_INDEX_EXACT.replace_all(html, r#"${1}${2}="./""#);
    let html = HREF_INDEX_TRAILING.replace_all(&html, r#"${1}${2}="${3}/""#);
    html.into_owned()
}

/// Lexical classification of a link or asset reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PathKind {
    /// Full `http://` or `https://` URL; left unchanged.
    ExternalUrl,
    /// Already root-absolute (`/...`); left unchanged.
    RootAbsolute,
    /// Pure `#fragment` anchor; left unchanged.
    Anchor,
    /// `.` or `./...`; rewritten under the prefix.
    CurrentDir,
    /// `..` or `../...`; rewritten by consuming trailing prefix components.
    ParentDir,
    /// Any other relative path; prefixed as-is.
    Relative,
}

/// Classify a reference purely from its lexical form.
#[must_use]
pub fn classify(path: &str) -> PathKind {
    if path.starts_with("http://") || path.starts_with("https://") {
        PathKind::ExternalUrl
    } else if path.starts_with('/') {
        PathKind::RootAbsolute
    } else if path.starts_with('#') {
        PathKind::Anchor
    } else if path == "." || path.starts_with("./") {
        PathKind::CurrentDir
    } else if path == ".." || path.starts_with("../") {
        PathKind::ParentDir
    } else {
        PathKind::Relative
    }
}

/// A classified link/asset reference and its rewritten form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathEntry {
    /// Attribute value exactly as it appears in the document.
    pub original: String,
    /// Lexical kind, computed from `original` before any rewriting.
    pub kind: PathKind,
    /// Rewritten value; equals `original` for the unchanged kinds.
    pub rewritten: String,
}

/// Classify every `href`/`src` attribute value in `html` against `prefix`.
///
/// Only double-quoted attributes are recognized; single-quoted attributes are
/// unsupported and skipped.
#[must_use]
pub fn path_entries(html: &str, prefix: &str) -> Vec<PathEntry> {
    URL_ATTRIBUTE
        .captures_iter(html)
        .map(|caps| {
            let original = caps[2].to_owned();
            let kind = classify(&original);
            let rewritten = rewrite_path(&original, kind, prefix);
            PathEntry {
                original,
                kind,
                rewritten,
            }
        })
        .collect()
}

/// Rewrite every relative `href`/`src` reference to a root-absolute path.
///
/// `prefix` is the page's root-relative directory, always `/`-terminated
/// (`"/"` for a top-level page). External URLs, root-absolute paths and pure
/// anchors are left unchanged, which also makes the operation idempotent on
/// its own output.
///
/// Rewriting is applied as a global literal replacement of each distinct
/// `attr="value"` string: identical attribute strings elsewhere in the
/// document, including ones appearing in plain text rather than in a real
/// tag, are rewritten identically. This is an accepted limitation of the
/// literal matching strategy.
#[must_use]
pub fn rewrite_paths_absolute(html: &str, prefix: &str) -> String {
    let mut output = html.to_owned();
    let mut seen = HashSet::new();

    for caps in URL_ATTRIBUTE.captures_iter(html) {
        let attr = &caps[1];
        let original = &caps[2];
        let kind = classify(original);
        let rewritten = rewrite_path(original, kind, prefix);
        if rewritten == *original {
            continue;
        }

        let find = format!(r#"{attr}="{original}""#);
        if !seen.insert(find.clone()) {
            continue;
        }
        let replace = format!(r#"{attr}="{rewritten}""#);
        output = output.replace(&find, &replace);
    }

    output
}

/// Rewrite a single reference of the given kind against `prefix`.
fn rewrite_path(path: &str, kind: PathKind, prefix: &str) -> String {
    match kind {
        PathKind::ExternalUrl | PathKind::RootAbsolute | PathKind::Anchor => path.to_owned(),
        PathKind::CurrentDir => {
            // "." normalizes to "./"
            let rest = path.strip_prefix("./").unwrap_or("");
            format!("{prefix}{rest}")
        }
        PathKind::ParentDir => {
            // ".." normalizes to "../"
            let mut working = prefix.to_owned();
            let mut rest = if path == ".." { "../" } else { path };
            while let Some(remainder) = rest.strip_prefix("../") {
                working = parent_of(&working);
                rest = remainder;
            }
            format!("{working}{rest}")
        }
        PathKind::Relative => format!("{prefix}{path}"),
    }
}

/// Strip one trailing directory component from a `/`-terminated prefix.
///
/// Never shortens past the root: `/a/b/` becomes `/a/`, and `/` stays `/`,
/// absorbing any traversal beyond the top without error.
fn parent_of(prefix: &str) -> String {
    let trimmed = prefix.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(idx) => trimmed[..=idx].to_owned(),
        None => "/".to_owned(),
    }
}

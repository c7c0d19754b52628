//! Inline token and include-directive substitution.
//!
//! Templates carry `{$NAME}` tokens (produced by placeholder extraction) and
//! optionally `{include file='X'}` directives. Includes are resolved first,
//! in a single non-recursive pass; tokens are then replaced from a supplied
//! value mapping.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use stencil_storage::Storage;

/// Pattern for an inline token, `{$NAME}`.
static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\$([^}]+)\}").expect("invalid token regex"));

/// Pattern for an include directive, `{include file='X'}`.
static INCLUDE_DIRECTIVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{include file='([^']+)'\}").expect("invalid include regex"));

/// Replace every `{$NAME}` token with its value from `values`.
///
/// Replacement is a single pass over the template: tokens without a value are
/// left as-is, and substituted values are never re-scanned, so a value that
/// itself contains `{$...}` text comes through literally.
#[must_use]
pub fn substitute_token_values(template: &str, values: &HashMap<String, String>) -> String {
    TOKEN
        .replace_all(template, |caps: &Captures<'_>| {
            values
                .get(&caps[1])
                .cloned()
                .unwrap_or_else(|| caps[0].to_owned())
        })
        .into_owned()
}

/// Resolve `{include file='X'}` directives against the style directory.
///
/// Single pass, non-recursive: directives inside included content are never
/// processed. A missing or unreadable include file is non-fatal and leaves
/// the directive text verbatim.
pub(crate) fn resolve_includes(
    storage: &dyn Storage,
    style_directory: &str,
    template: &str,
) -> String {
    INCLUDE_DIRECTIVE
        .replace_all(template, |caps: &Captures<'_>| {
            let file = join_style_path(style_directory, &caps[1]);
            if storage.exists(&file) {
                match storage.read(&file) {
                    Ok(content) => return content,
                    Err(e) => {
                        tracing::debug!(file = %file, error = %e, "Failed to read include file");
                    }
                }
            } else {
                tracing::debug!(file = %file, "Include file not found, leaving directive");
            }
            caps[0].to_owned()
        })
        .into_owned()
}

/// Join an include filename onto the style directory without doubling slashes.
fn join_style_path(style_directory: &str, file: &str) -> String {
    format!("{}/{}", style_directory.trim_end_matches('/'), file)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use stencil_storage::MockStorage;

    use super::*;

    fn values(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn test_substitute_tokens() {
        let result = substitute_token_values(
            "<title>{$title}</title><body>{$content}</body>",
            &values(&[("title", "Home"), ("content", "<p>Hi</p>")]),
        );

        assert_eq!(result, "<title>Home</title><body><p>Hi</p></body>");
    }

    #[test]
    fn test_unmatched_token_left_as_is() {
        let result = substitute_token_values("{$known} {$unknown}", &values(&[("known", "v")]));

        assert_eq!(result, "v {$unknown}");
    }

    #[test]
    fn test_substituted_value_not_rescanned() {
        let result = substitute_token_values(
            "{$a}",
            &values(&[("a", "{$b}"), ("b", "never")]),
        );

        assert_eq!(result, "{$b}");
    }

    #[test]
    fn test_resolve_include() {
        let storage = MockStorage::new().with_file("/style/default/header.html", "<header/>");

        let result = resolve_includes(
            &storage,
            "/style/default/",
            "{include file='header.html'}<main/>",
        );

        assert_eq!(result, "<header/><main/>");
    }

    #[test]
    fn test_missing_include_left_verbatim() {
        let storage = MockStorage::new();

        let result = resolve_includes(&storage, "/style/default/", "{include file='gone.html'}");

        assert_eq!(result, "{include file='gone.html'}");
    }

    #[test]
    fn test_includes_are_not_recursive() {
        let storage = MockStorage::new()
            .with_file("/style/outer.html", "{include file='inner.html'}")
            .with_file("/style/inner.html", "never");

        let result = resolve_includes(&storage, "/style", "{include file='outer.html'}");

        // The included file's own directive is left for a later render pass.
        assert_eq!(result, "{include file='inner.html'}");
    }

    #[test]
    fn test_join_style_path() {
        assert_eq!(
            join_style_path("/style/default/", "menu.html"),
            "/style/default/menu.html"
        );
        assert_eq!(
            join_style_path("/style/default", "menu.html"),
            "/style/default/menu.html"
        );
    }
}

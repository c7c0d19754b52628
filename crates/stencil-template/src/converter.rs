//! Designer-page conversion pipeline.
//!
//! [`Converter`] orchestrates the full designer-to-template transformation
//! over one page: directory-index chopping, absolute path rewriting with the
//! page's computed prefix, and placeholder comment extraction. It also hosts
//! the render-time inverse ([`Converter::substitute_tokens`]) and the
//! file-level fragment operations backed by the storage collaborator.

use std::collections::HashMap;
use std::sync::Arc;

use stencil_storage::{Storage, StorageError};

use crate::fragments::{MatchCountError, extract_fragments, substitute_fragments};
use crate::paths::{chop_directory_index, rewrite_paths_absolute};
use crate::placeholders::{PlaceholderError, extract_placeholder_comments};
use crate::tokens::{resolve_includes, substitute_token_values};

/// Error from a converter operation.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum TemplateError {
    /// Page content could not be read or written.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// A fragment did not match exactly once.
    #[error(transparent)]
    MatchCount(#[from] MatchCountError),

    /// Placeholder comment markers were malformed.
    #[error(transparent)]
    Placeholder(#[from] PlaceholderError),
}

/// Result of converting a designer page into a template.
///
/// The resolved style directory is returned explicitly so a caller can see
/// whether the fallback was used, instead of having its input mutated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConvertedTemplate {
    /// Templated HTML with inline `{$NAME}` tokens.
    pub html: String,
    /// Style directory the page was actually loaded from.
    pub style_directory: String,
    /// Whether the fallback style directory was used.
    pub used_fallback: bool,
}

/// Designer-to-template converter.
///
/// Converts a designer's raw HTML page into a templatised page, so a template
/// can be dropped in from a designer without manual changes first.
///
/// # Example
///
/// ```ignore
/// use std::collections::HashMap;
/// use std::sync::Arc;
/// use stencil_storage::FsStorage;
/// use stencil_template::Converter;
///
/// let converter = Converter::new(Arc::new(FsStorage::new("htdocs".into())));
/// let mut placeholders = HashMap::new();
/// let converted = converter.convert_designer_html(
///     "contacts/index.html",
///     "/style/default/",
///     None,
///     &mut placeholders,
/// )?;
/// ```
pub struct Converter {
    storage: Arc<dyn Storage>,
}

impl Converter {
    /// Create a new converter over the given file store.
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Convert a designer's raw HTML page into a templatised page.
    ///
    /// `page` is the page identifier relative to the style directory
    /// (e.g. `contacts/index.html`); `style_directory` is root-relative and
    /// `/`-terminated (e.g. `/style/default/`). If the page is missing under
    /// the primary style directory and a fallback is given, the fallback is
    /// used instead; the directory actually used is reported in the result.
    ///
    /// Captured placeholder content is accumulated into `placeholders`, which
    /// is caller-owned and never cleared here.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Storage`] if the page cannot be read from the
    /// resolved style directory, and [`TemplateError::Placeholder`] if its
    /// placeholder markers are nested.
    pub fn convert_designer_html(
        &self,
        page: &str,
        style_directory: &str,
        fallback_style_directory: Option<&str>,
        placeholders: &mut HashMap<String, String>,
    ) -> Result<ConvertedTemplate, TemplateError> {
        let mut style_directory = style_directory.to_owned();
        let mut used_fallback = false;
        let mut path = format!("{style_directory}{page}");

        // The fallback is part of the repository and expected to exist, so a
        // missing primary page falls through to it before the read.
        if let Some(fallback) = fallback_style_directory
            && !self.storage.exists(&path)
        {
            tracing::debug!(page = %page, fallback = %fallback, "Page missing in primary style directory, using fallback");
            style_directory = fallback.to_owned();
            path = format!("{style_directory}{page}");
            used_fallback = true;
        }

        let html = self.storage.read(&path)?;

        let html = chop_directory_index(&html);
        let prefix = page_prefix(page);
        let html = rewrite_paths_absolute(&html, &prefix);
        let html = extract_placeholder_comments(&html, placeholders)?;

        tracing::debug!(page = %page, prefix = %prefix, used_fallback, "Converted designer page to template");

        Ok(ConvertedTemplate {
            html,
            style_directory,
            used_fallback,
        })
    }

    /// Push final values into a template.
    ///
    /// If `style_directory` is given, `{include file='X'}` directives are
    /// first resolved against it in a single non-recursive pass (missing
    /// include files are non-fatal and left verbatim). Every `{$NAME}` token
    /// is then replaced with its value from `values`; unmatched tokens are
    /// left as-is.
    #[must_use]
    pub fn substitute_tokens(
        &self,
        template: &str,
        values: &HashMap<String, String>,
        style_directory: Option<&str>,
    ) -> String {
        let template = match style_directory {
            Some(dir) => resolve_includes(self.storage.as_ref(), dir, template),
            None => template.to_owned(),
        };
        substitute_token_values(&template, values)
    }

    /// Apply exactly-once fragment replacements to a stored page.
    ///
    /// Reads `input_path`, applies `replacements` in order, and writes the
    /// result to `output_path`, or back to `input_path` when no output path
    /// is given. Nothing is written if any replacement fails.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::MatchCount`] if a fragment does not match
    /// exactly once, or [`TemplateError::Storage`] on read/write failure.
    pub fn add_placeholders(
        &self,
        replacements: &[(&str, &str)],
        input_path: &str,
        output_path: Option<&str>,
    ) -> Result<(), TemplateError> {
        let source = self.storage.read(input_path)?;
        let result = substitute_fragments(replacements, &source)?;
        self.storage
            .write(output_path.unwrap_or(input_path), &result)?;
        Ok(())
    }

    /// Split a stored page into parts by exactly-once extraction.
    ///
    /// Reads `input_path` and writes each captured fragment to its
    /// destination path. Nothing is written if any extraction fails.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::MatchCount`] if a fragment does not match
    /// exactly once, or [`TemplateError::Storage`] on read/write failure.
    pub fn split_up_files(
        &self,
        parts: &[(&str, &str)],
        input_path: &str,
    ) -> Result<(), TemplateError> {
        let source = self.storage.read(input_path)?;
        let extracted = extract_fragments(parts, &source)?;
        for (destination, fragment) in &extracted {
            self.storage.write(destination, fragment)?;
        }
        Ok(())
    }
}

/// Compute the root-relative path prefix for a page's links.
///
/// The prefix is the page's parent directory relative to the style root,
/// always `/`-prefixed and `/`-terminated: `contacts/index.html` yields
/// `/contacts/`; a top-level page yields `/`.
fn page_prefix(page: &str) -> String {
    match page.rfind('/') {
        Some(idx) => format!("/{}/", &page[..idx]),
        None => "/".to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use stencil_storage::{MockStorage, StorageErrorKind};

    use super::*;

    fn converter(storage: MockStorage) -> Converter {
        Converter::new(Arc::new(storage))
    }

    #[test]
    fn test_page_prefix() {
        assert_eq!(page_prefix("index.html"), "/");
        assert_eq!(page_prefix("contacts/index.html"), "/contacts/");
        assert_eq!(page_prefix("a/b/page.html"), "/a/b/");
    }

    #[test]
    fn test_convert_full_pipeline() {
        let designer = concat!(
            "<html><head>\n",
            " <link rel=\"stylesheet\" href=\"../css/site.css\">\n",
            "</head><body>\n",
            " <a href=\"index.html\">Home</a>\n",
            " <img src=\"images/logo.png\">\n",
            "<!-- {$content} --><p>Sample</p><!-- /{$content} -->\n",
            "</body></html>"
        );
        let converter = converter(
            MockStorage::new().with_file("/style/default/contacts/index.html", designer),
        );
        let mut placeholders = HashMap::new();

        let converted = converter
            .convert_designer_html(
                "contacts/index.html",
                "/style/default/",
                None,
                &mut placeholders,
            )
            .unwrap();

        let expected = concat!(
            "<html><head>\n",
            " <link rel=\"stylesheet\" href=\"/css/site.css\">\n",
            "</head><body>\n",
            " <a href=\"/contacts/\">Home</a>\n",
            " <img src=\"/contacts/images/logo.png\">\n",
            "{$content}\n",
            "</body></html>"
        );
        assert_eq!(converted.html, expected);
        assert_eq!(converted.style_directory, "/style/default/");
        assert!(!converted.used_fallback);
        assert_eq!(placeholders["content"], "<p>Sample</p>");
    }

    #[test]
    fn test_convert_uses_fallback() {
        let converter = converter(
            MockStorage::new().with_file("/style/fallback/index.html", "<p>fallback</p>"),
        );
        let mut placeholders = HashMap::new();

        let converted = converter
            .convert_designer_html(
                "index.html",
                "/style/custom/",
                Some("/style/fallback/"),
                &mut placeholders,
            )
            .unwrap();

        assert_eq!(converted.html, "<p>fallback</p>");
        assert_eq!(converted.style_directory, "/style/fallback/");
        assert!(converted.used_fallback);
    }

    #[test]
    fn test_convert_prefers_primary() {
        let converter = converter(
            MockStorage::new()
                .with_file("/style/custom/index.html", "<p>custom</p>")
                .with_file("/style/fallback/index.html", "<p>fallback</p>"),
        );
        let mut placeholders = HashMap::new();

        let converted = converter
            .convert_designer_html(
                "index.html",
                "/style/custom/",
                Some("/style/fallback/"),
                &mut placeholders,
            )
            .unwrap();

        assert_eq!(converted.html, "<p>custom</p>");
        assert!(!converted.used_fallback);
    }

    #[test]
    fn test_convert_missing_everywhere() {
        let converter = converter(MockStorage::new());
        let mut placeholders = HashMap::new();

        let err = converter
            .convert_designer_html(
                "index.html",
                "/style/custom/",
                Some("/style/fallback/"),
                &mut placeholders,
            )
            .unwrap_err();

        match err {
            TemplateError::Storage(e) => assert_eq!(e.kind, StorageErrorKind::NotFound),
            other => panic!("expected storage error, got {other:?}"),
        }
    }

    #[test]
    fn test_round_trip_extraction_and_substitution() {
        let designer = "<body><!-- {$content} --><p>Sample</p><!-- /{$content} --></body>";
        let converter =
            converter(MockStorage::new().with_file("/style/default/index.html", designer));
        let mut placeholders = HashMap::new();

        let converted = converter
            .convert_designer_html("index.html", "/style/default/", None, &mut placeholders)
            .unwrap();
        let rendered = converter.substitute_tokens(&converted.html, &placeholders, None);

        assert_eq!(rendered, "<body><p>Sample</p></body>");
    }

    #[test]
    fn test_substitute_tokens_with_includes() {
        let converter = converter(
            MockStorage::new().with_file("/style/default/footer.html", "<footer>{$year}</footer>"),
        );
        let values = HashMap::from([("year".to_owned(), "2026".to_owned())]);

        let rendered = converter.substitute_tokens(
            "<main/>{include file='footer.html'}",
            &values,
            Some("/style/default/"),
        );

        // Tokens inside included content are substituted in the same render.
        assert_eq!(rendered, "<main/><footer>2026</footer>");
    }

    #[test]
    fn test_add_placeholders_overwrites_input() {
        let storage = Arc::new(
            MockStorage::new().with_file("/page.html", "<title>Sample</title>"),
        );
        let converter = Converter::new(Arc::clone(&storage) as Arc<dyn Storage>);

        converter
            .add_placeholders(&[("Sample", "{$title}")], "/page.html", None)
            .unwrap();

        assert_eq!(storage.read("/page.html").unwrap(), "<title>{$title}</title>");
    }

    #[test]
    fn test_add_placeholders_separate_output() {
        let storage = Arc::new(MockStorage::new().with_file("/in.html", "abc"));
        let converter = Converter::new(Arc::clone(&storage) as Arc<dyn Storage>);

        converter
            .add_placeholders(&[("b", "{$b}")], "/in.html", Some("/out.html"))
            .unwrap();

        assert_eq!(storage.read("/in.html").unwrap(), "abc");
        assert_eq!(storage.read("/out.html").unwrap(), "a{$b}c");
    }

    #[test]
    fn test_add_placeholders_failure_writes_nothing() {
        let storage = Arc::new(MockStorage::new().with_file("/in.html", "dup dup"));
        let converter = Converter::new(Arc::clone(&storage) as Arc<dyn Storage>);

        let err = converter
            .add_placeholders(&[("dup", "x")], "/in.html", Some("/out.html"))
            .unwrap_err();

        match err {
            TemplateError::MatchCount(e) => assert_eq!(e.count, 2),
            other => panic!("expected match count error, got {other:?}"),
        }
        assert!(!storage.exists("/out.html"));
        assert_eq!(storage.read("/in.html").unwrap(), "dup dup");
    }

    #[test]
    fn test_split_up_files() {
        let storage = Arc::new(
            MockStorage::new().with_file("/page.html", "<head>h</head><body>b</body>"),
        );
        let converter = Converter::new(Arc::clone(&storage) as Arc<dyn Storage>);

        converter
            .split_up_files(
                &[
                    ("/parts/head.html", "<head>h</head>"),
                    ("/parts/body.html", "<body>b</body>"),
                ],
                "/page.html",
            )
            .unwrap();

        assert_eq!(storage.read("/parts/head.html").unwrap(), "<head>h</head>");
        assert_eq!(storage.read("/parts/body.html").unwrap(), "<body>b</body>");
    }

    #[test]
    fn test_split_up_files_failure_writes_nothing() {
        let storage = Arc::new(MockStorage::new().with_file("/page.html", "x"));
        let converter = Converter::new(Arc::clone(&storage) as Arc<dyn Storage>);

        let err = converter
            .split_up_files(&[("/parts/a.html", "x"), ("/parts/b.html", "absent")], "/page.html")
            .unwrap_err();

        match err {
            TemplateError::MatchCount(e) => {
                assert_eq!(e.index, 2);
                assert_eq!(e.target, "/parts/b.html");
            }
            other => panic!("expected match count error, got {other:?}"),
        }
        assert!(!storage.exists("/parts/a.html"));
        assert!(!storage.exists("/parts/b.html"));
    }
}

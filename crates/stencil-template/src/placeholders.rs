//! Placeholder comment extraction.
//!
//! A designer supplies sample HTML wrapped in paired marker comments:
//!
//! ```html
//! <!-- {$content} -->
//! <p>Sample body text</p>
//! <!-- /{$content} -->
//! ```
//!
//! Extraction captures the enclosed content under the marker name and
//! replaces the whole pair with the inline token `{$content}`.
//!
//! Pairs are matched with an explicit two-token scan: open-marker name
//! capture, then a forward scan for the nearest close marker with the same
//! name. Markers must not nest; an open marker inside another pair's content
//! is rejected rather than producing an arbitrary split point.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

/// Pattern for an open marker, `<!-- {$NAME} -->`, capturing the name.
static OPEN_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<!--\s+\{\$([^}]+)\}\s+-->").expect("invalid open marker regex"));

/// Pattern for the close marker of a specific name, `<!-- /{$NAME} -->`.
///
/// # Panics
///
/// Panics if the pattern fails to compile. This should never happen as the
/// name is escaped.
fn close_marker(name: &str) -> Regex {
    Regex::new(&format!(r"<!--\s+/\{{\${}\}}\s+-->", regex::escape(name)))
        .expect("escaped close marker is a valid regex")
}

/// Error from placeholder comment extraction.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum PlaceholderError {
    /// An open marker appeared inside another pair's content.
    #[error("nested placeholder marker {{${inner}}} inside {{${outer}}}")]
    Nested {
        /// Name of the enclosing pair.
        outer: String,
        /// Name of the marker found inside its content.
        inner: String,
    },
}

/// Replace paired placeholder comments with inline tokens, capturing the
/// enclosed content into `placeholders`.
///
/// For every pair, `placeholders[NAME]` receives the enclosed content
/// verbatim; a later pair with the same name overwrites the earlier capture
/// (last write wins). The mapping is a caller-owned accumulator and is never
/// cleared here, so captures can be accumulated across several pages.
///
/// An open marker with no matching close marker is left in the output
/// verbatim.
///
/// # Errors
///
/// Returns [`PlaceholderError::Nested`] if an open marker occurs inside
/// another pair's content; markers must not nest.
pub fn extract_placeholder_comments(
    html: &str,
    placeholders: &mut HashMap<String, String>,
) -> Result<String, PlaceholderError> {
    let mut output = String::with_capacity(html.len());
    let mut pos = 0;

    while let Some(caps) = OPEN_MARKER.captures_at(html, pos) {
        let open = caps.get(0).expect("group 0 is the whole match");
        let name = caps[1].to_owned();

        let Some(close) = close_marker(&name).find_at(html, open.end()) else {
            // Unpaired open marker: emit it verbatim and keep scanning.
            output.push_str(&html[pos..open.end()]);
            pos = open.end();
            continue;
        };

        let content = &html[open.end()..close.start()];
        if let Some(inner) = OPEN_MARKER.captures(content) {
            return Err(PlaceholderError::Nested {
                outer: name,
                inner: inner[1].to_owned(),
            });
        }

        placeholders.insert(name.clone(), content.to_owned());
        output.push_str(&html[pos..open.start()]);
        output.push_str(&format!("{{${name}}}"));
        pos = close.end();
    }

    output.push_str(&html[pos..]);
    Ok(output)
}

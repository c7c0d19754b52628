//! Exactly-once fragment substitution and extraction.
//!
//! Both operations share the same contract: every pattern in a sequence must
//! match exactly once in the text it is applied against, or the whole call
//! fails with a [`MatchCountError`] identifying the offending operation.

use std::collections::HashMap;

use regex::{Regex, RegexBuilder};

/// Error when a fragment pattern does not match exactly once.
#[derive(Debug, thiserror::Error)]
#[error("fragment {index} ({target}) was found {count} time(s), expected exactly once")]
pub struct MatchCountError {
    /// 1-based position of the failing operation in its sequence.
    pub index: usize,
    /// Identifier of the failing operation: the pattern for substitutions,
    /// the destination for extractions.
    pub target: String,
    /// Observed number of non-overlapping matches (0, or 2 and above).
    pub count: usize,
}

/// Compile a fragment as a literal pattern.
///
/// The fragment is escaped so all of its characters match literally; dot
/// matches newline and greed is swapped so multi-line fragments match as a
/// single minimal span.
///
/// # Panics
///
/// Panics if the escaped pattern fails to compile. This should never happen
/// as escaping removes all metacharacters.
fn literal_pattern(fragment: &str) -> Regex {
    RegexBuilder::new(&regex::escape(fragment))
        .dot_matches_new_line(true)
        .swap_greed(true)
        .build()
        .expect("escaped fragment is a valid regex")
}

/// Apply a sequence of exactly-once replacements to `source`.
///
/// Operations are applied strictly in order, each seeing the text as mutated
/// by all prior operations in the same call. All mutation happens on a
/// working copy: the new text is returned only on full success, so `source`
/// is untouched by a failing call.
///
/// Replacement values are spliced in literally and never reinterpreted
/// (a value containing `$1` stays `$1`).
///
/// # Errors
///
/// Returns [`MatchCountError`] if any fragment matches zero times or more
/// than once in the current text; no result is produced in that case.
pub fn substitute_fragments(
    replacements: &[(&str, &str)],
    source: &str,
) -> Result<String, MatchCountError> {
    let mut text = source.to_owned();

    for (i, (fragment, replacement)) in replacements.iter().enumerate() {
        let pattern = literal_pattern(fragment);
        let spans: Vec<_> = pattern.find_iter(&text).map(|m| m.range()).collect();
        if spans.len() != 1 {
            return Err(MatchCountError {
                index: i + 1,
                target: (*fragment).to_owned(),
                count: spans.len(),
            });
        }
        text.replace_range(spans[0].clone(), replacement);
    }

    Ok(text)
}

/// Extract a sequence of exactly-once fragments from `source`.
///
/// Each `(destination, fragment)` pair captures the single matched span
/// verbatim under its destination key. The source text is never mutated, so
/// every operation matches against the original input.
///
/// # Errors
///
/// Returns [`MatchCountError`] if any fragment matches zero times or more
/// than once; no map is produced in that case.
pub fn extract_fragments(
    parts: &[(&str, &str)],
    source: &str,
) -> Result<HashMap<String, String>, MatchCountError> {
    let mut extracted = HashMap::new();

    for (i, (destination, fragment)) in parts.iter().enumerate() {
        let pattern = literal_pattern(fragment);
        let matches: Vec<_> = pattern.find_iter(source).collect();
        if matches.len() != 1 {
            return Err(MatchCountError {
                index: i + 1,
                target: (*destination).to_owned(),
                count: matches.len(),
            });
        }
        extracted.insert((*destination).to_owned(), matches[0].as_str().to_owned());
    }

    Ok(extracted)
}

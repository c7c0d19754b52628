//! Template preparation for the Stencil rendering system.
//!
//! This crate converts designer-authored, standalone HTML pages into
//! parameterized templates, and performs the inverse operation of injecting
//! final values at render time:
//!
//! - **Path rewriting**: relative `href`/`src` references are rewritten to
//!   root-absolute form as a page moves from a flat design file into a nested
//!   site structure, after directory-index filenames are chopped off links.
//! - **Placeholder extraction**: designer-supplied sample HTML delimited by
//!   paired marker comments is captured into a named mapping and replaced by
//!   inline `{$NAME}` tokens.
//! - **Exactly-once fragments**: substitution and extraction by pattern, with
//!   an enforced one-match invariant per operation.
//! - **Token substitution**: single-level `{include file='X'}` resolution
//!   followed by `{$NAME}` token replacement.
//!
//! Everything works by pattern matching over markup text; there is no DOM,
//! no templating language, and no malformed-HTML recovery.
//!
//! # Quick Start
//!
//! ```ignore
//! use std::collections::HashMap;
//! use std::sync::Arc;
//! use stencil_storage::FsStorage;
//! use stencil_template::Converter;
//!
//! let converter = Converter::new(Arc::new(FsStorage::new("htdocs".into())));
//!
//! // Designer page -> template + captured placeholders
//! let mut placeholders = HashMap::new();
//! let converted = converter.convert_designer_html(
//!     "contacts/index.html",
//!     "/style/default/",
//!     Some("/style/fallback/"),
//!     &mut placeholders,
//! )?;
//!
//! // Template + values -> final HTML
//! let html = converter.substitute_tokens(&converted.html, &placeholders, None);
//! ```

mod converter;
mod fragments;
mod paths;
mod placeholders;
mod tokens;

pub use converter::{ConvertedTemplate, Converter, TemplateError};
pub use fragments::{MatchCountError, extract_fragments, substitute_fragments};
pub use paths::{
    PathEntry, PathKind, chop_directory_index, classify, path_entries, rewrite_paths_absolute,
};
pub use placeholders::{PlaceholderError, extract_placeholder_comments};
pub use tokens::substitute_token_values;

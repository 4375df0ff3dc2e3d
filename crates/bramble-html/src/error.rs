//! Errors raised while building a document.

use bramble_common::source::LoadError;
use thiserror::Error;

/// A markup error the parser refuses to recover from, or a misuse of the
/// document API.
#[derive(Debug, Error)]
pub enum HtmlError {
    /// A closing tag that matches neither the open element, the
    /// optional-closing rules, nor any open ancestor.
    #[error("unexpected </{found}> at byte {offset}, expected </{expected}>")]
    Structural {
        /// Tag named by the closing tag.
        found: String,
        /// Tag of the element that was open, empty at document level.
        expected: String,
        /// Byte offset of the closing tag in the prepared buffer.
        offset: usize,
    },

    /// A form-scoped tag outside its required container.
    #[error("<{tag}> at byte {offset} must be inside <{required}>")]
    Nesting {
        /// The misplaced tag.
        tag: String,
        /// The container it needs, e.g. `form` or `select`.
        required: &'static str,
        /// Byte offset of the tag in the prepared buffer.
        offset: usize,
    },

    /// A tag written with `/>` directly at document level.
    #[error("self-closing <{tag}/> at byte {offset} is not allowed at document level")]
    SelfClosingAtRoot {
        /// The offending tag.
        tag: String,
        /// Byte offset of the tag in the prepared buffer.
        offset: usize,
    },

    /// The source file could not be loaded.
    #[error(transparent)]
    Load(#[from] LoadError),
}

impl HtmlError {
    /// Whether this is a structural error (bad closing tag or misplaced
    /// self-closing tag), as opposed to a nesting error.
    #[must_use]
    pub const fn is_structural(&self) -> bool {
        matches!(self, Self::Structural { .. } | Self::SelfClosingAtRoot { .. })
    }
}

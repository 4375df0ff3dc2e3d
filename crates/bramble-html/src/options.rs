//! Parser configuration.

use serde::{Deserialize, Serialize};

/// Charset assumed when a document does not declare one.
pub const DEFAULT_TARGET_CHARSET: &str = "UTF-8";

/// Text a `br` contributes to extracted text by default.
pub const DEFAULT_LINE_BREAK_TEXT: &str = "\r\n";

/// Options controlling how a [`crate::Document`] is parsed.
///
/// Deserializes from a partial JSON object; missing fields keep their
/// defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Remove `\r` and `\n` from the buffer before parsing (after script,
    /// style and comment bodies have been set aside).
    pub strip_linebreaks: bool,
    /// Store tag and attribute names lowercased and match selectors
    /// case-insensitively.
    pub lowercase_tags: bool,
    /// Set script, style, comment and CDATA bodies aside before parsing so
    /// markup-like text inside them is never tokenized.
    pub strip_noise: bool,
    /// Text a `br` contributes to [`crate::Document::text`].
    pub default_line_break_text: String,
    /// Text inserted into `span` elements that close with no children.
    /// Empty disables the insertion.
    pub default_span_text: String,
    /// Charset reported when the document declares none.
    pub target_charset: String,
    /// Compare attribute values in `find` ignoring ASCII case.
    pub case_insensitive_values: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            strip_linebreaks: true,
            lowercase_tags: true,
            strip_noise: true,
            default_line_break_text: DEFAULT_LINE_BREAK_TEXT.to_string(),
            default_span_text: String::new(),
            target_charset: DEFAULT_TARGET_CHARSET.to_string(),
            case_insensitive_values: false,
        }
    }
}

impl ParseOptions {
    /// Keep `\r` and `\n` in the buffer.
    #[must_use]
    pub const fn with_linebreaks(mut self) -> Self {
        self.strip_linebreaks = false;
        self
    }

    /// Keep tag and attribute names as written.
    #[must_use]
    pub const fn with_case_preserved(mut self) -> Self {
        self.lowercase_tags = false;
        self
    }

    /// Tokenize script, style, comment and CDATA bodies like any other text.
    #[must_use]
    pub const fn without_noise_stripping(mut self) -> Self {
        self.strip_noise = false;
        self
    }

    /// Text a `br` contributes to extracted text.
    #[must_use]
    pub fn with_line_break_text(mut self, text: impl Into<String>) -> Self {
        self.default_line_break_text = text.into();
        self
    }

    /// Text inserted into empty `span` elements.
    #[must_use]
    pub fn with_span_text(mut self, text: impl Into<String>) -> Self {
        self.default_span_text = text.into();
        self
    }

    /// Charset reported when the document declares none.
    #[must_use]
    pub fn with_target_charset(mut self, charset: impl Into<String>) -> Self {
        self.target_charset = charset.into();
        self
    }

    /// Compare attribute values in `find` ignoring ASCII case.
    #[must_use]
    pub const fn with_case_insensitive_values(mut self) -> Self {
        self.case_insensitive_values = true;
        self
    }
}

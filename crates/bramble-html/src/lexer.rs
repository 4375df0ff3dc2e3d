//! Cursor over the prepared buffer, classifying one lexical unit at a time.
//!
//! The cursor never builds tokens ahead of the parser. Each call to
//! [`Cursor::next_lexeme`] looks at the bytes under the cursor, decides what
//! they are, and advances past exactly that unit.

use bramble_dom::AttrValue;

/// One lexical unit of markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lexeme<'a> {
    /// `<!--content-->`. `<!-->` and `<!--->` are empty comments.
    Comment(&'a str),
    /// `<!content>` that is not a comment, usually a doctype.
    Declaration(&'a str),
    /// `</name>`.
    EndTag {
        /// Tag name as written, trimmed.
        name: &'a str,
        /// The whole closing tag, for turning it back into text.
        raw: &'a str,
    },
    /// `<name attributes>` or `<name attributes/>`.
    StartTag(StartTag<'a>),
    /// Character data up to the next `<`.
    Text(&'a str),
    /// A `<` that starts nothing recognisable.
    Noise(&'a str),
}

/// The parts of an opening tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartTag<'a> {
    /// Tag name as written.
    pub name: &'a str,
    /// Raw attribute source between the name and `>` (or `/>`).
    pub attributes: &'a str,
    /// Whether the tag ended with `/>`.
    pub self_closing: bool,
    /// The whole tag.
    pub raw: &'a str,
}

/// Position in a buffer.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    /// A cursor at the start of `input`.
    #[must_use]
    pub const fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    /// Bytes consumed so far.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.pos
    }

    /// Unconsumed input.
    #[must_use]
    pub fn remaining(&self) -> &'a str {
        &self.input[self.pos..]
    }

    /// Skip `len` bytes. Used after a nested scope consumed part of the
    /// remaining input on its own.
    pub fn advance(&mut self, len: usize) {
        self.pos = (self.pos + len).min(self.input.len());
    }

    /// Move back to an earlier position, e.g. to hand a closing tag back to
    /// an enclosing scope.
    pub fn rewind_to(&mut self, pos: usize) {
        self.pos = pos.min(self.pos);
    }

    /// Classify and consume the next lexical unit.
    pub fn next_lexeme(&mut self) -> Option<Lexeme<'a>> {
        let rest = self.remaining();
        if rest.is_empty() {
            return None;
        }

        if !rest.starts_with('<') {
            let len = rest.find('<').unwrap_or(rest.len());
            self.pos += len;
            return Some(Lexeme::Text(&rest[..len]));
        }

        if let Some(body) = rest.strip_prefix("<!--") {
            let Some((content, len)) = comment_extent(body) else {
                return Some(self.noise());
            };
            self.pos += len;
            return Some(Lexeme::Comment(content));
        }

        if let Some(body) = rest.strip_prefix("<!") {
            return match body.find('>') {
                Some(end) => {
                    self.pos += end + "<!>".len();
                    Some(Lexeme::Declaration(&body[..end]))
                }
                None => Some(self.noise()),
            };
        }

        if let Some(body) = rest.strip_prefix("</") {
            if let Some(end) = body.find('>') {
                let name = body[..end].trim();
                if is_tag_name(name) {
                    let len = end + "</>".len();
                    self.pos += len;
                    return Some(Lexeme::EndTag {
                        name,
                        raw: &rest[..len],
                    });
                }
            }
            return Some(self.noise());
        }

        let body = &rest[1..];
        let name_len = body
            .find(|c: char| c.is_whitespace() || c == '/' || c == '>')
            .unwrap_or(body.len());
        let name = &body[..name_len];
        let Some(end) = find_tag_end(&body[name_len..]).filter(|_| is_tag_name(name)) else {
            return Some(self.noise());
        };

        let inner = &body[name_len..name_len + end];
        let (attributes, self_closing) = match inner.trim_end().strip_suffix('/') {
            Some(attributes) => (attributes, true),
            None => (inner, false),
        };
        let len = 1 + name_len + end + 1;
        self.pos += len;
        Some(Lexeme::StartTag(StartTag {
            name,
            attributes,
            self_closing,
            raw: &rest[..len],
        }))
    }

    fn noise(&mut self) -> Lexeme<'a> {
        let rest = self.remaining();
        self.pos += 1;
        Lexeme::Noise(&rest[..1])
    }
}

/// Content and total length of a comment whose `<!--` has already been
/// stripped from `body`. `None` when the comment never closes.
#[must_use]
pub fn comment_extent(body: &str) -> Option<(&str, usize)> {
    if body.starts_with('>') {
        return Some(("", "<!-->".len()));
    }
    if body.starts_with("->") {
        return Some(("", "<!--->".len()));
    }
    body.find("-->").map(|end| (&body[..end], end + "<!---->".len()))
}

/// `[\w\-:]+`
#[must_use]
pub fn is_tag_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | ':'))
}

/// Offset of the `>` closing a tag, skipping `>` inside quoted attribute
/// values.
#[must_use]
pub fn find_tag_end(source: &str) -> Option<usize> {
    let mut quote = None;
    let mut after_equals = false;
    for (index, c) in source.char_indices() {
        match quote {
            Some(open) => {
                if c == open {
                    quote = None;
                }
            }
            None if c == '>' => return Some(index),
            None if c == '=' => after_equals = true,
            None if matches!(c, '"' | '\'') && after_equals => {
                quote = Some(c);
                after_equals = false;
            }
            None if c.is_whitespace() => {}
            None => after_equals = false,
        }
    }
    None
}

/// Split raw attribute source into `(name, value)` pairs in source order.
///
/// The first quote after `=` sets the delimiter for that value; an unquoted
/// value ends at whitespace; a name with no `=` is a `Flag(true)`.
#[must_use]
pub fn scan_attributes(source: &str) -> Vec<(&str, AttrValue)> {
    let mut out = Vec::new();
    let mut rest = source;
    loop {
        rest = rest.trim_start_matches(|c: char| c.is_whitespace() || c == '/');
        if rest.is_empty() {
            break;
        }

        let name_end = rest
            .find(|c: char| c.is_whitespace() || c == '=')
            .unwrap_or(rest.len());
        let name = &rest[..name_end];
        rest = rest[name_end..].trim_start();

        let value = if let Some(after) = rest.strip_prefix('=') {
            let after = after.trim_start();
            if let Some(quote) = after.chars().next().filter(|c| matches!(c, '"' | '\'')) {
                let body = &after[1..];
                let end = body.find(quote).unwrap_or(body.len());
                rest = body.get(end + 1..).unwrap_or_default();
                AttrValue::Text(body[..end].to_string())
            } else {
                let end = after.find(char::is_whitespace).unwrap_or(after.len());
                rest = &after[end..];
                AttrValue::Text(after[..end].to_string())
            }
        } else {
            AttrValue::Flag(true)
        };

        if !name.is_empty() {
            out.push((name, value));
        }
    }
    out
}

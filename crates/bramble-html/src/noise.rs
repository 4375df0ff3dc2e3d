//! Setting aside markup that must not be tokenized.
//!
//! Script and style bodies, comment bodies and CDATA sections routinely
//! contain `<` and `>` that are not tags. Before parsing, each such chunk is
//! replaced by a placeholder that holds neither angle brackets nor line
//! breaks; the parser restores the original bytes when it builds the node
//! that carries the placeholder.

use std::borrow::Cow;

use crate::lexer::{comment_extent, find_tag_end, is_tag_name};

/// Delimits a placeholder on both sides.
const SENTINEL: char = '\u{1A}';

/// [`SENTINEL`] as a string slice.
const SENTINEL_TEXT: &str = "\u{1A}";

/// Tags whose bodies are raw text.
const RAW_TEXT_TAGS: [&str; 2] = ["script", "style"];

/// Chunks set aside from a buffer, by placeholder index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoiseTable {
    chunks: Vec<String>,
}

impl NoiseTable {
    /// Replace every noise chunk in `input` by a placeholder.
    ///
    /// The buffer is walked tag by tag, so `<script` or `<!--` inside a
    /// quoted attribute value starts nothing. Comment and raw-text bodies
    /// are replaced but their delimiting tags stay in the buffer, so the
    /// parser still sees `<!--`, `<script>` and so on. A whole CDATA section
    /// becomes a placeholder and so ends up as text. A comment, CDATA
    /// section or raw-text body that never closes is left for the tokenizer.
    ///
    /// Sentinel characters already present in `input` are set aside as
    /// chunks of their own, so every placeholder in the result was written
    /// here.
    #[must_use]
    pub fn strip(input: &str) -> (String, Self) {
        let mut table = Self::default();
        let mut out = String::with_capacity(input.len());
        let mut rest = input;

        while let Some(start) = rest.find(['<', SENTINEL]) {
            out.push_str(&rest[..start]);
            let tail = &rest[start..];
            let consumed = if tail.starts_with(SENTINEL) {
                table.set_aside(SENTINEL_TEXT, &mut out);
                SENTINEL.len_utf8()
            } else {
                table.take_markup(tail, &mut out)
            };
            rest = &tail[consumed..];
        }

        out.push_str(rest);
        (out, table)
    }

    /// Copy the markup starting at the `<` that opens `tail`, setting aside
    /// whatever noise it carries. Returns the bytes consumed.
    fn take_markup(&mut self, tail: &str, out: &mut String) -> usize {
        if let Some(body) = tail.strip_prefix("<!--") {
            return match comment_extent(body) {
                Some((content, len)) => {
                    out.push_str("<!--");
                    self.set_aside(content, out);
                    out.push_str(&tail["<!--".len() + content.len()..len]);
                    len
                }
                None => {
                    out.push('<');
                    1
                }
            };
        }

        if starts_with_ignore_case(tail, "<![CDATA[") {
            return match tail.find("]]>") {
                Some(end) => {
                    let len = end + "]]>".len();
                    self.set_aside(&tail[..len], out);
                    len
                }
                None => {
                    out.push('<');
                    1
                }
            };
        }

        let body = &tail[1..];
        let name_len = body
            .find(|c: char| c.is_whitespace() || c == '/' || c == '>')
            .unwrap_or(body.len());
        let name = &body[..name_len];
        let Some(end) = find_tag_end(&body[name_len..]).filter(|_| is_tag_name(name)) else {
            out.push('<');
            return 1;
        };

        let open_len = 1 + name_len + end + 1;
        self.push_plain(&tail[..open_len], out);
        let Some(tag) = RAW_TEXT_TAGS.iter().find(|tag| name.eq_ignore_ascii_case(tag)) else {
            return open_len;
        };
        if tail[..open_len - 1].trim_end().ends_with('/') {
            return open_len;
        }

        let content = &tail[open_len..];
        match find_ignore_case(content, &format!("</{tag}")) {
            Some(close) => {
                self.set_aside(&content[..close], out);
                open_len + close
            }
            None => open_len,
        }
    }

    /// Copy `text`, setting aside each sentinel it contains.
    fn push_plain(&mut self, text: &str, out: &mut String) {
        let mut pieces = text.split(SENTINEL);
        if let Some(first) = pieces.next() {
            out.push_str(first);
        }
        for piece in pieces {
            self.set_aside(SENTINEL_TEXT, out);
            out.push_str(piece);
        }
    }

    fn set_aside(&mut self, chunk: &str, out: &mut String) {
        if chunk.is_empty() {
            return;
        }
        out.push(SENTINEL);
        out.push_str(&self.chunks.len().to_string());
        out.push(SENTINEL);
        self.chunks.push(chunk.to_string());
    }

    /// Put the original bytes back in place of any placeholders in `text`.
    #[must_use]
    pub fn restore<'a>(&self, text: &'a str) -> Cow<'a, str> {
        if self.chunks.is_empty() || !text.contains(SENTINEL) {
            return Cow::Borrowed(text);
        }

        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        while let Some(start) = rest.find(SENTINEL) {
            out.push_str(&rest[..start]);
            let after = &rest[start + SENTINEL.len_utf8()..];
            let chunk = after.find(SENTINEL).and_then(|end| {
                after[..end]
                    .parse::<usize>()
                    .ok()
                    .and_then(|index| self.chunks.get(index))
                    .map(|chunk| (chunk, end))
            });
            if let Some((chunk, end)) = chunk {
                out.push_str(chunk);
                rest = &after[end + SENTINEL.len_utf8()..];
            } else {
                out.push(SENTINEL);
                rest = after;
            }
        }
        out.push_str(rest);
        Cow::Owned(out)
    }

    /// Number of chunks set aside.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Whether nothing was set aside.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

fn starts_with_ignore_case(haystack: &str, prefix: &str) -> bool {
    haystack
        .as_bytes()
        .get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix.as_bytes()))
}

fn find_ignore_case(haystack: &str, needle: &str) -> Option<usize> {
    haystack
        .match_indices('<')
        .map(|(index, _)| index)
        .find(|&index| starts_with_ignore_case(&haystack[index..], needle))
}

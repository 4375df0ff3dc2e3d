//! Tree construction.
//!
//! A single forward pass over the prepared buffer. Each lexeme creates at
//! most one node, extends the trailing text node, or closes open elements.
//! A `<form>` opens a nested scope: the builder recurses into the remaining
//! input, and the nested call reports how many bytes it consumed so the
//! enclosing scope can continue after them.

use bramble_common::warning::warn_once;
use bramble_dom::{AttrValue, DomTree, ElementData, NodeId, NodeType};

use crate::error::HtmlError;
use crate::events::{Observers, ParseEvent};
use crate::lexer::{Cursor, Lexeme, StartTag, scan_attributes};
use crate::noise::NoiseTable;
use crate::options::ParseOptions;
use crate::tags;

/// A piece of markup the parser had to recover from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIssue {
    /// What was wrong and what the parser did about it.
    pub message: String,
    /// Byte offset in the prepared buffer.
    pub offset: usize,
}

/// What an opening tag turned into.
enum Opened {
    /// A node was built; the builder's position is already updated.
    Node,
    /// A form, whose content is parsed in a nested scope.
    Form(NodeId),
    /// Not a tag we build; the `<` becomes text.
    Unknown,
}

/// What a closing tag did.
enum Closed {
    /// Keep parsing in this scope.
    Continue,
    /// The scope's own element was closed.
    ScopeClosed,
    /// The tag closes something outside this scope. The scope is closed and
    /// the tag is left for the enclosing scope.
    HandBack,
}

/// Builds nodes into a tree from a prepared buffer.
pub struct TreeBuilder<'a> {
    pub(crate) tree: &'a mut DomTree,
    pub(crate) noise: &'a NoiseTable,
    pub(crate) options: &'a ParseOptions,
    pub(crate) observers: &'a mut Observers,
    pub(crate) issues: &'a mut Vec<ParseIssue>,
}

impl TreeBuilder<'_> {
    /// Parse the whole buffer into the document node.
    pub fn run(&mut self, input: &str) -> Result<(), HtmlError> {
        let _ = self.parse_scope(NodeId::ROOT, input, 0)?;
        Ok(())
    }

    /// Parse `input` into `scope` until the input runs out or the scope's
    /// element is closed. `base` is the offset of `input` in the buffer.
    /// Returns the number of bytes consumed.
    fn parse_scope(
        &mut self,
        scope: NodeId,
        input: &str,
        base: usize,
    ) -> Result<usize, HtmlError> {
        let mut cursor = Cursor::new(input);
        let mut current = scope;

        loop {
            let start = cursor.position();
            let offset = base + start;
            let Some(lexeme) = cursor.next_lexeme() else {
                self.close_to_scope(current, scope, base + input.len());
                return Ok(input.len());
            };

            match lexeme {
                Lexeme::Text(text) => self.append_text(current, text, offset),
                Lexeme::Noise(raw) => {
                    self.recover(offset, "stray '<' kept as text".to_string());
                    self.append_text(current, raw, offset);
                }
                Lexeme::Comment(content) => {
                    let content = self.noise.restore(content).into_owned();
                    let end = cursor.position() + base;
                    self.append_leaf(current, NodeType::Comment(content), offset, end);
                }
                Lexeme::Declaration(content) => {
                    let content = self.noise.restore(content).into_owned();
                    let end = cursor.position() + base;
                    self.append_leaf(current, NodeType::Doctype(content), offset, end);
                }
                Lexeme::EndTag { name, raw } => {
                    match self.close_tag(&mut current, scope, name, raw, offset)? {
                        Closed::Continue => {}
                        Closed::ScopeClosed => return Ok(cursor.position()),
                        Closed::HandBack => return Ok(start),
                    }
                }
                Lexeme::StartTag(tag) => match self.open_tag(&mut current, scope, &tag, offset)? {
                    Opened::Node => {}
                    Opened::Form(form) => {
                        let consumed =
                            self.parse_scope(form, cursor.remaining(), base + cursor.position())?;
                        cursor.advance(consumed);
                    }
                    Opened::Unknown => {
                        self.recover(offset, format!("unknown tag <{}> kept as text", tag.name));
                        cursor.rewind_to(start);
                        cursor.advance(1);
                        self.append_text(current, "<", offset);
                    }
                },
            }
        }
    }

    // ========== opening tags ==========

    fn open_tag(
        &mut self,
        current: &mut NodeId,
        scope: NodeId,
        tag: &StartTag<'_>,
        offset: usize,
    ) -> Result<Opened, HtmlError> {
        let key = tag.name.to_ascii_lowercase();
        let name = if self.options.lowercase_tags {
            key.clone()
        } else {
            tag.name.to_string()
        };

        if let Some(closes) = tags::optional_closing(&key) {
            while *current != scope
                && self
                    .tree
                    .as_element(*current)
                    .is_some_and(|open| closes.iter().any(|&closed| open.is(closed)))
            {
                self.close_element(*current, offset);
                *current = self.tree.parent(*current).unwrap_or(NodeId::ROOT);
            }
        }

        if tags::requires_form(&key)
            && self.find_inclusive(*current, |tag| tag == "form").is_none()
        {
            return Err(HtmlError::Nesting {
                tag: name,
                required: "form",
                offset,
            });
        }
        if key == "option" && self.find_inclusive(*current, tags::is_option_container).is_none() {
            return Err(HtmlError::Nesting {
                tag: name,
                required: "select",
                offset,
            });
        }

        Ok(match key.as_str() {
            "meta" | "link" => {
                let id = self.create_element(*current, &name, tag, offset, true);
                self.register(id, &key, tag.raw);
                Opened::Node
            }
            "form" => Opened::Form(self.create_element(*current, &name, tag, offset, false)),
            _ if tag.self_closing => {
                if *current == NodeId::ROOT {
                    return Err(HtmlError::SelfClosingAtRoot { tag: name, offset });
                }
                let _ = self.create_element(*current, &name, tag, offset, true);
                Opened::Node
            }
            _ if tags::is_self_closing(&key) => {
                let _ = self.create_element(*current, &name, tag, offset, true);
                Opened::Node
            }
            _ if tags::is_allowed(&key) => {
                *current = self.create_element(*current, &name, tag, offset, false);
                Opened::Node
            }
            _ => Opened::Unknown,
        })
    }

    fn create_element(
        &mut self,
        parent: NodeId,
        name: &str,
        tag: &StartTag<'_>,
        offset: usize,
        self_closing: bool,
    ) -> NodeId {
        let mut data = ElementData::new(name);
        for (key, value) in scan_attributes(tag.attributes) {
            let key = if self.options.lowercase_tags {
                key.to_ascii_lowercase()
            } else {
                key.to_string()
            };
            let value = match value {
                AttrValue::Text(text) => AttrValue::Text(self.noise.restore(&text).into_owned()),
                other => other,
            };
            if !data.attrs.insert_if_absent(&key, value) {
                self.recover(offset, format!("duplicate attribute '{key}' on <{name}> ignored"));
            }
        }

        let node_type = if self_closing {
            NodeType::SelfClosing(data)
        } else {
            NodeType::Element(data)
        };
        let id = self.tree.alloc(node_type);
        if let Some(node) = self.tree.get_mut(id) {
            node.start = Some(offset);
            if self_closing {
                node.end = Some(offset + tag.raw.len());
            }
        }
        let _ = self.tree.add_child(parent, id);
        id
    }

    fn register(&mut self, id: NodeId, key: &str, raw: &str) {
        if key == "meta" {
            let name = self
                .tree
                .as_element(id)
                .and_then(|e| e.attrs.get_text("name"))
                .map(|name| name.to_ascii_lowercase());
            if let Some(name) = name {
                let duplicate = self.tree.linked(NodeId::ROOT).iter().any(|&other| {
                    self.tree.as_element(other).is_some_and(|e| {
                        e.is("meta")
                            && e.attrs
                                .get_text("name")
                                .is_some_and(|n| n.eq_ignore_ascii_case(&name))
                    })
                });
                if duplicate {
                    let offset = self.tree.get(id).and_then(|node| node.start).unwrap_or_default();
                    self.recover(offset, format!("duplicate <meta name=\"{name}\">"));
                }
            }
        }

        let _ = self.tree.add_linked(NodeId::ROOT, id);
        let event = if key == "meta" {
            ParseEvent::MetaNodeCreated { node: id, raw }
        } else {
            ParseEvent::LinkNodeCreated { node: id, raw }
        };
        self.observers.emit(&event);
    }

    // ========== closing tags ==========

    fn close_tag(
        &mut self,
        current: &mut NodeId,
        scope: NodeId,
        name: &str,
        raw: &str,
        offset: usize,
    ) -> Result<Closed, HtmlError> {
        let end = offset + raw.len();

        if self.is_tag(*current, name) {
            return Ok(self.close_through(current, *current, scope, end));
        }

        // An open ancestor in this scope: close everything up to it.
        if let Some(target) = self.find_open(*current, scope, name) {
            self.report_implicit_closes(*current, target, name, offset);
            return Ok(self.close_through(current, target, scope, end));
        }

        // An ancestor outside this scope: the scope ends here.
        if scope != NodeId::ROOT && self.tree.ancestors(scope).any(|id| self.is_tag(id, name)) {
            self.close_to_scope(*current, scope, offset);
            return Ok(Closed::HandBack);
        }

        let key = name.to_ascii_lowercase();
        if (tags::is_block(&key) && *current != NodeId::ROOT) || !tags::is_allowed(&key) {
            self.recover(offset, format!("unmatched </{name}> kept as text"));
            self.append_text(*current, raw, offset);
            return Ok(Closed::Continue);
        }

        Err(HtmlError::Structural {
            found: name.to_string(),
            expected: self.tree.tag_name(*current).unwrap_or_default().to_string(),
            offset,
        })
    }

    /// Close every element from `current` up to and including `target`.
    fn close_through(
        &mut self,
        current: &mut NodeId,
        target: NodeId,
        scope: NodeId,
        end: usize,
    ) -> Closed {
        let mut open = *current;
        while open != target {
            self.close_element(open, end);
            match self.tree.parent(open) {
                Some(parent) => open = parent,
                None => break,
            }
        }
        self.close_element(target, end);
        *current = self.tree.parent(target).unwrap_or(NodeId::ROOT);
        if target == scope {
            Closed::ScopeClosed
        } else {
            Closed::Continue
        }
    }

    /// Close every open element of a scope, the scope's own element
    /// included (the document node has nothing to close).
    fn close_to_scope(&mut self, current: NodeId, scope: NodeId, end: usize) {
        let mut open = current;
        loop {
            if open == NodeId::ROOT {
                return;
            }
            self.close_element(open, end);
            if open == scope {
                return;
            }
            match self.tree.parent(open) {
                Some(parent) => open = parent,
                None => return,
            }
        }
    }

    fn close_element(&mut self, id: NodeId, end: usize) {
        let is_empty_span = self.tree.get(id).is_some_and(|node| {
            node.children.is_empty()
                && matches!(&node.node_type, NodeType::Element(data) if data.is("span"))
        });
        if let Some(node) = self.tree.get_mut(id) {
            node.end = Some(end);
        }
        if is_empty_span && !self.options.default_span_text.is_empty() {
            let text = self
                .tree
                .alloc(NodeType::Text(self.options.default_span_text.clone()));
            let _ = self.tree.add_child(id, text);
        }
    }

    fn report_implicit_closes(
        &mut self,
        current: NodeId,
        target: NodeId,
        name: &str,
        offset: usize,
    ) {
        let mut open = current;
        while open != target {
            if let Some(tag) = self.tree.tag_name(open)
                && tags::optional_closing(&tag.to_ascii_lowercase()).is_none()
            {
                let message = format!("<{tag}> implicitly closed by </{name}>");
                self.recover(offset, message);
            }
            match self.tree.parent(open) {
                Some(parent) => open = parent,
                None => return,
            }
        }
    }

    // ========== content ==========

    /// Append text, extending a trailing text child if there is one.
    fn append_text(&mut self, parent: NodeId, text: &str, offset: usize) {
        let text = self.noise.restore(text);
        if let Some(last) = self.tree.last_child(parent)
            && let Some(NodeType::Text(existing)) =
                self.tree.get_mut(last).map(|node| &mut node.node_type)
        {
            existing.push_str(&text);
            return;
        }
        let id = self.tree.alloc(NodeType::Text(text.into_owned()));
        if let Some(node) = self.tree.get_mut(id) {
            node.start = Some(offset);
        }
        let _ = self.tree.add_child(parent, id);
    }

    fn append_leaf(&mut self, parent: NodeId, node_type: NodeType, offset: usize, end: usize) {
        let id = self.tree.alloc(node_type);
        if let Some(node) = self.tree.get_mut(id) {
            node.start = Some(offset);
            node.end = Some(end);
        }
        let _ = self.tree.add_child(parent, id);
    }

    // ========== lookups ==========

    fn is_tag(&self, id: NodeId, name: &str) -> bool {
        self.tree.as_element(id).is_some_and(|e| e.is(name))
    }

    /// Nearest element named `name` from `current` up to and including
    /// `scope`.
    fn find_open(&self, current: NodeId, scope: NodeId, name: &str) -> Option<NodeId> {
        let mut open = current;
        loop {
            if self.is_tag(open, name) {
                return Some(open);
            }
            if open == scope {
                return None;
            }
            open = self.tree.parent(open)?;
        }
    }

    /// Nearest element, starting at `id` itself, whose lowercased tag
    /// satisfies `accept`.
    fn find_inclusive(&self, id: NodeId, accept: impl Fn(&str) -> bool) -> Option<NodeId> {
        std::iter::once(id)
            .chain(self.tree.ancestors(id))
            .find(|&open| {
                self.tree
                    .tag_name(open)
                    .is_some_and(|tag| accept(&tag.to_ascii_lowercase()))
            })
    }

    fn recover(&mut self, offset: usize, message: String) {
        let _ = warn_once("HTML Parser", &message);
        self.issues.push(ParseIssue { message, offset });
    }
}

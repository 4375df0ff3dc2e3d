//! The parsed document.
//!
//! A [`Document`] owns the markup it was created from, the prepared buffer
//! the parser reads, and the resulting [`DomTree`]. Parsing is explicit:
//! construct, optionally [`Document::subscribe`], then [`Document::parse`].

use std::fmt;
use std::path::Path;

use bramble_common::source::SourceFile;
use bramble_css::selector::{MatchOptions, parse_selector};
use bramble_dom::{DomTree, ElementData, NodeId};

use crate::error::HtmlError;
use crate::events::{Observers, ParseEvent, ParseObserver};
use crate::noise::NoiseTable;
use crate::nodes::{FormNode, LinkNode, MetaNode};
use crate::options::ParseOptions;
use crate::parser::{ParseIssue, TreeBuilder};

const BYTE_ORDER_MARK: char = '\u{FEFF}';

/// An HTML document and the tree parsed from it.
#[derive(Debug)]
pub struct Document {
    source: String,
    location: Option<String>,
    buffer: String,
    noise: NoiseTable,
    tree: DomTree,
    options: ParseOptions,
    issues: Vec<ParseIssue>,
    observers: Observers,
    charset: Option<String>,
    parsed: bool,
}

impl Document {
    /// Create an unparsed document with default options.
    #[must_use]
    pub fn new(html: impl Into<String>) -> Self {
        Self::with_options(html, ParseOptions::default())
    }

    /// Create an unparsed document.
    #[must_use]
    pub fn with_options(html: impl Into<String>, options: ParseOptions) -> Self {
        let mut source = html.into();
        if source.starts_with(BYTE_ORDER_MARK) {
            let _ = source.drain(..BYTE_ORDER_MARK.len_utf8());
        }
        Self {
            source,
            location: None,
            buffer: String::new(),
            noise: NoiseTable::default(),
            tree: DomTree::new(),
            options,
            issues: Vec::new(),
            observers: Observers::default(),
            charset: None,
            parsed: false,
        }
    }

    /// Create an unparsed document from a loaded source, remembering where
    /// it came from.
    #[must_use]
    pub fn from_source(source: SourceFile, options: ParseOptions) -> Self {
        let location = source.location().display().to_string();
        let mut document = Self::with_options(source.into_content(), options);
        document.location = Some(location);
        document
    }

    /// Read a file and create an unparsed document from it.
    ///
    /// # Errors
    /// Returns [`HtmlError::Load`] if the file cannot be read.
    pub fn from_file(path: impl AsRef<Path>, options: ParseOptions) -> Result<Self, HtmlError> {
        let source = SourceFile::load(path)?;
        Ok(Self::from_source(source, options))
    }

    /// Register an observer for parse events. Observers stay registered
    /// across repeated parses.
    pub fn subscribe(&mut self, observer: impl ParseObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Build the tree.
    ///
    /// Any previous tree is discarded first; handles from an earlier parse
    /// must not be reused. Recoverable problems are collected in
    /// [`Document::issues`]; the others abort the parse and leave an empty
    /// tree.
    ///
    /// # Errors
    /// Returns [`HtmlError::Structural`] for a closing tag nothing can
    /// account for, [`HtmlError::Nesting`] for a form control outside a form
    /// (or an `option` outside a `select`), and
    /// [`HtmlError::SelfClosingAtRoot`] for a `<tag/>` directly in the
    /// document.
    pub fn parse(&mut self) -> Result<(), HtmlError> {
        self.tree = DomTree::new();
        self.issues.clear();
        self.charset = None;
        self.parsed = false;
        self.prepare_buffer();

        self.observers.emit(&ParseEvent::ParseStart {
            length: self.buffer.len(),
        });

        let mut builder = TreeBuilder {
            tree: &mut self.tree,
            noise: &self.noise,
            options: &self.options,
            observers: &mut self.observers,
            issues: &mut self.issues,
        };
        if let Err(err) = builder.run(&self.buffer) {
            self.tree = DomTree::new();
            return Err(err);
        }

        self.charset = self.guess_charset();
        self.parsed = true;
        self.observers.emit(&ParseEvent::ParseEnd {
            nodes: self.tree.len(),
        });
        Ok(())
    }

    fn prepare_buffer(&mut self) {
        let (mut buffer, noise) = if self.options.strip_noise {
            NoiseTable::strip(&self.source)
        } else {
            (self.source.clone(), NoiseTable::default())
        };
        if self.options.strip_linebreaks {
            buffer.retain(|c| c != '\r' && c != '\n');
        }
        self.buffer = buffer;
        self.noise = noise;
    }

    fn guess_charset(&self) -> Option<String> {
        self.meta_nodes()
            .iter()
            .find_map(MetaNode::declared_charset)
    }

    // ========== accessors ==========

    /// Whether the last [`Document::parse`] succeeded.
    #[must_use]
    pub const fn is_parsed(&self) -> bool {
        self.parsed
    }

    /// The markup as given, without a leading byte order mark.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Where the markup was loaded from, if it came from a file.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    /// Length of the markup in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.source.len()
    }

    /// Whether there is no markup at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }

    /// The options this document parses with.
    #[must_use]
    pub const fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// The parsed tree. Empty until [`Document::parse`] succeeds.
    #[must_use]
    pub const fn tree(&self) -> &DomTree {
        &self.tree
    }

    /// The parsed tree, for editing passes.
    pub const fn tree_mut(&mut self) -> &mut DomTree {
        &mut self.tree
    }

    /// The document node.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Problems the last parse recovered from, in the order met.
    #[must_use]
    pub fn issues(&self) -> &[ParseIssue] {
        &self.issues
    }

    // ========== queries ==========

    const fn match_options(&self) -> MatchOptions {
        MatchOptions {
            ignore_name_case: self.options.lowercase_tags,
            ignore_value_case: self.options.case_insensitive_values,
        }
    }

    /// Every element matching `selector`, in document order.
    #[must_use]
    pub fn find(&self, selector: &str) -> Vec<NodeId> {
        self.find_in(NodeId::ROOT, selector)
    }

    /// The `index`-th element matching `selector`; negative indices count
    /// from the end.
    #[must_use]
    pub fn find_nth(&self, selector: &str, index: isize) -> Option<NodeId> {
        parse_selector(selector).find_nth(&self.tree, NodeId::ROOT, index, self.match_options())
    }

    /// Every element below `scope` matching `selector`.
    #[must_use]
    pub fn find_in(&self, scope: NodeId, selector: &str) -> Vec<NodeId> {
        parse_selector(selector).find(&self.tree, scope, self.match_options())
    }

    /// The first element with the given `id`.
    #[must_use]
    pub fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.elements_by_id(id).into_iter().next()
    }

    /// Every element with the given `id`.
    #[must_use]
    pub fn elements_by_id(&self, id: &str) -> Vec<NodeId> {
        self.tree
            .descendants(NodeId::ROOT)
            .filter(|&node| {
                self.tree
                    .as_element(node)
                    .and_then(ElementData::id)
                    .is_some_and(|own| own == id)
            })
            .collect()
    }

    /// The first element with the given tag name.
    #[must_use]
    pub fn element_by_tag_name(&self, tag: &str) -> Option<NodeId> {
        self.elements_by_tag_name(tag).into_iter().next()
    }

    /// Every element with the given tag name.
    #[must_use]
    pub fn elements_by_tag_name(&self, tag: &str) -> Vec<NodeId> {
        let ignore_case = self.options.lowercase_tags;
        self.tree
            .descendants(NodeId::ROOT)
            .filter(|&id| {
                self.tree.tag_name(id).is_some_and(|name| {
                    if ignore_case {
                        name.eq_ignore_ascii_case(tag)
                    } else {
                        name == tag
                    }
                })
            })
            .collect()
    }

    // ========== output ==========

    /// Render the whole tree back to markup.
    #[must_use]
    pub fn to_html(&self) -> String {
        self.tree.to_html(NodeId::ROOT)
    }

    /// Text of a subtree, with `br` rendered as the configured line break.
    #[must_use]
    pub fn text(&self, id: NodeId) -> String {
        self.tree.text_content(id, &self.options.default_line_break_text)
    }

    // ========== head metadata ==========

    /// The charset the document declares in a `meta` tag, or else the
    /// configured target charset.
    #[must_use]
    pub fn charset(&self) -> &str {
        self.charset
            .as_deref()
            .unwrap_or(&self.options.target_charset)
    }

    /// The charset output is meant to be in.
    #[must_use]
    pub fn target_charset(&self) -> &str {
        &self.options.target_charset
    }

    /// Registered `meta` elements, in the order they were parsed.
    #[must_use]
    pub fn meta_nodes(&self) -> Vec<MetaNode<'_>> {
        self.tree
            .linked(NodeId::ROOT)
            .iter()
            .filter_map(|&id| MetaNode::new(&self.tree, id))
            .collect()
    }

    /// The first `meta` whose `name` matches, ignoring ASCII case.
    #[must_use]
    pub fn meta(&self, name: &str) -> Option<MetaNode<'_>> {
        self.meta_nodes().into_iter().find(|meta| {
            meta.name()
                .is_some_and(|own| own.eq_ignore_ascii_case(name))
        })
    }

    /// Registered `link` elements, in the order they were parsed.
    #[must_use]
    pub fn link_nodes(&self) -> Vec<LinkNode<'_>> {
        self.tree
            .linked(NodeId::ROOT)
            .iter()
            .filter_map(|&id| LinkNode::new(&self.tree, id))
            .collect()
    }

    /// Every `form` element, in document order.
    #[must_use]
    pub fn forms(&self) -> Vec<FormNode<'_>> {
        self.tree
            .descendants(NodeId::ROOT)
            .filter_map(|id| FormNode::new(&self.tree, id))
            .collect()
    }

    /// Destroy a node, its subtree and everything linked to it.
    ///
    /// Returns `false` for stale handles and for the document node.
    pub fn destroy(&mut self, id: NodeId) -> bool {
        self.tree.destroy(id)
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_html())
    }
}

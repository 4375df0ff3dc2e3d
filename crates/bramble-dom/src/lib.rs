//! Node tree for the Bramble parser.
//!
//! This crate provides an arena-based tree of parsed markup nodes.
//!
//! # Design
//!
//! Nodes live in generation-checked slots and refer to each other through
//! [`NodeId`] handles, never through references. A parent owns the ordered
//! list of its children, each child records its parent and its position in
//! that list, and nodes may additionally be *linked* to peers for lookup.
//!
//! Destroying a node frees its slot and bumps the slot's generation, so a
//! handle that outlived its node resolves to `None` instead of aliasing
//! whatever node reuses the slot later.

pub mod attributes;
mod serialize;

use std::collections::HashSet;
use std::fmt;

pub use attributes::{AttrValue, Attributes};

/// A generation-checked handle to a node in a [`DomTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    index: usize,
    generation: u32,
}

impl NodeId {
    /// The document node is always in slot 0 and is never freed.
    pub const ROOT: Self = Self {
        index: 0,
        generation: 0,
    };

    /// Slot index of this handle.
    #[must_use]
    pub const fn index(self) -> usize {
        self.index
    }

    /// Generation of the slot when this handle was issued.
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.index)?;
        if self.generation > 0 {
            write!(f, "@{}", self.generation)?;
        }
        Ok(())
    }
}

/// One parsed unit of markup.
#[derive(Debug, Clone)]
pub struct Node {
    /// What the node is, with its payload.
    pub node_type: NodeType,

    /// The owning parent, `None` for the document node and detached nodes.
    pub parent: Option<NodeId>,

    /// Children in document order.
    pub children: Vec<NodeId>,

    /// Position of this node in its parent's `children`.
    pub child_index: usize,

    /// Cross-references to peer nodes. Symmetric, never ownership.
    pub linked: Vec<NodeId>,

    /// Byte offset in the parsed buffer where the node starts.
    pub start: Option<usize>,

    /// Byte offset where the element was closed, explicitly or implicitly.
    pub end: Option<usize>,
}

impl Node {
    fn new(node_type: NodeType) -> Self {
        Self {
            node_type,
            parent: None,
            children: Vec::new(),
            child_index: 0,
            linked: Vec::new(),
            start: None,
            end: None,
        }
    }
}

/// The kind of a node, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum NodeKind {
    /// The document node at the root of every tree.
    Document,
    /// An element with a closing tag (explicit or synthesized).
    Element,
    /// An element that never has children, such as `<br>`.
    SelfClosing,
    /// A run of character data.
    Text,
    /// `<!-- ... -->`.
    Comment,
    /// Any other `<! ... >` declaration, usually `<!DOCTYPE html>`.
    Doctype,
}

/// A node's kind together with its payload.
#[derive(Debug, Clone)]
pub enum NodeType {
    /// The document node.
    Document,
    /// An element that may have children.
    Element(ElementData),
    /// An element that can never have children.
    SelfClosing(ElementData),
    /// Character data, verbatim.
    Text(String),
    /// Comment content between `<!--` and `-->`.
    Comment(String),
    /// Declaration content between `<!` and `>`.
    Doctype(String),
}

impl NodeType {
    /// The payload-free kind.
    #[must_use]
    pub const fn kind(&self) -> NodeKind {
        match self {
            Self::Document => NodeKind::Document,
            Self::Element(_) => NodeKind::Element,
            Self::SelfClosing(_) => NodeKind::SelfClosing,
            Self::Text(_) => NodeKind::Text,
            Self::Comment(_) => NodeKind::Comment,
            Self::Doctype(_) => NodeKind::Doctype,
        }
    }

    /// Element data of an `Element` or `SelfClosing` node.
    #[must_use]
    pub const fn element(&self) -> Option<&ElementData> {
        match self {
            Self::Element(data) | Self::SelfClosing(data) => Some(data),
            _ => None,
        }
    }

    /// Mutable element data of an `Element` or `SelfClosing` node.
    pub const fn element_mut(&mut self) -> Option<&mut ElementData> {
        match self {
            Self::Element(data) | Self::SelfClosing(data) => Some(data),
            _ => None,
        }
    }

    /// Only the document and ordinary elements can own children.
    #[must_use]
    pub const fn accepts_children(&self) -> bool {
        matches!(self, Self::Document | Self::Element(_))
    }
}

/// Tag name and attributes of an element.
#[derive(Debug, Clone, Default)]
pub struct ElementData {
    /// The tag name as stored by the parser (lowercased unless configured
    /// otherwise).
    pub tag_name: String,
    /// Attributes in source order.
    pub attrs: Attributes,
}

impl ElementData {
    /// An element with no attributes.
    #[must_use]
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            attrs: Attributes::new(),
        }
    }

    /// Returns the element's id attribute value if present.
    #[must_use]
    pub fn id(&self) -> Option<std::borrow::Cow<'_, str>> {
        self.attrs.get_text("id")
    }

    /// Returns the class tokens of the element.
    #[must_use]
    pub fn classes(&self) -> &[String] {
        self.attrs.classes()
    }

    /// Case-insensitive tag comparison.
    #[must_use]
    pub fn is(&self, tag: &str) -> bool {
        self.tag_name.eq_ignore_ascii_case(tag)
    }
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// Arena of nodes rooted at a document node.
///
/// Every relationship is a [`NodeId`]. Structural edits go through the
/// methods here so that the parent/child/`child_index` bookkeeping and the
/// symmetry of links always hold.
#[derive(Debug, Clone)]
pub struct DomTree {
    slots: Vec<Slot>,
    free: Vec<usize>,
    live: usize,
}

impl DomTree {
    /// Create a new tree with just the document node.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: vec![Slot {
                generation: 0,
                node: Some(Node::new(NodeType::Document)),
            }],
            free: Vec::new(),
            live: 1,
        }
    }

    /// Get the root document node ID.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by its ID. Stale handles yield `None`.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.slots
            .get(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    /// Get a mutable reference to a node by its ID.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots
            .get_mut(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    /// Whether `id` refers to a live node.
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    /// Number of live nodes, the document node included.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.live
    }

    /// Check if the tree is empty (should always have at least the Document).
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Allocate a new node and return its ID.
    /// The node is not yet attached to the tree.
    pub fn alloc(&mut self, node_type: NodeType) -> NodeId {
        self.live += 1;
        let node = Node::new(node_type);
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index];
            slot.node = Some(node);
            return NodeId {
                index,
                generation: slot.generation,
            };
        }
        self.slots.push(Slot {
            generation: 0,
            node: Some(node),
        });
        NodeId {
            index: self.slots.len() - 1,
            generation: 0,
        }
    }

    fn release(&mut self, id: NodeId) {
        if let Some(slot) = self.slots.get_mut(id.index)
            && slot.generation == id.generation
            && slot.node.take().is_some()
        {
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(id.index);
            self.live -= 1;
        }
    }

    fn can_adopt(&self, parent: NodeId, child: NodeId) -> bool {
        child != NodeId::ROOT
            && child != parent
            && self.contains(child)
            && self
                .get(parent)
                .is_some_and(|node| node.node_type.accepts_children())
            && !self.is_descendant_of(parent, child)
    }

    /// Append `child` as the last child of `parent`.
    ///
    /// A child that already has a different parent is detached from it first.
    /// Returns `false`, changing nothing, when `parent` cannot own children
    /// (self-closing, text, comment or doctype), when `child` is already a
    /// child of `parent`, or when the edit would create a cycle.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        if !self.can_adopt(parent, child) || self.parent(child) == Some(parent) {
            return false;
        }
        if let Some(old_parent) = self.parent(child) {
            let _ = self.remove_child(old_parent, child);
        }

        let Some(parent_node) = self.get_mut(parent) else {
            return false;
        };
        parent_node.children.push(child);
        let index = parent_node.children.len() - 1;

        if let Some(node) = self.get_mut(child) {
            node.parent = Some(parent);
            node.child_index = index;
        }
        true
    }

    /// Insert `child` into `parent` immediately before `reference`.
    ///
    /// Same refusals as [`DomTree::add_child`], plus `reference` must be a
    /// child of `parent`. Moving a node within its own parent is allowed.
    pub fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: NodeId) -> bool {
        if child == reference
            || self.parent(reference) != Some(parent)
            || !self.can_adopt(parent, child)
        {
            return false;
        }
        if let Some(old_parent) = self.parent(child) {
            let _ = self.remove_child(old_parent, child);
        }

        let index = self.child_index(reference).unwrap_or_default();
        let Some(parent_node) = self.get_mut(parent) else {
            return false;
        };
        parent_node.children.insert(index, child);

        if let Some(node) = self.get_mut(child) {
            node.parent = Some(parent);
        }
        self.reindex_children(parent, index);
        true
    }

    /// Detach `child` from `parent`. The child stays allocated.
    ///
    /// Returns `false` if `child` is not a child of `parent`. Later siblings
    /// have their `child_index` shifted down.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        if self.parent(child) != Some(parent) {
            return false;
        }
        let Some(index) = self.child_index(child) else {
            return false;
        };
        let Some(parent_node) = self.get_mut(parent) else {
            return false;
        };
        if parent_node.children.get(index) != Some(&child) {
            return false;
        }
        let _ = parent_node.children.remove(index);

        if let Some(node) = self.get_mut(child) {
            node.parent = None;
            node.child_index = 0;
        }
        self.reindex_children(parent, index);
        true
    }

    fn reindex_children(&mut self, parent: NodeId, from: usize) {
        let Some(tail) = self
            .get(parent)
            .and_then(|node| node.children.get(from..))
            .map(<[NodeId]>::to_vec)
        else {
            return;
        };
        for (offset, child) in tail.into_iter().enumerate() {
            if let Some(node) = self.get_mut(child) {
                node.child_index = from + offset;
            }
        }
    }

    /// Link two nodes to each other.
    ///
    /// Returns `false` if either node is missing, they are the same node, or
    /// they are already linked.
    pub fn add_linked(&mut self, a: NodeId, b: NodeId) -> bool {
        if a == b || !self.contains(a) || !self.contains(b) || self.linked(a).contains(&b) {
            return false;
        }
        if let Some(node) = self.get_mut(a) {
            node.linked.push(b);
        }
        if let Some(node) = self.get_mut(b) {
            node.linked.push(a);
        }
        true
    }

    /// Remove the link between two nodes. Returns `false` if there was none.
    pub fn remove_linked(&mut self, a: NodeId, b: NodeId) -> bool {
        if !self.linked(a).contains(&b) {
            return false;
        }
        if let Some(node) = self.get_mut(a) {
            node.linked.retain(|&peer| peer != b);
        }
        if let Some(node) = self.get_mut(b) {
            node.linked.retain(|&peer| peer != a);
        }
        true
    }

    /// Peers linked to a node.
    #[must_use]
    pub fn linked(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], |node| node.linked.as_slice())
    }

    /// Destroy a node and everything that depends on it.
    ///
    /// The cascade covers the node's subtree and every linked peer (with the
    /// peer's own subtree and links, transitively). Each destroyed node is
    /// unlinked from surviving peers and detached from a surviving parent,
    /// then its slot is freed. The document node is never destroyed: calling
    /// this on it returns `false`, and a cascade that reaches it through a
    /// link only severs that link.
    pub fn destroy(&mut self, id: NodeId) -> bool {
        if id == NodeId::ROOT || !self.contains(id) {
            return false;
        }

        let doomed = self.collect_doomed(id);
        let doomed_set: HashSet<NodeId> = doomed.iter().copied().collect();

        for &node_id in &doomed {
            let survivors: Vec<NodeId> = self
                .linked(node_id)
                .iter()
                .copied()
                .filter(|peer| !doomed_set.contains(peer))
                .collect();
            for peer in survivors {
                let _ = self.remove_linked(node_id, peer);
            }
            if let Some(parent) = self.parent(node_id)
                && !doomed_set.contains(&parent)
            {
                let _ = self.remove_child(parent, node_id);
            }
        }

        for node_id in doomed {
            self.release(node_id);
        }
        true
    }

    fn collect_doomed(&self, id: NodeId) -> Vec<NodeId> {
        let mut doomed = Vec::new();
        let mut seen = HashSet::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if current == NodeId::ROOT || !seen.insert(current) {
                continue;
            }
            let Some(node) = self.get(current) else {
                continue;
            };
            doomed.push(current);
            stack.extend(node.children.iter().rev().copied());
            stack.extend(node.linked.iter().copied());
        }
        doomed
    }

    /// Get the parent of a node.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// Get all children of a node.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], |n| n.children.as_slice())
    }

    /// Position of an attached node among its siblings.
    #[must_use]
    pub fn child_index(&self, id: NodeId) -> Option<usize> {
        self.get(id)
            .filter(|node| node.parent.is_some())
            .map(|node| node.child_index)
    }

    /// Get the first child of a node.
    #[must_use]
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.children.first().copied())
    }

    /// Get the last child of a node.
    #[must_use]
    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.children.last().copied())
    }

    /// The sibling at `child_index + 1` in the parent's children.
    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let index = self.child_index(id)?;
        self.children(parent).get(index + 1).copied()
    }

    /// The sibling at `child_index - 1` in the parent's children.
    #[must_use]
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let index = self.child_index(id)?.checked_sub(1)?;
        self.children(parent).get(index).copied()
    }

    /// Check if `descendant` is a strict descendant of `ancestor`.
    #[must_use]
    pub fn is_descendant_of(&self, descendant: NodeId, ancestor: NodeId) -> bool {
        self.ancestors(descendant).any(|id| id == ancestor)
    }

    /// Iterate over all ancestors of a node, from parent to root.
    #[must_use]
    pub fn ancestors(&self, id: NodeId) -> AncestorIterator<'_> {
        AncestorIterator {
            tree: self,
            current: self.parent(id),
        }
    }

    /// Iterate over preceding siblings (from immediately before to first child).
    #[must_use]
    pub fn preceding_siblings(&self, id: NodeId) -> PrecedingSiblingIterator<'_> {
        PrecedingSiblingIterator {
            tree: self,
            current: self.prev_sibling(id),
        }
    }

    /// Iterate over the subtree below `id` in document order, excluding `id`.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            tree: self,
            stack: self.children(id).iter().rev().copied().collect(),
        }
    }

    /// Get element data if this node is an element (self-closing or not).
    #[must_use]
    pub fn as_element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id).and_then(|n| n.node_type.element())
    }

    /// Mutable element data if this node is an element.
    pub fn as_element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        self.get_mut(id).and_then(|n| n.node_type.element_mut())
    }

    /// Tag name of an element node.
    #[must_use]
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.as_element(id).map(|e| e.tag_name.as_str())
    }

    /// Get text content if this node is a text node.
    #[must_use]
    pub fn as_text(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(|n| match &n.node_type {
            NodeType::Text(s) => Some(s.as_str()),
            _ => None,
        })
    }

    /// Replace the content of a text, comment or doctype node.
    ///
    /// Returns `false` for any other node.
    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) -> bool {
        match self.get_mut(id).map(|n| &mut n.node_type) {
            Some(
                NodeType::Text(content) | NodeType::Comment(content) | NodeType::Doctype(content),
            ) => {
                *content = text.into();
                true
            }
            _ => false,
        }
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over ancestors of a node.
pub struct AncestorIterator<'a> {
    tree: &'a DomTree,
    current: Option<NodeId>,
}

impl Iterator for AncestorIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.tree.parent(id);
        Some(id)
    }
}

/// Iterator over preceding siblings of a node.
pub struct PrecedingSiblingIterator<'a> {
    tree: &'a DomTree,
    current: Option<NodeId>,
}

impl Iterator for PrecedingSiblingIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.tree.prev_sibling(id);
        Some(id)
    }
}

/// Pre-order iterator over a subtree.
pub struct Descendants<'a> {
    tree: &'a DomTree,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        self.stack.extend(self.tree.children(id).iter().rev().copied());
        Some(id)
    }
}

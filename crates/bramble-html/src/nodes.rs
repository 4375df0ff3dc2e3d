//! Typed views over elements with extra meaning: `meta`, `link`, `form`
//! and form controls.
//!
//! The views borrow the tree and read attributes on demand; they add no
//! storage of their own.

use std::borrow::Cow;
use std::collections::HashMap;

use bramble_dom::{DomTree, NodeId, NodeType};

fn attribute<'a>(tree: &'a DomTree, id: NodeId, name: &str) -> Option<Cow<'a, str>> {
    tree.as_element(id).and_then(|e| e.attrs.get_text(name))
}

fn is_element(tree: &DomTree, id: NodeId, tag: &str) -> bool {
    tree.as_element(id).is_some_and(|e| e.is(tag))
}

/// A `<meta>` element.
#[derive(Debug, Clone, Copy)]
pub struct MetaNode<'a> {
    tree: &'a DomTree,
    id: NodeId,
}

impl<'a> MetaNode<'a> {
    /// View `id` as a meta node, if it is one.
    #[must_use]
    pub fn new(tree: &'a DomTree, id: NodeId) -> Option<Self> {
        is_element(tree, id, "meta").then_some(Self { tree, id })
    }

    /// The underlying node.
    #[must_use]
    pub const fn id(&self) -> NodeId {
        self.id
    }

    /// `name`
    #[must_use]
    pub fn name(&self) -> Option<Cow<'a, str>> {
        attribute(self.tree, self.id, "name")
    }

    /// `content`
    #[must_use]
    pub fn content(&self) -> Option<Cow<'a, str>> {
        attribute(self.tree, self.id, "content")
    }

    /// `charset`
    #[must_use]
    pub fn charset(&self) -> Option<Cow<'a, str>> {
        attribute(self.tree, self.id, "charset")
    }

    /// `http-equiv`
    #[must_use]
    pub fn http_equiv(&self) -> Option<Cow<'a, str>> {
        attribute(self.tree, self.id, "http-equiv")
    }

    /// The charset this tag declares, from `charset="..."` or from
    /// `http-equiv="content-type" content="text/html; charset=..."`.
    #[must_use]
    pub fn declared_charset(&self) -> Option<String> {
        if let Some(charset) = self.charset() {
            let charset = charset.trim();
            return (!charset.is_empty()).then(|| charset.to_string());
        }

        if !self
            .http_equiv()
            .is_some_and(|equiv| equiv.eq_ignore_ascii_case("content-type"))
        {
            return None;
        }
        let content = self.content()?;
        let lower = content.to_ascii_lowercase();
        let start = lower.find("charset=")? + "charset=".len();
        let charset = content[start..]
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .trim_matches(|c| c == '"' || c == '\'');
        (!charset.is_empty()).then(|| charset.to_string())
    }
}

/// A `<link>` element.
#[derive(Debug, Clone, Copy)]
pub struct LinkNode<'a> {
    tree: &'a DomTree,
    id: NodeId,
}

impl<'a> LinkNode<'a> {
    /// View `id` as a link node, if it is one.
    #[must_use]
    pub fn new(tree: &'a DomTree, id: NodeId) -> Option<Self> {
        is_element(tree, id, "link").then_some(Self { tree, id })
    }

    /// The underlying node.
    #[must_use]
    pub const fn id(&self) -> NodeId {
        self.id
    }

    /// `rel`
    #[must_use]
    pub fn relation(&self) -> Option<Cow<'a, str>> {
        attribute(self.tree, self.id, "rel")
    }

    /// `href`
    #[must_use]
    pub fn href(&self) -> Option<Cow<'a, str>> {
        attribute(self.tree, self.id, "href")
    }

    /// `media`
    #[must_use]
    pub fn media(&self) -> Option<Cow<'a, str>> {
        attribute(self.tree, self.id, "media")
    }

    /// `type`
    #[must_use]
    pub fn link_type(&self) -> Option<Cow<'a, str>> {
        attribute(self.tree, self.id, "type")
    }

    /// `hreflang`
    #[must_use]
    pub fn hreflang(&self) -> Option<Cow<'a, str>> {
        attribute(self.tree, self.id, "hreflang")
    }

    /// `sizes`
    #[must_use]
    pub fn sizes(&self) -> Option<Cow<'a, str>> {
        attribute(self.tree, self.id, "sizes")
    }

    /// Whether `rel` contains the token `stylesheet`.
    #[must_use]
    pub fn is_stylesheet(&self) -> bool {
        self.relation().is_some_and(|rel| {
            rel.split_whitespace()
                .any(|token| token.eq_ignore_ascii_case("stylesheet"))
        })
    }
}

/// Tags that carry a value submitted with their form.
const CONTROL_TAGS: [&str; 3] = ["input", "select", "textarea"];

/// Input types that are never part of the submitted values.
const BUTTON_TYPES: [&str; 4] = ["submit", "button", "reset", "image"];

/// A `<form>` element.
#[derive(Debug, Clone, Copy)]
pub struct FormNode<'a> {
    tree: &'a DomTree,
    id: NodeId,
}

impl<'a> FormNode<'a> {
    /// View `id` as a form, if it is one.
    #[must_use]
    pub fn new(tree: &'a DomTree, id: NodeId) -> Option<Self> {
        is_element(tree, id, "form").then_some(Self { tree, id })
    }

    /// The underlying node.
    #[must_use]
    pub const fn id(&self) -> NodeId {
        self.id
    }

    /// `action`
    #[must_use]
    pub fn action(&self) -> Option<Cow<'a, str>> {
        attribute(self.tree, self.id, "action")
    }

    /// `method`, lowercased, defaulting to `get`.
    #[must_use]
    pub fn method(&self) -> String {
        attribute(self.tree, self.id, "method")
            .map_or_else(|| "get".to_string(), |method| method.to_ascii_lowercase())
    }

    /// `name`
    #[must_use]
    pub fn name(&self) -> Option<Cow<'a, str>> {
        attribute(self.tree, self.id, "name")
    }

    /// `enctype`
    #[must_use]
    pub fn enctype(&self) -> Option<Cow<'a, str>> {
        attribute(self.tree, self.id, "enctype")
    }

    /// `target`
    #[must_use]
    pub fn target(&self) -> Option<Cow<'a, str>> {
        attribute(self.tree, self.id, "target")
    }

    /// `accept-charset`
    #[must_use]
    pub fn accept_charset(&self) -> Option<Cow<'a, str>> {
        attribute(self.tree, self.id, "accept-charset")
    }

    /// `autocomplete`
    #[must_use]
    pub fn autocomplete(&self) -> Option<Cow<'a, str>> {
        attribute(self.tree, self.id, "autocomplete")
    }

    /// Whether `novalidate` is set.
    #[must_use]
    pub fn novalidate(&self) -> bool {
        self.tree
            .as_element(self.id)
            .is_some_and(|e| e.attrs.contains("novalidate"))
    }

    /// `input`, `select` and `textarea` elements in the form, in document
    /// order.
    #[must_use]
    pub fn input_nodes(&self) -> Vec<InputNode<'a>> {
        let tree = self.tree;
        tree.descendants(self.id)
            .filter_map(|id| InputNode::new(tree, id))
            .collect()
    }

    /// Submitted values by control name.
    ///
    /// Checkboxes and radio buttons count only when checked (value `on` if
    /// they have none), a textarea submits its text, a select submits its
    /// selected option or else its first one. Unnamed controls and buttons
    /// are skipped. A later control overrides an earlier one of the same
    /// name.
    #[must_use]
    pub fn input_values(&self) -> HashMap<String, String> {
        let mut values = HashMap::new();
        for input in self.input_nodes() {
            let Some(name) = input.name() else {
                continue;
            };
            if let Some(value) = input.submitted_value() {
                let _ = values.insert(name.into_owned(), value);
            }
        }
        values
    }

    /// Write `values` into the named controls of `form`.
    ///
    /// Text-like inputs get a new `value` attribute, checkboxes and radio
    /// buttons are checked when the value matches theirs and unchecked
    /// otherwise, a textarea's text is replaced, and a select marks the
    /// matching option as selected. Returns how many controls were updated.
    pub fn set_input_values(
        tree: &mut DomTree,
        form: NodeId,
        values: &HashMap<String, String>,
    ) -> usize {
        let Some(view) = FormNode::new(tree, form) else {
            return 0;
        };
        let targets: Vec<(NodeId, String, String)> = view
            .input_nodes()
            .iter()
            .filter_map(|input| {
                let name = input.name()?;
                let value = values.get(name.as_ref())?;
                Some((input.id(), input.tag(), value.clone()))
            })
            .collect();

        let mut updated = 0;
        for (id, tag, value) in targets {
            let changed = match tag.as_str() {
                "textarea" => replace_text(tree, id, &value),
                "select" => select_option(tree, id, &value),
                _ => set_input(tree, id, &value),
            };
            if changed {
                updated += 1;
            }
        }
        updated
    }
}

fn replace_text(tree: &mut DomTree, id: NodeId, value: &str) -> bool {
    let children = tree.children(id).to_vec();
    for child in children {
        let _ = tree.destroy(child);
    }
    let text = tree.alloc(NodeType::Text(value.to_string()));
    tree.add_child(id, text)
}

fn select_option(tree: &mut DomTree, id: NodeId, value: &str) -> bool {
    let options = options_of(tree, id);
    let Some(chosen) = options
        .iter()
        .copied()
        .find(|&option| option_value(tree, option) == value)
    else {
        return false;
    };
    for option in options {
        if let Some(element) = tree.as_element_mut(option) {
            if option == chosen {
                element.attrs.set("selected", true);
            } else {
                let _ = element.attrs.remove("selected");
            }
        }
    }
    true
}

fn set_input(tree: &mut DomTree, id: NodeId, value: &str) -> bool {
    let Some(input) = InputNode::new(tree, id) else {
        return false;
    };
    let kind = input.input_type();
    let own_value = input.value().map_or_else(|| "on".to_string(), Cow::into_owned);
    let Some(element) = tree.as_element_mut(id) else {
        return false;
    };
    if kind == "checkbox" || kind == "radio" {
        if own_value == value {
            element.attrs.set("checked", true);
        } else {
            let _ = element.attrs.remove("checked");
        }
    } else {
        element.attrs.set("value", value);
    }
    true
}

fn options_of(tree: &DomTree, select: NodeId) -> Vec<NodeId> {
    tree.descendants(select)
        .filter(|&option| is_element(tree, option, "option"))
        .collect()
}

fn option_value(tree: &DomTree, option: NodeId) -> String {
    attribute(tree, option, "value")
        .map_or_else(|| tree.text_content(option, "").trim().to_string(), Cow::into_owned)
}

/// An `input`, `select` or `textarea` element.
#[derive(Debug, Clone, Copy)]
pub struct InputNode<'a> {
    tree: &'a DomTree,
    id: NodeId,
}

impl<'a> InputNode<'a> {
    /// View `id` as a form control, if it is one.
    #[must_use]
    pub fn new(tree: &'a DomTree, id: NodeId) -> Option<Self> {
        CONTROL_TAGS
            .iter()
            .any(|tag| is_element(tree, id, tag))
            .then_some(Self { tree, id })
    }

    /// The underlying node.
    #[must_use]
    pub const fn id(&self) -> NodeId {
        self.id
    }

    /// Lowercased tag name: `input`, `select` or `textarea`.
    #[must_use]
    pub fn tag(&self) -> String {
        self.tree
            .tag_name(self.id)
            .unwrap_or_default()
            .to_ascii_lowercase()
    }

    /// `name`
    #[must_use]
    pub fn name(&self) -> Option<Cow<'a, str>> {
        attribute(self.tree, self.id, "name")
    }

    /// `type`, lowercased. Inputs default to `text`; a select or textarea
    /// reports its tag name.
    #[must_use]
    pub fn input_type(&self) -> String {
        let tag = self.tag();
        if tag != "input" {
            return tag;
        }
        attribute(self.tree, self.id, "type")
            .map_or_else(|| "text".to_string(), |kind| kind.to_ascii_lowercase())
    }

    /// `value`
    #[must_use]
    pub fn value(&self) -> Option<Cow<'a, str>> {
        attribute(self.tree, self.id, "value")
    }

    /// Whether `checked` is set.
    #[must_use]
    pub fn is_checked(&self) -> bool {
        self.tree
            .as_element(self.id)
            .is_some_and(|e| e.attrs.contains("checked"))
    }

    /// The form this control belongs to: its nearest `form` ancestor.
    #[must_use]
    pub fn form(&self) -> Option<FormNode<'a>> {
        let tree = self.tree;
        tree.ancestors(self.id)
            .find_map(|ancestor| FormNode::new(tree, ancestor))
    }

    /// The value this control contributes to its form, if any.
    #[must_use]
    pub fn submitted_value(&self) -> Option<String> {
        match self.input_type().as_str() {
            "textarea" => Some(self.tree.text_content(self.id, "\n")),
            "select" => {
                let tree = self.tree;
                let options = options_of(tree, self.id);
                let chosen = options
                    .iter()
                    .copied()
                    .find(|&option| {
                        tree.as_element(option)
                            .is_some_and(|e| e.attrs.contains("selected"))
                    })
                    .or_else(|| options.first().copied())?;
                Some(option_value(tree, chosen))
            }
            "checkbox" | "radio" => self
                .is_checked()
                .then(|| self.value().map_or_else(|| "on".to_string(), Cow::into_owned)),
            kind if BUTTON_TYPES.contains(&kind) => None,
            _ => Some(self.value().map(Cow::into_owned).unwrap_or_default()),
        }
    }
}


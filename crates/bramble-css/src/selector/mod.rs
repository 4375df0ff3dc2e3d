//! Selector representation and matching.
//!
//! A [`Selector`] is a list of alternatives. Each alternative is a chain of
//! [`SelectorStep`]s evaluated left to right: the first step searches below
//! the query scope, each later step searches below the matches of the one
//! before it.

mod parser;

use std::borrow::Cow;
use std::collections::HashSet;

use bramble_dom::attributes::CLASS;
use bramble_dom::{DomTree, ElementData, NodeId};

pub use parser::parse_selector;

/// Pseudo-attribute comparing against a node's text content.
pub const PLAINTEXT: &str = "plaintext";

/// Comparison between an attribute value and the value in a selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display, strum_macros::EnumString)]
pub enum Operator {
    /// `[attr=v]` - exact match.
    #[strum(serialize = "=")]
    Equals,
    /// `[attr!=v]` - present but different.
    #[strum(serialize = "!=")]
    NotEquals,
    /// `[attr^=v]` - starts with.
    #[strum(serialize = "^=")]
    Prefix,
    /// `[attr$=v]` - ends with.
    #[strum(serialize = "$=")]
    Suffix,
    /// `[attr*=v]` - contains, ignoring ASCII case.
    #[strum(serialize = "*=")]
    Contains,
}

/// One condition on an element's attributes.
///
/// `#main` is `id = main`, `.nav` is `class = nav`, `[!href]` is a negated
/// presence test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeTest {
    /// Attribute name, or [`PLAINTEXT`].
    pub key: String,
    /// Value to compare against. `None`, empty, or `*` only test presence.
    pub value: Option<String>,
    /// How `value` is compared.
    pub operator: Operator,
    /// `[!key]`: the attribute must be absent. The value is ignored.
    pub negated: bool,
}

/// One step of a descendant chain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectorStep {
    /// Required tag name. `None` matches any element.
    pub tag: Option<String>,
    /// Conditions that must all hold.
    pub tests: Vec<AttributeTest>,
    /// `tag[n]`: pick the n-th (1-based) matching direct child instead of
    /// searching all descendants.
    pub position: Option<usize>,
}

/// Matching behaviour that depends on how the document was parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchOptions {
    /// Compare tag and attribute names ignoring ASCII case.
    pub ignore_name_case: bool,
    /// Compare attribute values ignoring ASCII case.
    pub ignore_value_case: bool,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            ignore_name_case: true,
            ignore_value_case: false,
        }
    }
}

/// A parsed `find` query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selector {
    /// Comma separated alternatives, each a chain of steps.
    pub alternatives: Vec<Vec<SelectorStep>>,
}

impl Selector {
    /// A selector with no steps matches nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.alternatives.iter().all(Vec::is_empty)
    }

    /// Every node below `scope` matched by any alternative, without
    /// duplicates, in document order.
    #[must_use]
    pub fn find(&self, tree: &DomTree, scope: NodeId, options: MatchOptions) -> Vec<NodeId> {
        let mut found = HashSet::new();
        for steps in self.alternatives.iter().filter(|steps| !steps.is_empty()) {
            let mut heads = vec![scope];
            for step in steps {
                heads = step.seek(tree, &heads, options);
                if heads.is_empty() {
                    break;
                }
            }
            found.extend(heads);
        }

        if found.is_empty() {
            return Vec::new();
        }
        tree.descendants(scope)
            .filter(|id| found.contains(id))
            .collect()
    }

    /// The `index`-th match. Negative indices count from the end, `-1`
    /// being the last match. Out of range yields `None`.
    #[must_use]
    pub fn find_nth(
        &self,
        tree: &DomTree,
        scope: NodeId,
        index: isize,
        options: MatchOptions,
    ) -> Option<NodeId> {
        let found = self.find(tree, scope, options);
        let resolved = if index < 0 {
            found.len().checked_sub(index.unsigned_abs())?
        } else {
            usize::try_from(index).ok()?
        };
        found.get(resolved).copied()
    }
}

impl SelectorStep {
    fn seek(&self, tree: &DomTree, heads: &[NodeId], options: MatchOptions) -> Vec<NodeId> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for &head in heads {
            if let Some(position) = self.position {
                let nth = position.checked_sub(1).and_then(|skip| {
                    tree.children(head)
                        .iter()
                        .copied()
                        .filter(|&child| self.matches(tree, child, options))
                        .nth(skip)
                });
                if let Some(id) = nth
                    && seen.insert(id)
                {
                    out.push(id);
                }
            } else {
                for id in tree.descendants(head) {
                    if self.matches(tree, id, options) && seen.insert(id) {
                        out.push(id);
                    }
                }
            }
        }
        out
    }

    /// Whether `id` is an element satisfying the tag and every test.
    #[must_use]
    pub fn matches(&self, tree: &DomTree, id: NodeId, options: MatchOptions) -> bool {
        let Some(element) = tree.as_element(id) else {
            return false;
        };
        if let Some(tag) = &self.tag
            && !names_equal(tag, &element.tag_name, options)
        {
            return false;
        }
        self.tests
            .iter()
            .all(|test| test.matches(tree, id, element, options))
    }
}

impl AttributeTest {
    fn matches(
        &self,
        tree: &DomTree,
        id: NodeId,
        element: &ElementData,
        options: MatchOptions,
    ) -> bool {
        let actual = if self.key == PLAINTEXT {
            Some(Cow::Owned(tree.text_content(id, "")))
        } else {
            lookup(element, &self.key, options)
        };

        if self.negated {
            return actual.is_none();
        }
        let Some(actual) = actual else {
            return false;
        };
        let Some(expected) = self
            .value
            .as_deref()
            .filter(|value| !value.is_empty() && *value != "*")
        else {
            return true;
        };

        if self.compare(&actual, expected, options) {
            return true;
        }
        // "a b" fails `.a` as a whole string, so retry per class token.
        self.key == CLASS
            && element
                .classes()
                .iter()
                .any(|token| self.compare(token, expected, options))
    }

    fn compare(&self, actual: &str, expected: &str, options: MatchOptions) -> bool {
        let fold = options.ignore_value_case || self.operator == Operator::Contains;
        let (actual, expected) = if fold {
            (
                Cow::Owned(actual.to_ascii_lowercase()),
                Cow::Owned(expected.to_ascii_lowercase()),
            )
        } else {
            (Cow::Borrowed(actual), Cow::Borrowed(expected))
        };
        match self.operator {
            Operator::Equals => actual == expected,
            Operator::NotEquals => actual != expected,
            Operator::Prefix => actual.starts_with(expected.as_ref()),
            Operator::Suffix => actual.ends_with(expected.as_ref()),
            Operator::Contains => actual.contains(expected.as_ref()),
        }
    }
}

fn names_equal(wanted: &str, actual: &str, options: MatchOptions) -> bool {
    if options.ignore_name_case {
        wanted.eq_ignore_ascii_case(actual)
    } else {
        wanted == actual
    }
}

fn lookup<'a>(element: &'a ElementData, key: &str, options: MatchOptions) -> Option<Cow<'a, str>> {
    if !options.ignore_name_case {
        return element.attrs.get_text(key);
    }
    element
        .attrs
        .iter()
        .find(|(name, value)| name.eq_ignore_ascii_case(key) && value.is_present())
        .map(|(_, value)| value.as_text())
}

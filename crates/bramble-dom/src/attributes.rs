//! Per-element attribute table.
//!
//! Attributes keep their source order. The `class` attribute is special: it
//! holds a list of distinct tokens, and every assignment merges into that list
//! instead of replacing it.

use std::borrow::Cow;
use std::fmt;

/// Name of the attribute whose values are merged as a token list.
pub const CLASS: &str = "class";

/// The value of one attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    /// A plain string value, `name="value"`.
    Text(String),
    /// Whitespace separated tokens. Only used for `class`.
    MultiToken(Vec<String>),
    /// A boolean attribute. `Flag(true)` renders as the bare name,
    /// `Flag(false)` is treated as absent.
    Flag(bool),
}

impl AttrValue {
    /// String view of the value. Tokens are joined by a single space and a
    /// flag reads as the empty string.
    #[must_use]
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            Self::Text(text) => Cow::Borrowed(text),
            Self::MultiToken(tokens) => Cow::Owned(tokens.join(" ")),
            Self::Flag(_) => Cow::Borrowed(""),
        }
    }

    /// Whether the attribute counts as set.
    #[must_use]
    pub const fn is_present(&self) -> bool {
        !matches!(self, Self::Flag(false))
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

impl From<Vec<String>> for AttrValue {
    fn from(value: Vec<String>) -> Self {
        Self::MultiToken(value)
    }
}

/// Ordered attribute list of one element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    entries: Vec<(String, AttrValue)>,
}

impl Attributes {
    /// An empty table.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|(key, _)| key == name)
    }

    /// Raw value of `name`, including `Flag(false)` entries.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.position(name).map(|index| &self.entries[index].1)
    }

    /// String view of `name` if it is present.
    #[must_use]
    pub fn get_text(&self, name: &str) -> Option<Cow<'_, str>> {
        self.get(name)
            .filter(|value| value.is_present())
            .map(AttrValue::as_text)
    }

    /// Whether `name` is present. A `Flag(false)` entry is not.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some_and(AttrValue::is_present)
    }

    /// Assign `value` to `name`.
    ///
    /// Any existing value is replaced in place, keeping its position. For
    /// `class` the new tokens are merged into the existing list instead; a
    /// bare `class` flag contributes no tokens.
    ///
    /// # Panics
    /// Panics if `name` is empty or contains whitespace.
    pub fn set(&mut self, name: &str, value: impl Into<AttrValue>) {
        validate_name(name);
        let value = value.into();
        if name == CLASS {
            self.merge_classes(value);
            return;
        }
        match self.position(name) {
            Some(index) => self.entries[index].1 = value,
            None => self.entries.push((name.to_owned(), value)),
        }
    }

    /// Assign `value` unless `name` is already set. `class` always merges.
    ///
    /// Returns `false` when the value was dropped because the name was taken.
    ///
    /// # Panics
    /// Panics if `name` is empty or contains whitespace.
    pub fn insert_if_absent(&mut self, name: &str, value: impl Into<AttrValue>) -> bool {
        if name != CLASS && self.position(name).is_some() {
            return false;
        }
        self.set(name, value);
        true
    }

    /// Remove `name`, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<AttrValue> {
        self.position(name).map(|index| self.entries.remove(index).1)
    }

    /// Class tokens in assignment order.
    #[must_use]
    pub fn classes(&self) -> &[String] {
        match self.get(CLASS) {
            Some(AttrValue::MultiToken(tokens)) => tokens,
            _ => &[],
        }
    }

    /// Whether `class` holds the token `name`.
    #[must_use]
    pub fn has_class(&self, name: &str) -> bool {
        self.classes().iter().any(|token| token == name)
    }

    /// Merge one or more whitespace separated class tokens.
    pub fn add_class(&mut self, tokens: &str) {
        self.merge_classes(AttrValue::Text(tokens.to_owned()));
    }

    /// Replace the class list outright.
    pub fn set_classes<I, S>(&mut self, tokens: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let _ = self.remove(CLASS);
        self.merge_classes(AttrValue::MultiToken(
            tokens.into_iter().map(Into::into).collect(),
        ));
    }

    fn merge_classes(&mut self, value: AttrValue) {
        let incoming: Vec<String> = match value {
            AttrValue::Text(text) => text.split_whitespace().map(str::to_owned).collect(),
            AttrValue::MultiToken(tokens) => tokens
                .iter()
                .flat_map(|token| token.split_whitespace())
                .map(str::to_owned)
                .collect(),
            // A bare `class` attribute.
            AttrValue::Flag(_) => Vec::new(),
        };

        let index = if let Some(index) = self.position(CLASS) {
            index
        } else {
            self.entries
                .push((CLASS.to_owned(), AttrValue::MultiToken(Vec::new())));
            self.entries.len() - 1
        };

        let slot = &mut self.entries[index].1;
        let mut tokens = match std::mem::replace(slot, AttrValue::Flag(true)) {
            AttrValue::MultiToken(tokens) => tokens,
            AttrValue::Text(text) => text.split_whitespace().map(str::to_owned).collect(),
            AttrValue::Flag(_) => Vec::new(),
        };
        for token in incoming {
            if !tokens.contains(&token) {
                tokens.push(token);
            }
        }
        *slot = AttrValue::MultiToken(tokens);
    }

    /// Attributes in source order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    /// Number of entries, including `Flag(false)` ones.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entries.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Renders as it appears inside a start tag: ` name="value"` per attribute,
/// with a leading space. Values containing `"` but no `'` are single-quoted;
/// values containing both are double-quoted with `"` written as `&quot;`.
impl fmt::Display for Attributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in self.iter() {
            match value {
                AttrValue::Flag(false) => {}
                AttrValue::Flag(true) => write!(f, " {name}")?,
                AttrValue::Text(_) | AttrValue::MultiToken(_) => {
                    let text = value.as_text();
                    match (text.contains('"'), text.contains('\'')) {
                        (true, false) => write!(f, " {name}='{text}'")?,
                        (true, true) => write!(f, " {name}=\"{}\"", text.replace('"', "&quot;"))?,
                        _ => write!(f, " {name}=\"{text}\"")?,
                    }
                }
            }
        }
        Ok(())
    }
}

fn validate_name(name: &str) {
    assert!(!name.is_empty(), "attribute name must not be empty");
    assert!(
        !name.chars().any(char::is_whitespace),
        "attribute name {name:?} contains whitespace"
    );
}

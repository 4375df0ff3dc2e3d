//! Parse lifecycle notifications.
//!
//! Hosts that want to react while a document is built (collecting
//! stylesheets from `link` tags, switching charset on a `meta`) register a
//! [`ParseObserver`] with [`crate::Document::subscribe`]. Nothing is required
//! to listen.

use bramble_dom::NodeId;
use strum_macros::Display;

/// Something that happened while parsing.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum ParseEvent<'a> {
    /// Parsing is about to begin on the prepared buffer.
    ParseStart {
        /// Prepared buffer length in bytes.
        length: usize,
    },
    /// A `meta` node was created and registered with the document.
    MetaNodeCreated {
        /// The new node.
        node: NodeId,
        /// The tag as written.
        raw: &'a str,
    },
    /// A `link` node was created and registered with the document.
    LinkNodeCreated {
        /// The new node.
        node: NodeId,
        /// The tag as written.
        raw: &'a str,
    },
    /// Parsing finished successfully.
    ParseEnd {
        /// Live nodes in the tree, the document node included.
        nodes: usize,
    },
}

/// Receives [`ParseEvent`]s.
pub trait ParseObserver {
    /// Called for every event, in the order events happen.
    fn on_event(&mut self, event: &ParseEvent<'_>);
}

impl<F> ParseObserver for F
where
    F: FnMut(&ParseEvent<'_>),
{
    fn on_event(&mut self, event: &ParseEvent<'_>) {
        self(event);
    }
}

/// Registered observers, notified in registration order.
#[derive(Default)]
pub(crate) struct Observers {
    observers: Vec<Box<dyn ParseObserver>>,
}

impl Observers {
    pub(crate) fn push(&mut self, observer: Box<dyn ParseObserver>) {
        self.observers.push(observer);
    }

    pub(crate) fn emit(&mut self, event: &ParseEvent<'_>) {
        for observer in &mut self.observers {
            observer.on_event(event);
        }
    }
}

impl std::fmt::Debug for Observers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observers")
            .field("count", &self.observers.len())
            .finish()
    }
}

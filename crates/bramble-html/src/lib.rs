//! Forgiving single-pass HTML parser for the Bramble toolkit.
//!
//! # Scope
//!
//! This crate implements:
//! - **Lexer** ([`lexer`]): one lexical unit at a time from a byte cursor,
//!   with quote-aware attribute scanning
//! - **Noise table** ([`noise`]): script, style, comment and CDATA bodies
//!   set aside before tokenizing and restored verbatim into the tree
//! - **Tree builder** ([`parser`]): optional closing tags, block-tag
//!   walk-up, literal-text fallback for stray closing tags, and nested
//!   parse scopes for forms
//! - **Document** ([`document`]): buffer preparation, queries, charset
//!   guess, meta/link registry and parse events
//! - **Node views** ([`nodes`]): `meta`, `link`, `form` and form controls
//!
//! # Not Implemented
//!
//! - WHATWG tree construction (insertion modes, foster parenting, adoption
//!   agency)
//! - Character reference decoding
//! - Encoding sniffing beyond a `meta` charset guess

/// Parsed documents.
pub mod document;
/// Parse errors.
pub mod error;
/// Parse lifecycle notifications.
pub mod events;
/// Lexical units of the prepared buffer.
pub mod lexer;
/// Typed views over special elements.
pub mod nodes;
/// Noise stripping and restoration.
pub mod noise;
/// Parser configuration.
pub mod options;
/// Tree construction.
pub mod parser;
/// Static tag tables.
pub mod tags;

pub use document::Document;
pub use error::HtmlError;
pub use events::{ParseEvent, ParseObserver};
pub use noise::NoiseTable;
pub use nodes::{FormNode, InputNode, LinkNode, MetaNode};
pub use options::ParseOptions;
pub use parser::ParseIssue;

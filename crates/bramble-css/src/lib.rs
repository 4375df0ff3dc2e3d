//! Selector queries for the Bramble parser.
//!
//! # Scope
//!
//! This crate implements the `find` query language used against parsed
//! documents:
//! - **Steps** - tag names, `*`, `#id`, `.class` and bracketed attribute tests
//!   (`[attr]`, `[!attr]`, `[attr=v]`, `[attr!=v]`, `[attr^=v]`, `[attr$=v]`,
//!   `[attr*=v]`)
//! - **Descendant chains** - steps separated by whitespace or `/`
//! - **Alternatives** - chains separated by `,`, merged in document order
//! - **Positional steps** - `li[2]`, the second `li` child of each candidate
//!
//! # Not Yet Implemented
//!
//! - Child and sibling combinators (`>`, `+`, `~`)
//! - Pseudo-classes

pub mod selector;

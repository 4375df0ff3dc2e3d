//! Common utilities for the Bramble parser.
//!
//! This crate provides shared infrastructure used by all parser components:
//! - **Warning System** - colored terminal output for recovered markup errors
//! - **Sources** - loading markup files from disk with their location

pub mod source;
pub mod warning;

//! Low-level binary reading infrastructure.
//!
//! This module provides the [`crate::file::Parser`] type, a cursor-based binary data
//! reader used by the class-file codec and the metadata pruner. Class files are
//! big-endian throughout, so the parser only offers big-endian primitives.

mod parser;

pub use parser::Parser;

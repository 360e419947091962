#![deny(missing_docs)]
#![allow(dead_code)]

//! # jarshake
//!
//! A tree-shaker for JVM class archives. Given a classpath of compiled class
//! archives and a set of *root* declarations that must remain callable and
//! reflectable, `jarshake` computes the minimal closure of classes, fields and
//! methods transitively reachable from those roots, then rewrites the classpath
//! into a new archive containing only that closure, with every retained method
//! given a synthetically valid trivial body.
//!
//! ## Features
//!
//! - **Worklist reachability analysis** - classes, fields and methods tracked as
//!   separate frontiers; edges discovered by deep inspection of class headers,
//!   generic signatures, annotations (including nested element values), thrown
//!   exceptions, nesting relationships, record components and method bodies
//! - **Owned class-file codec** - decoding and re-encoding with a freshly built
//!   constant pool, no JVM required
//! - **Stub synthesis** - minimal legal bodies per return category, super-calling
//!   constructors, and a synthetic default constructor where every original
//!   constructor was pruned
//! - **Metadata consistency** - the structured declaration blob some toolchains
//!   attach to classes is pruned to match the retained member set, fail-open
//! - **Forgiving by design** - unresolvable references are dead ends, malformed
//!   signatures and annotations contribute nothing, and only missing or corrupt
//!   required inputs are fatal
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use jarshake::prelude::*;
//! use std::path::{Path, PathBuf};
//!
//! // Index the classpath; the first archive containing a class wins.
//! let index = ClasspathIndex::new(&[PathBuf::from("app.jar"), PathBuf::from("lib.jar")])?;
//!
//! // Keep everything reachable from one method root.
//! let roots = RootSignature::parse_list("com/example/Api#run()V");
//! let summary = shake(&index, &roots, Path::new("out/app-min.jar"))?;
//!
//! println!(
//!     "kept {} classes, {} fields, {} methods",
//!     summary.classes, summary.fields, summary.methods
//! );
//! # Ok::<(), jarshake::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`classpath`] - archive indexing and lazy class resolution
//!   ([`ClasspathIndex`], the [`ClassResolver`] seam)
//! - [`classfile`] - the owned binary codec ([`classfile::ClassModel`] and friends)
//! - [`shake`](mod@shake) - the pipeline: [`shake::analyze`], [`shake::rewrite`],
//!   [`shake::write_archive`], and the one-call [`shake::shake`]
//! - [`file`] - bounds-checked byte cursor shared by the codec
//! - [`Error`] and [`Result`] - error handling
//!
//! The analysis is single-threaded by design (three shared worklists, no
//! suspension points); class rewriting, a pure per-class function, fans out with
//! `rayon`. The repository's index is built once and read-only afterwards, so
//! concurrent resolution is safe.

#[macro_use]
mod error;

pub mod classfile;
pub mod classpath;
pub mod file;
pub mod prelude;
pub mod shake;

#[cfg(test)]
pub(crate) mod testutil;

pub use error::Error;

pub use classpath::{ClassResolver, ClasspathIndex};
pub use shake::{
    analyze, rewrite, shake, write_archive, KeepSets, MemberKey, RootSignature, ShakeSummary,
};

/// The result type used throughout jarshake.
pub type Result<T> = std::result::Result<T, Error>;

//! # jarshake Prelude
//!
//! Convenient re-exports of the types and functions most runs of the shaker
//! touch. Import this module to get the whole pipeline in one line.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all jarshake operations
pub use crate::Error;

/// The result type used throughout jarshake
pub use crate::Result;

// ================================================================================================
// Pipeline Entry Points
// ================================================================================================

/// One-call pipeline: analyze, rewrite, emit
pub use crate::shake::shake;

/// Reachability analysis
pub use crate::shake::analyze;

/// Class rewriting against the keep sets
pub use crate::shake::rewrite;

/// Output archive emission
pub use crate::shake::write_archive;

/// Run summary counts
pub use crate::shake::ShakeSummary;

// ================================================================================================
// Repository and Roots
// ================================================================================================

/// The archive-backed class repository
pub use crate::classpath::ClasspathIndex;

/// The resolution seam implemented by any class source
pub use crate::classpath::ClassResolver;

/// Parsed root declarations
pub use crate::shake::RootSignature;

/// Analysis results
pub use crate::shake::{KeepSets, MemberKey};

// ================================================================================================
// Class Model
// ================================================================================================

/// The structured decode of one class
pub use crate::classfile::{ClassModel, FieldModel, MethodModel};

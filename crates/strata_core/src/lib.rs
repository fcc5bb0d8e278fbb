//! strata_core: Core utilities for the strata build-description compiler.
//!
//! Provides text ranges, line maps, source locations, and string interning
//! used throughout the evaluation pipeline.

pub mod intern;
pub mod text;

// Re-export commonly used types
pub use intern::{InternedString, StringInterner};
pub use text::{LineMap, SourceLocation, TextRange};

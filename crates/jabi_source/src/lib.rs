//! Source text ownership and byte-span tracking for Java compilation units.
//!
//! The [`SourceDb`] owns the text of every compilation unit in a batch. Syntax
//! trees and diagnostics refer back into it through [`FileId`] and [`Span`].

#![warn(missing_docs)]

pub mod source_db;
pub mod span;

pub use source_db::{ResolvedSpan, SourceDb, SourceFile};
pub use span::{FileId, Span};

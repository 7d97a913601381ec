//! Structured diagnostics for parsing and ABI-stub generation.
//!
//! A [`Diagnostic`] carries a [`Severity`], a [`DiagnosticCode`], a primary
//! span and optional labels/notes. Worker threads emit into a shared
//! [`DiagnosticSink`]; the driver renders them with a [`DiagnosticRenderer`].

#![warn(missing_docs)]

pub mod code;
pub mod diagnostic;
pub mod renderer;
pub mod severity;
pub mod sink;

pub use code::{Category, DiagnosticCode};
pub use diagnostic::{Diagnostic, Label, LabelStyle};
pub use renderer::{DiagnosticRenderer, TerminalRenderer};
pub use severity::Severity;
pub use sink::DiagnosticSink;

//! Shared foundational types for the jabi ABI-stub toolchain.
//!
//! This crate provides interned [`Name`]s and the thread-safe [`NameTable`] that
//! canonicalizes them, and content hashing for stub invalidation.

#![warn(missing_docs)]

pub mod hash;
pub mod name;

pub use hash::ContentHash;
pub use name::{Name, NameTable};

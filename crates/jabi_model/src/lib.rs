//! Tree-backed symbol and type model for Java ABI stubs.
//!
//! A [`ResolutionSession`] indexes a batch of parsed compilation units and
//! answers symbol queries about them: the [`Element`] a name denotes, its
//! supertypes, members and [`TypeMirror`]. Symbols outside the batch come
//! from a [`ResolutionDelegate`], which the session consults only when the
//! batch does not declare a name.
//!
//! Every element is canonical: whatever path reaches a symbol, the session
//! hands back the same [`ElementId`]. Queries can run concurrently from any
//! number of threads.

#![warn(missing_docs)]

pub mod arena;
pub mod cache;
pub mod delegate;
pub mod element;
pub mod errors;
pub mod ids;
mod index;
mod resolve;
pub mod session;
pub mod types;

pub use cache::{CanonicalCache, Reentrant};
pub use delegate::{
    ChainedDelegate, DelegateError, ResolutionDelegate, SymbolDescriptor, SymbolKind, SymbolTable,
};
pub use element::{Element, ElementKind, ElementOrigin, QualifiedName};
pub use errors::ModelError;
pub use ids::{DeclId, ElementId, UnitId};
pub use session::{ModelConfig, ResolutionSession};
pub use types::{DeclaredType, NoTypeKind, TypeDisplay, TypeKind, TypeMirror, TypeVariable, WildcardType};

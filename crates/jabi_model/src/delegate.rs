//! Resolution of names that no tree in the batch declares.
//!
//! A [`ResolutionDelegate`] answers for precompiled dependencies: it maps a
//! canonical name to a [`SymbolDescriptor`], which the session wraps as an
//! opaque element. [`SymbolTable`] is the in-memory implementation, loaded
//! from JSON symbol files; [`ChainedDelegate`] stacks several of them.

use jabi_java_parser::ast::Modifier;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Provider of fully resolved symbols for names outside the current batch.
///
/// Implementations may block (for example on I/O); the session never holds
/// a lock shared with unrelated lookups while calling them.
pub trait ResolutionDelegate: Send + Sync {
    /// Returns the symbol with canonical name `qualified_name`, if known.
    fn resolve(&self, qualified_name: &str) -> Option<SymbolDescriptor>;
}

/// The flavor of a precompiled type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolKind {
    /// A class.
    Class,
    /// An interface.
    Interface,
    /// An enum.
    Enum,
    /// An annotation type.
    Annotation,
    /// A record.
    Record,
}

/// The resolved surface of one precompiled type.
///
/// Supertypes are canonical names; the session resolves them through the
/// same path as any other name, so they may point back into the batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolDescriptor {
    /// Canonical name, e.g. `java.util.Map.Entry`.
    pub qualified_name: String,
    /// Package name; empty for the unnamed package.
    #[serde(default)]
    pub package: String,
    /// Type flavor.
    pub kind: SymbolKind,
    /// Declared modifiers.
    #[serde(default)]
    pub modifiers: Vec<Modifier>,
    /// Type parameter names in order.
    #[serde(default)]
    pub type_parameters: Vec<String>,
    /// Canonical name of the direct superclass, if any.
    #[serde(default)]
    pub superclass: Option<String>,
    /// Canonical names of the direct superinterfaces.
    #[serde(default)]
    pub interfaces: Vec<String>,
}

impl SymbolDescriptor {
    /// Creates a descriptor with no modifiers, type parameters or supertypes.
    pub fn new(kind: SymbolKind, package: &str, qualified_name: &str) -> Self {
        Self {
            qualified_name: qualified_name.to_string(),
            package: package.to_string(),
            kind,
            modifiers: Vec::new(),
            type_parameters: Vec::new(),
            superclass: None,
            interfaces: Vec::new(),
        }
    }

    /// Sets the superclass.
    pub fn extends(mut self, superclass: &str) -> Self {
        self.superclass = Some(superclass.to_string());
        self
    }

    /// Adds a superinterface.
    pub fn implements(mut self, interface: &str) -> Self {
        self.interfaces.push(interface.to_string());
        self
    }

    /// Sets the type parameter names.
    pub fn with_type_parameters(mut self, params: &[&str]) -> Self {
        self.type_parameters = params.iter().map(|p| p.to_string()).collect();
        self
    }

    /// Sets the modifiers.
    pub fn with_modifiers(mut self, modifiers: &[Modifier]) -> Self {
        self.modifiers = modifiers.to_vec();
        self
    }

    /// The last segment of the qualified name.
    pub fn simple_name(&self) -> &str {
        self.qualified_name
            .rsplit('.')
            .next()
            .unwrap_or(&self.qualified_name)
    }

    /// Canonical name of the declaring type for member types, derived from the
    /// qualified name and the package.
    pub fn enclosing_type(&self) -> Option<&str> {
        let rest = if self.package.is_empty() {
            self.qualified_name.as_str()
        } else {
            self.qualified_name
                .strip_prefix(self.package.as_str())?
                .strip_prefix('.')?
        };
        let (outer_rest, _) = rest.rsplit_once('.')?;
        let cut = self.qualified_name.len() - rest.len() + outer_rest.len();
        Some(&self.qualified_name[..cut])
    }
}

/// Errors from loading a symbol file.
#[derive(Debug, thiserror::Error)]
pub enum DelegateError {
    /// The file could not be read.
    #[error("cannot read symbol file {}: {source}", path.display())]
    Io {
        /// The file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// The file is not a valid symbol file.
    #[error("invalid symbol file {}: {message}", path.display())]
    Parse {
        /// The file, or `<memory>` for in-memory input.
        path: PathBuf,
        /// Parser message.
        message: String,
    },
}

#[derive(Deserialize, Serialize)]
struct SymbolFile {
    #[serde(default)]
    symbols: Vec<SymbolDescriptor>,
}

/// An in-memory table of precompiled symbols keyed by canonical name.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    symbols: HashMap<String, SymbolDescriptor>,
}

impl SymbolTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a symbol.
    pub fn insert(&mut self, descriptor: SymbolDescriptor) {
        self.symbols
            .insert(descriptor.qualified_name.clone(), descriptor);
    }

    /// Number of symbols.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Returns `true` if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Parses a symbol file: `{ "symbols": [ { "qualified_name": ..., ... } ] }`.
    pub fn from_json_str(text: &str) -> Result<Self, DelegateError> {
        Self::parse(text, Path::new("<memory>"))
    }

    /// Loads a symbol file from disk.
    pub fn load(path: &Path) -> Result<Self, DelegateError> {
        let text = std::fs::read_to_string(path).map_err(|source| DelegateError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text, path)
    }

    fn parse(text: &str, path: &Path) -> Result<Self, DelegateError> {
        let file: SymbolFile = serde_json::from_str(text).map_err(|e| DelegateError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let mut table = Self::new();
        for descriptor in file.symbols {
            table.insert(descriptor);
        }
        Ok(table)
    }

    /// Serializes the table as a symbol file, sorted by name.
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        let mut symbols: Vec<_> = self.symbols.values().cloned().collect();
        symbols.sort_by(|a, b| a.qualified_name.cmp(&b.qualified_name));
        serde_json::to_string_pretty(&SymbolFile { symbols })
    }

    /// The platform types every batch can refer to without a symbol file.
    pub fn platform() -> Self {
        use Modifier::{Abstract, Final, Public};
        const LANG: &str = "java.lang";
        const OBJECT: &str = "java.lang.Object";
        const SERIALIZABLE: &str = "java.io.Serializable";

        let class = |name: &str| SymbolDescriptor::new(SymbolKind::Class, LANG, name);
        let interface = |name: &str| SymbolDescriptor::new(SymbolKind::Interface, LANG, name);

        let mut table = Self::new();
        for descriptor in [
            class(OBJECT).with_modifiers(&[Public]),
            class("java.lang.Enum")
                .with_modifiers(&[Public, Abstract])
                .with_type_parameters(&["E"])
                .extends(OBJECT)
                .implements("java.lang.Comparable")
                .implements(SERIALIZABLE),
            class("java.lang.Record")
                .with_modifiers(&[Public, Abstract])
                .extends(OBJECT),
            class("java.lang.String")
                .with_modifiers(&[Public, Final])
                .extends(OBJECT)
                .implements(SERIALIZABLE)
                .implements("java.lang.Comparable")
                .implements("java.lang.CharSequence"),
            class("java.lang.Number")
                .with_modifiers(&[Public, Abstract])
                .extends(OBJECT)
                .implements(SERIALIZABLE),
            class("java.lang.Integer")
                .with_modifiers(&[Public, Final])
                .extends("java.lang.Number")
                .implements("java.lang.Comparable"),
            class("java.lang.Throwable")
                .with_modifiers(&[Public])
                .extends(OBJECT)
                .implements(SERIALIZABLE),
            class("java.lang.Exception")
                .with_modifiers(&[Public])
                .extends("java.lang.Throwable"),
            class("java.lang.RuntimeException")
                .with_modifiers(&[Public])
                .extends("java.lang.Exception"),
            class("java.lang.Error")
                .with_modifiers(&[Public])
                .extends("java.lang.Throwable"),
            interface("java.lang.Runnable").with_modifiers(&[Public]),
            interface("java.lang.Cloneable").with_modifiers(&[Public]),
            interface("java.lang.CharSequence").with_modifiers(&[Public]),
            interface("java.lang.AutoCloseable").with_modifiers(&[Public]),
            interface("java.lang.Comparable")
                .with_modifiers(&[Public])
                .with_type_parameters(&["T"]),
            interface("java.lang.Iterable")
                .with_modifiers(&[Public])
                .with_type_parameters(&["T"]),
            SymbolDescriptor::new(
                SymbolKind::Interface,
                "java.lang.annotation",
                "java.lang.annotation.Annotation",
            )
            .with_modifiers(&[Public]),
            SymbolDescriptor::new(SymbolKind::Interface, "java.io", SERIALIZABLE)
                .with_modifiers(&[Public]),
            SymbolDescriptor::new(SymbolKind::Annotation, LANG, "java.lang.Override")
                .with_modifiers(&[Public]),
            SymbolDescriptor::new(SymbolKind::Annotation, LANG, "java.lang.Deprecated")
                .with_modifiers(&[Public]),
        ] {
            table.insert(descriptor);
        }
        table
    }
}

impl ResolutionDelegate for SymbolTable {
    fn resolve(&self, qualified_name: &str) -> Option<SymbolDescriptor> {
        self.symbols.get(qualified_name).cloned()
    }
}

/// Consults several delegates in order; the first answer wins.
#[derive(Default, Clone)]
pub struct ChainedDelegate {
    delegates: Vec<Arc<dyn ResolutionDelegate>>,
}

impl ChainedDelegate {
    /// Creates an empty chain, which resolves nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a delegate with lower priority than those already present.
    pub fn push(&mut self, delegate: Arc<dyn ResolutionDelegate>) {
        self.delegates.push(delegate);
    }

    /// Builder form of [`ChainedDelegate::push`].
    pub fn with(mut self, delegate: Arc<dyn ResolutionDelegate>) -> Self {
        self.push(delegate);
        self
    }

    /// Number of delegates in the chain.
    pub fn len(&self) -> usize {
        self.delegates.len()
    }

    /// Returns `true` for an empty chain.
    pub fn is_empty(&self) -> bool {
        self.delegates.is_empty()
    }
}

impl ResolutionDelegate for ChainedDelegate {
    fn resolve(&self, qualified_name: &str) -> Option<SymbolDescriptor> {
        self.delegates
            .iter()
            .find_map(|delegate| delegate.resolve(qualified_name))
    }
}

//! Interned simple and qualified names with O(1) equality.
//!
//! Every name the toolchain handles (identifiers, package paths, qualified type
//! names) goes through a [`NameTable`]. Two names with the same text obtained
//! from the same table are the same [`Name`], so name equality is a `u32`
//! comparison and names can key the resolution caches directly.

use lasso::ThreadedRodeo;
use serde::{Deserialize, Serialize};

/// An interned name: either a simple identifier (`Foo`) or a dot-joined
/// qualified path (`com.facebook.buck.Foo`).
///
/// A `Name` is only meaningful together with the [`NameTable`] that produced it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Name(u32);

impl Name {
    /// Creates a `Name` from a raw `u32` index.
    ///
    /// Intended for deserialization and tests. Normal code interns through
    /// [`NameTable::intern`].
    pub fn from_raw(index: u32) -> Self {
        Self(index)
    }

    /// Returns the raw `u32` index of this name.
    pub fn as_raw(self) -> u32 {
        self.0
    }
}

// SAFETY: `Name` wraps a `u32`, which always fits in `usize` on supported
// platforms. `try_from_usize` rejects indices that do not fit in `u32`.
unsafe impl lasso::Key for Name {
    fn into_usize(self) -> usize {
        self.0 as usize
    }

    fn try_from_usize(int: usize) -> Option<Self> {
        u32::try_from(int).ok().map(Name)
    }
}

/// Thread-safe name table backed by [`lasso::ThreadedRodeo`].
///
/// Interning is idempotent and may be called concurrently from every worker
/// of a resolution session. After warm-up almost all calls are reads.
pub struct NameTable {
    rodeo: ThreadedRodeo<Name>,
    empty: Name,
}

impl NameTable {
    /// Creates a table that already holds the canonical empty name.
    pub fn new() -> Self {
        let rodeo = ThreadedRodeo::new();
        let empty = rodeo.get_or_intern_static("");
        Self { rodeo, empty }
    }

    /// Interns `text`, returning the existing name if it was seen before.
    ///
    /// The empty string is accepted and yields [`NameTable::empty`], which is
    /// the simple name of anonymous classes and of the unnamed package.
    pub fn intern(&self, text: &str) -> Name {
        self.rodeo.get_or_intern(text)
    }

    /// Returns the name for `text` if it has already been interned.
    pub fn get(&self, text: &str) -> Option<Name> {
        self.rodeo.get(text)
    }

    /// The canonical empty name.
    pub fn empty(&self) -> Name {
        self.empty
    }

    /// Returns `true` if `name` is the empty name.
    pub fn is_empty(&self, name: Name) -> bool {
        name == self.empty
    }

    /// Resolves a name back to its text.
    ///
    /// # Panics
    ///
    /// Panics if `name` was not produced by this table.
    pub fn resolve(&self, name: Name) -> &str {
        self.rodeo.resolve(&name)
    }

    /// Joins an optional enclosing qualified name and a simple name with `.`.
    ///
    /// With no enclosing name (or the empty name, i.e. the unnamed package) the
    /// result is `simple` itself, never a name with a leading separator.
    ///
    /// # Panics
    ///
    /// Panics if `simple` is the empty name. Qualifying an empty segment is a
    /// contract violation; anonymous constructs have no qualified name at all.
    pub fn qualify(&self, enclosing: Option<Name>, simple: Name) -> Name {
        assert!(
            !self.is_empty(simple),
            "cannot qualify an empty simple name"
        );
        match enclosing {
            Some(outer) if !self.is_empty(outer) => {
                let text = format!("{}.{}", self.resolve(outer), self.resolve(simple));
                self.intern(&text)
            }
            _ => simple,
        }
    }

    /// Interns every segment of a dotted path and qualifies them left to right.
    ///
    /// Returns `None` for an empty path.
    pub fn qualify_path<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Option<Name> {
        segments.into_iter().fold(None, |acc, segment| {
            Some(self.qualify(acc, self.intern(segment)))
        })
    }

    /// Returns the number of distinct names interned so far.
    pub fn len(&self) -> usize {
        self.rodeo.len()
    }

    /// Returns `true` if only the canonical empty name has been interned.
    pub fn is_fresh(&self) -> bool {
        self.rodeo.len() <= 1
    }
}

impl Default for NameTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intern_resolve_roundtrip() {
        let names = NameTable::new();
        let foo = names.intern("Foo");
        assert_eq!(names.resolve(foo), "Foo");
    }

    #[test]
    fn same_text_same_name() {
        let names = NameTable::new();
        assert_eq!(names.intern("com.facebook"), names.intern("com.facebook"));
        assert_ne!(names.intern("Foo"), names.intern("Bar"));
    }

    #[test]
    fn empty_name_is_canonical() {
        let names = NameTable::new();
        assert!(names.is_fresh());
        assert_eq!(names.intern(""), names.empty());
        assert!(names.is_empty(names.empty()));
    }

    #[test]
    fn get_does_not_intern() {
        let names = NameTable::new();
        assert!(names.get("Missing").is_none());
        let before = names.len();
        let _ = names.get("Missing");
        assert_eq!(names.len(), before);
        let present = names.intern("Present");
        assert_eq!(names.get("Present"), Some(present));
    }

    #[test]
    fn qualify_with_package() {
        let names = NameTable::new();
        let pkg = names.intern("com.facebook.buck");
        let foo = names.intern("Foo");
        let qualified = names.qualify(Some(pkg), foo);
        assert_eq!(names.resolve(qualified), "com.facebook.buck.Foo");
        assert_eq!(qualified, names.intern("com.facebook.buck.Foo"));
    }

    #[test]
    fn qualify_unnamed_package_has_no_separator() {
        let names = NameTable::new();
        let foo = names.intern("Foo");
        assert_eq!(names.qualify(None, foo), foo);
        assert_eq!(names.qualify(Some(names.empty()), foo), foo);
    }

    #[test]
    #[should_panic(expected = "empty simple name")]
    fn qualify_empty_segment_panics() {
        let names = NameTable::new();
        let pkg = names.intern("pkg");
        names.qualify(Some(pkg), names.empty());
    }

    #[test]
    fn qualify_path_joins_segments() {
        let names = NameTable::new();
        let name = names.qualify_path(["java", "lang", "Object"]).unwrap();
        assert_eq!(names.resolve(name), "java.lang.Object");
        assert!(names.qualify_path(std::iter::empty()).is_none());
    }

    #[test]
    fn concurrent_interning_agrees() {
        use std::sync::Arc;
        use std::thread;

        let names = Arc::new(NameTable::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let names = Arc::clone(&names);
                thread::spawn(move || names.intern("java.lang.Object"))
            })
            .collect();
        let results: Vec<Name> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(results.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn serde_roundtrip() {
        let name = Name::from_raw(42);
        let json = serde_json::to_string(&name).unwrap();
        let back: Name = serde_json::from_str(&json).unwrap();
        assert_eq!(name, back);
    }
}

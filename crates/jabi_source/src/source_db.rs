//! The per-batch database of compilation-unit text.

use crate::span::{FileId, Span};
use jabi_common::ContentHash;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// One compilation unit's text plus the line index used to render locations.
pub struct SourceFile {
    /// Identifier inside the owning [`SourceDb`].
    pub id: FileId,
    /// Path on disk, or a synthetic name such as `Foo.java` for in-memory units.
    pub path: PathBuf,
    /// Full text of the unit.
    pub content: String,
    /// Hash of `content`, recorded in generated stubs.
    pub content_hash: ContentHash,
    line_starts: Vec<u32>,
}

impl SourceFile {
    fn new(id: FileId, path: PathBuf, content: String) -> Self {
        let mut line_starts = vec![0u32];
        line_starts.extend(
            content
                .bytes()
                .enumerate()
                .filter(|&(_, b)| b == b'\n')
                .map(|(i, _)| (i + 1) as u32),
        );
        let content_hash = ContentHash::from_bytes(content.as_bytes());
        Self {
            id,
            path,
            content,
            content_hash,
            line_starts,
        }
    }

    /// Converts a byte offset to 1-indexed `(line, column)`.
    pub fn line_col(&self, offset: u32) -> (u32, u32) {
        let line_idx = match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx,
            Err(idx) => idx - 1,
        };
        (line_idx as u32 + 1, offset - self.line_starts[line_idx] + 1)
    }

    /// Returns the full text of the line containing `offset`, without the newline.
    pub fn line_text(&self, offset: u32) -> &str {
        let (line, _) = self.line_col(offset);
        let start = self.line_starts[line as usize - 1] as usize;
        let end = self
            .line_starts
            .get(line as usize)
            .map_or(self.content.len(), |&next| next as usize - 1);
        self.content[start..end].trim_end_matches('\r')
    }
}

/// A span resolved to a path and 1-indexed line/column coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSpan {
    /// Path of the compilation unit.
    pub file_path: PathBuf,
    /// Start line.
    pub line: u32,
    /// Start column.
    pub col: u32,
}

impl fmt::Display for ResolvedSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file_path.display(), self.line, self.col)
    }
}

/// Owns the text of every compilation unit processed in one batch.
#[derive(Default)]
pub struct SourceDb {
    files: Vec<SourceFile>,
}

impl SourceDb {
    /// Creates an empty database.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a `.java` file from disk.
    pub fn load_file(&mut self, path: &Path) -> Result<FileId, io::Error> {
        let content = std::fs::read_to_string(path)?;
        Ok(self.add_source(path, content))
    }

    /// Adds an in-memory compilation unit; `name` is shown in diagnostics.
    pub fn add_source(&mut self, name: impl Into<PathBuf>, content: String) -> FileId {
        let id = FileId::from_raw(self.files.len() as u32);
        self.files.push(SourceFile::new(id, name.into(), content));
        id
    }

    /// Returns the unit with the given id.
    ///
    /// # Panics
    ///
    /// Panics if `id` did not come from this database.
    pub fn get_file(&self, id: FileId) -> &SourceFile {
        &self.files[id.as_raw() as usize]
    }

    /// Iterates over every unit in load order.
    pub fn files(&self) -> impl Iterator<Item = &SourceFile> {
        self.files.iter()
    }

    /// Number of loaded units.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns `true` when nothing has been loaded.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Resolves the start of `span` to line/column coordinates.
    pub fn resolve_span(&self, span: Span) -> ResolvedSpan {
        let file = self.get_file(span.file);
        let (line, col) = file.line_col(span.start);
        ResolvedSpan {
            file_path: file.path.clone(),
            line,
            col,
        }
    }

    /// Returns the text covered by `span`.
    pub fn snippet(&self, span: Span) -> &str {
        &self.get_file(span.file).content[span.start as usize..span.end as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_col_resolution() {
        let mut db = SourceDb::new();
        let id = db.add_source("Foo.java", "package a;\nclass Foo {}\n".to_string());
        let file = db.get_file(id);
        assert_eq!(file.line_col(0), (1, 1));
        assert_eq!(file.line_col(11), (2, 1));
        assert_eq!(file.line_col(17), (2, 7));
    }

    #[test]
    fn line_text_strips_newline() {
        let mut db = SourceDb::new();
        let id = db.add_source("Foo.java", "package a;\r\nclass Foo {}".to_string());
        let file = db.get_file(id);
        assert_eq!(file.line_text(3), "package a;");
        assert_eq!(file.line_text(14), "class Foo {}");
    }

    #[test]
    fn resolve_and_snippet() {
        let mut db = SourceDb::new();
        let id = db.add_source("Bar.java", "class Bar extends Baz {}".to_string());
        let span = Span::new(id, 18, 21);
        assert_eq!(db.snippet(span), "Baz");
        assert_eq!(db.resolve_span(span).to_string(), "Bar.java:1:19");
    }

    #[test]
    fn hash_tracks_content() {
        let mut db = SourceDb::new();
        let a = db.add_source("A.java", "class A {}".to_string());
        let b = db.add_source("B.java", "class A {}".to_string());
        assert_eq!(db.get_file(a).content_hash, db.get_file(b).content_hash);
        assert_eq!(db.len(), 2);
    }

    #[test]
    fn load_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Foo.java");
        std::fs::write(&path, "public class Foo {}").unwrap();

        let mut db = SourceDb::new();
        let id = db.load_file(&path).unwrap();
        assert_eq!(db.get_file(id).content, "public class Foo {}");
        assert_eq!(db.get_file(id).path, path);
    }

    #[test]
    fn load_missing_file_errors() {
        let mut db = SourceDb::new();
        assert!(db.load_file(Path::new("/definitely/not/here.java")).is_err());
        assert!(db.is_empty());
    }
}

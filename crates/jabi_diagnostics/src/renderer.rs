//! Rendering diagnostics for humans.

use crate::diagnostic::{Diagnostic, LabelStyle};
use jabi_source::SourceDb;

/// Formats a diagnostic into text.
pub trait DiagnosticRenderer {
    /// Renders one diagnostic.
    fn render(&self, diag: &Diagnostic, source_db: &SourceDb) -> String;
}

/// rustc-style terminal output:
///
/// ```text
/// warning[W301]: cannot find symbol `com.example.Base`
///   --> Foo.java:2:27
///    |
///  2 | public class Foo extends com.example.Base {}
///    |                          ^^^^^^^^^^^^^^^^ not in this batch or on the classpath
/// ```
pub struct TerminalRenderer {
    /// Wrap the header in ANSI colour codes.
    pub color: bool,
}

impl TerminalRenderer {
    /// Creates a renderer.
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn header(&self, diag: &Diagnostic) -> String {
        let text = format!("{}[{}]", diag.severity, diag.code);
        if !self.color {
            return text;
        }
        let colour = if diag.severity.is_error() { "31" } else { "33" };
        format!("\x1b[1;{colour}m{text}\x1b[0m")
    }
}

impl DiagnosticRenderer for TerminalRenderer {
    fn render(&self, diag: &Diagnostic, source_db: &SourceDb) -> String {
        let mut out = format!("{}: {}\n", self.header(diag), diag.message);

        if !diag.primary_span.is_dummy() {
            let span = diag.primary_span;
            let file = source_db.get_file(span.file);
            let (line, col) = file.line_col(span.start);
            let gutter = line.to_string();
            let pad = " ".repeat(gutter.len());

            out.push_str(&format!("{pad}--> {}\n", source_db.resolve_span(span)));
            out.push_str(&format!("{pad} |\n"));
            out.push_str(&format!("{gutter} | {}\n", file.line_text(span.start)));

            let label = diag
                .labels
                .iter()
                .find(|l| l.style == LabelStyle::Primary)
                .map(|l| format!(" {}", l.message))
                .unwrap_or_default();
            out.push_str(&format!(
                "{pad} | {}{}{label}\n",
                " ".repeat(col as usize - 1),
                "^".repeat(span.len().max(1) as usize),
            ));
        }

        for note in &diag.notes {
            out.push_str(&format!("   = note: {note}\n"));
        }
        for help in &diag.help {
            out.push_str(&format!("   = help: {help}\n"));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::{Category, DiagnosticCode};
    use crate::diagnostic::Label;
    use jabi_source::Span;

    #[test]
    fn renders_source_line_and_carets() {
        let mut db = SourceDb::new();
        let id = db.add_source("Foo.java", "class Foo extends Bar {}\n".to_string());
        let span = Span::new(id, 18, 21);
        let diag = Diagnostic::warning(
            DiagnosticCode::new(Category::Warning, 301),
            "cannot find symbol `Bar`",
            span,
        )
        .with_label(Label::primary(span, "not found"));

        let out = TerminalRenderer::new(false).render(&diag, &db);
        assert!(out.starts_with("warning[W301]: cannot find symbol `Bar`"));
        assert!(out.contains("--> Foo.java:1:19"));
        assert!(out.contains("class Foo extends Bar {}"));
        assert!(out.contains("^^^ not found"));
    }

    #[test]
    fn dummy_span_has_no_location() {
        let db = SourceDb::new();
        let diag = Diagnostic::error(
            DiagnosticCode::new(Category::Error, 900),
            "no sources",
            Span::DUMMY,
        )
        .with_help("pass at least one .java file");
        let out = TerminalRenderer::new(false).render(&diag, &db);
        assert!(!out.contains("-->"));
        assert!(out.contains("= help: pass at least one .java file"));
    }

    #[test]
    fn color_wraps_header() {
        let db = SourceDb::new();
        let diag = Diagnostic::error(DiagnosticCode::new(Category::Error, 1), "x", Span::DUMMY);
        let out = TerminalRenderer::new(true).render(&diag, &db);
        assert!(out.starts_with("\x1b[1;31m"));
    }
}

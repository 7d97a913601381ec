//! Core parser infrastructure and compilation-unit level rules.
//!
//! [`JavaParser`] provides the primitive operations (advance, expect, eat),
//! error recovery and balanced-delimiter skipping. Type declarations live in
//! `decl.rs`, type references in `types.rs`.

use crate::ast::*;
use crate::token::{JavaToken, Token};
use jabi_common::{Name, NameTable};
use jabi_diagnostics::code::{Category, DiagnosticCode};
use jabi_diagnostics::{Diagnostic, DiagnosticSink};
use jabi_source::Span;

/// Code for syntax errors.
pub const PARSE_ERROR: DiagnosticCode = DiagnosticCode::new(Category::Error, 101);

/// A recursive descent parser over the declaration-level Java grammar.
///
/// Errors go to the sink; the parser always produces a [`CompilationUnit`],
/// dropping or replacing what it could not understand.
pub struct JavaParser<'src> {
    pub(crate) tokens: Vec<Token>,
    pub(crate) pos: usize,
    pub(crate) source: &'src str,
    pub(crate) names: &'src NameTable,
    pub(crate) sink: &'src DiagnosticSink,
}

impl<'src> JavaParser<'src> {
    /// Creates a parser over tokens lexed from `source`.
    pub fn new(
        tokens: Vec<Token>,
        source: &'src str,
        names: &'src NameTable,
        sink: &'src DiagnosticSink,
    ) -> Self {
        Self {
            tokens,
            pos: 0,
            source,
            names,
            sink,
        }
    }

    // ========================================================================
    // Primitive operations
    // ========================================================================

    pub(crate) fn current(&self) -> JavaToken {
        self.tokens[self.pos].kind
    }

    pub(crate) fn current_span(&self) -> Span {
        self.tokens[self.pos].span
    }

    pub(crate) fn current_text(&self) -> &'src str {
        self.text_at(0)
    }

    /// Source text of the token at `pos + offset`, or `""` past the end.
    pub(crate) fn text_at(&self, offset: usize) -> &'src str {
        match self.tokens.get(self.pos + offset) {
            Some(token) => &self.source[token.span.start as usize..token.span.end as usize],
            None => "",
        }
    }

    pub(crate) fn at(&self, kind: JavaToken) -> bool {
        self.current() == kind
    }

    pub(crate) fn at_eof(&self) -> bool {
        self.current() == JavaToken::Eof
    }

    /// Returns `true` if the current token is the contextual keyword `word`.
    pub(crate) fn at_word(&self, word: &str) -> bool {
        self.at(JavaToken::Identifier) && self.current_text() == word
    }

    pub(crate) fn peek_kind(&self, offset: usize) -> JavaToken {
        self.tokens
            .get(self.pos + offset)
            .map_or(JavaToken::Eof, |t| t.kind)
    }

    pub(crate) fn prev_span(&self) -> Span {
        if self.pos > 0 {
            self.tokens[self.pos - 1].span
        } else {
            self.current_span()
        }
    }

    pub(crate) fn advance(&mut self) {
        if !self.at_eof() {
            self.pos += 1;
        }
    }

    pub(crate) fn eat(&mut self, kind: JavaToken) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn expect(&mut self, kind: JavaToken) {
        if !self.eat(kind) {
            self.expected(&format!("{kind:?}"));
        }
    }

    /// Expects an identifier and interns it. Emits an error and returns a
    /// placeholder name if the current token is something else.
    pub(crate) fn expect_ident(&mut self) -> Name {
        if self.at(JavaToken::Identifier) {
            let name = self.names.intern(self.current_text());
            self.advance();
            name
        } else {
            self.expected("identifier");
            self.names.intern("<missing>")
        }
    }

    /// Span from `start` to the end of the previously consumed token.
    pub(crate) fn span_from(&self, start: Span) -> Span {
        start.merge(self.prev_span())
    }

    // ========================================================================
    // Error handling and recovery
    // ========================================================================

    pub(crate) fn error(&self, msg: &str) {
        self.sink
            .emit(Diagnostic::error(PARSE_ERROR, msg, self.current_span()));
    }

    pub(crate) fn expected(&self, what: &str) {
        let found = match self.current() {
            JavaToken::Eof => "end of file".to_string(),
            _ => format!("`{}`", self.current_text()),
        };
        self.sink.emit(Diagnostic::error(
            PARSE_ERROR,
            format!("expected {what}, found {found}"),
            self.current_span(),
        ));
    }

    /// Skips to the end of the current member: past the next `;` or balanced
    /// `{...}` block, stopping before a `}` that closes the enclosing body.
    pub(crate) fn recover_member(&mut self) {
        loop {
            match self.current() {
                JavaToken::Eof | JavaToken::RightBrace => return,
                JavaToken::Semicolon => {
                    self.advance();
                    return;
                }
                JavaToken::LeftBrace => {
                    self.skip_balanced(JavaToken::LeftBrace, JavaToken::RightBrace);
                    return;
                }
                JavaToken::LeftParen => {
                    self.skip_balanced(JavaToken::LeftParen, JavaToken::RightParen);
                }
                _ => self.advance(),
            }
        }
    }

    /// Skips at least one token, then up to the start of the next top-level
    /// declaration or past the next `;`.
    fn recover_to_declaration(&mut self) {
        self.advance();
        while !self.at_eof() {
            if self.eat(JavaToken::Semicolon)
                || self.at_type_decl_start()
                || self.current().is_modifier()
                || self.at(JavaToken::At)
            {
                return;
            }
            self.advance();
        }
    }

    /// Consumes a delimited group starting at `open`, including the matching
    /// `close`. Nested groups of the same pair are counted.
    pub(crate) fn skip_balanced(&mut self, open: JavaToken, close: JavaToken) {
        let start = self.current_span();
        if !self.eat(open) {
            self.expected(&format!("{open:?}"));
            return;
        }
        let mut depth = 1usize;
        while depth > 0 {
            let kind = self.current();
            if kind == JavaToken::Eof {
                self.sink.emit(Diagnostic::error(
                    PARSE_ERROR,
                    format!("unclosed {open:?}"),
                    start,
                ));
                return;
            }
            if kind == open {
                depth += 1;
            } else if kind == close {
                depth -= 1;
            }
            self.advance();
        }
    }

    /// Skips an annotation: `@Name`, `@a.b.Name` or `@Name(...)`.
    pub(crate) fn skip_annotation(&mut self) {
        self.expect(JavaToken::At);
        self.parse_qualified_ident();
        if self.at(JavaToken::LeftParen) {
            self.skip_balanced(JavaToken::LeftParen, JavaToken::RightParen);
        }
    }

    /// Returns `true` at an annotation use (as opposed to `@interface`).
    pub(crate) fn at_annotation(&self) -> bool {
        self.at(JavaToken::At) && self.peek_kind(1) != JavaToken::Interface
    }

    pub(crate) fn skip_annotations(&mut self) {
        while self.at_annotation() {
            self.skip_annotation();
        }
    }

    // ========================================================================
    // Compilation unit
    // ========================================================================

    /// Parses a complete compilation unit.
    pub fn parse_compilation_unit(&mut self) -> CompilationUnit {
        let start = self.current_span();

        // Annotations may precede `package` in package-info.java; otherwise they
        // belong to the first type declaration.
        let rewind = self.pos;
        self.skip_annotations();
        let package = if self.at(JavaToken::Package) {
            Some(self.parse_package_decl())
        } else {
            self.pos = rewind;
            None
        };

        let mut imports = Vec::new();
        while self.at(JavaToken::Import) {
            imports.push(self.parse_import_decl());
        }

        let mut types = Vec::new();
        while !self.at_eof() {
            if self.eat(JavaToken::Semicolon) {
                continue;
            }
            match self.parse_type_decl_with_modifiers() {
                Some(decl) => types.push(decl),
                None => {
                    self.expected("class, interface, enum, record or annotation type declaration");
                    self.recover_to_declaration();
                }
            }
        }

        CompilationUnit {
            package,
            imports,
            types,
            span: start.merge(self.current_span()),
        }
    }

    fn parse_package_decl(&mut self) -> PackageDecl {
        let start = self.current_span();
        self.expect(JavaToken::Package);
        let name = self.parse_qualified_ident();
        self.expect(JavaToken::Semicolon);
        PackageDecl {
            name,
            span: self.span_from(start),
        }
    }

    fn parse_import_decl(&mut self) -> ImportDecl {
        let start = self.current_span();
        self.expect(JavaToken::Import);
        let is_static = self.eat(JavaToken::Static);

        let path_start = self.current_span();
        let mut segments = vec![self.expect_ident()];
        let mut on_demand = false;
        while self.at(JavaToken::Dot) {
            match self.peek_kind(1) {
                JavaToken::Identifier => {
                    self.advance();
                    segments.push(self.expect_ident());
                }
                JavaToken::Operator if self.text_at(1) == "*" => {
                    self.advance();
                    self.advance();
                    on_demand = true;
                    break;
                }
                _ => {
                    self.advance();
                    self.expected("identifier or `*`");
                    break;
                }
            }
        }
        let path = QualifiedIdent {
            segments,
            span: self.span_from(path_start),
        };
        self.expect(JavaToken::Semicolon);

        ImportDecl {
            is_static,
            path,
            on_demand,
            span: self.span_from(start),
        }
    }

    /// Parses `a.b.c`. Stops before a `.` that is not followed by an identifier.
    pub(crate) fn parse_qualified_ident(&mut self) -> QualifiedIdent {
        let start = self.current_span();
        let mut segments = vec![self.expect_ident()];
        while self.at(JavaToken::Dot) && self.peek_kind(1) == JavaToken::Identifier {
            self.advance();
            segments.push(self.expect_ident());
        }
        QualifiedIdent {
            segments,
            span: self.span_from(start),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::parse_source;
    use jabi_common::NameTable;

    #[test]
    fn package_and_imports() {
        let names = NameTable::new();
        let (unit, errors) = parse_source(
            "package com.facebook.buck;\n\
             import java.util.List;\n\
             import java.util.*;\n\
             import static java.util.Collections.emptyList;\n\
             import static java.util.Collections.*;\n",
            &names,
        );
        assert!(errors.is_empty(), "{errors:?}");
        let pkg = unit.package.unwrap();
        let text: Vec<_> = pkg.name.segments.iter().map(|n| names.resolve(*n)).collect();
        assert_eq!(text, ["com", "facebook", "buck"]);

        assert_eq!(unit.imports.len(), 4);
        assert!(!unit.imports[0].on_demand && !unit.imports[0].is_static);
        assert_eq!(unit.imports[0].path.segments.len(), 3);
        assert!(unit.imports[1].on_demand);
        assert_eq!(unit.imports[1].path.segments.len(), 2);
        assert!(unit.imports[2].is_static && !unit.imports[2].on_demand);
        assert!(unit.imports[3].is_static && unit.imports[3].on_demand);
    }

    #[test]
    fn unnamed_package() {
        let names = NameTable::new();
        let (unit, errors) = parse_source("public class Foo {}", &names);
        assert!(errors.is_empty());
        assert!(unit.package.is_none());
        assert_eq!(unit.types.len(), 1);
    }

    #[test]
    fn package_info_annotations() {
        let names = NameTable::new();
        let (unit, errors) = parse_source("@Deprecated\npackage a.b;\n", &names);
        assert!(errors.is_empty(), "{errors:?}");
        assert!(unit.package.is_some());
        assert!(unit.types.is_empty());
    }

    #[test]
    fn annotated_type_without_package() {
        let names = NameTable::new();
        let (unit, errors) = parse_source("@SuppressWarnings(\"x\") class A {}", &names);
        assert!(errors.is_empty(), "{errors:?}");
        assert!(unit.package.is_none());
        assert_eq!(unit.types.len(), 1);
    }

    #[test]
    fn stray_tokens_recover() {
        let names = NameTable::new();
        let (unit, errors) = parse_source("garbage here; class A {} 42 class B {}", &names);
        assert!(!errors.is_empty());
        let found: Vec<_> = unit
            .types
            .iter()
            .map(|t| names.resolve(t.name.unwrap()))
            .collect();
        assert_eq!(found, ["A", "B"]);
    }

    #[test]
    fn missing_semicolon_reports() {
        let names = NameTable::new();
        let (unit, errors) = parse_source("package a.b class A {}", &names);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("expected Semicolon"));
        assert_eq!(unit.types.len(), 1);
    }
}

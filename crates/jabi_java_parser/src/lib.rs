//! Hand-rolled declaration-level parser for Java.
//!
//! Produces the syntax trees the tree-backed model is built from: package,
//! imports, type declarations with their headers, member types, fields and
//! enum constants. Executable code (method bodies, initializers, annotation
//! arguments) is skipped by balanced-delimiter scanning. The main entry point
//! is [`parse_file`].
//!
//! # Architecture
//!
//! - **Lexer** ([`lexer`]): source text to tokens; contextual keywords such as
//!   `record` and `sealed` stay identifiers.
//! - **Parser** ([`parser`]): recursive descent with error recovery; every
//!   problem becomes a diagnostic and parsing continues.
//! - **AST** ([`ast`]): node types with spans and serde support.

#![warn(missing_docs)]

/// Syntax tree node types.
pub mod ast;
mod decl;
/// Lexical analyzer for Java source text.
pub mod lexer;
/// Recursive descent parser with error recovery.
pub mod parser;
/// Token types for the Java lexer.
pub mod token;
mod types;

pub use ast::CompilationUnit;
pub use token::{JavaToken, Token};

use jabi_common::NameTable;
use jabi_diagnostics::{Diagnostic, DiagnosticSink};
use jabi_source::{FileId, SourceDb};

/// Parses one compilation unit from `source_db`.
///
/// Identifiers are interned into `names`; lexical and syntax errors are
/// reported to `sink`.
pub fn parse_file(
    file_id: FileId,
    source_db: &SourceDb,
    names: &NameTable,
    sink: &DiagnosticSink,
) -> CompilationUnit {
    let source = &source_db.get_file(file_id).content;
    let tokens = lexer::lex(source, file_id, sink);
    let mut parser = parser::JavaParser::new(tokens, source, names, sink);
    parser.parse_compilation_unit()
}

/// Parses a standalone source string, returning the tree and every
/// diagnostic produced.
pub fn parse_source(source: &str, names: &NameTable) -> (CompilationUnit, Vec<Diagnostic>) {
    let mut db = SourceDb::new();
    let file_id = db.add_source("Input.java", source.to_string());
    let sink = DiagnosticSink::new();
    let unit = parse_file(file_id, &db, names, &sink);
    (unit, sink.take_all())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::*;

    fn parse_ok(source: &str, names: &NameTable) -> CompilationUnit {
        let (unit, errors) = parse_source(source, names);
        assert!(
            errors.is_empty(),
            "unexpected errors: {:?}",
            errors.iter().map(|e| &e.message).collect::<Vec<_>>()
        );
        unit
    }

    #[test]
    fn integration_realistic_unit() {
        let names = NameTable::new();
        let unit = parse_ok(
            r#"
            package com.facebook.buck.jvm.java.abi;

            import java.util.ArrayList;
            import java.util.List;
            import javax.annotation.Nullable;

            /** Collects things. */
            @SuppressWarnings("unchecked")
            public final class Collector<T extends Comparable<? super T>>
                extends AbstractCollector<T>
                implements Iterable<T>, java.io.Serializable {

              private static final long serialVersionUID = 1L;
              private final List<T> items = new ArrayList<>();
              @Nullable private T last;

              public Collector() {}

              @Override
              public java.util.Iterator<T> iterator() {
                return items.iterator();
              }

              public void add(T item) {
                if (last == null || item.compareTo(last) > 0) { last = item; }
                items.add(item);
                String s = """
                    text } block {
                    """;
              }

              static class Node<E> {
                E value;
                Node<E> next;
              }

              public enum Mode {
                FAST { @Override int cost() { return 1; } },
                SLOW;
                int cost() { return 10; }
              }

              interface Visitor<R> extends java.util.function.Function<T, R> {}
            }
            "#,
            &names,
        );

        assert!(unit.package.is_some());
        assert_eq!(unit.imports.len(), 3);
        assert_eq!(unit.types.len(), 1);

        let collector = &unit.types[0];
        assert_eq!(collector.modifiers, vec![Modifier::Public, Modifier::Final]);
        assert_eq!(collector.type_params.len(), 1);
        assert_eq!(collector.extends.len(), 1);
        assert_eq!(collector.implements.len(), 2);
        assert_eq!(collector.fields().count(), 3);

        let nested: Vec<_> = collector
            .member_types()
            .map(|t| (names.resolve(t.name.unwrap()), t.kind))
            .collect();
        assert_eq!(
            nested,
            [
                ("Node", TypeDeclKind::Class),
                ("Mode", TypeDeclKind::Enum),
                ("Visitor", TypeDeclKind::Interface),
            ]
        );

        let mode = collector.member_types().nth(1).unwrap();
        let constants: Vec<_> = mode.enum_constants().collect();
        assert_eq!(constants.len(), 2);
        assert!(constants[0].body.as_ref().unwrap().is_enum_constant_body());
    }

    #[test]
    fn spans_point_into_source() {
        let names = NameTable::new();
        let mut db = SourceDb::new();
        let id = db.add_source("Foo.java", "class Foo extends Bar {}".to_string());
        let sink = DiagnosticSink::new();
        let unit = parse_file(id, &db, &names, &sink);
        let decl = &unit.types[0];
        assert_eq!(db.snippet(decl.name_span), "Foo");
        assert_eq!(db.snippet(decl.extends[0].span()), "Bar");
        assert_eq!(db.snippet(decl.span), "class Foo extends Bar {}");
    }

    #[test]
    fn errors_carry_locations() {
        let names = NameTable::new();
        let mut db = SourceDb::new();
        let id = db.add_source("Bad.java", "class Bad {\n  int ;\n}".to_string());
        let sink = DiagnosticSink::new();
        parse_file(id, &db, &names, &sink);
        let errors = sink.take_all();
        assert_eq!(errors.len(), 1);
        assert_eq!(db.resolve_span(errors[0].primary_span).to_string(), "Bad.java:2:7");
    }

    #[test]
    fn ast_serializes() {
        let names = NameTable::new();
        let unit = parse_ok("package p; class A<T> { T t; }", &names);
        let json = serde_json::to_string(&unit).unwrap();
        let back: CompilationUnit = serde_json::from_str(&json).unwrap();
        assert_eq!(back.types.len(), 1);
        assert_eq!(back.types[0].fields().count(), 1);
    }
}

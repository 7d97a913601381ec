//! `jabi stubs`: one ABI stub record per top-level type.
//!
//! 1. Load the project config (nearest `jabi.toml`, else defaults)
//! 2. Discover `.java` files in the given paths or `[project] sources`
//! 3. Parse every file in parallel
//! 4. Open a resolution session over the batch and the symbol tables
//! 5. Extract each top-level type's surface in parallel
//! 6. Write the stubs and render diagnostics

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use jabi_config::StubFormat;
use jabi_diagnostics::{DiagnosticSink, Severity};
use jabi_java_parser::ast::Modifier;
use jabi_model::{Element, ElementKind, ModelError, ResolutionSession, TypeMirror};
use jabi_source::{SourceDb, Span};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

use crate::logging::init_logging;
use crate::pipeline::{load_project, open_session, render_diagnostics};
use crate::{GlobalArgs, OutputFormat, StubsArgs};

/// The public surface of one type.
#[derive(Debug, Serialize)]
pub struct TypeStub {
    /// Canonical name, or the simple name when there is none.
    pub name: String,
    /// Declaration flavor.
    pub kind: ElementKind,
    /// Declared modifiers.
    pub modifiers: Vec<Modifier>,
    /// Type parameter names.
    pub type_parameters: Vec<String>,
    /// Direct superclass as Java source; absent for interfaces and the root class.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub superclass: Option<String>,
    /// Direct superinterfaces as Java source.
    pub interfaces: Vec<String>,
    /// Enum constant names in declaration order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub enum_constants: Vec<String>,
    /// Non-private fields.
    pub fields: Vec<FieldStub>,
    /// Non-private member types.
    pub nested: Vec<TypeStub>,
    /// The unit the type was read from; top-level types only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceRef>,
}

/// One field of a [`TypeStub`].
#[derive(Debug, Serialize)]
pub struct FieldStub {
    /// Field name.
    pub name: String,
    /// Declared type as Java source.
    #[serde(rename = "type")]
    pub ty: String,
    /// Declared modifiers.
    pub modifiers: Vec<Modifier>,
}

/// Where a stub came from.
#[derive(Debug, Serialize)]
pub struct SourceRef {
    /// Path of the compilation unit.
    pub path: PathBuf,
    /// Hex XXH3-128 of the unit's text.
    pub content_hash: String,
}

/// Runs the `jabi stubs` command.
///
/// Returns exit code 0 when no error diagnostics were produced, 1 otherwise.
pub fn run(args: &StubsArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let project = load_project(global)?;
    init_logging(global, &project.config.log);

    if !global.quiet {
        eprintln!("   Resolving {}", project.config.project.name);
    }

    let sink = DiagnosticSink::new();
    let Some((session, source_db)) = open_session(&project, &args.inputs, &sink)? else {
        if !global.quiet {
            eprintln!("warning: no Java source files found");
        }
        return Ok(0);
    };

    let types = session.top_level_types()?;
    let stubs: Vec<TypeStub> = types
        .par_iter()
        .map(|element| extract(element, &source_db, &sink))
        .collect();

    let (hits, misses) = session.cache_stats();
    debug!(
        elements = session.element_count(),
        hits, misses, "canonicalization cache"
    );

    let format = match args.format {
        Some(OutputFormat::Json) => StubFormat::Json,
        Some(OutputFormat::Text) => StubFormat::Text,
        None => project.config.output.format,
    };
    let out_dir = args
        .out
        .as_ref()
        .map(PathBuf::from)
        .or_else(|| project.config.output.dir.as_ref().map(|dir| project.root.join(dir)));

    match out_dir {
        Some(dir) => {
            let written = write_stubs(&stubs, &dir, format)?;
            info!(stubs = written, dir = %dir.display(), "wrote stubs");
        }
        None => match format {
            StubFormat::Json => println!("{}", serde_json::to_string_pretty(&stubs)?),
            StubFormat::Text => {
                for stub in &stubs {
                    print!("{}", render_text(stub));
                }
            }
        },
    }

    let diagnostics = sink.diagnostics();
    render_diagnostics(&sink, &source_db, global.color);
    let warning_count = diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Warning)
        .count();

    if !global.quiet {
        eprintln!(
            "   Result: {} stub(s), {} error(s), {} warning(s)",
            stubs.len(),
            sink.error_count(),
            warning_count
        );
    }

    if sink.has_errors() {
        Ok(1)
    } else {
        Ok(0)
    }
}

/// Builds the stub of a top-level type, reporting unresolvable references
/// into `sink`.
pub fn extract(element: &Element<'_>, source_db: &SourceDb, sink: &DiagnosticSink) -> TypeStub {
    let mut stub = extract_type(element, sink);
    stub.source = element.span().filter(|span| !span.is_dummy()).map(|span| {
        let file = source_db.get_file(span.file);
        SourceRef {
            path: file.path.clone(),
            content_hash: file.content_hash.to_string(),
        }
    });
    stub
}

fn extract_type(element: &Element<'_>, sink: &DiagnosticSink) -> TypeStub {
    let session = element.session();
    let at = element.span().unwrap_or(Span::DUMMY);
    let names = session.names();

    let superclass = match element.superclass() {
        Ok(TypeMirror::None(_)) => None,
        Ok(ty) => {
            report_unresolved(&ty, session, at, sink);
            Some(ty.display(session).to_string())
        }
        Err(err) => Some(unresolved(err, at, sink)),
    };
    let interfaces = match element.interfaces() {
        Ok(tys) => tys
            .iter()
            .map(|ty| {
                report_unresolved(ty, session, at, sink);
                ty.display(session).to_string()
            })
            .collect(),
        Err(err) => vec![unresolved(err, at, sink)],
    };

    let mut stub = TypeStub {
        name: element.to_string(),
        kind: element.kind(),
        modifiers: element.modifiers().to_vec(),
        type_parameters: element
            .type_parameters()
            .iter()
            .map(|param| names.resolve(*param).to_string())
            .collect(),
        superclass,
        interfaces,
        enum_constants: Vec::new(),
        fields: Vec::new(),
        nested: Vec::new(),
        source: None,
    };

    let members = match element.enclosed_elements() {
        Ok(members) => members,
        Err(err) => {
            sink.emit(err.to_diagnostic(at));
            return stub;
        }
    };
    for member in members {
        if member.has_modifier(Modifier::Private) {
            continue;
        }
        match member.kind() {
            ElementKind::EnumConstant => {
                stub.enum_constants.push(member.simple_name_str().to_string());
            }
            ElementKind::Field => {
                let ty = member.as_type();
                report_unresolved(&ty, session, member.span().unwrap_or(at), sink);
                stub.fields.push(FieldStub {
                    name: member.simple_name_str().to_string(),
                    ty: ty.display(session).to_string(),
                    modifiers: member.modifiers().to_vec(),
                });
            }
            kind if kind.is_type() => stub.nested.push(extract_type(&member, sink)),
            _ => {}
        }
    }
    stub
}

/// Emits the diagnostic for a failed supertype query and returns the name
/// to record in its place.
fn unresolved(err: ModelError, at: Span, sink: &DiagnosticSink) -> String {
    sink.emit(err.to_diagnostic(at));
    match err {
        ModelError::UnknownSymbol { name, .. } => name,
        _ => "<error>".to_string(),
    }
}

/// Reports every declared type inside `ty` whose name does not resolve.
fn report_unresolved(ty: &TypeMirror, session: &ResolutionSession, at: Span, sink: &DiagnosticSink) {
    match ty {
        TypeMirror::Declared(declared) => {
            if let Err(err) = declared.element(session) {
                sink.emit(err.to_diagnostic(at));
            }
            for arg in declared.type_arguments() {
                report_unresolved(arg, session, at, sink);
            }
        }
        TypeMirror::Array(component) => report_unresolved(component, session, at, sink),
        TypeMirror::Wildcard(wildcard) => {
            for bound in wildcard.extends_bound.iter().chain(&wildcard.super_bound) {
                report_unresolved(bound, session, at, sink);
            }
        }
        _ => {}
    }
}

/// Writes one file per stub into `dir`, named after the type.
///
/// Returns the number of files written.
fn write_stubs(
    stubs: &[TypeStub],
    dir: &Path,
    format: StubFormat,
) -> Result<usize, Box<dyn std::error::Error>> {
    std::fs::create_dir_all(dir)?;
    for stub in stubs {
        let (file_name, contents) = match format {
            StubFormat::Json => (
                format!("{}.json", stub.name),
                serde_json::to_string_pretty(stub)?,
            ),
            StubFormat::Text => (format!("{}.txt", stub.name), render_text(stub)),
        };
        std::fs::write(dir.join(file_name), contents)?;
    }
    Ok(stubs.len())
}

/// Renders a stub as an indented summary, one declaration per line.
pub fn render_text(stub: &TypeStub) -> String {
    let mut out = String::new();
    write_type(&mut out, stub, 0);
    out
}

fn write_type(out: &mut String, stub: &TypeStub, depth: usize) {
    let indent = "    ".repeat(depth);
    let _ = write!(out, "{indent}");
    for modifier in &stub.modifiers {
        let _ = write!(out, "{} ", modifier.keyword());
    }
    let _ = write!(out, "{} {}", stub.kind, stub.name);
    if !stub.type_parameters.is_empty() {
        let _ = write!(out, "<{}>", stub.type_parameters.join(", "));
    }
    if let Some(ref superclass) = stub.superclass {
        let _ = write!(out, " extends {superclass}");
    }
    if !stub.interfaces.is_empty() {
        let _ = write!(out, " implements {}", stub.interfaces.join(", "));
    }
    out.push('\n');

    for constant in &stub.enum_constants {
        let _ = writeln!(out, "{indent}    {constant}");
    }
    for field in &stub.fields {
        let _ = write!(out, "{indent}    ");
        for modifier in &field.modifiers {
            let _ = write!(out, "{} ", modifier.keyword());
        }
        let _ = writeln!(out, "{} {}", field.ty, field.name);
    }
    for nested in &stub.nested {
        write_type(out, nested, depth + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InputArgs;
    use jabi_common::NameTable;
    use jabi_model::{ModelConfig, SymbolTable};
    use std::fs;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn session(sources: &[&str]) -> (ResolutionSession, SourceDb) {
        let names = Arc::new(NameTable::new());
        let sink = DiagnosticSink::new();
        let mut db = SourceDb::new();
        let ids: Vec<_> = sources
            .iter()
            .enumerate()
            .map(|(i, text)| db.add_source(format!("Unit{i}.java"), text.to_string()))
            .collect();
        let units = ids
            .iter()
            .map(|id| jabi_java_parser::parse_file(*id, &db, &names, &sink))
            .collect();
        assert!(!sink.has_errors());
        let session = ResolutionSession::new(
            units,
            names,
            Arc::new(SymbolTable::platform()),
            ModelConfig::default(),
        );
        (session, db)
    }

    fn stub_of(sources: &[&str], name: &str) -> (TypeStub, DiagnosticSink) {
        let (session, db) = session(sources);
        let sink = DiagnosticSink::new();
        let element = session.lookup_type(name).unwrap();
        let stub = extract(&element, &db, &sink);
        (stub, sink)
    }

    #[test]
    fn class_surface() {
        let (stub, sink) = stub_of(
            &["package com.example;
               public final class Box<T> implements Comparable<Box<T>> {
                   public T value;
                   private int secret;
                   protected static int[] counts, totals;
                   public static class Inner {}
                   private static class Hidden {}
               }"],
            "com.example.Box",
        );
        assert_eq!(stub.name, "com.example.Box");
        assert_eq!(stub.kind, ElementKind::Class);
        assert_eq!(stub.modifiers, vec![Modifier::Public, Modifier::Final]);
        assert_eq!(stub.type_parameters, vec!["T"]);
        assert_eq!(stub.superclass.as_deref(), Some("java.lang.Object"));
        assert_eq!(stub.interfaces, vec!["java.lang.Comparable<com.example.Box<T>>"]);

        let fields: Vec<_> = stub
            .fields
            .iter()
            .map(|f| (f.name.as_str(), f.ty.as_str()))
            .collect();
        assert_eq!(
            fields,
            vec![("value", "T"), ("counts", "int[]"), ("totals", "int[]")]
        );
        assert_eq!(stub.nested.len(), 1);
        assert_eq!(stub.nested[0].name, "com.example.Box.Inner");
        assert!(stub.nested[0].source.is_none());

        let source = stub.source.unwrap();
        assert_eq!(source.path, PathBuf::from("Unit0.java"));
        assert_eq!(source.content_hash.len(), 32);
        assert!(sink.diagnostics().is_empty());
    }

    #[test]
    fn enum_constants_and_supertype() {
        let (stub, _) = stub_of(
            &["package p; public enum Color { RED, GREEN { }, BLUE; private int code; }"],
            "p.Color",
        );
        assert_eq!(stub.kind, ElementKind::Enum);
        assert_eq!(stub.enum_constants, vec!["RED", "GREEN", "BLUE"]);
        assert_eq!(stub.superclass.as_deref(), Some("java.lang.Enum<p.Color>"));
        assert!(stub.fields.is_empty());
    }

    #[test]
    fn interface_has_no_superclass() {
        let (stub, _) = stub_of(
            &["package p; public interface Shape extends Comparable<Shape> { int SIDES = 0; }"],
            "p.Shape",
        );
        assert!(stub.superclass.is_none());
        assert_eq!(stub.interfaces, vec!["java.lang.Comparable<p.Shape>"]);
        let json = serde_json::to_value(&stub).unwrap();
        assert!(json.get("superclass").is_none());
        assert_eq!(json["kind"], "interface");
    }

    #[test]
    fn unknown_supertype_is_recorded_and_reported() {
        let (stub, sink) = stub_of(&["package p; public class A extends Missing {}"], "p.A");
        assert_eq!(stub.superclass.as_deref(), Some("Missing"));
        let diagnostics = sink.diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, jabi_model::errors::W301);
        assert_eq!(diagnostics[0].severity, Severity::Warning);
    }

    #[test]
    fn unknown_field_type_is_rendered_as_written() {
        let (stub, sink) = stub_of(&["package p; public class A { public Gone<String> g; }"], "p.A");
        assert_eq!(stub.fields[0].ty, "Gone<java.lang.String>");
        assert_eq!(sink.diagnostics().len(), 1);
    }

    #[test]
    fn text_rendering() {
        let (stub, _) = stub_of(
            &["package p; public class Outer { public int x; public interface Cb {} }"],
            "p.Outer",
        );
        let text = render_text(&stub);
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "public class p.Outer extends java.lang.Object");
        assert_eq!(lines[1], "    public int x");
        assert_eq!(lines[2], "    public interface p.Outer.Cb");
    }

    #[test]
    fn run_writes_one_file_per_type() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src/p");
        fs::create_dir_all(&src).unwrap();
        fs::write(
            tmp.path().join("jabi.toml"),
            "[project]\nname = \"demo\"\n\n[output]\ndir = \"abi\"\n",
        )
        .unwrap();
        fs::write(src.join("A.java"), "package p; public class A {}").unwrap();
        fs::write(src.join("B.java"), "package p; public class B extends A {}").unwrap();

        let args = StubsArgs {
            inputs: InputArgs {
                paths: Vec::new(),
                symbols: Vec::new(),
                no_platform: false,
            },
            out: None,
            format: None,
        };
        let global = GlobalArgs {
            quiet: true,
            verbose: false,
            color: false,
            config: Some(tmp.path().to_string_lossy().into_owned()),
            log_format: None,
        };
        assert_eq!(run(&args, &global).unwrap(), 0);

        let b = fs::read_to_string(tmp.path().join("abi/p.B.json")).unwrap();
        let json: serde_json::Value = serde_json::from_str(&b).unwrap();
        assert_eq!(json["superclass"], "p.A");
        assert!(tmp.path().join("abi/p.A.json").is_file());
    }
}

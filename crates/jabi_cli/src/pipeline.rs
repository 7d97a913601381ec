//! Shared pipeline steps for `stubs` and `lookup`.
//!
//! Project and config resolution, `.java` discovery, parallel parsing, the
//! resolution delegate stack and diagnostic rendering.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use jabi_common::NameTable;
use jabi_config::{JabiConfig, CONFIG_FILE_NAME};
use jabi_diagnostics::{DiagnosticRenderer, DiagnosticSink, TerminalRenderer};
use jabi_java_parser::ast::CompilationUnit;
use jabi_model::{ChainedDelegate, ModelConfig, ResolutionDelegate, ResolutionSession, SymbolTable};
use jabi_source::SourceDb;
use rayon::prelude::*;
use tracing::{debug, info};

use crate::{GlobalArgs, InputArgs};

/// A project directory and its configuration.
pub struct Project {
    /// Directory relative config paths are resolved against.
    pub root: PathBuf,
    /// Parsed `jabi.toml`, or defaults when there is none.
    pub config: JabiConfig,
}

/// A parsed batch, ready to become a session.
pub struct Batch {
    /// Text of every unit.
    pub source_db: SourceDb,
    /// The table every identifier was interned into.
    pub names: Arc<NameTable>,
    /// One tree per file, in discovery order.
    pub units: Vec<CompilationUnit>,
}

/// Walks up from `start` looking for the nearest directory containing `jabi.toml`.
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(CONFIG_FILE_NAME).is_file() {
            return Some(current);
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Loads the project configuration.
///
/// `--config` may name a file or a directory. Without it the nearest
/// `jabi.toml` above the current directory is used; with none found, the
/// defaults apply and the current directory is the root.
pub fn load_project(global: &GlobalArgs) -> Result<Project, Box<dyn std::error::Error>> {
    if let Some(ref config_path) = global.config {
        let path = PathBuf::from(config_path);
        return if path.is_dir() {
            Ok(Project {
                config: jabi_config::load_config(&path)?,
                root: path,
            })
        } else {
            Ok(Project {
                config: jabi_config::load_config_file(&path)?,
                root: path
                    .parent()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| PathBuf::from(".")),
            })
        };
    }
    let cwd = std::env::current_dir()?;
    match find_project_root(&cwd) {
        Some(root) => Ok(Project {
            config: jabi_config::load_config(&root)?,
            root,
        }),
        None => Ok(Project {
            root: cwd,
            config: JabiConfig::default(),
        }),
    }
}

/// The files and directories to scan: the command line's, else the
/// configured source roots.
pub fn source_roots(project: &Project, inputs: &InputArgs) -> Vec<PathBuf> {
    if inputs.paths.is_empty() {
        project
            .config
            .project
            .sources
            .iter()
            .map(|dir| project.root.join(dir))
            .collect()
    } else {
        inputs.paths.iter().map(PathBuf::from).collect()
    }
}

/// Returns `true` for `.java` files other than module descriptors.
pub fn is_java_source(path: &Path) -> bool {
    path.extension().and_then(|ext| ext.to_str()) == Some("java")
        && path.file_name().and_then(|name| name.to_str()) != Some("module-info.java")
}

/// Collects `.java` files under `roots`, sorted and without duplicates.
///
/// Roots that do not exist are skipped.
pub fn discover_java_files(roots: &[PathBuf]) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
    let mut files = Vec::new();
    for root in roots {
        if root.is_dir() {
            walk_dir(root, &mut files)?;
        } else if root.is_file() && is_java_source(root) {
            files.push(root.clone());
        }
    }
    files.sort();
    files.dedup();
    Ok(files)
}

fn walk_dir(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            walk_dir(&path, files)?;
        } else if is_java_source(&path) {
            files.push(path);
        }
    }
    Ok(())
}

/// Loads every file, then parses them in parallel.
pub fn parse_batch(
    files: &[PathBuf],
    sink: &DiagnosticSink,
) -> Result<Batch, Box<dyn std::error::Error>> {
    let mut source_db = SourceDb::new();
    let file_ids = files
        .iter()
        .map(|path| source_db.load_file(path))
        .collect::<Result<Vec<_>, _>>()?;

    let names = Arc::new(NameTable::new());
    let units: Vec<CompilationUnit> = file_ids
        .par_iter()
        .map(|file_id| jabi_java_parser::parse_file(*file_id, &source_db, &names, sink))
        .collect();
    info!(
        files = units.len(),
        errors = sink.error_count(),
        "parsed sources"
    );
    Ok(Batch {
        source_db,
        names,
        units,
    })
}

/// Builds the delegate stack: command-line symbol tables, configured ones,
/// then the platform table.
pub fn build_delegate(
    project: &Project,
    inputs: &InputArgs,
) -> Result<Arc<dyn ResolutionDelegate>, Box<dyn std::error::Error>> {
    let cli_tables = inputs.symbols.iter().map(PathBuf::from);
    let configured = project
        .config
        .classpath
        .symbols
        .iter()
        .map(|path| project.root.join(path));

    let mut delegate = ChainedDelegate::new();
    for path in cli_tables.chain(configured) {
        let table = SymbolTable::load(&path)?;
        debug!(path = %path.display(), symbols = table.len(), "loaded symbol table");
        delegate.push(Arc::new(table));
    }
    if project.config.classpath.platform && !inputs.no_platform {
        delegate.push(Arc::new(SymbolTable::platform()));
    }
    Ok(Arc::new(delegate))
}

/// The model settings from `[model]`.
pub fn model_config(config: &JabiConfig) -> ModelConfig {
    ModelConfig {
        root_object: config.model.root_object.clone(),
        implicit_imports: config.model.implicit_imports.clone(),
    }
}

/// Runs discovery and parsing and opens a session over the result.
///
/// Returns `None` when no sources were found.
pub fn open_session(
    project: &Project,
    inputs: &InputArgs,
    sink: &DiagnosticSink,
) -> Result<Option<(ResolutionSession, SourceDb)>, Box<dyn std::error::Error>> {
    let roots = source_roots(project, inputs);
    let files = discover_java_files(&roots)?;
    if files.is_empty() {
        return Ok(None);
    }
    let delegate = build_delegate(project, inputs)?;
    let Batch {
        source_db,
        names,
        units,
    } = parse_batch(&files, sink)?;
    let session = ResolutionSession::new(units, names, delegate, model_config(&project.config));
    session.report_duplicates(sink);
    Ok(Some((session, source_db)))
}

/// Renders all diagnostics from a sink to stderr.
///
/// Returns the number of diagnostics rendered.
pub fn render_diagnostics(sink: &DiagnosticSink, source_db: &SourceDb, color: bool) -> usize {
    let diagnostics = sink.diagnostics();
    let renderer = TerminalRenderer::new(color);
    for diag in &diagnostics {
        eprintln!("{}", renderer.render(diag, source_db));
    }
    diagnostics.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn inputs(paths: &[&str], symbols: &[&str]) -> InputArgs {
        InputArgs {
            paths: paths.iter().map(|p| p.to_string()).collect(),
            symbols: symbols.iter().map(|p| p.to_string()).collect(),
            no_platform: false,
        }
    }

    fn project(root: &Path) -> Project {
        Project {
            root: root.to_path_buf(),
            config: JabiConfig::default(),
        }
    }

    #[test]
    fn find_project_root_in_parent() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("jabi.toml"), "[project]\nname = \"t\"\n").unwrap();
        let sub = tmp.path().join("src/main");
        fs::create_dir_all(&sub).unwrap();
        assert_eq!(find_project_root(&sub).as_deref(), Some(tmp.path()));
    }

    #[test]
    fn java_source_detection() {
        assert!(is_java_source(Path::new("a/Foo.java")));
        assert!(!is_java_source(Path::new("a/module-info.java")));
        assert!(!is_java_source(Path::new("a/Foo.class")));
        assert!(!is_java_source(Path::new("Foo")));
    }

    #[test]
    fn discover_files_recursive_and_sorted() {
        let tmp = TempDir::new().unwrap();
        let pkg = tmp.path().join("com/example");
        fs::create_dir_all(&pkg).unwrap();
        fs::write(pkg.join("B.java"), "package com.example; class B {}").unwrap();
        fs::write(pkg.join("A.java"), "package com.example; class A {}").unwrap();
        fs::write(tmp.path().join("module-info.java"), "module m {}").unwrap();
        fs::write(tmp.path().join("notes.txt"), "not java").unwrap();

        let roots = vec![tmp.path().to_path_buf(), pkg.join("A.java")];
        let files = discover_java_files(&roots).unwrap();
        assert_eq!(files, vec![pkg.join("A.java"), pkg.join("B.java")]);
    }

    #[test]
    fn missing_roots_are_skipped() {
        let tmp = TempDir::new().unwrap();
        let files = discover_java_files(&[tmp.path().join("nope")]).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn configured_sources_are_root_relative() {
        let tmp = TempDir::new().unwrap();
        let roots = source_roots(&project(tmp.path()), &inputs(&[], &[]));
        assert_eq!(roots, vec![tmp.path().join("src")]);
        let roots = source_roots(&project(tmp.path()), &inputs(&["Foo.java"], &[]));
        assert_eq!(roots, vec![PathBuf::from("Foo.java")]);
    }

    #[test]
    fn parse_batch_keeps_file_order() {
        let tmp = TempDir::new().unwrap();
        let a = tmp.path().join("A.java");
        let b = tmp.path().join("B.java");
        fs::write(&a, "class A {}").unwrap();
        fs::write(&b, "class B extends {}").unwrap();
        let sink = DiagnosticSink::new();
        let batch = parse_batch(&[a, b], &sink).unwrap();
        assert_eq!(batch.units.len(), 2);
        assert_eq!(batch.source_db.len(), 2);
        let first = batch.units[0].types[0].name.unwrap();
        assert_eq!(batch.names.resolve(first), "A");
        assert!(sink.has_errors());
    }

    #[test]
    fn delegate_consults_symbol_files_before_platform() {
        let tmp = TempDir::new().unwrap();
        let symbols = tmp.path().join("deps.json");
        fs::write(
            &symbols,
            r#"{"symbols": [{"qualified_name": "com.dep.Base", "package": "com.dep", "kind": "class"}]}"#,
        )
        .unwrap();
        let delegate =
            build_delegate(&project(tmp.path()), &inputs(&[], &[symbols.to_str().unwrap()])).unwrap();
        assert!(delegate.resolve("com.dep.Base").is_some());
        assert!(delegate.resolve("java.lang.Object").is_some());
        assert!(delegate.resolve("com.dep.Missing").is_none());
    }

    #[test]
    fn platform_can_be_disabled() {
        let tmp = TempDir::new().unwrap();
        let mut args = inputs(&[], &[]);
        args.no_platform = true;
        let delegate = build_delegate(&project(tmp.path()), &args).unwrap();
        assert!(delegate.resolve("java.lang.Object").is_none());
    }

    #[test]
    fn missing_symbol_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("missing.json");
        let result = build_delegate(&project(tmp.path()), &inputs(&[], &[missing.to_str().unwrap()]));
        assert!(result.is_err());
    }
}

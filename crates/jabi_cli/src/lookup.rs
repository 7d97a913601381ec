//! `jabi lookup`: prints the surface of one type.
//!
//! The name may denote a type in the batch or one only a symbol table knows;
//! either way the answer comes from the same resolution session.

use jabi_diagnostics::DiagnosticSink;

use crate::logging::init_logging;
use crate::pipeline::{load_project, open_session, render_diagnostics};
use crate::stubs::{extract, render_text};
use crate::{GlobalArgs, LookupArgs};

/// Runs the `jabi lookup` command.
///
/// Returns exit code 1 when the name does not resolve.
pub fn run(args: &LookupArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let project = load_project(global)?;
    init_logging(global, &project.config.log);

    let sink = DiagnosticSink::new();
    let Some((session, source_db)) = open_session(&project, &args.inputs, &sink)? else {
        eprintln!("error: no Java source files found");
        return Ok(1);
    };

    let code = match session.lookup_type(&args.name) {
        Ok(element) => {
            let stub = extract(&element, &source_db, &sink);
            print!("{}", render_text(&stub));
            if !global.quiet {
                eprintln!("   Origin: {:?}", element.origin());
            }
            0
        }
        Err(err) => {
            eprintln!("error: {err}");
            1
        }
    };
    render_diagnostics(&sink, &source_db, global.color);
    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InputArgs;
    use std::fs;
    use tempfile::TempDir;

    fn args(name: &str, dir: &std::path::Path) -> LookupArgs {
        LookupArgs {
            name: name.to_string(),
            inputs: InputArgs {
                paths: vec![dir.to_string_lossy().into_owned()],
                symbols: Vec::new(),
                no_platform: false,
            },
        }
    }

    fn global(dir: &std::path::Path) -> GlobalArgs {
        fs::write(dir.join("jabi.toml"), "[project]\nname = \"t\"\n").unwrap();
        GlobalArgs {
            quiet: true,
            verbose: false,
            color: false,
            config: Some(dir.to_string_lossy().into_owned()),
            log_format: None,
        }
    }

    #[test]
    fn finds_batch_and_platform_types() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("A.java"), "package p; public class A {}").unwrap();
        assert_eq!(run(&args("p.A", tmp.path()), &global(tmp.path())).unwrap(), 0);
        assert_eq!(
            run(&args("java.lang.String", tmp.path()), &global(tmp.path())).unwrap(),
            0
        );
    }

    #[test]
    fn unknown_name_fails() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("A.java"), "package p; public class A {}").unwrap();
        assert_eq!(run(&args("p.Nope", tmp.path()), &global(tmp.path())).unwrap(), 1);
    }
}

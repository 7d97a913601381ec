//! Loading and validating `jabi.toml`.

use crate::error::ConfigError;
use crate::types::JabiConfig;
use std::path::Path;

/// File name looked up in a project directory.
pub const CONFIG_FILE_NAME: &str = "jabi.toml";

/// Loads `<project_dir>/jabi.toml`.
pub fn load_config(project_dir: &Path) -> Result<JabiConfig, ConfigError> {
    load_config_file(&project_dir.join(CONFIG_FILE_NAME))
}

/// Loads a configuration from an explicit path.
pub fn load_config_file(path: &Path) -> Result<JabiConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    load_config_from_str(&content)
}

/// Parses and validates configuration text.
pub fn load_config_from_str(content: &str) -> Result<JabiConfig, ConfigError> {
    let config: JabiConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &JabiConfig) -> Result<(), ConfigError> {
    if config.project.name.is_empty() {
        return Err(ConfigError::MissingField("project.name".to_string()));
    }
    if !is_qualified_identifier(&config.model.root_object) {
        return Err(ConfigError::ValidationError(format!(
            "model.root_object `{}` is not a qualified class name",
            config.model.root_object
        )));
    }
    if let Some(bad) = config
        .model
        .implicit_imports
        .iter()
        .find(|pkg| !is_qualified_identifier(pkg))
    {
        return Err(ConfigError::ValidationError(format!(
            "model.implicit_imports entry `{bad}` is not a package name"
        )));
    }
    Ok(())
}

/// `a.b.C`: non-empty dot-separated Java identifiers.
fn is_qualified_identifier(text: &str) -> bool {
    !text.is_empty()
        && text.split('.').all(|segment| {
            let mut chars = segment.chars();
            matches!(chars.next(), Some(c) if c.is_alphabetic() || c == '_' || c == '$')
                && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{LogFormat, LogLevel, StubFormat};

    #[test]
    fn empty_file_uses_defaults() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.project.name, "jabi");
        assert_eq!(config.project.sources, vec!["src"]);
        assert!(config.classpath.platform);
        assert_eq!(config.model.root_object, "java.lang.Object");
        assert_eq!(config.model.implicit_imports, vec!["java.lang"]);
        assert_eq!(config.output.format, StubFormat::Json);
        assert_eq!(config.log.level, LogLevel::Info);
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
[project]
name = "app"
sources = ["src/main/java", "src/gen/java"]

[classpath]
symbols = ["deps/guava.json"]
platform = false

[model]
root_object = "java.lang.Object"
implicit_imports = ["java.lang", "kotlin"]

[output]
dir = "build/abi"
format = "text"

[log]
level = "debug"
format = "json"
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.project.name, "app");
        assert_eq!(config.project.sources.len(), 2);
        assert_eq!(config.classpath.symbols, vec!["deps/guava.json"]);
        assert!(!config.classpath.platform);
        assert_eq!(config.model.implicit_imports.len(), 2);
        assert_eq!(config.output.dir.as_deref(), Some("build/abi"));
        assert_eq!(config.output.format, StubFormat::Text);
        assert_eq!(config.log.level, LogLevel::Debug);
        assert_eq!(config.log.format, LogFormat::Json);
    }

    #[test]
    fn empty_name_rejected() {
        let err = load_config_from_str("[project]\nname = \"\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::MissingField(_)));
    }

    #[test]
    fn malformed_root_object_rejected() {
        let err = load_config_from_str("[model]\nroot_object = \"java..Object\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn malformed_implicit_import_rejected() {
        let err =
            load_config_from_str("[model]\nimplicit_imports = [\"java.lang.*\"]\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn unknown_log_level_is_parse_error() {
        let err = load_config_from_str("[log]\nlevel = \"loud\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn load_from_project_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "[project]\nname = \"x\"\n").unwrap();
        let config = load_config(dir.path()).unwrap();
        assert_eq!(config.project.name, "x");
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_config(Path::new("/nonexistent/dir")).unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }

    #[test]
    fn directive_strings() {
        assert_eq!(LogLevel::Trace.as_directive(), "trace");
        assert_eq!(LogLevel::Warn.as_directive(), "warn");
    }
}

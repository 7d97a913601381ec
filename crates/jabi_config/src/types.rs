//! Configuration types deserialized from `jabi.toml`.

use serde::Deserialize;

/// The whole configuration file.
#[derive(Debug, Default, Deserialize)]
pub struct JabiConfig {
    /// Project metadata and source roots.
    #[serde(default)]
    pub project: ProjectSection,
    /// Precompiled dependency symbols.
    #[serde(default)]
    pub classpath: ClasspathSection,
    /// Semantic-model policy knobs.
    #[serde(default)]
    pub model: ModelSection,
    /// Where and how stubs are written.
    #[serde(default)]
    pub output: OutputSection,
    /// Logging defaults, overridable from the command line.
    #[serde(default)]
    pub log: LogSection,
}

/// `[project]`
#[derive(Debug, Deserialize)]
pub struct ProjectSection {
    /// Project name, used in log output.
    pub name: String,
    /// Directories scanned recursively for `.java` files.
    #[serde(default = "default_sources")]
    pub sources: Vec<String>,
}

impl Default for ProjectSection {
    fn default() -> Self {
        Self {
            name: "jabi".to_string(),
            sources: default_sources(),
        }
    }
}

fn default_sources() -> Vec<String> {
    vec!["src".to_string()]
}

/// `[classpath]`
#[derive(Debug, Deserialize)]
pub struct ClasspathSection {
    /// JSON symbol tables describing compiled dependencies.
    #[serde(default)]
    pub symbols: Vec<String>,
    /// Whether the built-in `java.lang` table is consulted.
    #[serde(default = "default_true")]
    pub platform: bool,
}

impl Default for ClasspathSection {
    fn default() -> Self {
        Self {
            symbols: Vec::new(),
            platform: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// `[model]`
#[derive(Debug, Deserialize)]
pub struct ModelSection {
    /// Qualified name of the platform root class.
    #[serde(default = "default_root_object")]
    pub root_object: String,
    /// Packages imported on demand into every compilation unit.
    #[serde(default = "default_implicit_imports")]
    pub implicit_imports: Vec<String>,
}

impl Default for ModelSection {
    fn default() -> Self {
        Self {
            root_object: default_root_object(),
            implicit_imports: default_implicit_imports(),
        }
    }
}

fn default_root_object() -> String {
    "java.lang.Object".to_string()
}

fn default_implicit_imports() -> Vec<String> {
    vec!["java.lang".to_string()]
}

/// `[output]`
#[derive(Debug, Deserialize)]
pub struct OutputSection {
    /// Directory stubs are written to. Stubs go to stdout when unset.
    #[serde(default)]
    pub dir: Option<String>,
    /// Stub encoding.
    #[serde(default)]
    pub format: StubFormat,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            dir: None,
            format: StubFormat::Json,
        }
    }
}

/// Encoding of generated stubs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StubFormat {
    /// One JSON document per top-level type.
    #[default]
    Json,
    /// Indented human-readable summary.
    Text,
}

/// `[log]`
#[derive(Debug, Default, Deserialize)]
pub struct LogSection {
    /// Maximum level emitted.
    #[serde(default)]
    pub level: LogLevel,
    /// Text or JSON lines.
    #[serde(default)]
    pub format: LogFormat,
}

/// Logging verbosity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Errors only.
    Error,
    /// Errors and warnings.
    Warn,
    /// Batch-level progress.
    #[default]
    Info,
    /// Cache misses and delegate lookups.
    Debug,
    /// Every element construction.
    Trace,
}

impl LogLevel {
    /// The `EnvFilter` directive for this level.
    pub fn as_directive(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Log line encoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Compact human-readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// What a publication packages. Opaque to the graph, resolved once when the
/// publication is declared.
///
/// In `jarbird.toml`:
/// ```toml
/// source = { component = "java" }
/// source = { source-set = "main" }
/// source = { paths = ["src/main/kotlin"] }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitSource {
    #[serde(rename = "component")]
    Component(String),
    #[serde(rename = "source-set")]
    SourceSetRef(String),
    #[serde(rename = "paths")]
    RawPaths(Vec<PathBuf>),
}

impl Default for UnitSource {
    fn default() -> Self {
        UnitSource::Component("java".to_string())
    }
}

impl fmt::Display for UnitSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitSource::Component(name) => write!(f, "component '{name}'"),
            UnitSource::SourceSetRef(name) => write!(f, "source set '{name}'"),
            UnitSource::RawPaths(paths) => write!(f, "{} path(s)", paths.len()),
        }
    }
}

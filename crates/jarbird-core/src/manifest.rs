use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use jarbird_util::errors::{JarbirdError, JarbirdResult};

use crate::descriptor::VariantMode;
use crate::project::ProjectInfo;
use crate::source::UnitSource;

/// File name of the project manifest.
pub const MANIFEST_FILE: &str = "jarbird.toml";

/// The parsed representation of a `jarbird.toml` file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub project: ProjectInfo,

    /// Defaults shared by every publication declared in this project and
    /// inherited by workspace members.
    #[serde(default)]
    pub publish: PublishDefaults,

    #[serde(default, rename = "pub")]
    pub pubs: Vec<PubDecl>,

    #[serde(default)]
    pub workspace: Option<WorkspaceConfig>,
}

/// `[publish]`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PublishDefaults {
    #[serde(default)]
    pub repositories: Vec<RepositoryDecl>,
    #[serde(default)]
    pub signing: Option<bool>,
    #[serde(default)]
    pub docs: Option<bool>,
}

/// One `[[pub]]` entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PubDecl {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub variant: Option<String>,
    #[serde(default, rename = "variant-mode")]
    pub variant_mode: Option<VariantMode>,
    #[serde(default)]
    pub repositories: Vec<RepositoryDecl>,
    #[serde(default)]
    pub signing: Option<bool>,
    #[serde(default)]
    pub docs: Option<bool>,
    #[serde(default)]
    pub source: Option<UnitSource>,
}

/// `[workspace]`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    pub members: Vec<String>,
}

/// A repository a publication targets, as written in the manifest:
/// `local`, `maven:<key>`, `gradle-portal` or `artifactory:<key>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum RepositoryDecl {
    Local,
    Maven(String),
    GradlePortal,
    Artifactory(String),
}

impl FromStr for RepositoryDecl {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.split_once(':') {
            Some(("maven", key)) if !key.is_empty() => Ok(Self::Maven(key.to_string())),
            Some(("artifactory", key)) if !key.is_empty() => {
                Ok(Self::Artifactory(key.to_string()))
            }
            None if s == "local" => Ok(Self::Local),
            None if s == "gradle-portal" => Ok(Self::GradlePortal),
            _ => Err(format!(
                "unknown repository '{s}', expected local, maven:<key>, gradle-portal or artifactory:<key>"
            )),
        }
    }
}

impl TryFrom<String> for RepositoryDecl {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RepositoryDecl> for String {
    fn from(value: RepositoryDecl) -> Self {
        value.to_string()
    }
}

impl fmt::Display for RepositoryDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepositoryDecl::Local => f.write_str("local"),
            RepositoryDecl::Maven(key) => write!(f, "maven:{key}"),
            RepositoryDecl::GradlePortal => f.write_str("gradle-portal"),
            RepositoryDecl::Artifactory(key) => write!(f, "artifactory:{key}"),
        }
    }
}

impl Manifest {
    /// Parse a `jarbird.toml`, expanding `${env:VAR}` references from the
    /// `jarbird.properties` next to it and the process environment.
    pub fn from_path(path: &Path) -> JarbirdResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| JarbirdError::Manifest {
            message: format!("Failed to read {}: {e}", path.display()),
        })?;

        let dir = path.parent().unwrap_or(Path::new("."));
        let props = crate::properties::load_properties_file(&dir.join(crate::properties::PROPERTIES_FILE))
            .unwrap_or_default();
        let resolved = crate::properties::interpolate(&content, &props);

        Self::parse(&resolved)
    }

    /// Parse a `jarbird.toml` from a string (no interpolation).
    pub fn parse(content: &str) -> JarbirdResult<Self> {
        toml::from_str(content).map_err(|e| JarbirdError::Manifest {
            message: format!("Failed to parse jarbird.toml: {e}"),
        })
    }
}

//! Repository endpoints: where a publication is sent.
//!
//! Endpoints are built from `jarbird.properties` entries:
//!
//! ```properties
//! repository.maven.central.release=https://oss.example.com/release
//! repository.maven.central.snapshot=https://oss.example.com/snapshot
//! repository.maven.central.username=alice
//! repository.maven.central.password=${env:CENTRAL_PASSWORD}
//! ```

use std::fmt;

use jarbird_core::descriptor::Coordinates;
use jarbird_core::properties::PropertySource;
use jarbird_util::errors::JarbirdResult;

/// Release URL of the Gradle plugin portal.
pub const PLUGIN_PORTAL_URL: &str = "https://plugins.gradle.org/m2";

/// The kinds of destination a publication can reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EndpointKind {
    /// The local Maven cache (`~/.m2/repository`).
    Local,
    /// A named remote Maven repository.
    Maven,
    /// The public Gradle plugin portal.
    PluginPortal,
    /// A named Artifactory instance.
    Artifactory,
}

impl EndpointKind {
    /// Channels that cannot take snapshots.
    pub fn is_release_only(self) -> bool {
        matches!(self, EndpointKind::PluginPortal)
    }

    /// Kinds that may be declared more than once under different keys.
    pub fn is_named(self) -> bool {
        matches!(self, EndpointKind::Maven | EndpointKind::Artifactory)
    }

    /// Kinds that store artifacts in the standard Maven directory layout.
    pub fn is_maven_layout(self) -> bool {
        !matches!(self, EndpointKind::PluginPortal)
    }
}

impl fmt::Display for EndpointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EndpointKind::Local => "Maven Local",
            EndpointKind::Maven => "Maven",
            EndpointKind::PluginPortal => "Gradle Plugin Portal",
            EndpointKind::Artifactory => "Artifactory",
        };
        f.write_str(label)
    }
}

/// A password or API key. Never printed.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("\"\"")
        } else {
            f.write_str("\"****\"")
        }
    }
}

/// A destination repository. Equality is structural over every field, which
/// is what de-duplicates the same repository declared at several levels.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepositoryEndpoint {
    pub kind: EndpointKind,
    /// Configuration key (`central` in `repository.maven.central.*`).
    /// Empty for the local cache and the plugin portal.
    pub id: String,
    pub release_url: String,
    pub snapshot_url: String,
    pub username: String,
    pub credential: Secret,
    pub description: String,
    pub allow_insecure_protocol: bool,
    /// Artifactory repository key.
    pub repo_key: String,
}

impl RepositoryEndpoint {
    /// The local Maven cache under the user's home directory.
    pub fn local() -> Self {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string());
        let url = format!("file://{home}/.m2/repository");
        Self {
            kind: EndpointKind::Local,
            id: String::new(),
            release_url: url.clone(),
            snapshot_url: url,
            username: String::new(),
            credential: Secret::default(),
            description: "Maven Local repository".to_string(),
            allow_insecure_protocol: false,
            repo_key: String::new(),
        }
    }

    /// `repository.maven.<key>.*`: `release` and `snapshot` are required,
    /// `username`, `password`, `allowInsecureProtocol` and `description`
    /// are optional.
    pub fn maven(key: &str, props: &dyn PropertySource) -> JarbirdResult<Self> {
        let prefix = format!("repository.maven.{key}");
        Ok(Self {
            kind: EndpointKind::Maven,
            id: key.to_string(),
            release_url: props.require(&format!("{prefix}.release"))?,
            snapshot_url: props.require(&format!("{prefix}.snapshot"))?,
            username: props.property(&format!("{prefix}.username")).unwrap_or_default(),
            credential: Secret::new(props.property(&format!("{prefix}.password")).unwrap_or_default()),
            description: props
                .property(&format!("{prefix}.description"))
                .unwrap_or_else(|| format!("Maven repository '{key}'")),
            allow_insecure_protocol: props.flag(&format!("{prefix}.allowInsecureProtocol")),
            repo_key: String::new(),
        })
    }

    /// The Gradle plugin portal. Credentials are optional since the portal
    /// publisher can also read them from its own configuration.
    pub fn plugin_portal(props: &dyn PropertySource) -> Self {
        Self {
            kind: EndpointKind::PluginPortal,
            id: String::new(),
            release_url: PLUGIN_PORTAL_URL.to_string(),
            snapshot_url: String::new(),
            username: props.property("repository.gradlePortal.key").unwrap_or_default(),
            credential: Secret::new(props.property("repository.gradlePortal.secret").unwrap_or_default()),
            description: "Gradle Plugin Portal".to_string(),
            allow_insecure_protocol: false,
            repo_key: String::new(),
        }
    }

    /// `repository.artifactory.<key>.*`: `release` and `snapshot` are
    /// required, `username`, `apikey` and `repoKey` are optional.
    pub fn artifactory(key: &str, props: &dyn PropertySource) -> JarbirdResult<Self> {
        let prefix = format!("repository.artifactory.{key}");
        Ok(Self {
            kind: EndpointKind::Artifactory,
            id: key.to_string(),
            release_url: props.require(&format!("{prefix}.release"))?,
            snapshot_url: props.require(&format!("{prefix}.snapshot"))?,
            username: props.property(&format!("{prefix}.username")).unwrap_or_default(),
            credential: Secret::new(props.property(&format!("{prefix}.apikey")).unwrap_or_default()),
            description: format!("Artifactory '{key}'"),
            allow_insecure_protocol: false,
            repo_key: props.property(&format!("{prefix}.repoKey")).unwrap_or_default(),
        })
    }

    /// Build an endpoint of `kind`. `key` is ignored for kinds without one.
    pub fn build(kind: EndpointKind, key: &str, props: &dyn PropertySource) -> JarbirdResult<Self> {
        match kind {
            EndpointKind::Local => Ok(Self::local()),
            EndpointKind::Maven => Self::maven(key, props),
            EndpointKind::PluginPortal => Ok(Self::plugin_portal(props)),
            EndpointKind::Artifactory => Self::artifactory(key, props),
        }
    }

    /// Base URL for a release or a snapshot, `None` when the endpoint has
    /// no such channel.
    pub fn url_for(&self, snapshot: bool) -> Option<&str> {
        let url = if snapshot {
            &self.snapshot_url
        } else {
            &self.release_url
        };
        (!url.is_empty()).then(|| url.trim_end_matches('/'))
    }

    pub fn has_credentials(&self) -> bool {
        !self.username.is_empty() || !self.credential.is_empty()
    }

    /// Full URL to a file of `coords` within this repository.
    pub fn file_url(&self, coords: &Coordinates, filename: &str) -> Option<String> {
        let base = self.url_for(jarbird_core::descriptor::is_snapshot(&coords.version))?;
        Some(format!(
            "{base}/{}/{filename}",
            coordinate_path(&coords.group, &coords.artifact_id, &coords.version)
        ))
    }

    /// URL of the POM that a publication of `coords` would upload.
    pub fn pom_url(&self, coords: &Coordinates) -> Option<String> {
        let filename = format!("{}-{}.pom", coords.artifact_id, coords.version);
        self.file_url(coords, &filename)
    }
}

impl fmt::Display for RepositoryEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.id.is_empty() {
            write!(f, "{}", self.kind)?;
        } else {
            write!(f, "{} '{}'", self.kind, self.id)?;
        }
        if !self.release_url.is_empty() {
            write!(f, " ({})", self.release_url)?;
        }
        if self.has_credentials() {
            write!(f, " [user: {}]", self.username)?;
        }
        Ok(())
    }
}

/// Standard Maven layout path for a coordinate.
///
/// `io.hkhc:jarbird:1.0` becomes `io/hkhc/jarbird/1.0`.
pub fn coordinate_path(group: &str, artifact: &str, version: &str) -> String {
    format!("{}/{}/{}", group.replace('.', "/"), artifact, version)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jarbird_util::errors::JarbirdError;
    use std::collections::BTreeMap;

    fn props(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn maven_endpoint_from_properties() {
        let p = props(&[
            ("repository.maven.mock.release", "https://repo/release"),
            ("repository.maven.mock.snapshot", "https://repo/snapshot/"),
            ("repository.maven.mock.username", "alice"),
            ("repository.maven.mock.password", "secret"),
            ("repository.maven.mock.allowInsecureProtocol", "true"),
        ]);
        let ep = RepositoryEndpoint::maven("mock", &p).unwrap();
        assert_eq!(ep.url_for(false), Some("https://repo/release"));
        assert_eq!(ep.url_for(true), Some("https://repo/snapshot"));
        assert_eq!(ep.username, "alice");
        assert_eq!(ep.credential.expose(), "secret");
        assert!(ep.allow_insecure_protocol);
    }

    #[test]
    fn maven_optional_credentials_default_to_empty() {
        let p = props(&[
            ("repository.maven.mock.release", "https://repo/release"),
            ("repository.maven.mock.snapshot", "https://repo/snapshot"),
        ]);
        let ep = RepositoryEndpoint::maven("mock", &p).unwrap();
        assert!(ep.username.is_empty());
        assert!(ep.credential.is_empty());
        assert!(!ep.allow_insecure_protocol);
    }

    #[test]
    fn maven_missing_release_names_property() {
        let p = props(&[("repository.maven.mock.snapshot", "https://repo/snapshot")]);
        let err = RepositoryEndpoint::maven("mock", &p).unwrap_err();
        match err {
            JarbirdError::MissingProperty { name } => {
                assert_eq!(name, "repository.maven.mock.release")
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn artifactory_reads_api_key_and_repo_key() {
        let p = props(&[
            ("repository.artifactory.corp.release", "https://corp/artifactory"),
            ("repository.artifactory.corp.snapshot", "https://corp/artifactory"),
            ("repository.artifactory.corp.apikey", "k3y"),
            ("repository.artifactory.corp.repoKey", "libs-release"),
        ]);
        let ep = RepositoryEndpoint::artifactory("corp", &p).unwrap();
        assert_eq!(ep.credential.expose(), "k3y");
        assert_eq!(ep.repo_key, "libs-release");
    }

    #[test]
    fn plugin_portal_has_no_snapshot_channel() {
        let ep = RepositoryEndpoint::plugin_portal(&BTreeMap::new());
        assert_eq!(ep.url_for(false), Some(PLUGIN_PORTAL_URL));
        assert_eq!(ep.url_for(true), None);
        assert!(ep.kind.is_release_only());
    }

    #[test]
    fn structural_equality() {
        let p = props(&[
            ("repository.maven.a.release", "r"),
            ("repository.maven.a.snapshot", "s"),
            ("repository.maven.b.release", "r"),
            ("repository.maven.b.snapshot", "s"),
        ]);
        let a1 = RepositoryEndpoint::maven("a", &p).unwrap();
        let a2 = RepositoryEndpoint::maven("a", &p).unwrap();
        let b = RepositoryEndpoint::maven("b", &p).unwrap();
        assert_eq!(a1, a2);
        assert_ne!(a1, b);
    }

    #[test]
    fn pom_url_uses_snapshot_channel_for_snapshots() {
        let p = props(&[
            ("repository.maven.m.release", "https://repo/release"),
            ("repository.maven.m.snapshot", "https://repo/snapshot"),
        ]);
        let ep = RepositoryEndpoint::maven("m", &p).unwrap();
        let coords = Coordinates {
            group: "io.hkhc".into(),
            artifact_id: "lib".into(),
            version: "1.0-SNAPSHOT".into(),
        };
        assert_eq!(
            ep.pom_url(&coords).unwrap(),
            "https://repo/snapshot/io/hkhc/lib/1.0-SNAPSHOT/lib-1.0-SNAPSHOT.pom"
        );
    }

    #[test]
    fn display_masks_credentials() {
        let p = props(&[
            ("repository.maven.m.release", "https://repo/release"),
            ("repository.maven.m.snapshot", "https://repo/snapshot"),
            ("repository.maven.m.username", "alice"),
            ("repository.maven.m.password", "hunter2"),
        ]);
        let ep = RepositoryEndpoint::maven("m", &p).unwrap();
        let shown = format!("{ep} {ep:?}");
        assert!(shown.contains("alice"));
        assert!(!shown.contains("hunter2"), "got: {shown}");
    }
}

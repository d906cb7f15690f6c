//! Publication descriptor: the POM-like metadata of one artifact.
//!
//! Descriptors are assembled from several partial fragments. Merging follows
//! two rules:
//!
//! - scalars use overlay-by-fallback: the target keeps a non-empty value and
//!   only empty fields are filled from the source;
//! - lists use overlay-by-append: the target's entries stay first and the
//!   source's entries follow.
//!
//! Nested records (SCM, organization, web site, plugin) are merged field by
//! field with the scalar rule.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::clock::Clock;
use crate::project::ProjectInfo;

/// Suffix marking a pre-release version. Case-sensitive.
pub const SNAPSHOT_SUFFIX: &str = "-SNAPSHOT";

/// Packaging used when no fragment declares one.
pub const DEFAULT_PACKAGING: &str = "jar";

/// `true` iff `version` ends with the literal `-SNAPSHOT`.
pub fn is_snapshot(version: &str) -> bool {
    version.ends_with(SNAPSHOT_SUFFIX)
}

/// Merge `self` into a target, filling only what the target lacks.
pub trait Overlay {
    fn overlay_to(&self, target: &mut Self);
}

fn fill(target: &mut String, source: &str) {
    if target.is_empty() && !source.is_empty() {
        *target = source.to_string();
    }
}

fn fill_nested<T: Overlay + Clone>(target: &mut Option<T>, source: &Option<T>) {
    if let Some(source) = source {
        match target {
            Some(existing) => source.overlay_to(existing),
            None => *target = Some(source.clone()),
        }
    }
}

fn is_blank(s: &str) -> bool {
    s.is_empty()
}

/// A license entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct License {
    pub name: String,
    #[serde(skip_serializing_if = "is_blank")]
    pub url: String,
    #[serde(skip_serializing_if = "is_blank")]
    pub dist: String,
    #[serde(skip_serializing_if = "is_blank")]
    pub comments: String,
}

impl License {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }
}

/// A developer or contributor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Person {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "is_blank")]
    pub organization: String,
    #[serde(skip_serializing_if = "is_blank")]
    pub organization_url: String,
    #[serde(skip_serializing_if = "is_blank")]
    pub url: String,
    #[serde(skip_serializing_if = "is_blank")]
    pub timezone: String,
}

/// Source control details. `repo_type` + `repo_name` (e.g. `github.com` +
/// `owner/repo`) are expanded into the URL fields by [`Descriptor::sync_with`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Scm {
    pub url: String,
    pub connection: String,
    pub developer_connection: String,
    pub repo_type: String,
    pub repo_name: String,
    pub issue_type: String,
    pub issue_url: String,
}

impl Overlay for Scm {
    fn overlay_to(&self, target: &mut Self) {
        fill(&mut target.url, &self.url);
        fill(&mut target.connection, &self.connection);
        fill(&mut target.developer_connection, &self.developer_connection);
        fill(&mut target.repo_type, &self.repo_type);
        fill(&mut target.repo_name, &self.repo_name);
        fill(&mut target.issue_type, &self.issue_type);
        fill(&mut target.issue_url, &self.issue_url);
    }
}

impl Scm {
    /// Derive URLs from `repo_type`/`repo_name` where they are still empty.
    pub fn expand(&mut self) {
        if self.repo_type.is_empty() || self.repo_name.is_empty() {
            return;
        }
        let host = self.repo_type.clone();
        let repo = self.repo_name.clone();
        fill(&mut self.url, &format!("https://{host}/{repo}"));
        fill(&mut self.connection, &format!("scm:git@{host}:{repo}"));
        fill(
            &mut self.developer_connection,
            &format!("scm:git@{host}:{repo}.git"),
        );
        fill(&mut self.issue_type, &host);
        fill(&mut self.issue_url, &format!("https://{host}/{repo}/issues"));
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Organization {
    pub name: String,
    pub url: String,
}

impl Overlay for Organization {
    fn overlay_to(&self, target: &mut Self) {
        fill(&mut target.name, &self.name);
        fill(&mut target.url, &self.url);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Web {
    pub url: String,
    pub description: String,
}

impl Overlay for Web {
    fn overlay_to(&self, target: &mut Self) {
        fill(&mut target.url, &self.url);
        fill(&mut target.description, &self.description);
    }
}

/// Build-tool plugin details. A descriptor with a non-empty `id` describes a
/// plugin and is published with a marker artifact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PluginInfo {
    pub id: String,
    pub display_name: String,
    pub implementation_class: String,
    pub tags: Vec<String>,
}

impl Overlay for PluginInfo {
    fn overlay_to(&self, target: &mut Self) {
        fill(&mut target.id, &self.id);
        fill(&mut target.display_name, &self.display_name);
        fill(&mut target.implementation_class, &self.implementation_class);
        target.tags.extend(self.tags.iter().cloned());
    }
}

impl PluginInfo {
    /// Coordinates of the marker artifact that lets plugin resolution map
    /// the plugin id to the implementation artifact.
    pub fn marker_coordinates(&self, main: &Coordinates) -> Coordinates {
        Coordinates {
            group: self.id.clone(),
            artifact_id: format!("{}.gradle.plugin", self.id),
            version: main.version.clone(),
        }
    }
}

/// How a publication variant shows up in the published coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VariantMode {
    /// Variant only distinguishes task and publication names.
    #[default]
    Invisible,
    /// `artifactId-variant`
    ArtifactId,
    /// `version-variant`, keeping `-SNAPSHOT` last.
    Version,
}

/// `group:artifactId:version`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Coordinates {
    pub group: String,
    pub artifact_id: String,
    pub version: String,
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group, self.artifact_id, self.version)
    }
}

/// Metadata of one publishable artifact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Descriptor {
    /// Selects which publication variant a fragment applies to. Not merged.
    #[serde(skip_serializing_if = "is_blank")]
    pub variant: String,
    pub group: String,
    pub artifact_id: String,
    #[serde(deserialize_with = "lenient::string")]
    pub version: String,
    pub name: String,
    pub description: String,
    pub packaging: String,
    pub url: String,
    pub inception_year: Option<i32>,
    pub licenses: Vec<License>,
    pub developers: Vec<Person>,
    pub contributors: Vec<Person>,
    pub organization: Option<Organization>,
    pub web: Option<Web>,
    pub scm: Option<Scm>,
    pub plugin: Option<PluginInfo>,
}

impl Overlay for Descriptor {
    fn overlay_to(&self, target: &mut Self) {
        fill(&mut target.group, &self.group);
        fill(&mut target.artifact_id, &self.artifact_id);
        fill(&mut target.version, &self.version);
        fill(&mut target.name, &self.name);
        fill(&mut target.description, &self.description);
        fill(&mut target.packaging, &self.packaging);
        fill(&mut target.url, &self.url);
        if target.inception_year.is_none() {
            target.inception_year = self.inception_year;
        }

        target.licenses.extend(self.licenses.iter().cloned());
        target.developers.extend(self.developers.iter().cloned());
        target.contributors.extend(self.contributors.iter().cloned());

        fill_nested(&mut target.organization, &self.organization);
        fill_nested(&mut target.web, &self.web);
        fill_nested(&mut target.scm, &self.scm);
        fill_nested(&mut target.plugin, &self.plugin);
    }
}

impl Descriptor {
    pub fn is_snapshot(&self) -> bool {
        is_snapshot(&self.version)
    }

    /// A descriptor with a plugin id describes a build-tool plugin.
    pub fn is_plugin(&self) -> bool {
        self.plugin.as_ref().is_some_and(|p| !p.id.is_empty())
    }

    /// First required coordinate that is still empty, checked in the order
    /// group, artifactId, version.
    pub fn missing_required(&self) -> Option<&'static str> {
        if self.group.is_empty() {
            Some("group")
        } else if self.artifact_id.is_empty() {
            Some("artifactId")
        } else if self.version.is_empty() {
            Some("version")
        } else {
            None
        }
    }

    /// Fill still-empty fields from the ambient project and derive the fields
    /// that follow from others (name, license links, SCM URLs, site URL).
    pub fn sync_with(&mut self, project: &ProjectInfo, clock: &dyn Clock) {
        fill(&mut self.group, &project.group);
        fill(&mut self.artifact_id, &project.name);
        fill(&mut self.version, &project.version);
        fill(&mut self.description, &project.description);
        if !self.group.is_empty() && !self.artifact_id.is_empty() {
            let name = format!("{}:{}", self.group, self.artifact_id);
            fill(&mut self.name, &name);
        }
        fill(&mut self.packaging, DEFAULT_PACKAGING);
        if self.inception_year.is_none() {
            self.inception_year = Some(clock.year());
        }

        for license in &mut self.licenses {
            if license.url.is_empty() {
                if let Some(url) = license_url(&license.name) {
                    license.url = url.to_string();
                }
            }
        }

        if let Some(scm) = &mut self.scm {
            scm.expand();
            if !scm.url.is_empty() {
                fill(&mut self.url, &scm.url);
                let web = self.web.get_or_insert_with(Web::default);
                fill(&mut web.url, &scm.url);
            }
        }
    }

    /// Published coordinates for a given variant.
    pub fn coordinates(&self, variant: &str, mode: VariantMode) -> Coordinates {
        Coordinates {
            group: self.group.clone(),
            artifact_id: variant_artifact_id(&self.artifact_id, variant, mode),
            version: variant_version(&self.version, variant, mode),
        }
    }
}

/// Artifact id as published for `variant`.
pub fn variant_artifact_id(artifact_id: &str, variant: &str, mode: VariantMode) -> String {
    match mode {
        VariantMode::ArtifactId if !variant.is_empty() => format!("{artifact_id}-{variant}"),
        _ => artifact_id.to_string(),
    }
}

/// Version as published for `variant`. A snapshot stays a snapshot.
pub fn variant_version(version: &str, variant: &str, mode: VariantMode) -> String {
    match mode {
        VariantMode::Version if !variant.is_empty() => match version.strip_suffix(SNAPSHOT_SUFFIX) {
            Some(base) => format!("{base}-{variant}{SNAPSHOT_SUFFIX}"),
            None => format!("{version}-{variant}"),
        },
        _ => version.to_string(),
    }
}

/// Canonical text URL for a well-known license name.
pub fn license_url(name: &str) -> Option<&'static str> {
    let url = match name {
        "Apache-2.0" | "Apache License 2.0" | "The Apache License, Version 2.0" => {
            "http://www.apache.org/licenses/LICENSE-2.0.txt"
        }
        "MIT" => "https://opensource.org/licenses/MIT",
        "BSD-2-Clause" => "https://opensource.org/licenses/BSD-2-Clause",
        "BSD-3-Clause" => "https://opensource.org/licenses/BSD-3-Clause",
        "GPL-2.0" => "https://www.gnu.org/licenses/old-licenses/gpl-2.0.txt",
        "GPL-3.0" => "https://www.gnu.org/licenses/gpl-3.0.txt",
        "LGPL-2.1" => "https://www.gnu.org/licenses/old-licenses/lgpl-2.1.txt",
        "LGPL-3.0" => "https://www.gnu.org/licenses/lgpl-3.0.txt",
        "EPL-2.0" => "https://www.eclipse.org/legal/epl-2.0/",
        "MPL-2.0" => "https://www.mozilla.org/MPL/2.0/",
        _ => return None,
    };
    Some(url)
}

/// Versions are text, but YAML reads `version: 2` as an integer and
/// `version: 1.10` as a float. Integers are taken as written. Floats are
/// rejected since `1.10` has already become `1.1` by the time it gets here.
mod lenient {
    use serde::de::{self, Deserializer, Visitor};
    use std::fmt;

    pub fn string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        deserializer.deserialize_any(ScalarVisitor)
    }

    struct ScalarVisitor;

    impl Visitor<'_> for ScalarVisitor {
        type Value = String;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a string or number")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_string<E: de::Error>(self, v: String) -> Result<String, E> {
            Ok(v)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<String, E> {
            Err(E::custom(format!(
                "version {v} was read as a number and may have lost digits, quote it (version: \"1.10\")"
            )))
        }

        fn visit_unit<E: de::Error>(self) -> Result<String, E> {
            Ok(String::new())
        }
    }
}

//! Task and publication names.
//!
//! Every name here is a pure function of the publication name, its variant
//! and the endpoint kind/id, so names are stable between runs and can be
//! discovered by external tooling:
//!
//! | Task                                         | Meaning                              |
//! |----------------------------------------------|--------------------------------------|
//! | `jbPublish`                                  | everything                           |
//! | `jbPublish<Pub><Variant>`                    | one publication, all its endpoints   |
//! | `jbPublish<Pub><Variant>To<Endpoint>`        | one publication to one endpoint      |
//! | `jbPublishTo<Kind>`                          | every publication to one kind        |
//! | `jbPublishToMaven<Id>Repository`             | every publication to one named repo  |

use jarbird_maven::endpoint::EndpointKind;

/// The grand aggregate task.
pub const GRAND_TASK: &str = "jbPublish";

const TASK_PREFIX: &str = "jbPublish";
const MARKER_SUFFIX: &str = "PluginMarkerMaven";

/// Hyphenated or capitalized names become lower camel case:
/// `He11o-world` is `he11oWorld`.
pub fn normalize_pub_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for word in name.split('-').filter(|w| !w.is_empty()) {
        if out.is_empty() {
            out.push_str(&decapitalize(word));
        } else {
            out.push_str(&capitalize(word));
        }
    }
    out
}

pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn decapitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `<Pub><Variant>` as it appears inside task names.
pub fn pub_id(pub_name: &str, variant: &str) -> String {
    format!(
        "{}{}",
        capitalize(&normalize_pub_name(pub_name)),
        capitalize(&normalize_pub_name(variant))
    )
}

/// Effective name of a publication: the name with its variant folded in.
/// Two publications of one scope may not share it.
pub fn publication_name(pub_name: &str, variant: &str) -> String {
    decapitalize(&pub_id(pub_name, variant))
}

/// Name of the plugin marker publication that accompanies a plugin.
pub fn marker_publication_name(pub_name: &str, variant: &str) -> String {
    format!("{}{MARKER_SUFFIX}", publication_name(pub_name, variant))
}

/// The `<Endpoint>` segment of a leaf task name.
pub fn endpoint_segment(kind: EndpointKind, id: &str) -> String {
    match kind {
        EndpointKind::Local => "MavenLocal".to_string(),
        EndpointKind::Maven => format!("Maven{}Repository", pub_id(id, "")),
        EndpointKind::PluginPortal => "GradlePortal".to_string(),
        EndpointKind::Artifactory => format!("Artifactory{}Repository", pub_id(id, "")),
    }
}

/// The `<Kind>` segment of a kind aggregate task name.
pub fn kind_segment(kind: EndpointKind) -> &'static str {
    match kind {
        EndpointKind::Local => "MavenLocal",
        EndpointKind::Maven => "MavenRepository",
        EndpointKind::PluginPortal => "GradlePortal",
        EndpointKind::Artifactory => "Artifactory",
    }
}

/// `jbPublish<Pub><Variant>To<Endpoint>`
pub fn leaf_task(pub_name: &str, variant: &str, kind: EndpointKind, id: &str) -> String {
    format!(
        "{TASK_PREFIX}{}To{}",
        pub_id(pub_name, variant),
        endpoint_segment(kind, id)
    )
}

/// `jbPublish<Pub><Variant>PluginMarkerMavenPublicationTo<Endpoint>`
pub fn marker_task(pub_name: &str, variant: &str, kind: EndpointKind, id: &str) -> String {
    format!(
        "{TASK_PREFIX}{}{MARKER_SUFFIX}PublicationTo{}",
        pub_id(pub_name, variant),
        endpoint_segment(kind, id)
    )
}

/// `jbPublish<Pub><Variant>`
pub fn unit_task(pub_name: &str, variant: &str) -> String {
    format!("{TASK_PREFIX}{}", pub_id(pub_name, variant))
}

/// `jbPublishTo<Endpoint>` for one named repository.
pub fn endpoint_task(kind: EndpointKind, id: &str) -> String {
    format!("{TASK_PREFIX}To{}", endpoint_segment(kind, id))
}

/// Why `pub_name` cannot name a publication, if it cannot. An empty name
/// would reuse the grand task, and a name starting with a `To` word would
/// read as a repository aggregate (`to-maven-local` is `jbPublishToMavenLocal`).
pub fn invalid_pub_name(pub_name: &str, variant: &str) -> Option<String> {
    if normalize_pub_name(pub_name).is_empty() {
        return Some("publication name is empty".to_string());
    }
    let id = pub_id(pub_name, variant);
    let reads_as_aggregate = id
        .strip_prefix("To")
        .and_then(|rest| rest.chars().next())
        .is_some_and(char::is_uppercase);
    if reads_as_aggregate {
        return Some(format!(
            "publication name '{pub_name}' gives task '{}', which is reserved for repository aggregates",
            unit_task(pub_name, variant)
        ));
    }
    None
}

/// `jbPublishTo<Kind>`
pub fn kind_task(kind: EndpointKind) -> String {
    format!("{TASK_PREFIX}To{}", kind_segment(kind))
}

/// Task of the host build that actually uploads a publication.
pub fn host_publish_task(pub_name: &str, variant: &str, kind: EndpointKind, id: &str) -> String {
    host_task(&pub_id(pub_name, variant), kind, id)
}

/// Host task that uploads the plugin marker publication.
pub fn host_marker_task(pub_name: &str, variant: &str, kind: EndpointKind, id: &str) -> String {
    host_task(
        &format!("{}{MARKER_SUFFIX}", pub_id(pub_name, variant)),
        kind,
        id,
    )
}

fn host_task(publication: &str, kind: EndpointKind, id: &str) -> String {
    match kind {
        EndpointKind::Local | EndpointKind::Maven => format!(
            "publish{publication}PublicationTo{}",
            endpoint_segment(kind, id)
        ),
        EndpointKind::PluginPortal => "publishPlugins".to_string(),
        EndpointKind::Artifactory => format!("artifactory{publication}Publish"),
    }
}

fn module_label(pub_name: &str, variant: &str) -> String {
    if variant.is_empty() {
        format!("module '{pub_name}'")
    } else {
        format!("module '{pub_name}' ({variant})")
    }
}

/// Human name of a single endpoint.
pub fn endpoint_label(kind: EndpointKind, id: &str) -> String {
    match kind {
        EndpointKind::Local => "Maven Local repository".to_string(),
        EndpointKind::Maven => format!("Maven repository '{id}'"),
        EndpointKind::PluginPortal => "Gradle Plugin Portal".to_string(),
        EndpointKind::Artifactory => format!("Artifactory repository '{id}'"),
    }
}

pub fn leaf_description(pub_name: &str, variant: &str, kind: EndpointKind, id: &str) -> String {
    format!(
        "Publish {} to {}",
        module_label(pub_name, variant),
        endpoint_label(kind, id)
    )
}

pub fn marker_description(pub_name: &str, variant: &str, kind: EndpointKind, id: &str) -> String {
    format!(
        "Publish plugin marker of {} to {}",
        module_label(pub_name, variant),
        endpoint_label(kind, id)
    )
}

pub fn unit_description(pub_name: &str, variant: &str) -> String {
    format!(
        "Publish {} to all targeted repositories",
        module_label(pub_name, variant)
    )
}

pub fn endpoint_description(kind: EndpointKind, id: &str) -> String {
    format!("Publish to {}", endpoint_label(kind, id))
}

pub fn kind_description(kind: EndpointKind) -> String {
    match kind {
        EndpointKind::Local => "Publish to Maven Local repository".to_string(),
        EndpointKind::Maven => "Publish to all Maven repositories".to_string(),
        EndpointKind::PluginPortal => "Publish to Gradle Plugin Portal".to_string(),
        EndpointKind::Artifactory => "Publish to all Artifactory repositories".to_string(),
    }
}

pub fn grand_description() -> String {
    "Publish all publications to all targeted repositories".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_pub_names() {
        assert_eq!(normalize_pub_name(""), "");
        assert_eq!(normalize_pub_name("Hello"), "hello");
        assert_eq!(normalize_pub_name("HelloWorld"), "helloWorld");
        assert_eq!(normalize_pub_name("he11o-world"), "he11oWorld");
        assert_eq!(normalize_pub_name("-helloWorld"), "helloWorld");
        assert_eq!(normalize_pub_name("helloWorld-"), "helloWorld");
        assert_eq!(normalize_pub_name("a--b"), "aB");
    }

    #[test]
    fn leaf_task_names() {
        assert_eq!(
            leaf_task("abc", "var", EndpointKind::Local, ""),
            "jbPublishAbcVarToMavenLocal"
        );
        assert_eq!(
            leaf_task("abc", "var", EndpointKind::Maven, "mock"),
            "jbPublishAbcVarToMavenMockRepository"
        );
        assert_eq!(
            leaf_task("lib", "", EndpointKind::PluginPortal, ""),
            "jbPublishLibToGradlePortal"
        );
        assert_eq!(
            leaf_task("lib", "", EndpointKind::Artifactory, "corp"),
            "jbPublishLibToArtifactoryCorpRepository"
        );
    }

    #[test]
    fn marker_task_name_inserts_suffix_before_endpoint() {
        assert_eq!(
            marker_task("abc", "var", EndpointKind::Local, ""),
            "jbPublishAbcVarPluginMarkerMavenPublicationToMavenLocal"
        );
    }

    #[test]
    fn aggregate_task_names() {
        assert_eq!(GRAND_TASK, "jbPublish");
        assert_eq!(unit_task("abc", "var"), "jbPublishAbcVar");
        assert_eq!(kind_task(EndpointKind::Local), "jbPublishToMavenLocal");
        assert_eq!(kind_task(EndpointKind::Maven), "jbPublishToMavenRepository");
        assert_eq!(
            endpoint_task(EndpointKind::Maven, "mock"),
            "jbPublishToMavenMockRepository"
        );
        assert_eq!(kind_task(EndpointKind::PluginPortal), "jbPublishToGradlePortal");
    }

    #[test]
    fn host_task_names() {
        assert_eq!(
            host_publish_task("abc", "var", EndpointKind::Local, ""),
            "publishAbcVarPublicationToMavenLocal"
        );
        assert_eq!(
            host_publish_task("abc", "var", EndpointKind::Maven, "mock"),
            "publishAbcVarPublicationToMavenMockRepository"
        );
        assert_eq!(
            host_marker_task("abc", "var", EndpointKind::Local, ""),
            "publishAbcVarPluginMarkerMavenPublicationToMavenLocal"
        );
        assert_eq!(
            host_publish_task("abc", "", EndpointKind::PluginPortal, ""),
            "publishPlugins"
        );
    }

    #[test]
    fn descriptions() {
        assert_eq!(
            unit_description("abc", "var"),
            "Publish module 'abc' (var) to all targeted repositories"
        );
        assert_eq!(
            leaf_description("abc", "var", EndpointKind::Local, ""),
            "Publish module 'abc' (var) to Maven Local repository"
        );
        assert_eq!(
            kind_description(EndpointKind::Local),
            "Publish to Maven Local repository"
        );
        assert_eq!(
            endpoint_description(EndpointKind::Maven, "mock"),
            "Publish to Maven repository 'mock'"
        );
        assert_eq!(
            kind_description(EndpointKind::Maven),
            "Publish to all Maven repositories"
        );
    }

    #[test]
    fn publication_names() {
        assert_eq!(publication_name("lib", ""), "lib");
        assert_eq!(publication_name("my-lib", "jre8"), "myLibJre8");
        assert_eq!(marker_publication_name("abc", "var"), "abcVarPluginMarkerMaven");
    }

    #[test]
    fn reserved_publication_names() {
        assert_eq!(
            invalid_pub_name("", "").as_deref(),
            Some("publication name is empty")
        );
        assert_eq!(
            invalid_pub_name("-", "jre8").as_deref(),
            Some("publication name is empty")
        );
        let message = invalid_pub_name("to-maven-repository", "").unwrap();
        assert!(message.contains("jbPublishToMavenRepository"), "{message}");
        assert!(invalid_pub_name("toMavenLocal", "").is_some());
        assert_eq!(invalid_pub_name("tomato", ""), None);
        assert_eq!(invalid_pub_name("to", ""), None);
        assert_eq!(invalid_pub_name("to-1", ""), None);
        assert_eq!(invalid_pub_name("lib", "to-x"), None);
    }

    #[test]
    fn names_do_not_collide_across_endpoints() {
        let a = leaf_task("lib", "", EndpointKind::Maven, "a");
        let b = leaf_task("lib", "", EndpointKind::Maven, "b");
        let local = leaf_task("lib", "", EndpointKind::Local, "");
        assert_ne!(a, b);
        assert_ne!(a, local);
    }
}

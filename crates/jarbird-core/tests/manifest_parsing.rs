use jarbird_core::descriptor::VariantMode;
use jarbird_core::manifest::{Manifest, RepositoryDecl};
use jarbird_core::source::UnitSource;
use std::path::PathBuf;

#[test]
fn parse_minimal_manifest() {
    let m = Manifest::parse(
        r#"
[project]
group = "io.hkhc"
name = "mylib"
version = "1.0"
"#,
    )
    .unwrap();
    assert_eq!(m.project.group, "io.hkhc");
    assert_eq!(m.project.name, "mylib");
    assert!(m.pubs.is_empty());
    assert!(m.workspace.is_none());
}

#[test]
fn parse_publications_and_repositories() {
    let m = Manifest::parse(
        r#"
[publish]
repositories = ["maven:central"]
signing = false

[[pub]]
name = "core"
variant = "jre8"
variant-mode = "artifact-id"
repositories = ["local", "artifactory:corp", "gradle-portal"]
source = { source-set = "main" }

[[pub]]
name = "ext"
source = { paths = ["src/ext"] }
"#,
    )
    .unwrap();

    assert_eq!(
        m.publish.repositories,
        vec![RepositoryDecl::Maven("central".into())]
    );
    assert_eq!(m.publish.signing, Some(false));
    assert_eq!(m.pubs.len(), 2);

    let core = &m.pubs[0];
    assert_eq!(core.name.as_deref(), Some("core"));
    assert_eq!(core.variant_mode, Some(VariantMode::ArtifactId));
    assert_eq!(
        core.repositories,
        vec![
            RepositoryDecl::Local,
            RepositoryDecl::Artifactory("corp".into()),
            RepositoryDecl::GradlePortal,
        ]
    );
    assert_eq!(core.source, Some(UnitSource::SourceSetRef("main".into())));
    assert_eq!(
        m.pubs[1].source,
        Some(UnitSource::RawPaths(vec![PathBuf::from("src/ext")]))
    );
}

#[test]
fn unknown_repository_is_a_manifest_error() {
    let err = Manifest::parse(
        r#"
[publish]
repositories = ["ftp:somewhere"]
"#,
    )
    .unwrap_err();
    assert!(err.to_string().contains("unknown repository"), "got: {err}");
}

#[test]
fn workspace_members() {
    let m = Manifest::parse(
        r#"
[workspace]
members = ["lib", "plugin"]
"#,
    )
    .unwrap();
    assert_eq!(m.workspace.unwrap().members, vec!["lib", "plugin"]);
}

#[test]
fn from_path_interpolates_properties() {
    let tmp = tempfile::TempDir::new().unwrap();
    std::fs::write(
        tmp.path().join("jarbird.properties"),
        "PROJECT_VERSION=3.1\n",
    )
    .unwrap();
    let path = tmp.path().join("jarbird.toml");
    std::fs::write(
        &path,
        "[project]\nversion = \"${env:PROJECT_VERSION}\"\n",
    )
    .unwrap();

    let m = Manifest::from_path(&path).unwrap();
    assert_eq!(m.project.version, "3.1");
}

#[test]
fn repository_decl_display_round_trips_through_parse() {
    let decl: RepositoryDecl = "maven:central".parse().unwrap();
    assert_eq!(decl.to_string(), "maven:central");
    assert!("maven:".parse::<RepositoryDecl>().is_err());
}

use jarbird_util::fs::{find_ancestor_with, first_existing};
use tempfile::TempDir;

#[test]
fn find_ancestor_with_finds_marker_in_parent() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("jarbird.toml"), "").unwrap();
    let nested = tmp.path().join("a").join("b");
    std::fs::create_dir_all(&nested).unwrap();

    let found = find_ancestor_with(&nested, "jarbird.toml").unwrap();
    assert_eq!(found, tmp.path());
}

#[test]
fn find_ancestor_with_returns_none_when_absent() {
    let tmp = TempDir::new().unwrap();
    assert!(find_ancestor_with(tmp.path(), "no-such-marker-file.xyz").is_none());
}

#[test]
fn first_existing_prefers_earlier_name() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("pom.yaml"), "").unwrap();
    std::fs::write(tmp.path().join("pom.yml"), "").unwrap();

    let found = first_existing(tmp.path(), &["pom.yaml", "pom.yml"]).unwrap();
    assert_eq!(found, tmp.path().join("pom.yaml"));
}

#[test]
fn first_existing_falls_back_to_later_name() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("pom.yml"), "").unwrap();

    let found = first_existing(tmp.path(), &["pom.yaml", "pom.yml"]).unwrap();
    assert_eq!(found, tmp.path().join("pom.yml"));
}

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

#[allow(deprecated)]
fn jarbird_cmd(tmp: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("jarbird").unwrap();
    cmd.env("JARBIRD_HOME", tmp.path().join("home"))
        .env("HOME", tmp.path())
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_check_reports_publications() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("jarbird.toml"),
        "\
[project]
group = \"io.example\"
name = \"core\"
version = \"1.0\"

[publish]
repositories = [\"maven:mock\"]
",
    )
    .unwrap();
    fs::write(
        tmp.path().join("jarbird.properties"),
        "\
repository.maven.mock.release=https://mock/release
repository.maven.mock.snapshot=https://mock/snapshot
repository.maven.mock.username=deployer
repository.maven.mock.password=s3cret
",
    )
    .unwrap();

    jarbird_cmd(&tmp)
        .current_dir(tmp.path())
        .args(["check"])
        .assert()
        .success()
        .stdout(predicate::str::contains(": lib: io.example:core:1.0"))
        .stdout(predicate::str::contains(
            "https://mock/release/io/example/core/1.0/core-1.0.pom",
        ))
        .stdout(predicate::str::contains("[user: deployer]"))
        .stdout(predicate::str::contains("s3cret").not())
        .stdout(predicate::str::contains("1 publication(s) OK"));
}

#[test]
fn test_check_fails_on_missing_metadata() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("jarbird.toml"),
        "[project]\nversion = \"1.0\"\n\n[[pub]]\nname = \"core\"\n",
    )
    .unwrap();

    jarbird_cmd(&tmp)
        .current_dir(tmp.path())
        .args(["check"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Publication 'core' is missing 'group'"))
        .stderr(predicate::str::contains("1 publication(s) failed validation"));
}

#[test]
fn test_check_unknown_repository_in_manifest() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("jarbird.toml"),
        "[project]\ngroup = \"g\"\nversion = \"1\"\n\n[publish]\nrepositories = [\"bintray\"]\n",
    )
    .unwrap();

    jarbird_cmd(&tmp)
        .current_dir(tmp.path())
        .args(["check"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown repository 'bintray'"));
}

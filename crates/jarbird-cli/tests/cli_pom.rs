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

fn plugin_project(tmp: &TempDir) -> std::path::PathBuf {
    let dir = tmp.path().join("greeter");
    fs::create_dir_all(&dir).unwrap();
    fs::write(
        dir.join("jarbird.toml"),
        "[project]\ngroup = \"io.example\"\nversion = \"0.1\"\n",
    )
    .unwrap();
    fs::write(
        dir.join("pom.yaml"),
        "\
description: Says hello
licenses:
  - name: Apache-2.0
scm:
  repoType: github.com
  repoName: example/greeter
plugin:
  id: io.example.greeter
  displayName: Greeter
  implementationClass: io.example.GreeterPlugin
",
    )
    .unwrap();
    dir
}

#[test]
fn test_pom_prints_main_pom() {
    let tmp = TempDir::new().unwrap();
    let dir = plugin_project(&tmp);

    jarbird_cmd(&tmp)
        .current_dir(&dir)
        .args(["pom"])
        .assert()
        .success()
        .stdout(predicate::str::contains("<groupId>io.example</groupId>"))
        .stdout(predicate::str::contains("<artifactId>greeter</artifactId>"))
        .stdout(predicate::str::contains("<version>0.1</version>"))
        .stdout(predicate::str::contains(
            "<url>http://www.apache.org/licenses/LICENSE-2.0.txt</url>",
        ));
}

#[test]
fn test_pom_marker() {
    let tmp = TempDir::new().unwrap();
    let dir = plugin_project(&tmp);

    jarbird_cmd(&tmp)
        .current_dir(&dir)
        .args(["pom", "--marker"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "<artifactId>io.example.greeter.gradle.plugin</artifactId>",
        ))
        .stdout(predicate::str::contains("<packaging>pom</packaging>"));
}

#[test]
fn test_pom_unknown_publication_fails() {
    let tmp = TempDir::new().unwrap();
    let dir = plugin_project(&tmp);

    jarbird_cmd(&tmp)
        .current_dir(&dir)
        .args(["pom", "--pub", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No publication matches"));
}

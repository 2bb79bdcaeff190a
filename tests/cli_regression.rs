//! End-to-end checks for the `hackeme` CLI inspector.

use assert_cmd::Command;
use predicates::prelude::*;

fn write_source(name: &str, source: &str) -> std::path::PathBuf {
    let path = std::env::temp_dir().join(name);
    std::fs::write(&path, source).expect("failed to write test source");
    path
}

#[test]
fn ast_subcommand_prints_the_grouped_tree() {
    let path = write_source(
        "hackeme_cli_ast.hm",
        "(define (add a) a)\n(define (add a b) (+ a b))",
    );

    Command::cargo_bin("hackeme")
        .unwrap()
        .arg("ast")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("fundef"))
        .stdout(predicate::str::contains("arity"));
}

#[test]
fn canonical_subcommand_skips_grouping() {
    let path = write_source(
        "hackeme_cli_canonical.hm",
        "(define (add a) a)\n(define (add a b) (+ a b))",
    );

    Command::cargo_bin("hackeme")
        .unwrap()
        .arg("canonical")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("fundef"))
        .stdout(predicate::str::contains("arity").not());
}

#[test]
fn json_output_is_machine_readable() {
    let path = write_source("hackeme_cli_json.hm", "(define x 5)");

    Command::cargo_bin("hackeme")
        .unwrap()
        .args(["ast", "--json"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"kind\": \"vardef\""));
}

#[test]
fn syntax_errors_exit_nonzero() {
    let path = write_source("hackeme_cli_bad.hm", "(define (broken");

    Command::cargo_bin("hackeme")
        .unwrap()
        .arg("ast")
        .arg(&path)
        .assert()
        .failure();
}

#[test]
fn missing_files_exit_nonzero() {
    Command::cargo_bin("hackeme")
        .unwrap()
        .args(["ast", "does-not-exist.hm"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot read"));
}

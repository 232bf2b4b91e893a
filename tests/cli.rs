use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use predicates::str::contains;
use tempfile::tempdir;

fn descent(grammar: &Path, output: &Path) -> Command {
    let mut cmd = Command::cargo_bin("descent").unwrap();
    cmd.arg(grammar).arg(output);
    cmd
}

#[test]
fn compiles_a_grammar() {
    let dir = tempdir().unwrap();
    let grammar = dir.path().join("list.rdg");
    let output = dir.path().join("list.rs");
    fs::write(&grammar, "list :: item \",\" list | item;\nitem :: /[0-9]+/;\n%%\n// trailer\n").unwrap();

    descent(&grammar, &output)
        .assert()
        .success()
        .stdout(contains("Grammar compiled successfully."));

    let code = fs::read_to_string(&output).unwrap();
    assert!(code.contains("pub struct List"));
    assert!(code.contains("Unrolled"));
    assert!(code.ends_with("// trailer\n"));
}

#[test]
fn no_unroll_flag() {
    let dir = tempdir().unwrap();
    let grammar = dir.path().join("list.rdg");
    let output = dir.path().join("list.rs");
    fs::write(&grammar, "list :: item \",\" list | item;\nitem :: /[0-9]+/;\n%%").unwrap();

    descent(&grammar, &output).arg("--no-unroll").assert().success();
    assert!(!fs::read_to_string(&output).unwrap().contains("Unrolled"));
}

#[test]
fn syntax_error_exits_with_line_number() {
    let dir = tempdir().unwrap();
    let grammar = dir.path().join("bad.rdg");
    let output = dir.path().join("bad.rs");
    fs::write(&grammar, "a :: \"x\";\nb :: ;\n%%").unwrap();

    descent(&grammar, &output)
        .assert()
        .code(1)
        .stderr(contains("Error: Line 2:"));
    assert!(!output.exists());
}

#[test]
fn semantic_errors_are_listed_together() {
    let dir = tempdir().unwrap();
    let grammar = dir.path().join("bad.rdg");
    let output = dir.path().join("bad.rs");
    fs::write(&grammar, "r :: r \"x\" | foo;\n%%").unwrap();

    descent(&grammar, &output)
        .assert()
        .code(1)
        .stderr(contains("left recursion in rule `r`").and(contains("undefined rules: foo")));
}

#[test]
fn unused_rules_warn_but_succeed() {
    let dir = tempdir().unwrap();
    let grammar = dir.path().join("unused.rdg");
    let output = dir.path().join("unused.rs");
    fs::write(&grammar, "start :: \"x\";\nbar :: \"y\";\n%%").unwrap();

    descent(&grammar, &output)
        .assert()
        .success()
        .stderr(contains("warning: unused rules:").and(contains("bar")));
}

#[test]
fn missing_input_file() {
    let dir = tempdir().unwrap();
    descent(&dir.path().join("nope.rdg"), &dir.path().join("out.rs"))
        .assert()
        .code(1)
        .stderr(contains("Error:").and(contains("nope.rdg")));
}

#[test]
fn requires_two_paths() {
    Command::cargo_bin("descent").unwrap().arg("only-one.rdg").assert().failure();
}

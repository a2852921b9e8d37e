use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;

fn workspace_root() -> PathBuf {
    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    manifest_dir.parent().unwrap().parent().unwrap().to_path_buf()
}

#[test]
fn runs_factorial_demo() {
    let root = workspace_root();
    let mut cmd = Command::cargo_bin("resin-cli").unwrap();
    cmd.arg(root.join("demos/factorial.resin"));
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("success"))
        .stdout(predicate::str::contains("3628800\n"))
        .stdout(predicate::str::contains("i32 3628800"));
}

#[test]
fn runs_fib_demo() {
    let root = workspace_root();
    let mut cmd = Command::cargo_bin("resin-cli").unwrap();
    cmd.arg(root.join("demos/fib.resin"));
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("success"))
        .stdout(predicate::str::contains("i32 144"));
}

#[test]
fn runs_primes_demo() {
    let root = workspace_root();
    let mut cmd = Command::cargo_bin("resin-cli").unwrap();
    cmd.arg(root.join("demos/primes.resin"));
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("2\n3\n5\n7\n11\n13\n17\n19\n23\n29\n"));
}

#[test]
fn folds_a_constant_program_from_stdin() {
    let mut cmd = Command::cargo_bin("resin-cli").unwrap();
    cmd.write_stdin("(+ 1 2 3.0)");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("success"))
        .stdout(predicate::str::contains("f32 6.000000"))
        .stdout(predicate::str::contains("lit: f32 6.000000"));
}

#[test]
fn feeds_reads_from_stdin() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sum.resin");
    std::fs::write(&path, "(print (+ (readi32) (readi32)))").unwrap();

    let mut cmd = Command::cargo_bin("resin-cli").unwrap();
    cmd.arg(path).write_stdin("4 5\n");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("9\n"))
        .stdout(predicate::str::contains("i32 9"));
}

#[test]
fn parse_error_is_nonzero() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.resin");
    std::fs::write(&path, "(print 1").unwrap(); // malformed on purpose

    let mut cmd = Command::cargo_bin("resin-cli").unwrap();
    cmd.arg(path);
    cmd.assert()
        .failure()
        .stdout(predicate::str::contains("failure"))
        .stderr(predicate::str::contains("parse error"));
}

#[test]
fn lex_error_is_nonzero() {
    let mut cmd = Command::cargo_bin("resin-cli").unwrap();
    cmd.write_stdin("(print @)");
    cmd.assert()
        .failure()
        .stdout(predicate::str::contains("failure"))
        .stderr(predicate::str::contains("lex error"));
}

#[test]
fn read_failure_is_a_runtime_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("read.resin");
    std::fs::write(&path, "(readi32)").unwrap();

    let mut cmd = Command::cargo_bin("resin-cli").unwrap();
    cmd.arg(path).write_stdin("");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("runtime error"));
}

#[test]
fn empty_input_exits_quietly() {
    let mut cmd = Command::cargo_bin("resin-cli").unwrap();
    cmd.write_stdin("");
    cmd.assert().success().stdout(predicate::str::is_empty());
}

#[test]
fn missing_file_fails() {
    let mut cmd = Command::cargo_bin("resin-cli").unwrap();
    cmd.arg("no-such-file.resin");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("failure reading input file"));
}

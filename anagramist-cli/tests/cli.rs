//! End-to-end coverage of the operator CLI surface, driving the built
//! binary the way an operator would from a shell.

use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;

fn vocab_fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../anagramist-core/tests/fixtures/vocab_general.txt")
}

fn cli() -> Command {
    Command::cargo_bin("anagramist").unwrap()
}

#[test]
fn solve_then_verify_then_inspect_a_small_bank() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("tree.sqlite");

    cli()
        .arg("solve")
        .arg("--store")
        .arg(&store)
        .arg("--bank")
        .arg("bishbashbosh")
        .arg("--vocab")
        .arg(vocab_fixture())
        .arg("--max-iterations")
        .arg("300")
        .arg("--max-expansions-per-iteration")
        .arg("20")
        .arg("--seed")
        .arg("1")
        .assert()
        .success()
        .stdout(predicate::str::contains("solved:"));

    cli()
        .arg("verify")
        .arg("--store")
        .arg(&store)
        .assert()
        .success()
        .stdout(predicate::str::contains("store is consistent"));

    cli()
        .arg("inspect")
        .arg("--store")
        .arg(&store)
        .arg("--bank")
        .arg("bishbashbosh")
        .arg("--vocab")
        .arg(vocab_fixture())
        .arg("")
        .assert()
        .success()
        .stdout(predicate::str::contains("node: "));
}

#[test]
fn set_status_reports_updated_then_already_set() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("tree.sqlite");

    cli()
        .arg("solve")
        .arg("--store")
        .arg(&store)
        .arg("--bank")
        .arg("hi")
        .arg("--vocab")
        .arg(vocab_fixture())
        .arg("--max-iterations")
        .arg("20")
        .assert()
        .success();

    cli()
        .arg("set-status")
        .arg("--store")
        .arg(&store)
        .arg("--status")
        .arg("7")
        .arg("hi")
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated"));

    cli()
        .arg("set-status")
        .arg("--store")
        .arg(&store)
        .arg("--status")
        .arg("7")
        .arg("hi")
        .assert()
        .success()
        .stdout(predicate::str::contains("AlreadySet"));
}

#[test]
fn trim_reports_deleted_count() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("tree.sqlite");

    cli()
        .arg("solve")
        .arg("--store")
        .arg(&store)
        .arg("--bank")
        .arg("bishbashbosh")
        .arg("--vocab")
        .arg(vocab_fixture())
        .arg("--max-iterations")
        .arg("300")
        .arg("--max-expansions-per-iteration")
        .arg("20")
        .arg("--seed")
        .arg("1")
        .assert()
        .success();

    cli()
        .arg("trim")
        .arg("--store")
        .arg(&store)
        .arg("")
        .assert()
        .success()
        .stdout(predicate::str::contains("deleted"));
}

#[test]
fn score_once_prints_aligned_word_scores() {
    cli()
        .arg("score-once")
        .arg("hi there")
        .assert()
        .success()
        .stdout(predicate::str::contains("hi\t"))
        .stdout(predicate::str::contains("there\t"));
}

//! Integration tests for the kempt binary.

// `assert_cmd` assertions hand back the `Assert` for further chaining.
#![allow(unused_results)]

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const CLEAN: &str = "<!DOCTYPE html>\n<html>\n<head>\n<title>t</title>\n</head>\n<body>\n<p>x</p>\n</body>\n</html>\n";

fn kempt() -> Command {
    Command::cargo_bin("kempt").unwrap()
}

#[test]
fn clean_input_exits_zero() {
    kempt()
        .write_stdin(CLEAN)
        .assert()
        .code(0)
        .stdout(CLEAN)
        .stderr(predicate::str::contains("No warnings or errors were found."));
}

#[test]
fn warnings_exit_one_and_output_is_repaired() {
    kempt()
        .write_stdin("<h1>Hello, world!</h2>")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("<h1>Hello, world!</h1>"))
        .stderr(predicate::str::contains("Warning: missing <!DOCTYPE> declaration"));
}

#[test]
fn errors_exit_two_without_output() {
    kempt()
        .write_stdin("<p><blink>x</blink></p>")
        .assert()
        .code(2)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Error: <blink> is not recognized!"));
}

#[test]
fn errors_flag_reports_without_markup() {
    kempt()
        .arg("-e")
        .write_stdin("<p>x</p>")
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty());
}

#[test]
fn quiet_drops_the_summary() {
    kempt()
        .args(["-q", "-s", "show-info=no"])
        .write_stdin(CLEAN)
        .assert()
        .code(0)
        .stderr(predicate::str::is_empty());
}

#[test]
fn missing_file_is_fatal() {
    let dir = TempDir::new().unwrap();
    kempt()
        .arg(dir.path().join("absent.html"))
        .assert()
        .code(3)
        .stderr(predicate::str::contains("file not found"));
}

#[test]
fn modify_rewrites_the_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("page.html");
    fs::write(&path, "<title>t</title><p>x").unwrap();

    kempt().arg("-m").arg(&path).assert().code(1).stdout(predicate::str::is_empty());

    let rewritten = fs::read_to_string(&path).unwrap();
    assert!(rewritten.starts_with("<!DOCTYPE html>\n"));
    assert!(rewritten.contains("<p>x</p>"));
}

#[test]
fn output_file_and_worst_status() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("out.html");
    kempt()
        .args(["-x", "-o"])
        .arg(&out)
        .write_stdin("<p>a<br>b</p>")
        .assert()
        .code(1);
    let written = fs::read_to_string(&out).unwrap();
    assert!(written.contains("<br />"));

    let clean = dir.path().join("clean.html");
    let broken = dir.path().join("broken.html");
    fs::write(&clean, CLEAN).unwrap();
    fs::write(&broken, "<p><blink>x</blink></p>").unwrap();
    kempt().arg("-e").arg(&clean).arg(&broken).assert().code(2);
}

#[test]
fn config_file_and_set_overrides() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("kempt.conf");
    fs::write(&config, "indent: yes\nshow-body-only: yes\n").unwrap();

    kempt()
        .arg("-c")
        .arg(&config)
        .args(["-s", "indent=no"])
        .write_stdin("<div><p>x</p></div>")
        .assert()
        .code(1)
        .stdout("<div>\n<p>x</p>\n</div>\n");
}

#[test]
fn bad_settings_are_reported_not_fatal() {
    kempt()
        .args(["-s", "frobnicate=yes", "-q"])
        .write_stdin(CLEAN)
        .assert()
        .code(0)
        .stderr(predicate::str::contains("unknown option: frobnicate"));
}

#[test]
fn malformed_set_is_fatal() {
    kempt()
        .args(["-s", "wrap"])
        .write_stdin(CLEAN)
        .assert()
        .code(3)
        .stderr(predicate::str::contains("expected KEY=VALUE"));
}

#[test]
fn show_config_lists_options() {
    kempt()
        .args(["--show-config", "-w", "72"])
        .assert()
        .code(0)
        .stdout(predicate::str::contains("wrap").and(predicate::str::contains("72")))
        .stdout(predicate::str::contains("doctype-mode").and(predicate::str::contains("(read-only)")));
}

#[test]
fn error_file_receives_diagnostics() {
    let dir = TempDir::new().unwrap();
    let log = dir.path().join("errors.txt");
    kempt()
        .arg("-s")
        .arg(format!("error-file={}", log.display()))
        .write_stdin("<p>x</p>")
        .assert()
        .code(1)
        .stderr(predicate::str::is_empty());
    let text = fs::read_to_string(&log).unwrap();
    assert!(text.contains("missing <!DOCTYPE> declaration"));
}

#[test]
fn gnu_emacs_format_names_the_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("page.html");
    fs::write(&path, "<p>x</p>").unwrap();
    kempt()
        .args(["-e", "-s", "gnu-emacs=yes"])
        .arg(&path)
        .assert()
        .code(1)
        .stderr(predicate::str::contains(format!("{}: Warning:", path.display())));
}

#[test]
fn tree_dump_is_printed() {
    kempt()
        .args(["--tree", "-e"])
        .write_stdin("<p>x</p>")
        .assert()
        .stdout(predicate::str::contains("body"));
}

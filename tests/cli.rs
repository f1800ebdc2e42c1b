//! End-to-end tests for the mimemap binary

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

fn mimemap() -> Command {
    Command::cargo_bin("mimemap").unwrap()
}

fn write_fixture(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn type_resolves_from_given_mime_types_file() {
    let fixture = write_fixture("application/x-zzq zzq\n");

    mimemap()
        .args(["--mime-types"])
        .arg(fixture.path())
        .args(["type", "sample.zzq"])
        .assert()
        .success()
        .stdout(predicate::str::contains("sample.zzq: application/x-zzq"));
}

#[test]
fn type_defaults_to_octet_stream() {
    mimemap()
        .args(["type", "no-extension"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "no-extension: application/octet-stream",
        ));
}

#[test]
fn type_json_output() {
    let output = mimemap()
        .args(["--json", "type", "no-extension"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let reports: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(reports[0]["file"], "no-extension");
    assert_eq!(reports[0]["mime_type"], "application/octet-stream");
}

#[test]
fn commands_lists_preferred_and_all() {
    let fixture = write_fixture(
        "text/x-zzq; ; x-handler-view=zzq-viewer\n\
         text/x-zzq; ; x-handler-view=other-viewer; x-handler-edit=zzq-editor\n",
    );

    mimemap()
        .args(["--mailcap"])
        .arg(fixture.path())
        .args(["commands", "text/x-zzq"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("view: zzq-viewer")
                .and(predicate::str::contains("edit: zzq-editor"))
                .and(predicate::str::contains("view: other-viewer")),
        );
}

#[test]
fn commands_json_reports_first_entry_as_preferred() {
    // application/x-zzq: the built-in application/* fallback binds no view
    // verb, so every view entry here comes from the fixture
    let fixture = write_fixture(
        "application/x-zzq; ; x-handler-view=zzq-viewer\n\
         application/x-zzq; ; x-handler-view=other-viewer\n",
    );

    let output = mimemap()
        .args(["--json", "--mailcap"])
        .arg(fixture.path())
        .args(["commands", "application/x-zzq"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let preferred = report["preferred"].as_array().unwrap();
    let view: Vec<&serde_json::Value> = preferred
        .iter()
        .filter(|c| c["verb"] == "view")
        .collect();
    assert_eq!(view.len(), 1);
    assert_eq!(view[0]["handler"], "zzq-viewer");

    assert_eq!(
        report["all"]
            .as_array()
            .unwrap()
            .iter()
            .filter(|c| c["verb"] == "view")
            .count(),
        2
    );
}

#[test]
fn commands_native_entries_are_reported() {
    let fixture = write_fixture("video/x-zzq; zzqplay %s\n");

    mimemap()
        .args(["--mailcap"])
        .arg(fixture.path())
        .args(["commands", "video/x-zzq"])
        .assert()
        .success()
        .stdout(predicate::str::contains("video/x-zzq; zzqplay %s"));
}

#[test]
fn dump_includes_given_mailcap_types() {
    let fixture = write_fixture("application/x-zzq; ; x-handler-view=zzq-viewer\n");

    mimemap()
        .args(["--mailcap"])
        .arg(fixture.path())
        .args(["dump"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("application/x-zzq")
                .and(predicate::str::contains("Known MIME types:")),
        );
}

#[test]
fn missing_mailcap_file_fails() {
    mimemap()
        .args(["--mailcap", "/no/such/mailcap", "commands", "text/plain"])
        .assert()
        .failure();
}

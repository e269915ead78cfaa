use assert_cmd::Command;
use std::fs;
use tempfile::TempDir;

fn reltools() -> Command {
    let mut cmd = Command::cargo_bin("reltools").expect("binary not built");
    cmd.env_remove("RUST_LOG");
    cmd
}

fn stdout_of(args: &[&str]) -> String {
    let output = reltools().args(args).output().expect("failed to run reltools");
    assert!(
        output.status.success(),
        "command failed: {}\n{}",
        output.status,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).expect("stdout not utf-8")
}

#[test]
fn test_version_increment() {
    assert_eq!(stdout_of(&["version", "increment", "1.0.0-alpha19"]), "1.0.0-alpha20\n");
    assert_eq!(stdout_of(&["version", "increment", "1.0.0-rc01"]), "1.1.0-alpha01\n");
    assert_eq!(
        stdout_of(&["version", "increment", "1.0.0-rc01", "--within-minor"]),
        "1.0.0-rc02\n"
    );
    assert_eq!(stdout_of(&["version", "increment", "1.0.1", "--within-minor"]), "1.0.2\n");
}

#[test]
fn test_version_higher() {
    assert_eq!(stdout_of(&["version", "higher", "1.4.0-beta01", "1.4.2"]), "1.4.2\n");
    assert_eq!(stdout_of(&["version", "higher", "1.0.0-rc05", "1.2.0-beta02"]), "1.2.0-beta02\n");
}

#[test]
fn test_version_constants() {
    assert_eq!(
        stdout_of(&["version", "constants", "androidx.foo.bar", "bar-qux"]),
        "FOO_BAR BAR_QUX\n"
    );
    assert_eq!(
        stdout_of(&["version", "constants", "androidx.compose.runtime", "runtime"]),
        "COMPOSE RUNTIME\n"
    );
}

#[test]
fn test_version_should_update() {
    assert_eq!(
        stdout_of(&["version", "should-update", "1.2.0", "1.3.0-alpha01", "--group", "androidx.tracing"]),
        "true\n"
    );
    assert_eq!(
        stdout_of(&["version", "should-update", "1.2.0", "1.3.0-alpha01", "--group", "androidx.car"]),
        "false\n"
    );
    assert_eq!(
        stdout_of(&[
            "version",
            "should-update",
            "1.1.0-alpha01",
            "1.0.0-alpha01",
            "--artifact",
            "work-runtime"
        ]),
        "false\n"
    );
}

#[test]
fn test_should_update_needs_a_target() {
    reltools()
        .args(["version", "should-update", "1.0.0", "1.1.0"])
        .assert()
        .failure();
}

#[test]
fn test_invalid_version_fails() {
    reltools()
        .args(["version", "increment", "1.0"])
        .assert()
        .failure()
        .code(1);
}

#[test]
fn test_increment_past_u32_fails_cleanly() {
    let output = reltools()
        .args(["version", "increment", "1.4294967295.0"])
        .output()
        .expect("failed to run reltools");
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("component overflows"));
}

#[test]
fn test_relnote_present() {
    reltools()
        .args([
            "relnote",
            "--message",
            "Add API\n\nRelnote: Added Foo.bar()",
            "--path",
            "compose/runtime/",
            "compose/runtime/src/Foo.kt",
        ])
        .assert()
        .success();
}

#[test]
fn test_relnote_missing_fails() {
    let output = reltools()
        .args([
            "relnote",
            "--message",
            "Add API",
            "--path",
            "compose/runtime/",
            "compose/runtime/src/Foo.kt",
        ])
        .output()
        .expect("failed to run reltools");

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("need a release note"));
}

#[test]
fn test_relnote_not_required_for_other_paths() {
    reltools()
        .args(["relnote", "--message", "Add API", "--path", "compose/runtime/", "docs/README.md"])
        .assert()
        .success();
}

#[test]
fn test_relnote_message_from_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let message = temp_dir.path().join("COMMIT_EDITMSG");
    fs::write(&message, "Fix crash\n\nRelnote: \"Fixed a crash in Foo\"\n").unwrap();

    reltools()
        .args([
            "relnote",
            "--message-file",
            message.to_str().unwrap(),
            "--path",
            "core/",
            "core/core/src/main/Foo.java",
        ])
        .assert()
        .success();
}

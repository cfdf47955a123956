// tests/cli_test.rs
use std::process::Command;

fn attribution() -> Command {
    Command::new(env!("CARGO_BIN_EXE_attribution"))
}

#[test]
fn test_attribution_help() {
    let output = attribution()
        .arg("--help")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("attribution"));
    assert!(stdout.contains("changelogs"));
    for command in ["generate", "tag", "log", "list"] {
        assert!(stdout.contains(command), "help lacks {}", command);
    }
}

#[test]
fn test_attribution_version() {
    let output = attribution()
        .arg("--version")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_tag_requires_version() {
    let output = attribution()
        .arg("tag")
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_changelog_outside_repository_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = attribution()
        .current_dir(dir.path())
        .env("GIT_CEILING_DIRECTORIES", dir.path().parent().unwrap())
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("ERROR:"));
}

#[test]
fn test_list_and_changelog_in_repository() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    let git = |args: &[&str]| {
        Command::new("git")
            .args(args)
            .current_dir(root)
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    };
    if !git(&["init", "-q"]) {
        return;
    }
    assert!(git(&["config", "user.name", "Test User"]));
    assert!(git(&["config", "user.email", "test@example.com"]));
    assert!(git(&["config", "tag.gpgsign", "false"]));
    std::fs::write(root.join("attribution.toml"), "name = \"cli-demo\"\n").unwrap();
    assert!(git(&["add", "attribution.toml"]));
    assert!(git(&["commit", "-q", "-m", "Initial commit"]));
    assert!(git(&["tag", "-a", "v1.0", "-m", "Hello world"]));
    assert!(git(&["tag", "nightly"]));

    let output = attribution().arg("list").current_dir(root).output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("v1.0"));
    assert!(!stdout.contains("nightly"));

    let output = attribution().current_dir(root).output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.starts_with("cli-demo\n========\n\nv1.0\n----\n\nHello world\n"));
}

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn transolution_cmd(dir: &Path) -> Command {
    let mut command = Command::new(assert_cmd::cargo::cargo_bin!("transolution"));
    command.current_dir(dir);
    command
}

fn run(dir: &Path, args: &[&str]) -> Output {
    transolution_cmd(dir)
        .args(args)
        .output()
        .expect("Failed to execute command")
}

fn assert_success(output: &Output) {
    assert!(
        output.status.success(),
        "Command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

fn write_resx(path: &Path, entries: &[(&str, &str)]) {
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<root>\n");
    for (key, value) in entries {
        xml.push_str(&format!(
            "  <data name=\"{key}\" xml:space=\"preserve\">\n    <value>{value}</value>\n  </data>\n"
        ));
    }
    xml.push_str("</root>\n");
    fs::write(path, xml).unwrap();
}

/// Creates `demo.tsln` with project `App` whose source is `Strings.resx`.
fn setup_solution(dir: &Path) {
    write_resx(&dir.join("Strings.resx"), &[("hello", "Hello"), ("bye", "Bye")]);
    assert_success(&run(dir, &["new", "demo.tsln", "--name", "Demo"]));
    assert_success(&run(dir, &["add-project", "demo.tsln", "App"]));
    assert_success(&run(
        dir,
        &["add-file", "demo.tsln", "-p", "App", "--source", "Strings.resx"],
    ));
}

#[test]
fn test_build_and_show_solution() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    setup_solution(dir);

    let output = run(
        dir,
        &["add-file", "demo.tsln", "-p", "App", "--culture", "de-DE"],
    );
    assert_success(&output);
    assert!(String::from_utf8_lossy(&output.stdout).contains("Added target Strings.de-DE.resx"));

    let xml = fs::read_to_string(dir.join("demo.tsln")).unwrap();
    assert!(xml.contains("<Solution Version=\"1\" Name=\"Demo\" Comment=\"\">"));
    assert!(xml.contains("<SourceFile Path=\"Strings.resx\" Type=\"resx\" Comment=\"\"/>"));
    assert!(xml.contains("<TargetFile Path=\"Strings.de-DE.resx\" Type=\"resx\" Comment=\"\"/>"));

    let output = run(dir, &["show", "demo.tsln"]);
    assert_success(&output);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Solution: Demo"));
    assert!(stdout.contains("Source: Strings.resx [resx]"));
    assert!(stdout.contains("Target: Strings.de-DE.resx [resx] (de-DE)"));
}

#[test]
fn test_show_json() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    setup_solution(dir);

    let output = run(dir, &["show", "demo.tsln", "--json"]);
    assert_success(&output);
    let v: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(v["name"], "Demo");
    assert_eq!(v["projects"][0]["name"], "App");
    assert_eq!(v["projects"][0]["source"]["type"], "resx");
}

#[test]
fn test_duplicate_target_is_updated() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    setup_solution(dir);

    assert_success(&run(
        dir,
        &["add-file", "demo.tsln", "-p", "App", "Strings.fr.resx"],
    ));
    let output = run(
        dir,
        &[
            "add-file",
            "demo.tsln",
            "-p",
            "App",
            "strings.FR.resx",
            "--comment",
            "second",
        ],
    );
    assert_success(&output);
    assert!(String::from_utf8_lossy(&output.stdout).contains("Updated target"));

    let xml = fs::read_to_string(dir.join("demo.tsln")).unwrap();
    assert_eq!(xml.matches("<TargetFile").count(), 1);
    assert!(xml.contains("Comment=\"second\""));
}

#[test]
fn test_unknown_project_fails() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    setup_solution(dir);

    let output = run(dir, &["add-file", "demo.tsln", "-p", "Nope", "x.de.resx"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Project \"Nope\" not found"));
}

#[test]
fn test_new_refuses_to_overwrite() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    assert_success(&run(dir, &["new", "demo.tsln"]));
    let output = run(dir, &["new", "demo.tsln"]);
    assert!(!output.status.success());
    assert_success(&run(dir, &["new", "demo.tsln", "--force"]));
}

#[test]
fn test_validate_reports_missing_files() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    setup_solution(dir);
    assert_success(&run(
        dir,
        &["add-file", "demo.tsln", "-p", "App", "Strings.fr.resx"],
    ));

    assert_success(&run(dir, &["validate", "demo.tsln"]));

    let output = run(dir, &["validate", "demo.tsln", "--check-files", "--json"]);
    assert!(!output.status.success());
    let v: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(v["errors"], 1);
    assert_eq!(v["issues"][0]["message"], "file does not exist");
}

#[test]
fn test_validate_strict_fails_on_warnings() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    setup_solution(dir);

    // App has no targets yet
    assert_success(&run(dir, &["validate", "demo.tsln"]));
    let output = run(dir, &["validate", "demo.tsln", "--strict"]);
    assert!(!output.status.success());
}

#[test]
fn test_stats_with_coverage() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    setup_solution(dir);
    write_resx(&dir.join("Strings.de.resx"), &[("hello", "Hallo"), ("old", "Alt")]);
    assert_success(&run(
        dir,
        &["add-file", "demo.tsln", "-p", "App", "--culture", "de"],
    ));

    let output = run(dir, &["stats", "demo.tsln", "--coverage", "--json"]);
    assert_success(&output);
    let v: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(v["summary"]["projects"], 1);
    assert_eq!(v["summary"]["target_files"], 1);
    assert_eq!(v["summary"]["cultures"][0], "de");
    let target = &v["coverage"][0];
    assert_eq!(target["total"], 2);
    assert_eq!(target["translated"], 1);
    assert_eq!(target["completion_percent"], 50.0);
    assert_eq!(target["missing"][0], "bye");
    assert_eq!(target["obsolete"][0], "old");
}

#[test]
fn test_view_and_convert_resource() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    write_resx(&dir.join("Strings.resx"), &[("hello", "Hello"), ("bye", "Bye")]);

    let output = run(dir, &["view", "-i", "Strings.resx"]);
    assert_success(&output);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Entries: 2"));
    assert!(stdout.contains("Entry 1: hello"));

    assert_success(&run(dir, &["convert", "-i", "Strings.resx", "-o", "Strings.csv"]));
    let csv = fs::read_to_string(dir.join("Strings.csv")).unwrap();
    assert_eq!(csv, "hello,Hello,\nbye,Bye,\n");

    assert_success(&run(dir, &["convert", "-i", "Strings.csv", "-o", "Copy.resx"]));
    let output = run(dir, &["view", "-i", "Copy.resx"]);
    assert_success(&output);
    assert!(String::from_utf8_lossy(&output.stdout).contains("Entry 2: bye"));
}

#[test]
fn test_view_missing_file_fails() {
    let temp_dir = TempDir::new().unwrap();
    let output = run(temp_dir.path(), &["view", "-i", "missing.resx"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("missing.resx"));
}

#[test]
fn test_config_default_format() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    setup_solution(dir);
    fs::write(dir.join("transolution.toml"), "default_format = \"csv\"\n").unwrap();

    assert_success(&run(
        dir,
        &["add-file", "demo.tsln", "-p", "App", "Strings.de.txt"],
    ));
    let xml = fs::read_to_string(dir.join("demo.tsln")).unwrap();
    assert!(xml.contains("<TargetFile Path=\"Strings.de.txt\" Type=\"csv\""));
}

#[test]
fn test_invalid_config_fails() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    fs::write(dir.join("custom.toml"), "log_level = \"loud\"\n").unwrap();
    let output = run(dir, &["--config", "custom.toml", "new", "demo.tsln"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Unknown log level"));
}

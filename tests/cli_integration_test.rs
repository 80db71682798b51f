use anyhow::Result;
use serde_json::Value;
use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

fn get_binary_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_ebsynth"))
}

/// Runs in an empty working directory with no EBSYNTH_CONFIG so the embedded
/// registry is used unless --config says otherwise.
fn run(dir: &TempDir, args: &[&str]) -> Output {
    Command::new(get_binary_path())
        .args(args)
        .current_dir(dir.path())
        .env_remove("EBSYNTH_CONFIG")
        .env("XDG_CONFIG_HOME", dir.path().join("xdg"))
        .env("HOME", dir.path())
        .env("RUST_LOG", "error")
        .output()
        .expect("Failed to run binary")
}

#[test]
fn test_cli_help() {
    let dir = TempDir::new().unwrap();
    let output = run(&dir, &["--help"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--config"));
    assert!(stdout.contains("--only"));
    assert!(stdout.contains("--format"));
    assert!(stdout.contains("--out-dir"));
}

#[test]
fn test_cli_list_embedded_registry() {
    let dir = TempDir::new().unwrap();
    let output = run(&dir, &["--list"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let names: Vec<_> = stdout.lines().collect();
    assert_eq!(
        names,
        ["dev", "staging", "sandbox", "production-blue", "production-green"]
    );
}

#[test]
fn test_cli_json_descriptors() -> Result<()> {
    let dir = TempDir::new()?;
    let output = run(&dir, &["--format", "json", "--only", "production-*"]);
    assert!(output.status.success());

    let v: Value = serde_json::from_slice(&output.stdout)?;
    let arr = v.as_array().unwrap();
    assert_eq!(arr.len(), 2);
    assert_eq!(arr[0]["environment"], "production-blue");
    assert_eq!(arr[0]["high_availability"], true);
    Ok(())
}

#[test]
fn test_cli_writes_one_template_per_environment() -> Result<()> {
    let dir = TempDir::new()?;
    let out = dir.path().join("cdk.out");
    let output = run(&dir, &["--out-dir", out.to_str().unwrap()]);
    assert!(output.status.success());

    let count = std::fs::read_dir(&out)?.count();
    assert_eq!(count, 5);

    let text = std::fs::read_to_string(out.join("breederhq-api-dev.template.json"))?;
    let v: Value = serde_json::from_str(&text)?;
    assert_eq!(
        v["Resources"]["Environment"]["Properties"]["EnvironmentName"],
        "breederhq-api-dev"
    );
    Ok(())
}

#[test]
fn test_cli_duplicate_environment_fails_without_output() -> Result<()> {
    let dir = TempDir::new()?;
    let config = dir.path().join("dup.toml");
    std::fs::write(
        &config,
        r#"
[app]
name = "shop"

[defaults]
account = "123456789012"
region = "eu-west-1"
instance_class = "t4g.small"
runtime_version = "22"

[[environments]]
name = "dev"

[[environments]]
name = "dev"
"#,
    )?;
    let out = dir.path().join("out");

    let output = run(
        &dir,
        &[
            "--config",
            config.to_str().unwrap(),
            "--out-dir",
            out.to_str().unwrap(),
        ],
    );

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("duplicate environment name 'dev'"));
    assert!(!out.exists());
    Ok(())
}

#[test]
fn test_cli_missing_config_fails() {
    let dir = TempDir::new().unwrap();
    let output = run(&dir, &["--config", "does-not-exist.toml"]);
    assert!(!output.status.success());
}

#[test]
fn test_cli_report_to_file() -> Result<()> {
    let dir = TempDir::new()?;
    let report = dir.path().join("report.txt");
    let output = run(
        &dir,
        &[
            "--report",
            "summary",
            "--report-out",
            report.to_str().unwrap(),
        ],
    );
    assert!(output.status.success());

    let text = std::fs::read_to_string(&report)?;
    assert!(text.contains("environments: 5"));
    assert!(text.contains("- production-green (LoadBalanced)"));
    Ok(())
}

#[test]
fn test_cli_unwritable_report_leaves_no_output() -> Result<()> {
    let dir = TempDir::new()?;
    let out = dir.path().join("out");
    let report = dir.path().join("missing").join("report.txt");
    let output = run(
        &dir,
        &[
            "--out-dir",
            out.to_str().unwrap(),
            "--report",
            "summary",
            "--report-out",
            report.to_str().unwrap(),
        ],
    );

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to write report"));
    assert!(!out.exists());
    Ok(())
}

#[test]
fn test_cli_failed_output_removes_report() -> Result<()> {
    let dir = TempDir::new()?;
    let out = dir.path().join("out");
    std::fs::create_dir_all(out.join("breederhq-api-staging.template.json"))?;
    let report = dir.path().join("report.txt");
    let output = run(
        &dir,
        &[
            "--out-dir",
            out.to_str().unwrap(),
            "--report",
            "summary",
            "--report-out",
            report.to_str().unwrap(),
        ],
    );

    assert!(!output.status.success());
    assert!(!report.exists());
    assert!(!out.join("breederhq-api-dev.template.json").exists());
    Ok(())
}

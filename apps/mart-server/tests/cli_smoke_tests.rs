//! CLI smoke tests for the mart-server binary.

use std::path::Path;
use std::process::{Command, Stdio};
use std::time::Duration;
use tempfile::TempDir;
use tokio::time::timeout;

fn run_mart_server(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_mart-server"))
        .args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .expect("Failed to execute mart-server")
}

async fn run_mart_server_with_timeout(
    args: &[&str],
    timeout_duration: Duration,
) -> Result<std::process::Output, Box<dyn std::error::Error>> {
    let mut cmd = tokio::process::Command::new(env!("CARGO_BIN_EXE_mart-server"));
    cmd.args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    match timeout(timeout_duration, cmd.output()).await {
        Ok(result) => result.map_err(|e| e.into()),
        Err(elapsed) => Err(elapsed.into()),
    }
}

/// Write a config whose home_dir (and therefore log files) lives in `dir`.
fn write_config(dir: &Path, name: &str, body: &str) -> String {
    let path = dir.join(name);
    let content = format!(
        "server:\n  home_dir: \"{}\"\n  host: \"127.0.0.1\"\n  port: 0\n{}",
        dir.display(),
        body
    );
    std::fs::write(&path, content).expect("Failed to write config file");
    path.to_string_lossy().to_string()
}

#[test]
fn test_cli_help_command() {
    let output = run_mart_server(&["--help"]);
    assert!(output.status.success(), "Help command should succeed");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("mart-server"), "Should contain binary name");
    assert!(stdout.contains("Usage:"), "Should contain usage information");
    assert!(stdout.contains("run"));
    assert!(stdout.contains("check"));
    assert!(stdout.contains("--config"));
    assert!(stdout.contains("--mock"));
}

#[test]
fn test_cli_version_command() {
    let output = run_mart_server(&["--version"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("mart-server"));
    assert!(stdout.contains("0.1.0"));
}

#[test]
fn test_cli_invalid_command() {
    let output = run_mart_server(&["invalid-command"]);
    assert!(!output.status.success(), "Invalid command should fail");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error"), "Should report the bad subcommand: {stderr}");
}

#[test]
fn test_cli_config_validation_missing_file() {
    let output = run_mart_server(&["--config", "/nonexistent/config.yaml", "check"]);
    assert!(!output.status.success(), "Should fail with missing config");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("config file not found"),
        "Should mention config file issue: {stderr}"
    );
}

#[test]
fn test_cli_config_flag_short_form() {
    let output = run_mart_server(&["-c", "/nonexistent/config.yaml", "check"]);
    assert!(!output.status.success());
}

#[test]
fn test_cli_config_validation_invalid_yaml() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("invalid.yaml");
    std::fs::write(&config_path, "invalid: yaml: content: [unclosed")
        .expect("Failed to write file");

    let output = run_mart_server(&["--config", config_path.to_str().unwrap(), "check"]);
    assert!(!output.status.success(), "Should fail with invalid YAML");
}

#[test]
fn test_cli_config_validation_valid_config() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = write_config(
        temp_dir.path(),
        "valid.yaml",
        r#"
database:
  url: "sqlite://database/mart.db?mode=rwc"

logging:
  default:
    console_level: info
    file: "logs/mart.log"
    file_level: info
    max_backups: 3
    max_size_mb: 10

modules:
  http:
    auth:
      tokens:
        - token: "admin-token"
          user_id: "6f1c2b0e-8a43-4c55-9d0b-2f6f4f7a9e11"
          role: admin
  commerce:
    seed_products:
      - id: "2b1e4c0a-9f3d-4a8e-8c7b-5d6e7f8a9b0c"
        name: "Green tea"
        price: 4.25
"#,
    );

    let output = run_mart_server(&["--config", &config_path, "check"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(output.status.success(), "STDOUT: {stdout}\nSTDERR: {stderr}");

    assert!(stdout.contains("Configuration check passed"));
    assert!(stdout.contains("API tokens: 1, seed products: 1"));
    // Relative sqlite paths are resolved under home_dir.
    assert!(stdout.contains(&format!(
        "sqlite://{}/database/mart.db",
        temp_dir.path().to_string_lossy().replace('\\', "/")
    )));
}

#[test]
fn test_cli_unknown_seed_product_field_is_rejected() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = write_config(
        temp_dir.path(),
        "bad-seed.yaml",
        r#"
database:
  url: "sqlite://database/mart.db"

modules:
  commerce:
    seed_produce: []
"#,
    );

    let output = run_mart_server(&["--config", &config_path, "check"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("commerce"), "Should name the module: {stderr}");
}

#[test]
fn test_cli_unsupported_database_scheme() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = write_config(
        temp_dir.path(),
        "mysql.yaml",
        r#"
database:
  url: "mysql://localhost/mart"
"#,
    );

    let output = run_mart_server(&["--config", &config_path, "check"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Unsupported database type"), "{stderr}");
}

#[test]
fn test_cli_mock_flag() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    // --mock replaces the database, so an unsupported scheme is never looked at.
    let config_path = write_config(
        temp_dir.path(),
        "mock.yaml",
        r#"
database:
  url: "mysql://localhost/nonexistent"
"#,
    );

    let output = run_mart_server(&["--config", &config_path, "--mock", "check"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        output.status.success(),
        "Should succeed with mock database: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(stdout.contains("sqlite::memory:"));
}

#[test]
fn test_cli_print_config() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = write_config(temp_dir.path(), "print.yaml", "");

    let output = run_mart_server(&["--config", &config_path, "--port", "8099", "--print-config"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("port: 8099"), "{stdout}");
}

#[test]
fn test_cli_subcommand_help() {
    let output = run_mart_server(&["run", "--help"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Start the server"));

    let output = run_mart_server(&["check", "--help"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Check configuration"));
}

#[tokio::test]
async fn test_cli_run_command_with_mock_database() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = write_config(
        temp_dir.path(),
        "run.yaml",
        r#"
logging:
  default:
    console_level: info
    file: ""
"#,
    );

    let result = run_mart_server_with_timeout(
        &["--config", &config_path, "--mock", "run"],
        Duration::from_secs(5),
    )
    .await;

    match result {
        // Still serving when the timeout fired.
        Err(err) => assert!(err.to_string().contains("elapsed"), "{err}"),
        Ok(output) => panic!(
            "Server exited early with {}:\nSTDOUT: {}\nSTDERR: {}",
            output.status,
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        ),
    }
}

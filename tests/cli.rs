//! Command-line surface of the `creatorhub` binary.

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// A command isolated from the caller's environment and any stray `.env`.
fn creatorhub(dir: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("creatorhub");
    cmd.current_dir(dir.path())
        .env_remove("JWT_SECRET")
        .env_remove("CREATORHUB_HOST")
        .env_remove("CREATORHUB_PORT")
        .env_remove("CREATORHUB_DB_PATH")
        .env_remove("CREATORHUB_UPLOAD_DIR");
    cmd
}

#[test]
fn test_help_lists_commands() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    creatorhub(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("init-db"))
        .stdout(predicate::str::contains("config"));
    Ok(())
}

#[test]
fn test_config_prints_defaults() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    creatorhub(&dir)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("port = 5000"))
        .stdout(predicate::str::contains("# configuration OK"));
    Ok(())
}

#[test]
fn test_config_reads_file_and_env() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    fs::write(
        dir.path().join("hub.toml"),
        "[server]\nport = 7100\n\n[search]\ndefault_limit = 500\nmax_limit = 50\n",
    )?;
    creatorhub(&dir)
        .args(["--config", "hub.toml", "config"])
        .env("CREATORHUB_HOST", "0.0.0.0")
        .assert()
        .success()
        .stdout(predicate::str::contains("port = 7100"))
        .stdout(predicate::str::contains("host = \"0.0.0.0\""))
        .stdout(predicate::str::contains("# warning: search.default_limit"));
    Ok(())
}

#[test]
fn test_config_rejects_malformed_file() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    fs::write(dir.path().join("creatorhub.toml"), "[server\nport = ")?;
    creatorhub(&dir).arg("config").assert().failure();
    Ok(())
}

#[test]
fn test_init_db_creates_database() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    creatorhub(&dir)
        .args(["init-db", "--db-path", "data/hub.db"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Database initialized"));
    assert!(dir.path().join("data/hub.db").exists());

    // Migrations are idempotent.
    creatorhub(&dir)
        .args(["init-db", "--db-path", "data/hub.db"])
        .assert()
        .success();
    Ok(())
}

#[test]
fn test_serve_requires_jwt_secret() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    creatorhub(&dir)
        .args(["serve", "--port", "0", "--db-path", "hub.db"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("JWT_SECRET"));
    Ok(())
}

//! Layered configuration for the creatorhub server.
//!
//! Values are resolved in order: `creatorhub.toml` → environment → CLI flags.
//! Every key is optional; missing keys fall back to defaults.
//!
//! # Configuration File Format
//!
//! ```toml
//! [server]
//! host = "127.0.0.1"
//! port = 5000
//! db_path = ".creatorhub/creatorhub.db"
//! upload_dir = "uploads"
//! dev_mode = false
//!
//! [auth]
//! token_ttl_hours = 24
//! default_avatar = "/uploads/defaults/avatar.png"
//!
//! [search]
//! default_limit = 12
//! max_limit = 100
//!
//! [featured]
//! per_kind = 3
//! excerpt_chars = 150
//!
//! [uploads]
//! max_bytes = 10485760
//!
//! [logging]
//! dir = "logs"
//! json = false
//! ```
//!
//! The JWT signing secret never comes from the file, only from `JWT_SECRET`
//! (see [`jwt_secret_from_env`]).

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_FILE: &str = "creatorhub.toml";
pub const JWT_SECRET_ENV: &str = "JWT_SECRET";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSection {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,
    /// Permissive CORS for a locally served client.
    #[serde(default)]
    pub dev_mode: bool,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_db_path() -> PathBuf {
    PathBuf::from(".creatorhub/creatorhub.db")
}

fn default_upload_dir() -> PathBuf {
    PathBuf::from("uploads")
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            db_path: default_db_path(),
            upload_dir: default_upload_dir(),
            dev_mode: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSection {
    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: u64,
    /// Avatar assigned to freshly registered users.
    #[serde(default = "default_avatar")]
    pub default_avatar: String,
}

fn default_token_ttl_hours() -> u64 {
    24
}

fn default_avatar() -> String {
    "/uploads/defaults/avatar.png".to_string()
}

impl Default for AuthSection {
    fn default() -> Self {
        Self {
            token_ttl_hours: default_token_ttl_hours(),
            default_avatar: default_avatar(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchSection {
    #[serde(default = "default_limit")]
    pub default_limit: u32,
    #[serde(default = "default_max_limit")]
    pub max_limit: u32,
}

fn default_limit() -> u32 {
    12
}

fn default_max_limit() -> u32 {
    100
}

impl Default for SearchSection {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            max_limit: default_max_limit(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeaturedSection {
    #[serde(default = "default_per_kind")]
    pub per_kind: u32,
    #[serde(default = "default_excerpt_chars")]
    pub excerpt_chars: usize,
}

fn default_per_kind() -> u32 {
    3
}

fn default_excerpt_chars() -> usize {
    150
}

impl Default for FeaturedSection {
    fn default() -> Self {
        Self {
            per_kind: default_per_kind(),
            excerpt_chars: default_excerpt_chars(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadsSection {
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,
}

fn default_max_bytes() -> usize {
    10 * 1024 * 1024
}

impl Default for UploadsSection {
    fn default() -> Self {
        Self {
            max_bytes: default_max_bytes(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingSection {
    /// When set, logs go to a daily rolling file in this directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
    #[serde(default)]
    pub json: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HubConfig {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub auth: AuthSection,
    #[serde(default)]
    pub search: SearchSection,
    #[serde(default)]
    pub featured: FeaturedSection,
    #[serde(default)]
    pub uploads: UploadsSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

/// CLI-level overrides, applied last.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub db_path: Option<PathBuf>,
    pub upload_dir: Option<PathBuf>,
    pub dev_mode: bool,
}

impl HubConfig {
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse creatorhub config")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::parse(&content)
    }

    /// Load `path` if it exists, otherwise start from defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Resolve the full layered configuration.
    pub fn resolve(path: &Path, cli: &CliOverrides) -> Result<Self> {
        let mut config = Self::load_or_default(path)?;
        config.apply_env(|key| std::env::var(key).ok())?;
        config.apply_cli(cli);
        Ok(config)
    }

    /// Overlay environment values. `lookup` is injected so tests do not
    /// have to mutate the process environment.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("CREATORHUB_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("CREATORHUB_PORT") {
            self.server.port = port
                .trim()
                .parse()
                .with_context(|| format!("Invalid CREATORHUB_PORT value '{}'", port))?;
        }
        if let Some(db_path) = lookup("CREATORHUB_DB_PATH") {
            self.server.db_path = PathBuf::from(db_path);
        }
        if let Some(upload_dir) = lookup("CREATORHUB_UPLOAD_DIR") {
            self.server.upload_dir = PathBuf::from(upload_dir);
        }
        Ok(())
    }

    pub fn apply_cli(&mut self, cli: &CliOverrides) {
        if let Some(ref host) = cli.host {
            self.server.host = host.clone();
        }
        if let Some(port) = cli.port {
            self.server.port = port;
        }
        if let Some(ref db_path) = cli.db_path {
            self.server.db_path = db_path.clone();
        }
        if let Some(ref upload_dir) = cli.upload_dir {
            self.server.upload_dir = upload_dir.clone();
        }
        if cli.dev_mode {
            self.server.dev_mode = true;
        }
    }

    /// Human-readable problems with the resolved configuration.
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.server.port == 0 {
            problems.push("server.port must be non-zero".to_string());
        }
        if self.search.default_limit == 0 {
            problems.push("search.default_limit must be at least 1".to_string());
        }
        if self.search.default_limit > self.search.max_limit {
            problems.push(format!(
                "search.default_limit ({}) exceeds search.max_limit ({})",
                self.search.default_limit, self.search.max_limit
            ));
        }
        if self.featured.per_kind == 0 {
            problems.push("featured.per_kind must be at least 1".to_string());
        }
        if self.auth.token_ttl_hours == 0 {
            problems.push("auth.token_ttl_hours must be at least 1".to_string());
        }
        problems
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }
}

/// Read the JWT secret. Missing or blank is a hard startup failure.
pub fn jwt_secret_from_env() -> Result<String> {
    let secret = std::env::var(JWT_SECRET_ENV)
        .with_context(|| format!("{} must be set to start the server", JWT_SECRET_ENV))?;
    if secret.trim().is_empty() {
        anyhow::bail!("{} must not be empty", JWT_SECRET_ENV);
    }
    Ok(secret)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = HubConfig::default();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.upload_dir, PathBuf::from("uploads"));
        assert_eq!(config.search.default_limit, 12);
        assert_eq!(config.featured.per_kind, 3);
        assert_eq!(config.featured.excerpt_chars, 150);
        assert!(!config.server.dev_mode);
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_parse_partial_file_keeps_defaults() -> Result<()> {
        let config = HubConfig::parse(
            r#"
            [server]
            port = 8080

            [featured]
            per_kind = 5
            "#,
        )?;
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.featured.per_kind, 5);
        assert_eq!(config.featured.excerpt_chars, 150);
        assert_eq!(config.auth.token_ttl_hours, 24);
        Ok(())
    }

    #[test]
    fn test_parse_rejects_bad_types() {
        assert!(HubConfig::parse("[server]\nport = \"abc\"").is_err());
    }

    #[test]
    fn test_env_overrides_file() -> Result<()> {
        let mut config = HubConfig::parse("[server]\nport = 8080")?;
        let env: HashMap<&str, &str> = [
            ("CREATORHUB_PORT", "9090"),
            ("CREATORHUB_UPLOAD_DIR", "/srv/uploads"),
        ]
        .into_iter()
        .collect();
        config.apply_env(|k| env.get(k).map(|v| v.to_string()))?;
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.upload_dir, PathBuf::from("/srv/uploads"));
        Ok(())
    }

    #[test]
    fn test_env_invalid_port_is_error() {
        let mut config = HubConfig::default();
        let result = config.apply_env(|k| (k == "CREATORHUB_PORT").then(|| "nope".to_string()));
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_overrides_env() -> Result<()> {
        let mut config = HubConfig::default();
        config.apply_env(|k| (k == "CREATORHUB_PORT").then(|| "9090".to_string()))?;
        config.apply_cli(&CliOverrides {
            port: Some(7070),
            dev_mode: true,
            ..Default::default()
        });
        assert_eq!(config.server.port, 7070);
        assert!(config.server.dev_mode);
        Ok(())
    }

    #[test]
    fn test_validate_reports_problems() {
        let mut config = HubConfig::default();
        config.server.port = 0;
        config.search.default_limit = 500;
        config.featured.per_kind = 0;
        let problems = config.validate();
        assert_eq!(problems.len(), 3);
        assert!(problems.iter().any(|p| p.contains("server.port")));
        assert!(problems.iter().any(|p| p.contains("max_limit")));
        assert!(problems.iter().any(|p| p.contains("per_kind")));
    }

    #[test]
    fn test_load_or_default_missing_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let config = HubConfig::load_or_default(&dir.path().join("absent.toml"))?;
        assert_eq!(config.server.port, 5000);
        Ok(())
    }

    #[test]
    fn test_to_toml_roundtrips() -> Result<()> {
        let mut config = HubConfig::default();
        config.server.port = 6001;
        let parsed = HubConfig::parse(&config.to_toml()?)?;
        assert_eq!(parsed.server.port, 6001);
        Ok(())
    }
}

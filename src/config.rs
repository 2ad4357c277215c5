//! Configuration for siteforge.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (SITEFORGE_*)
//! 2. Config file (.siteforge/config.yaml)
//! 3. Defaults
//!
//! Config file discovery:
//! - Searches the current directory and its parents, then the home
//!   directory, for .siteforge/config.yaml
//! - Credentials are environment-only; the config file never holds secrets

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::core::steps::{default_steps, BuildStep};

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub store: StoreSection,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub build: BuildConfig,
}

/// `store:` section of the config file. Credentials are deliberately
/// absent from this schema.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreSection {
    pub endpoint: Option<String>,
    pub region: Option<String>,
    pub bucket: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub path_style: Option<bool>,
}

/// HTTP server settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Port the HTTP service binds to.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    3001
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

/// Build pipeline settings.
#[derive(Debug, Clone, Deserialize)]
pub struct BuildConfig {
    /// Build output directory inside the project tree; doubles as the
    /// artifact sub-namespace in the bucket, so raw source and published
    /// output never overlap.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Concurrency cap for per-file uploads during publish.
    #[serde(default = "default_upload_concurrency")]
    pub upload_concurrency: usize,

    /// Ordered build steps, run fail-fast in the project directory.
    #[serde(default = "default_steps")]
    pub steps: Vec<BuildStep>,
}

fn default_output_dir() -> String {
    "build".to_string()
}

fn default_upload_concurrency() -> usize {
    8
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            upload_concurrency: default_upload_concurrency(),
            steps: default_steps(),
        }
    }
}

/// Resolved object-store settings, env overrides applied.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub endpoint: String,
    pub region: String,
    pub bucket: String,
    pub access_key: String,
    pub secret_key: String,
    pub timeout_seconds: u64,
    pub path_style: bool,
}

/// Fully resolved configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub store: StoreConfig,
    pub server: ServerConfig,
    pub build: BuildConfig,
    /// Path to the config file, when one was found.
    pub config_file: Option<PathBuf>,
}

impl Config {
    /// Load configuration from all sources.
    pub fn load() -> Result<Self> {
        let config_path = find_config_file();
        let file = match &config_path {
            Some(path) => Some(load_config_file(path)?),
            None => None,
        };
        Ok(resolve(file, config_path))
    }
}

/// Find a config file by searching the current directory and its parents,
/// then the home directory.
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(".siteforge").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    let home_config = dirs::home_dir()?.join(".siteforge").join("config.yaml");
    if home_config.exists() {
        return Some(home_config);
    }

    None
}

/// Load and parse a config file.
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Merge file values, environment overrides, and defaults.
fn resolve(file: Option<ConfigFile>, config_file: Option<PathBuf>) -> Config {
    let file = file.unwrap_or(ConfigFile {
        version: String::new(),
        store: StoreSection::default(),
        server: ServerConfig::default(),
        build: BuildConfig::default(),
    });

    let store = StoreConfig {
        endpoint: env_or("SITEFORGE_ENDPOINT", file.store.endpoint),
        region: env_or("SITEFORGE_REGION", file.store.region.or_else(|| Some("auto".to_string()))),
        bucket: env_or("SITEFORGE_BUCKET", file.store.bucket),
        access_key: env_or("SITEFORGE_ACCESS_KEY", None),
        secret_key: env_or("SITEFORGE_SECRET_KEY", None),
        timeout_seconds: file.store.timeout_seconds.unwrap_or(30),
        path_style: file.store.path_style.unwrap_or(true),
    };

    let mut server = file.server;
    if let Ok(port) = std::env::var("SITEFORGE_PORT") {
        if let Ok(port) = port.parse() {
            server.port = port;
        }
    }

    Config {
        store,
        server,
        build: file.build,
        config_file,
    }
}

/// Environment variable if set, else the file value, else empty.
fn env_or(var: &str, fallback: Option<String>) -> String {
    std::env::var(var)
        .ok()
        .or(fallback)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_config_file_parsing() {
        let temp = tempfile::TempDir::new().unwrap();
        let dir = temp.path().join(".siteforge");
        std::fs::create_dir_all(&dir).unwrap();

        let config_path = dir.join("config.yaml");
        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(
            file,
            r#"
version: "1.0"
store:
  endpoint: https://example.r2.cloudflarestorage.com
  bucket: sites
  timeout_seconds: 10
server:
  port: 8080
build:
  output_dir: dist
  upload_concurrency: 4
  steps:
    - name: build
      program: npm
      args: ["run", "build"]
"#
        )
        .unwrap();

        let parsed = load_config_file(&config_path).unwrap();
        assert_eq!(parsed.version, "1.0");
        assert_eq!(
            parsed.store.endpoint.as_deref(),
            Some("https://example.r2.cloudflarestorage.com")
        );
        assert_eq!(parsed.store.timeout_seconds, Some(10));
        assert_eq!(parsed.server.port, 8080);
        assert_eq!(parsed.build.output_dir, "dist");
        assert_eq!(parsed.build.upload_concurrency, 4);
        assert_eq!(parsed.build.steps.len(), 1);
        assert_eq!(parsed.build.steps[0].program, "npm");
    }

    #[test]
    fn test_build_defaults() {
        let build = BuildConfig::default();
        assert_eq!(build.output_dir, "build");
        assert_eq!(build.upload_concurrency, 8);
        assert_eq!(build.steps.len(), 3);
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let parsed: ConfigFile = serde_yaml::from_str("version: \"1.0\"\n").unwrap();
        assert_eq!(parsed.server.port, 3001);
        assert_eq!(parsed.build.output_dir, "build");
        assert!(parsed.store.endpoint.is_none());
    }
}

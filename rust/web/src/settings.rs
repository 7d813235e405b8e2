use crate::server::ServerConfig;
use clap::Args;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Names the TOML file to load when no `--config` flag is given.
pub const CONFIG_ENV: &str = "GANG_CONFIG";

/// Everything the server binary needs to start.
///
/// Resolved lowest to highest: defaults, TOML file, `GANG_*` environment
/// variables, then command-line flags.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppSettings {
    pub host: String,
    pub port: u16,
    pub static_dir: PathBuf,
    /// Fallback `EnvFilter` directive when `RUST_LOG` is unset.
    pub log_filter: String,
    /// Fixed shuffle seed; games are dealt from entropy when absent.
    pub seed: Option<u64>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3001,
            static_dir: PathBuf::from("static"),
            log_filter: "info,gang_web=debug".to_string(),
            seed: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    #[serde(default)]
    host: Option<String>,
    #[serde(default)]
    port: Option<u16>,
    #[serde(default)]
    static_dir: Option<PathBuf>,
    #[serde(default)]
    log_filter: Option<String>,
    #[serde(default)]
    seed: Option<u64>,
}

/// Command-line values, applied after every other layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Args)]
pub struct SettingsOverrides {
    /// Host to bind to
    #[arg(long)]
    pub host: Option<String>,
    /// Port to bind to
    #[arg(long, short)]
    pub port: Option<u16>,
    /// Directory holding the built client
    #[arg(long, short = 'd')]
    pub static_dir: Option<PathBuf>,
    /// Fixed shuffle seed for reproducible deals
    #[arg(long)]
    pub seed: Option<u64>,
}

impl AppSettings {
    /// Defaults, then the file at `path` (or `$GANG_CONFIG`), then the
    /// environment, then `overrides`. Only the final result is validated,
    /// so a later layer can repair a value an earlier one got wrong.
    pub fn load(path: Option<&Path>, overrides: &SettingsOverrides) -> Result<Self, SettingsError> {
        let mut settings = Self::default();

        let from_env = env_value(CONFIG_ENV).map(PathBuf::from);
        if let Some(path) = path.map(Path::to_path_buf).or(from_env) {
            settings.merge_file(&path)?;
        }
        settings.apply_env()?;
        settings.apply_overrides(overrides);
        settings.validate()?;
        Ok(settings)
    }

    fn merge_file(&mut self, path: &Path) -> Result<(), SettingsError> {
        let text = fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file: FileSettings = toml::from_str(&text)?;

        if let Some(host) = file.host {
            self.host = host;
        }
        if let Some(port) = file.port {
            self.port = port;
        }
        if let Some(dir) = file.static_dir {
            self.static_dir = dir;
        }
        if let Some(filter) = file.log_filter {
            self.log_filter = filter;
        }
        if let Some(seed) = file.seed {
            self.seed = Some(seed);
        }
        Ok(())
    }

    fn apply_env(&mut self) -> Result<(), SettingsError> {
        if let Some(host) = env_value("GANG_HOST") {
            self.host = host;
        }
        if let Some(port) = env_value("GANG_PORT") {
            self.port = port
                .parse()
                .map_err(|_| SettingsError::InvalidValue(format!("invalid GANG_PORT: {port}")))?;
        }
        if let Some(dir) = env_value("GANG_STATIC_DIR") {
            self.static_dir = PathBuf::from(dir);
        }
        if let Some(filter) = env_value("GANG_LOG") {
            self.log_filter = filter;
        }
        if let Some(seed) = env_value("GANG_SEED") {
            self.seed = Some(
                seed.parse()
                    .map_err(|_| SettingsError::InvalidValue(format!("invalid GANG_SEED: {seed}")))?,
            );
        }
        Ok(())
    }

    fn apply_overrides(&mut self, overrides: &SettingsOverrides) {
        if let Some(host) = &overrides.host {
            self.host = host.clone();
        }
        if let Some(port) = overrides.port {
            self.port = port;
        }
        if let Some(dir) = &overrides.static_dir {
            self.static_dir = dir.clone();
        }
        if let Some(seed) = overrides.seed {
            self.seed = Some(seed);
        }
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.host.trim().is_empty() {
            return Err(SettingsError::InvalidValue(
                "host cannot be empty".to_string(),
            ));
        }

        if self.static_dir.as_os_str().is_empty() {
            return Err(SettingsError::InvalidValue(
                "static_dir cannot be empty".to_string(),
            ));
        }

        Ok(())
    }

    pub fn server_config(&self) -> ServerConfig {
        ServerConfig::new(self.host.clone(), self.port, self.static_dir.clone()).with_seed(self.seed)
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to read settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid settings file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid settings value: {0}")]
    InvalidValue(String),
}

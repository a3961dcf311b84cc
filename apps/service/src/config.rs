use std::{env, fmt, fs, path};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read config file")]
    ReadFailed,
    #[error("failed to write config file")]
    WriteFailed,
    #[error("failed to parse config file")]
    ParseFailed,
    #[error("no usable config path ($XDG_CONFIG_HOME and $HOME unset)")]
    ConfigPathUnavailable,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub worker: WorkerConfig,
    pub storage: StorageConfig,
    pub limits: LimitsConfig,
    pub sms: SmsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Seconds between scheduler passes over all checks.
    pub interval_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root of the record store (one subdirectory per collection).
    pub data_dir: path::PathBuf,
    /// Directory holding the per-check audit log streams.
    pub log_dir: path::PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Maximum checks a single user may own.
    pub max_checks: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmsConfig {
    /// When false, alerts are written to the service log instead of sent.
    pub enabled: bool,
    pub account_sid: String,
    pub auth_token: String,
    pub from_phone: String,
    /// Prefix added to stored 10-digit numbers when dialing out.
    pub country_code: String,
}

/// Used to ensure we are actually reading a toml file
fn normalize_toml_path(path: &path::Path) -> path::PathBuf {
    let mut path = path.to_path_buf();
    if path.extension().map(|ext| ext != "toml").unwrap_or(true) {
        path.set_extension("toml");
    }
    path
}

/// Get default config path ($XDG_CONFIG_HOME/upwatch/config.toml or
/// $HOME/.config/...)
fn default_config_path() -> Result<path::PathBuf, Error> {
    let path = if let Ok(config_home) = env::var("XDG_CONFIG_HOME") {
        path::PathBuf::from(config_home)
    } else if let Some(home_dir) = env::home_dir() {
        home_dir.join(".config")
    } else {
        return Err(Error::ConfigPathUnavailable);
    };

    Ok(path.join("upwatch/config.toml"))
}

impl Default for Config {
    fn default() -> Self {
        Self {
            worker: WorkerConfig { interval_seconds: 60 },
            storage: StorageConfig {
                data_dir: ".data".into(),
                log_dir: ".logs".into(),
            },
            limits: LimitsConfig { max_checks: 5 },
            sms: SmsConfig {
                enabled: false,
                account_sid: String::new(),
                auth_token: String::new(),
                from_phone: String::new(),
                country_code: "+1".into(),
            },
        }
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Current Internal Configuration State:")?;
        writeln!(f, "  Worker")?;
        writeln!(f, "    Interval: {}s", self.worker.interval_seconds)?;
        writeln!(f, "  Storage")?;
        writeln!(f, "    Data Dir: {}", self.storage.data_dir.display())?;
        writeln!(f, "    Log Dir: {}", self.storage.log_dir.display())?;
        writeln!(f, "  Limits")?;
        writeln!(f, "    Max Checks per User: {}", self.limits.max_checks)?;
        writeln!(f, "  SMS")?;
        writeln!(f, "    Enabled: {}", self.sms.enabled)?;
        writeln!(f, "    From: {}", self.sms.from_phone)?;
        writeln!(f, "    Country Code: {}", self.sms.country_code)?;
        Ok(())
    }
}

impl Config {
    /// Generate Config structure from file
    ///
    /// Creates a default config in ~/.config/upwatch/config.toml
    ///  or the specified path, with the name config.toml if one does not exist
    pub fn from_config(optional_path: Option<impl AsRef<path::Path>>) -> Result<Self, Error> {
        let config_path: path::PathBuf = if let Some(path) = optional_path {
            normalize_toml_path(path.as_ref())
        } else {
            default_config_path()?
        };

        if config_path.exists() {
            let raw_string = fs::read_to_string(&config_path).map_err(|_err| Error::ReadFailed)?;
            toml::from_str(raw_string.as_str()).map_err(|_err| Error::ParseFailed)
        } else {
            let config = Self::default();
            config.write_config(&config_path)?;
            Ok(config)
        }
    }

    /// Serialize and write a config to a file
    pub fn write_config(&self, path: &std::path::Path) -> Result<(), Error> {
        let config_str: String =
            toml::to_string_pretty(self).map_err(|_err| Error::ParseFailed)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|_err| Error::WriteFailed)?;
        }

        std::fs::write(path, config_str).map_err(|_err| Error::WriteFailed)
    }
}

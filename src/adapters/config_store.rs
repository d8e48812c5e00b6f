//! Configuration source.
//!
//! Implements [`ConfigPort`].  On the host an optional JSON file (path
//! from `FIRENODE_CONFIG`) overrides the defaults; on the device the
//! compiled-in defaults are used.  Either way the result is validated
//! before it is returned.

use log::info;

use crate::app::ports::{ConfigError, ConfigPort};
use crate::config::SystemConfig;

/// Environment variable naming the host JSON config file.
pub const CONFIG_ENV: &str = "FIRENODE_CONFIG";

pub struct ConfigStore {
    #[cfg_attr(target_os = "espidf", allow(dead_code))]
    path: Option<std::path::PathBuf>,
}

impl ConfigStore {
    /// Defaults only.
    pub fn builtin() -> Self {
        Self { path: None }
    }

    /// Read from `path` when it exists (host only).
    pub fn at(path: impl Into<std::path::PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// Path from [`CONFIG_ENV`], defaults when unset.
    pub fn from_env() -> Self {
        match std::env::var_os(CONFIG_ENV) {
            Some(p) => Self::at(p),
            None => Self::builtin(),
        }
    }

    /// Parse and validate a JSON document.
    pub fn parse(json: &[u8]) -> Result<SystemConfig, ConfigError> {
        let cfg: SystemConfig = serde_json::from_slice(json).map_err(|_| ConfigError::Corrupted)?;
        cfg.validate()?;
        Ok(cfg)
    }
}

impl ConfigPort for ConfigStore {
    #[cfg(not(target_os = "espidf"))]
    fn load(&self) -> Result<SystemConfig, ConfigError> {
        let Some(path) = &self.path else {
            let cfg = SystemConfig::default();
            cfg.validate()?;
            return Ok(cfg);
        };
        let bytes = std::fs::read(path).map_err(|_| ConfigError::IoError)?;
        let cfg = Self::parse(&bytes)?;
        info!("Config: loaded {}", path.display());
        Ok(cfg)
    }

    #[cfg(target_os = "espidf")]
    fn load(&self) -> Result<SystemConfig, ConfigError> {
        let cfg = SystemConfig::default();
        cfg.validate()?;
        info!("Config: built-in defaults");
        Ok(cfg)
    }
}

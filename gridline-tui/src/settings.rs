//! Application settings, loaded from `config.json`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use gridline::{ConfigError, TableConfig};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Terminal columns below which the tenants table switches to cards.
pub const TERMINAL_BREAKPOINT: u16 = 100;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid settings JSON in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Table(#[from] ConfigError),

    #[error("invalid value for '{0}': must be greater than zero")]
    Zero(&'static str),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub table: TableConfig,
    /// Rows per page requested from the tenant service.
    pub page_size: u32,
    /// Simulated server latency.
    pub latency_ms: u64,
    /// Number of generated tenants.
    pub tenants: usize,
    /// Where CSV exports and printouts are written.
    pub output_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            table: TableConfig::default().breakpoint(TERMINAL_BREAKPOINT),
            page_size: 10,
            latency_ms: 350,
            tenants: 47,
            output_dir: PathBuf::from("."),
        }
    }
}

impl Settings {
    /// Load settings from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let json = match fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::info!("no settings at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(SettingsError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        let settings: Self = serde_json::from_str(&json).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        settings.validate()?;
        log::info!("settings loaded from {}", path.display());
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        self.table.validate()?;
        if self.page_size == 0 {
            return Err(SettingsError::Zero("page_size"));
        }
        Ok(())
    }
}

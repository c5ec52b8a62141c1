//! Configuration for the Microflow host
//!
//! This module contains the configuration type and its environment loading.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::error::{HostError, HostResult};
use microflow_core::{EngineSettings, DEFAULT_MAX_PAGE_SIZE, DEFAULT_PAGE_SIZE};

/// Host configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostConfig {
    /// YAML file or directory of workflow definitions loaded at start-up
    #[serde(default)]
    pub definitions_path: Option<PathBuf>,

    /// Page size used when a request names none
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,

    /// Largest page size a request may ask for
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u32,

    /// Log filter used when RUST_LOG is not set
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn default_max_page_size() -> u32 {
    DEFAULT_MAX_PAGE_SIZE
}

fn default_log_filter() -> String {
    "info,microflow=debug".to_string()
}

impl HostConfig {
    /// Load configuration from environment variables
    pub fn load() -> HostResult<Self> {
        let config = Self::from_vars(|name| env::var(name).ok())?;
        info!(
            definitions_path = ?config.definitions_path,
            default_page_size = config.default_page_size,
            max_page_size = config.max_page_size,
            "Loaded host configuration"
        );
        Ok(config)
    }

    /// Log filter from the environment, available before the rest of the
    /// configuration is loaded
    pub fn log_filter_from_env() -> String {
        Self::log_filter_from(|name| env::var(name).ok())
    }

    /// Log filter from an arbitrary variable source
    pub fn log_filter_from<F>(var: F) -> String
    where
        F: Fn(&str) -> Option<String>,
    {
        var("LOG_FILTER").unwrap_or_else(default_log_filter)
    }

    /// Build a configuration from an arbitrary variable source
    pub fn from_vars<F>(var: F) -> HostResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Start with defaults
        let mut config = Self::default();

        if let Some(path) = var("MICROFLOW_DEFINITIONS_PATH") {
            if !path.trim().is_empty() {
                config.definitions_path = Some(PathBuf::from(path));
            }
        }

        if let Some(size) = var("MICROFLOW_DEFAULT_PAGE_SIZE") {
            match size.parse::<u32>() {
                Ok(size) => config.default_page_size = size,
                Err(_) => warn!("Invalid MICROFLOW_DEFAULT_PAGE_SIZE value: {}", size),
            }
        }

        if let Some(size) = var("MICROFLOW_MAX_PAGE_SIZE") {
            match size.parse::<u32>() {
                Ok(size) => config.max_page_size = size,
                Err(_) => warn!("Invalid MICROFLOW_MAX_PAGE_SIZE value: {}", size),
            }
        }

        config.log_filter = Self::log_filter_from(&var);

        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> HostResult<()> {
        if self.default_page_size == 0 {
            return Err(HostError::ConfigError(
                "Default page size must be at least 1".to_string(),
            ));
        }

        if self.default_page_size > self.max_page_size {
            return Err(HostError::ConfigError(format!(
                "Default page size {} exceeds the maximum of {}",
                self.default_page_size, self.max_page_size
            )));
        }

        Ok(())
    }

    /// Paging limits for the engine
    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            default_page_size: self.default_page_size,
            max_page_size: self.max_page_size,
        }
    }
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            definitions_path: None,
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            log_filter: default_log_filter(),
        }
    }
}

// file: src/config/loader.rs
// version: 2.0.0
// guid: d4e5f6a7-b8c9-4012-8345-6789a0bcdef1

//! Configuration file loading and environment variable substitution

use super::BootstrapConfig;
use crate::error::{Result, SetupError};
use regex::Regex;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Configuration loader with environment variable substitution
pub struct ConfigLoader {
    env_vars: HashMap<String, String>,
}

impl ConfigLoader {
    /// Create a new config loader
    pub fn new() -> Self {
        Self {
            env_vars: std::env::vars().collect(),
        }
    }

    /// Load the bootstrap configuration, falling back to defaults when no file is given
    pub fn load_or_default<P: AsRef<Path>>(&self, path: Option<P>) -> Result<BootstrapConfig> {
        match path {
            Some(path) => self.load(path),
            None => Ok(BootstrapConfig::default()),
        }
    }

    /// Load bootstrap configuration from a YAML file
    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<BootstrapConfig> {
        let content = fs::read_to_string(&path).map_err(|e| {
            SetupError::config(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        debug!("Loaded config file {}", path.as_ref().display());
        self.parse(&content)
    }

    /// Parse YAML content into a validated configuration
    pub fn parse(&self, content: &str) -> Result<BootstrapConfig> {
        let expanded = self.expand_env_vars(content)?;
        // An empty document deserializes to null, which serde_yaml refuses for a struct
        let config: BootstrapConfig = if expanded.trim().is_empty() {
            BootstrapConfig::default()
        } else {
            serde_yaml::from_str(&expanded)?
        };

        config.validate()?;

        Ok(config)
    }

    /// Expand `${VAR}` references in configuration content
    fn expand_env_vars(&self, content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}")
            .map_err(|e| SetupError::config(format!("Invalid regex pattern: {}", e)))?;

        let mut result = content.to_string();
        let mut missing_vars = Vec::new();

        for cap in re.captures_iter(content) {
            let var_name = &cap[1];
            let placeholder = &cap[0];

            if let Some(value) = self.env_vars.get(var_name) {
                result = result.replace(placeholder, value);
            } else if !missing_vars.iter().any(|v| v == var_name) {
                missing_vars.push(var_name.to_string());
            }
        }

        if !missing_vars.is_empty() {
            return Err(SetupError::config(format!(
                "Missing environment variables: {}",
                missing_vars.join(", ")
            )));
        }

        Ok(result)
    }

    /// Set environment variable for substitution
    pub fn set_env_var(&mut self, key: String, value: String) {
        self.env_vars.insert(key, value);
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

//! TOML configuration for the command-line tool.
//!
//! ```toml
//! [engine]
//! default_tax_year = 2025
//!
//! [rates]
//! brackets = "rate_tables.csv"   # relative to this file
//! ```
//!
//! Both sections are optional. Command-line flags win over the file.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use malta_tax_core::EngineConfig;
use serde::Deserialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    pub engine: EngineConfig,
    pub rates: RatesConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RatesConfig {
    /// CSV file of income tax tables merged over the built-in schedules.
    pub brackets: Option<PathBuf>,
}

impl CliConfig {
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("Invalid configuration")
    }

    /// Reads a configuration file. A relative `brackets` path is resolved
    /// against the file's directory.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let mut config = Self::from_toml(&text)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;

        if let (Some(brackets), Some(dir)) = (&config.rates.brackets, path.parent()) {
            if brackets.is_relative() {
                config.rates.brackets = Some(dir.join(brackets));
            }
        }
        Ok(config)
    }

    pub fn with_brackets(
        mut self,
        brackets: Option<PathBuf>,
    ) -> Self {
        if brackets.is_some() {
            self.rates.brackets = brackets;
        }
        self
    }
}

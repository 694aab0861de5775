//! Optional TOML configuration file.
//!
//! ```toml
//! err = "err"          # required error variable name, "" for any
//! ignore = "vendor"    # skip paths matching this regex, "" for none
//! error_type = "error" # result type marking error-returning functions
//! ```
//!
//! Command-line flags override file values, which override the defaults.

use crate::domain::config::{Config, DEFAULT_ERROR_TYPE};
use anyhow::{Context, Result};
use regex::Regex;
use serde::Deserialize;
use std::fs;
use std::path::Path;

pub const DEFAULT_IGNORE: &str = "vendor";

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub err: Option<String>,
    pub ignore: Option<String>,
    pub error_type: Option<String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("Invalid config {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }
}

/// Values given on the command line; `None` when the flag was not passed.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub err: Option<String>,
    pub ignore: Option<String>,
    pub error_type: Option<String>,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub err: String,
    pub ignore: String,
    pub error_type: String,
}

impl Settings {
    pub fn resolve(flags: Overrides, file: FileConfig) -> Self {
        Self {
            err: flags.err.or(file.err).unwrap_or_default(),
            ignore: flags
                .ignore
                .or(file.ignore)
                .unwrap_or_else(|| DEFAULT_IGNORE.to_string()),
            error_type: flags
                .error_type
                .or(file.error_type)
                .unwrap_or_else(|| DEFAULT_ERROR_TYPE.to_string()),
        }
    }

    /// Compiled ignore pattern; an empty pattern disables filtering.
    pub fn ignore_regex(&self) -> Result<Option<Regex>> {
        if self.ignore.is_empty() {
            return Ok(None);
        }
        let rx = Regex::new(&self.ignore)
            .with_context(|| format!("Invalid ignore pattern {:?}", self.ignore))?;
        Ok(Some(rx))
    }

    pub fn config(&self, list: bool, rewrite: bool) -> Config {
        Config {
            list,
            rewrite,
            err_type_name: self.error_type.clone(),
            ..Config::default()
        }
        .with_err_var_name(&self.err)
    }
}

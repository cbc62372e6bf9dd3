//! Reading rule files.
//!
//! Both entry points share one parse-then-validate path; the only
//! difference is the [`Origin`] attached to a failure.

use crate::config::schema::{RuleConfig, ValidationError};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Where rule text came from, for error messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    Inline,
    File(PathBuf),
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Inline => f.write_str("<inline>"),
            Origin::File(path) => write!(f, "{}", path.display()),
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read rule file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed rule file {origin}: {source}")]
    Toml {
        origin: Origin,
        #[source]
        source: toml_edit::de::Error,
    },

    #[error("rejected rule file {origin}: {source}")]
    Invalid {
        origin: Origin,
        #[source]
        source: ValidationError,
    },
}

impl ConfigError {
    pub fn origin(&self) -> Origin {
        match self {
            ConfigError::Io { path, .. } => Origin::File(path.clone()),
            ConfigError::Toml { origin, .. } | ConfigError::Invalid { origin, .. } => {
                origin.clone()
            }
        }
    }
}

/// Parse and validate rule-file TOML held in memory.
pub fn load_from_str(input: &str) -> Result<RuleConfig, ConfigError> {
    parse(input, Origin::Inline)
}

/// Read, parse and validate the rule file at `path`.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RuleConfig, ConfigError> {
    let path = path.as_ref();
    let input = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    parse(&input, Origin::File(path.to_path_buf()))
}

fn parse(input: &str, origin: Origin) -> Result<RuleConfig, ConfigError> {
    let config: RuleConfig = match toml_edit::de::from_str(input) {
        Ok(config) => config,
        Err(source) => return Err(ConfigError::Toml { origin, source }),
    };

    match config.validate() {
        Ok(()) => Ok(config),
        Err(source) => Err(ConfigError::Invalid { origin, source }),
    }
}

//! Configuration: credentials, region, and per-domain knowledge base ids.
//!
//! Layered like a typical CLI tool: a TOML file at
//! `~/.config/courtside/config.toml` (or `$COURTSIDE_CONFIG`), with
//! environment variables overriding individual values. Credentials may be
//! absent — that is a user-visible condition, not a crash.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::Domain;

pub const DEFAULT_REGION: &str = "us-east-1";

const CONFIG_PATH_VAR: &str = "COURTSIDE_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("could not parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error(
        "no credentials configured; set access_key_id and secret_access_key \
         under [aws] in the config file, or export AWS_ACCESS_KEY_ID and \
         AWS_SECRET_ACCESS_KEY"
    )]
    MissingCredentials,
}

/// Credential material for signing requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AwsConfig {
    pub access_key_id: String,
    pub secret_access_key: String,
    #[serde(default = "default_region")]
    pub region: String,
}

fn default_region() -> String {
    DEFAULT_REGION.to_string()
}

/// Per-domain overrides; defaults come from [`Domain`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DomainOverride {
    #[serde(default)]
    pub knowledge_base_id: Option<String>,
    #[serde(default)]
    pub model_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DomainSettings {
    #[serde(default)]
    pub rulebook: DomainOverride,
    #[serde(default)]
    pub compensation: DomainOverride,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub aws: Option<AwsConfig>,
    #[serde(default)]
    pub domains: DomainSettings,
}

impl Config {
    /// Load from the default path (or `$COURTSIDE_CONFIG`), then apply
    /// environment overrides. A missing file is an empty config, not an
    /// error.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var(CONFIG_PATH_VAR)
            .map(PathBuf::from)
            .ok()
            .or_else(Self::default_path);

        let mut config = match path {
            Some(ref path) if path.exists() => Self::load_from(path)?,
            _ => Self::default(),
        };
        config.apply_env();
        Ok(config)
    }

    /// Parse a specific TOML file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("courtside").join("config.toml"))
    }

    /// Environment variables override file values; credentials from the
    /// environment are only used when both halves of the key pair are set.
    pub fn apply_env(&mut self) {
        if let (Ok(access_key_id), Ok(secret_access_key)) = (
            std::env::var("AWS_ACCESS_KEY_ID"),
            std::env::var("AWS_SECRET_ACCESS_KEY"),
        ) {
            let region = std::env::var("AWS_REGION")
                .ok()
                .or_else(|| self.aws.as_ref().map(|aws| aws.region.clone()))
                .unwrap_or_else(default_region);
            self.aws = Some(AwsConfig {
                access_key_id,
                secret_access_key,
                region,
            });
        } else if let (Some(aws), Ok(region)) = (self.aws.as_mut(), std::env::var("AWS_REGION")) {
            aws.region = region;
        }

        if let Ok(id) = std::env::var("COURTSIDE_RULEBOOK_KB") {
            self.domains.rulebook.knowledge_base_id = Some(id);
        }
        if let Ok(id) = std::env::var("COURTSIDE_COMPENSATION_KB") {
            self.domains.compensation.knowledge_base_id = Some(id);
        }
    }

    /// Credentials, or a message explaining how to configure them.
    pub fn credentials(&self) -> Result<&AwsConfig, ConfigError> {
        self.aws.as_ref().ok_or(ConfigError::MissingCredentials)
    }

    fn overrides(&self, domain: Domain) -> &DomainOverride {
        match domain {
            Domain::Rulebook => &self.domains.rulebook,
            Domain::Compensation => &self.domains.compensation,
        }
    }

    /// Knowledge base id for a domain: config override or compiled default.
    pub fn knowledge_base_id(&self, domain: Domain) -> &str {
        self.overrides(domain)
            .knowledge_base_id
            .as_deref()
            .unwrap_or_else(|| domain.default_knowledge_base_id())
    }

    /// Model (inference profile) id for a domain.
    pub fn model_id(&self, domain: Domain) -> &str {
        self.overrides(domain)
            .model_id
            .as_deref()
            .unwrap_or_else(|| domain.default_model_id())
    }
}

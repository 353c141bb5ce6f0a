// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Destination configuration.
//!
//! A destination is loaded from an optional JSON file and then overridden by
//! environment variables (`PROTEUS_URL`, `PROTEUS_USER`, `PROTEUS_PASSWORD`,
//! `PROTEUS_TENANT`, `PROTEUS_TIMEOUT_SECS`), so credentials can stay out of
//! files entirely.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const ENV_URL: &str = "PROTEUS_URL";
pub const ENV_USER: &str = "PROTEUS_USER";
pub const ENV_PASSWORD: &str = "PROTEUS_PASSWORD";
pub const ENV_TENANT: &str = "PROTEUS_TENANT";
pub const ENV_TIMEOUT_SECS: &str = "PROTEUS_TIMEOUT_SECS";

/// One remote repository destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    base_url: String,
    username: String,
    password: String,
    tenant: Option<String>,
    timeout_secs: u64,
}

impl Config {
    /// Builds a destination directly, for embedding the library. The loader
    /// below is the CLI path.
    pub fn new(
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            username: username.into(),
            password: password.into(),
            tenant: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn with_tenant(mut self, tenant: impl Into<String>) -> Self {
        self.tenant = Some(tenant.into());
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn tenant(&self) -> Option<&str> {
        self.tenant.as_deref()
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }

    /// Loads the destination from an optional file, then applies environment
    /// overrides. Missing required fields after both passes are an error.
    pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
        let mut file: FileConfig = match path {
            Some(path) => read_file(path)?,
            None => FileConfig::default(),
        };

        if let Ok(url) = std::env::var(ENV_URL) {
            file.url = Some(url);
        }
        if let Ok(user) = std::env::var(ENV_USER) {
            file.user = Some(user);
        }
        if let Ok(password) = std::env::var(ENV_PASSWORD) {
            file.password = Some(password);
        }
        if let Ok(tenant) = std::env::var(ENV_TENANT) {
            file.tenant = Some(tenant);
        }
        if let Ok(raw) = std::env::var(ENV_TIMEOUT_SECS) {
            let parsed = raw.parse().map_err(|_| ConfigError::InvalidValue {
                field: "timeout_secs",
                value: raw,
            })?;
            file.timeout_secs = Some(parsed);
        }

        file.into_config()
    }

}

#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    url: Option<String>,
    user: Option<String>,
    password: Option<String>,
    tenant: Option<String>,
    timeout_secs: Option<u64>,
}

impl FileConfig {
    fn into_config(self) -> Result<Config, ConfigError> {
        let base_url = self
            .url
            .ok_or(ConfigError::Missing { field: "url" })?;
        let username = self
            .user
            .ok_or(ConfigError::Missing { field: "user" })?;
        let password = self
            .password
            .ok_or(ConfigError::Missing { field: "password" })?;
        Ok(Config {
            base_url,
            username,
            password,
            tenant: self.tenant,
            timeout_secs: self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
        })
    }
}

fn read_file(path: &Path) -> Result<FileConfig, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: io::Error,
    },
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    Missing {
        field: &'static str,
    },
    InvalidValue {
        field: &'static str,
        value: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "cannot read config {}: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "cannot parse config {}: {source}", path.display())
            }
            Self::Missing { field } => {
                write!(f, "missing destination field '{field}' (file or environment)")
            }
            Self::InvalidValue { field, value } => {
                write!(f, "invalid value '{value}' for destination field '{field}'")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            _ => None,
        }
    }
}

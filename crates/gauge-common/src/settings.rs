// RunnerSettings: runner configuration resolved from the launch environment.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::constants::{self, variables};

/// Settings the host provides when it launches the runner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunnerSettings {
    /// Address of the host's message endpoint.
    pub host: String,

    /// Port of the host's message endpoint.
    pub port: u16,

    /// Root directory of the project under test, if the host supplied one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_root: Option<PathBuf>,
}

impl RunnerSettings {
    /// Resolve settings from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolve settings through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let port = read(variables::INTERNAL_PORT)
            .with_context(|| format!("Environment variable {} is not set", variables::INTERNAL_PORT))?;
        let port = port.parse::<u16>().with_context(|| {
            format!(
                "Environment variable {} is not a valid port: '{}'",
                variables::INTERNAL_PORT,
                port
            )
        })?;

        let host = read(variables::RUNNER_HOST).unwrap_or_else(|| constants::DEFAULT_HOST.to_string());
        let project_root = read(variables::PROJECT_ROOT).map(PathBuf::from);

        Ok(Self {
            host,
            port,
            project_root,
        })
    }
}

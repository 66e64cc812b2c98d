//! Code for the configuration of the application.

use std::{path::Path, time::Duration};

use anyhow::{bail, Result};
use octoprint::Client;
use serde::{Deserialize, Serialize};

/// OctoPrint forgets an authorization request that is not polled for this
/// long.
const STALE_REQUEST_AFTER: Duration = Duration::from_secs(5);

/// The configuration of the application.
#[derive(Default, Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// The OctoPrint instance to talk to.
    #[serde(default)]
    pub server: ServerConfig,

    /// Settings for the `authorize` command.
    #[serde(default)]
    pub authorization: AuthorizationConfig,
}

impl Config {
    /// Parse a configuration from a toml file.
    pub fn from_file(file: &Path) -> Result<Self> {
        let config = std::fs::read_to_string(file)?;
        Self::from_str(&config)
    }

    /// Parse a configuration from a toml string.
    pub fn from_str(config: &str) -> Result<Self> {
        let config: Self = toml::from_str(config)?;
        config.authorization.validate()?;
        Ok(config)
    }

    /// Build a client for the configured server.
    pub fn client(&self) -> Result<Client> {
        if self.server.url.is_empty() {
            bail!("no OctoPrint url configured; set `server.url` or pass --url");
        }

        let client = Client::new(&self.server.url)?;
        Ok(match &self.server.api_key {
            Some(api_key) => client.with_api_key(api_key),
            None => client,
        })
    }
}

/// The OctoPrint instance to talk to.
#[derive(Default, Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Base url, e.g. `http://octopi.local/`.
    #[serde(default)]
    pub url: String,

    /// Api key sent as `X-Api-Key`.
    pub api_key: Option<String>,
}

/// Settings for the `authorize` command.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthorizationConfig {
    /// Application identifier shown to the user.
    pub app: String,

    /// Restrict the request to this user.
    pub user: Option<String>,

    /// Seconds between polls.
    pub poll_interval_secs: u64,

    /// Give up after this many seconds without a decision.
    pub timeout_secs: u64,
}

impl Default for AuthorizationConfig {
    fn default() -> Self {
        Self {
            app: "octoprint-cli".to_owned(),
            user: None,
            poll_interval_secs: 1,
            timeout_secs: 300,
        }
    }
}

impl AuthorizationConfig {
    /// Time between polls.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Time to wait for a decision.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    fn validate(&self) -> Result<()> {
        if self.poll_interval_secs == 0 || self.poll_interval() >= STALE_REQUEST_AFTER {
            bail!(
                "authorization.poll_interval_secs must be between 1 and {}, got {}",
                STALE_REQUEST_AFTER.as_secs() - 1,
                self.poll_interval_secs
            );
        }
        if self.timeout_secs == 0 {
            bail!("authorization.timeout_secs must be positive");
        }
        Ok(())
    }
}

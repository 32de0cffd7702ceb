//! Configuration for the frontend server and its upstream

use serde::{Deserialize, Serialize};
use std::time::Duration;
use log::debug;

pub const DEFAULT_API_URL: &str = "http://localhost:5000";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;

/// Deployment mode, controls whether fault details reach the browser
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode
{   Development
  , Production
}

impl Mode
{   /// Anything other than "production" runs as development
    pub fn parse(raw: &str) -> Self
    {   if raw.trim().eq_ignore_ascii_case("production")
        {   Mode::Production
        } else
        {   Mode::Development
        }
    }

    pub fn exposes_details(&self) -> bool
    {   *self != Mode::Production
    }
}

/// Frontend configuration, built once at startup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrontendConfig
{   /// Prediction API base URL
    pub api_url: String
  , /// Listen address
    pub host: String
  , /// Listen port
    pub port: u16
  , /// Development or production
    pub mode: Mode
  , /// Timeout for prediction and dataset calls, in seconds
    pub predict_timeout_secs: u64
  , /// Timeout for upstream health checks, in seconds
    pub health_timeout_secs: u64
}

impl Default for FrontendConfig
{   fn default() -> Self
    {   FrontendConfig
        {   api_url: DEFAULT_API_URL.to_string()
          , host: DEFAULT_HOST.to_string()
          , port: DEFAULT_PORT
          , mode: Mode::Development
          , predict_timeout_secs: 10
          , health_timeout_secs: 5
        }
    }
}

impl FrontendConfig
{   /// Read `API_URL`, `HOST`, `PORT` and `APP_ENV` from the process
    /// environment. `NODE_ENV` stands in when `APP_ENV` is unset.
    pub fn from_env() -> Result<Self, crate::error::Error>
    {   Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset or blank keys keep
    /// their defaults
    pub fn from_lookup<F>(lookup: F)
      -> Result<Self, crate::error::Error>
    where F: Fn(&str) -> Option<String>
    {   let get = |key: &str| lookup(key)
          .map(|v| v.trim().to_string())
          .filter(|v| !v.is_empty());

        let mut config = FrontendConfig::default();

        if let Some(url) = get("API_URL")
        {   config.api_url = url.trim_end_matches('/').to_string();
        }
        if let Some(host) = get("HOST")
        {   config.host = host;
        }
        if let Some(port) = get("PORT")
        {   config.port = port.parse().map_err(|_| {
              crate::error::Error::InvalidConfiguration(
                format!("PORT must be a port number, got {:?}", port)
              )
            })?;
        }
        if let Some(mode) = get("APP_ENV").or_else(|| get("NODE_ENV"))
        {   config.mode = Mode::parse(&mode);
        }

        debug!("Loaded frontend config: {:?}", config);
        Ok(config)
    }

    pub fn predict_timeout(&self) -> Duration
    {   Duration::from_secs(self.predict_timeout_secs)
    }

    pub fn health_timeout(&self) -> Duration
    {   Duration::from_secs(self.health_timeout_secs)
    }

    pub fn bind_address(&self) -> String
    {   format!("{}:{}", self.host, self.port)
    }
}

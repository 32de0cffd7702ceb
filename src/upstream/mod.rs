//! Upstream prediction API access

pub mod http;

// Re-export for convenience
pub use http::HttpUpstream;

use std::time::Duration;
use async_trait::async_trait;
use serde_json::Value;

pub const PREDICT_PATH: &str = "/api/predict";
pub const HEALTH_PATH: &str = "/api/health";
pub const DATASET_PATH: &str = "/api/best-worst-wines";

/// Any HTTP answer from the upstream, whatever its status
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamResponse
{   pub status: u16
  , /// Parsed JSON, or the raw text as a JSON string
    pub body: Value
}

impl UpstreamResponse
{   pub fn is_success(&self) -> bool
    {   (200..300).contains(&self.status)
    }
}

/// One-shot HTTP calls against the prediction API.
///
/// `Ok` means a response arrived (any status); `Err` means none did.
/// Implementations never retry.
#[async_trait]
pub trait Upstream: Send + Sync
{   async fn post_json(
      &self
    , path: &str
    , payload: &Value
    , timeout: Duration
    ) -> Result<UpstreamResponse, crate::error::Error>;

    async fn get_json(
      &self
    , path: &str
    , timeout: Duration
    ) -> Result<UpstreamResponse, crate::error::Error>;
}

/// JSON if it parses, otherwise the text itself
pub fn decode_body(text: &str) -> Value
{   serde_json::from_str(text)
      .unwrap_or_else(|_| Value::String(text.to_string()))
}

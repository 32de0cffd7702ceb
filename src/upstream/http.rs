use std::time::Duration;
use async_trait::async_trait;
use log::{debug, trace, error};
use serde_json::Value;

use super::{decode_body, Upstream, UpstreamResponse};

/// reqwest-backed upstream bound to one base URL
#[derive(Debug, Clone)]
pub struct HttpUpstream
{   base_url: String
  , http_client: reqwest::Client
}

impl HttpUpstream
{   pub fn new(base_url: &str) -> Self
    {   debug!("Creating HttpUpstream for {}", base_url);
        HttpUpstream
        {   base_url: base_url.trim_end_matches('/').to_string()
          , http_client: reqwest::Client::new()
        }
    }

    fn url(&self, path: &str) -> String
    {   format!("{}{}", self.base_url, path)
    }

    async fn read(
      &self
    , response: reqwest::Response
    ) -> Result<UpstreamResponse, crate::error::Error>
    {   let status = response.status().as_u16();
        trace!("Upstream response status: {}", status);

        let text = response.text().await.map_err(|e| {
          error!("Failed to read upstream body: {}", e);
          crate::error::Error::from(e)
        })?;

        Ok(UpstreamResponse
        {   status
          , body: decode_body(&text)
        })
    }
}

#[async_trait]
impl Upstream for HttpUpstream
{   async fn post_json(
      &self
    , path: &str
    , payload: &Value
    , timeout: Duration
    ) -> Result<UpstreamResponse, crate::error::Error>
    {   let url = self.url(path);
        debug!("POST {} (timeout {:?})", url, timeout);
        trace!("Upstream payload: {}", payload);

        let response = self.http_client
          .post(&url)
          .header("Content-Type", "application/json")
          .json(payload)
          .timeout(timeout)
          .send()
          .await
          .map_err(|e| {
            error!("HTTP error calling {}: {}", url, e);
            crate::error::Error::from(e)
          })?;

        self.read(response).await
    }

    async fn get_json(
      &self
    , path: &str
    , timeout: Duration
    ) -> Result<UpstreamResponse, crate::error::Error>
    {   let url = self.url(path);
        debug!("GET {} (timeout {:?})", url, timeout);

        let response = self.http_client
          .get(&url)
          .timeout(timeout)
          .send()
          .await
          .map_err(|e| {
            error!("HTTP error calling {}: {}", url, e);
            crate::error::Error::from(e)
          })?;

        self.read(response).await
    }
}

//! Mediation between form/JSON callers and the prediction API

use std::sync::Arc;
use std::time::Duration;
use log::{debug, error, info, warn};
use serde_json::Value;

use crate::request::{
  HealthReport, MediationOutcome, PredictionResult, WineSample
, UNAVAILABLE_MESSAGE, UPSTREAM_ERROR_MESSAGE
};
use crate::upstream::{
  Upstream, UpstreamResponse, DATASET_PATH, HEALTH_PATH, PREDICT_PATH
};

/// Sorts one upstream call into the three outcomes
pub fn classify(
  reply: Result<UpstreamResponse, crate::error::Error>
) -> MediationOutcome
{   match reply
    {   Ok(response) if response.is_success() => {
          MediationOutcome::Success(PredictionResult
          {   status: response.status
            , body: response.body
          })
        }
      , Ok(response) => {
          let message = response.body
            .get("error")
            .and_then(Value::as_str)
            .filter(|message| !message.is_empty())
            .unwrap_or(UPSTREAM_ERROR_MESSAGE)
            .to_string();
          MediationOutcome::UpstreamError
          {   status: response.status
            , message
            , body: response.body
          }
        }
      , Err(e) => {
          error!("Prediction API unreachable: {}", e);
          MediationOutcome::UpstreamUnreachable(
            UNAVAILABLE_MESSAGE.to_string()
          )
        }
    }
}

/// Upstream client plus the timeouts it is called with
#[derive(Clone)]
pub struct Mediator
{   upstream: Arc<dyn Upstream>
  , predict_timeout: Duration
  , health_timeout: Duration
}

impl Mediator
{   pub fn new(
      upstream: Arc<dyn Upstream>
    , config: &crate::config::FrontendConfig
    ) -> Self
    {   Mediator
        {   upstream
          , predict_timeout: config.predict_timeout()
          , health_timeout: config.health_timeout()
        }
    }

    /// Forward a normalized form sample
    pub async fn submit(&self, sample: &WineSample) -> MediationOutcome
    {   if !sample.is_well_formed()
        {   warn!(
              "Forwarding sample with malformed fields {:?}",
              sample.malformed_fields()
            );
        }
        self.submit_raw(&sample.to_payload()).await
    }

    /// Forward a JSON body untouched
    pub async fn submit_raw(&self, payload: &Value) -> MediationOutcome
    {   debug!("Submitting prediction request");
        let reply = self.upstream
          .post_json(PREDICT_PATH, payload, self.predict_timeout)
          .await;
        let outcome = classify(reply);
        match &outcome
        {   MediationOutcome::Success(result) => {
              info!("Prediction received (status {})", result.status);
            }
          , MediationOutcome::UpstreamError { status, message, .. } => {
              warn!("Prediction API rejected request ({}): {}", status, message);
            }
          , MediationOutcome::UpstreamUnreachable(_) => {}
        }
        outcome
    }

    /// Dataset statistics (best and worst wine) from the upstream
    pub async fn dataset_overview(&self) -> MediationOutcome
    {   debug!("Fetching dataset overview");
        let reply = self.upstream
          .get_json(DATASET_PATH, self.predict_timeout)
          .await;
        classify(reply)
    }

    /// Frontend is always healthy here; upstream health is reported
    /// separately
    pub async fn health_check(&self) -> HealthReport
    {   let reply = self.upstream
          .get_json(HEALTH_PATH, self.health_timeout)
          .await;
        match reply
        {   Ok(response) if response.is_success() => {
              HealthReport::available(response.body)
            }
          , Ok(response) => {
              warn!("Upstream health returned {}", response.status);
              HealthReport::unavailable(format!(
                "Request failed with status code {}",
                response.status
              ))
            }
          , Err(e) => {
              warn!("Upstream health check failed: {}", e);
              HealthReport::unavailable(e.to_string())
            }
        }
    }
}

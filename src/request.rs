//! Request, outcome and health types shared by the mediator and the server

use std::collections::BTreeMap;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const UPSTREAM_ERROR_MESSAGE: &str = "Prediction API server error";
pub const UNAVAILABLE_MESSAGE: &str = "Prediction API is unavailable";
pub const HEALTHY: &str = "healthy";
pub const UNAVAILABLE: &str = "unavailable";

/// Raw form submission, kept so the page can echo it back
pub type FormFields = BTreeMap<String, String>;

/// Flatten a JSON submission into form strings so it goes through the
/// same lenient parsing as a browser form. Nulls are dropped; anything
/// that is not an object yields no fields.
pub fn form_fields_from_json(value: &Value) -> FormFields
{   let Some(object) = value.as_object() else
    {   return FormFields::new();
    };
    object
      .iter()
      .filter(|(_, v)| !v.is_null())
      .map(|(name, v)| {
        let text = match v
        {   Value::String(s) => s.clone()
          , other => other.to_string()
        };
        (name.clone(), text)
      })
      .collect()
}

/// One wine's physicochemical measurements, as the upstream expects them
///
/// Non-finite measurements and a missing flag serialize as `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WineSample
{   pub fixed_acidity: f64
  , pub volatile_acidity: f64
  , pub citric_acid: f64
  , pub residual_sugar: f64
  , pub chlorides: f64
  , pub free_sulfur_dioxide: f64
  , pub total_sulfur_dioxide: f64
  , pub density: f64
  , #[serde(rename = "pH")]
    pub ph: f64
  , pub sulphates: f64
  , pub alcohol: f64
  , pub wine_type_red: Option<i64>
}

impl WineSample
{   /// Normalize a form submission. Never fails: unparsable
    /// measurements become NaN and an unparsable flag becomes `None`.
    pub fn from_form(fields: &FormFields) -> Self
    {   let measure = |name: &str| fields
          .get(name)
          .map(|raw| parse_measurement(raw))
          .unwrap_or(f64::NAN);

        WineSample
        {   fixed_acidity: measure("fixed_acidity")
          , volatile_acidity: measure("volatile_acidity")
          , citric_acid: measure("citric_acid")
          , residual_sugar: measure("residual_sugar")
          , chlorides: measure("chlorides")
          , free_sulfur_dioxide: measure("free_sulfur_dioxide")
          , total_sulfur_dioxide: measure("total_sulfur_dioxide")
          , density: measure("density")
          , ph: measure("pH")
          , sulphates: measure("sulphates")
          , alcohol: measure("alcohol")
          , wine_type_red: fields
              .get("wine_type_red")
              .and_then(|raw| parse_flag(raw))
        }
    }

    pub fn measurements(&self) -> [(&'static str, f64); 11]
    {   [   ("fixed_acidity", self.fixed_acidity)
          , ("volatile_acidity", self.volatile_acidity)
          , ("citric_acid", self.citric_acid)
          , ("residual_sugar", self.residual_sugar)
          , ("chlorides", self.chlorides)
          , ("free_sulfur_dioxide", self.free_sulfur_dioxide)
          , ("total_sulfur_dioxide", self.total_sulfur_dioxide)
          , ("density", self.density)
          , ("pH", self.ph)
          , ("sulphates", self.sulphates)
          , ("alcohol", self.alcohol)
        ]
    }

    /// Names of measurements that are not finite numbers
    pub fn malformed_fields(&self) -> Vec<&'static str>
    {   let mut bad: Vec<&'static str> = self.measurements()
          .iter()
          .filter(|(_, value)| !value.is_finite())
          .map(|(name, _)| *name)
          .collect();
        if !matches!(self.wine_type_red, Some(0) | Some(1))
        {   bad.push("wine_type_red");
        }
        bad
    }

    /// Finite measurements and a 0/1 flag. Range bounds are left to
    /// the browser and the upstream.
    pub fn is_well_formed(&self) -> bool
    {   self.malformed_fields().is_empty()
    }

    /// JSON body sent upstream
    pub fn to_payload(&self) -> Value
    {   serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Longest leading decimal literal, so "12.5g" reads as 12.5
fn numeric_prefix(raw: &str) -> &str
{   let s = raw.trim_start();
    let bytes = s.as_bytes();
    let len = bytes.len();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-'))
    {   end = 1;
    }
    let int_start = end;
    while end < len && bytes[end].is_ascii_digit()
    {   end += 1;
    }
    let mut digits = end - int_start;

    if end < len && bytes[end] == b'.'
    {   let mut frac = end + 1;
        while frac < len && bytes[frac].is_ascii_digit()
        {   frac += 1;
        }
        digits += frac - end - 1;
        if digits > 0
        {   end = frac;
        }
    }
    if digits == 0
    {   return "";
    }

    if end < len && (bytes[end] == b'e' || bytes[end] == b'E')
    {   let mut exp = end + 1;
        if exp < len && (bytes[exp] == b'+' || bytes[exp] == b'-')
        {   exp += 1;
        }
        let exp_digits = exp;
        while exp < len && bytes[exp].is_ascii_digit()
        {   exp += 1;
        }
        if exp > exp_digits
        {   end = exp;
        }
    }
    &s[..end]
}

/// Lenient float parse; NaN when no number leads the string
pub fn parse_measurement(raw: &str) -> f64
{   let prefix = numeric_prefix(raw);
    if prefix.is_empty()
    {   return f64::NAN;
    }
    prefix.parse().unwrap_or(f64::NAN)
}

/// Lenient integer parse of the leading digits
pub fn parse_flag(raw: &str) -> Option<i64>
{   let s = raw.trim_start();
    let sign_len = usize::from(s.starts_with('+') || s.starts_with('-'));
    let digits = s[sign_len..]
      .bytes()
      .take_while(|b| b.is_ascii_digit())
      .count();
    if digits == 0
    {   return None;
    }
    s[..sign_len + digits].parse().ok()
}

/// Upstream 2xx reply, body kept verbatim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult
{   pub status: u16
  , pub body: Value
}

/// Result of one upstream call, classified
#[derive(Debug, Clone, PartialEq)]
pub enum MediationOutcome
{   /// Upstream answered with 2xx
    Success(PredictionResult)
  , /// Upstream answered, but with a non-2xx status
    UpstreamError
    {   status: u16
      , message: String
      , body: Value
    }
  , /// No response at all (refused, timed out, DNS)
    UpstreamUnreachable(String)
}

impl MediationOutcome
{   /// HTTP status for JSON callers
    pub fn api_status(&self) -> u16
    {   match self
        {   MediationOutcome::Success(result) => result.status
          , MediationOutcome::UpstreamError { status, .. } => *status
          , MediationOutcome::UpstreamUnreachable(_) => 500
        }
    }

    /// JSON body for JSON callers
    pub fn api_body(&self) -> Value
    {   match self
        {   MediationOutcome::Success(result) => result.body.clone()
          , MediationOutcome::UpstreamError { body, .. } => body.clone()
          , MediationOutcome::UpstreamUnreachable(message) => {
              json!({ "error": message })
            }
        }
    }

    /// Human-readable failure for the page, `None` on success
    pub fn page_message(&self) -> Option<&str>
    {   match self
        {   MediationOutcome::Success(_) => None
          , MediationOutcome::UpstreamError { message, .. } => {
              Some(message.as_str())
            }
          , MediationOutcome::UpstreamUnreachable(message) => {
              Some(message.as_str())
            }
        }
    }

    pub fn is_success(&self) -> bool
    {   matches!(self, MediationOutcome::Success(_))
    }
}

/// Body of `GET /health`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthBody
{   pub frontend_status: String
  , pub api_status: Value
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>
  , pub timestamp: String
}

/// Health check result: 200 when upstream is healthy, 503 otherwise
#[derive(Debug, Clone, PartialEq)]
pub struct HealthReport
{   pub status: u16
  , pub body: HealthBody
}

impl HealthReport
{   pub fn available(api_status: Value) -> Self
    {   HealthReport
        {   status: 200
          , body: HealthBody
            {   frontend_status: HEALTHY.to_string()
              , api_status
              , error: None
              , timestamp: now_timestamp()
            }
        }
    }

    pub fn unavailable(error: String) -> Self
    {   HealthReport
        {   status: 503
          , body: HealthBody
            {   frontend_status: HEALTHY.to_string()
              , api_status: Value::String(UNAVAILABLE.to_string())
              , error: Some(error)
              , timestamp: now_timestamp()
            }
        }
    }
}

/// UTC, millisecond precision, `Z` suffix
pub fn now_timestamp() -> String
{   chrono::Utc::now()
      .to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

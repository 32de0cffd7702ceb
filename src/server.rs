//! HTTP surface: routes, handlers and the fault boundary

use std::fmt;
use std::sync::Arc;
use actix_web::http::header::ContentType;
use actix_web::http::StatusCode;
use actix_web::middleware::Logger;
use actix_web::{
  web, App, HttpMessage, HttpRequest, HttpResponse, HttpServer, ResponseError
};
use log::{debug, error, info};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::config::{FrontendConfig, Mode};
use crate::error::Error;
use crate::mediator::Mediator;
use crate::pages::{self, IndexView};
use crate::request::{
  form_fields_from_json, FormFields, MediationOutcome, WineSample
};
use crate::upstream::Upstream;

const REDACTED_MESSAGE: &str = "Internal server error";

/// Everything a handler needs, built once at startup
#[derive(Clone)]
pub struct AppState
{   pub mediator: Mediator
  , pub config: FrontendConfig
}

impl AppState
{   pub fn new(
      upstream: Arc<dyn Upstream>
    , config: FrontendConfig
    ) -> Self
    {   AppState
        {   mediator: Mediator::new(upstream, &config)
          , config
        }
    }
}

/// Failure inside the frontend itself, rendered as a 500 error page
#[derive(Debug)]
pub struct HandlerFault
{   message: String
  , mode: Mode
}

impl HandlerFault
{   pub fn new(error: crate::error::Error, mode: Mode) -> Self
    {   error!("Application error: {}", error);
        HandlerFault
        {   message: error.to_string()
          , mode
        }
    }

    /// Detail outside production, a fixed message in production
    pub fn public_message(&self) -> &str
    {   if self.mode.exposes_details()
        {   &self.message
        } else
        {   REDACTED_MESSAGE
        }
    }
}

impl fmt::Display for HandlerFault
{   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {   write!(f, "{}", self.message)
    }
}

impl ResponseError for HandlerFault
{   fn status_code(&self) -> StatusCode
    {   StatusCode::INTERNAL_SERVER_ERROR
    }

    fn error_response(&self) -> HttpResponse
    {   HttpResponse::InternalServerError()
          .content_type(ContentType::html())
          .body(pages::error_page(self.public_message()))
    }
}

fn html(status: StatusCode, body: String) -> HttpResponse
{   HttpResponse::build(status)
      .content_type(ContentType::html())
      .body(body)
}

fn json_with_status(status: u16, body: &Value) -> HttpResponse
{   let status = StatusCode::from_u16(status)
      .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    HttpResponse::build(status).json(body)
}

fn api_response(outcome: &MediationOutcome) -> HttpResponse
{   json_with_status(outcome.api_status(), &outcome.api_body())
}

#[derive(Debug, Deserialize)]
struct IndexQuery
{   example: Option<String>
}

/// Empty form, or a preset when `?example=<key>` names one
async fn index(req: HttpRequest) -> HttpResponse
{   let preset = web::Query::<IndexQuery>::from_query(req.query_string())
      .ok()
      .and_then(|q| q.into_inner().example)
      .and_then(|key| crate::fields::find_preset(&key));
    let inputs = preset.map(|p| p.to_form());

    html(StatusCode::OK, pages::index(&IndexView
    {   inputs: inputs.as_ref()
      , result: None
      , error: None
    }))
}

/// JSON body, `{}` when blank
fn decode_json(body: &[u8]) -> Result<Value, Error>
{   if body.iter().all(u8::is_ascii_whitespace)
    {   return Ok(json!({}));
    }
    serde_json::from_slice(body)
      .map_err(|e| Error::MalformedInput(e.to_string()))
}

/// Urlencoded and JSON bodies both become form fields; any other
/// content type carries no fields
fn read_submission(
  req: &HttpRequest
, body: &[u8]
) -> Result<FormFields, Error>
{   match req.content_type()
    {   "application/json" => {
          Ok(form_fields_from_json(&decode_json(body)?))
        }
      , "application/x-www-form-urlencoded" => {
          let text = std::str::from_utf8(body)
            .map_err(|e| Error::MalformedInput(e.to_string()))?;
          web::Query::<FormFields>::from_query(text)
            .map(web::Query::into_inner)
            .map_err(|e| Error::MalformedInput(e.to_string()))
        }
      , other => {
          debug!("Ignoring /predict body with content type {:?}", other);
          Ok(FormFields::new())
        }
    }
}

/// Form submission: always 200, failures are shown in the page
async fn predict_page(
  req: HttpRequest
, state: web::Data<AppState>
, body: web::Bytes
) -> Result<HttpResponse, HandlerFault>
{   let inputs = read_submission(&req, &body)
      .map_err(|e| HandlerFault::new(e, state.config.mode))?;
    let sample = WineSample::from_form(&inputs);
    let outcome = state.mediator.submit(&sample).await;

    let view = match &outcome
    {   MediationOutcome::Success(result) => IndexView
        {   inputs: Some(&inputs)
          , result: Some(&result.body)
          , error: None
        }
      , failed => IndexView
        {   inputs: Some(&inputs)
          , result: None
          , error: failed.page_message()
        }
    };
    Ok(html(StatusCode::OK, pages::index(&view)))
}

/// JSON passthrough; an empty body is sent as `{}`
async fn api_predict(
  state: web::Data<AppState>
, body: web::Bytes
) -> Result<HttpResponse, HandlerFault>
{   let payload = decode_json(&body)
      .map_err(|e| HandlerFault::new(e, state.config.mode))?;

    let outcome = state.mediator.submit_raw(&payload).await;
    Ok(api_response(&outcome))
}

async fn best_worst_wines(state: web::Data<AppState>) -> HttpResponse
{   let outcome = state.mediator.dataset_overview().await;
    api_response(&outcome)
}

async fn api_info() -> HttpResponse
{   html(StatusCode::OK, pages::api_info())
}

async fn health(state: web::Data<AppState>) -> HttpResponse
{   let report = state.mediator.health_check().await;
    let status = StatusCode::from_u16(report.status)
      .unwrap_or(StatusCode::SERVICE_UNAVAILABLE);
    HttpResponse::build(status).json(&report.body)
}

/// Fallback for unmatched paths and methods
pub async fn not_found(req: HttpRequest) -> HttpResponse
{   html(StatusCode::NOT_FOUND, pages::not_found(req.path()))
}

/// Register routes. Pair with `default_service(web::to(not_found))`
/// on the `App`.
pub fn configure(cfg: &mut web::ServiceConfig)
{   cfg
      .service(web::resource("/")
        .route(web::get().to(index))
        .default_service(web::to(not_found)))
      .service(web::resource("/predict")
        .route(web::post().to(predict_page))
        .default_service(web::to(not_found)))
      .service(web::resource("/api/predict")
        .route(web::post().to(api_predict))
        .default_service(web::to(not_found)))
      .service(web::resource("/api/best-worst-wines")
        .route(web::get().to(best_worst_wines))
        .default_service(web::to(not_found)))
      .service(web::resource("/api-info")
        .route(web::get().to(api_info))
        .default_service(web::to(not_found)))
      .service(web::resource("/health")
        .route(web::get().to(health))
        .default_service(web::to(not_found)));
}

/// Bind and serve until shutdown; listener failures surface as
/// `Error::Io`
pub async fn run(
  config: FrontendConfig
, upstream: Arc<dyn Upstream>
) -> Result<(), Error>
{   let bind_address = config.bind_address();
    info!("Frontend server listening on http://{}", bind_address);
    info!("Prediction API: {}", config.api_url);
    info!("Mode: {:?}", config.mode);

    let state = web::Data::new(AppState::new(upstream, config));

    HttpServer::new(move || {
      App::new()
        .wrap(Logger::default())
        .app_data(state.clone())
        .configure(configure)
        .default_service(web::to(not_found))
    })
    .bind(&bind_address)
    .map_err(|e| {
      error!("Failed to bind {}: {}", bind_address, e);
      Error::from(e)
    })?
    .run()
    .await?;

    info!("Frontend server stopped");
    Ok(())
}

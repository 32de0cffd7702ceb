use std::sync::{Arc, Mutex};
use std::time::Duration;
use actix_web::http::{header, StatusCode};
use actix_web::{test, web, App};
use async_trait::async_trait;
use serde_json::{json, Value};

use vinoteca::request::{UNAVAILABLE_MESSAGE, UPSTREAM_ERROR_MESSAGE};
use vinoteca::upstream::HEALTH_PATH;
use vinoteca::{
  server, AppState, Error, FrontendConfig, Mode, Upstream, UpstreamResponse
};

/// Canned replies, records every JSON payload it is sent
struct StubUpstream
{   predict: Result<UpstreamResponse, Error>
  , health: Result<UpstreamResponse, Error>
  , seen: Mutex<Vec<Value>>
}

impl StubUpstream
{   fn new(predict: Result<UpstreamResponse, Error>) -> Arc<Self>
    {   Arc::new(StubUpstream
        {   predict
          , health: ok(200, json!({ "status": "healthy" }))
          , seen: Mutex::new(vec![])
        })
    }

    fn with_health(
      predict: Result<UpstreamResponse, Error>
    , health: Result<UpstreamResponse, Error>
    ) -> Arc<Self>
    {   Arc::new(StubUpstream
        {   predict
          , health
          , seen: Mutex::new(vec![])
        })
    }

    fn last_payload(&self) -> Option<Value>
    {   self.seen.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl Upstream for StubUpstream
{   async fn post_json(
      &self
    , _path: &str
    , payload: &Value
    , _timeout: Duration
    ) -> Result<UpstreamResponse, Error>
    {   self.seen.lock().unwrap().push(payload.clone());
        self.predict.clone()
    }

    async fn get_json(
      &self
    , path: &str
    , _timeout: Duration
    ) -> Result<UpstreamResponse, Error>
    {   if path == HEALTH_PATH
        {   self.health.clone()
        } else
        {   self.predict.clone()
        }
    }
}

fn ok(status: u16, body: Value) -> Result<UpstreamResponse, Error>
{   Ok(UpstreamResponse { status, body })
}

fn refused() -> Result<UpstreamResponse, Error>
{   Err(Error::Unreachable("connection refused".to_string()))
}

fn config(mode: Mode) -> FrontendConfig
{   FrontendConfig
    {   mode
      , ..FrontendConfig::default()
    }
}

macro_rules! test_app
{   ($stub:expr) => { test_app!($stub, Mode::Development) };
    ($stub:expr, $mode:expr) => {
      test::init_service(
        App::new()
          .app_data(web::Data::new(AppState::new($stub.clone(), config($mode))))
          .configure(server::configure)
          .default_service(web::to(server::not_found))
      ).await
    };
}

const GOOD_RED: [(&str, &str); 12] = [
    ("wine_type_red", "1")
  , ("fixed_acidity", "8.5")
  , ("volatile_acidity", "0.4")
  , ("citric_acid", "0.3")
  , ("residual_sugar", "2.1")
  , ("chlorides", "0.08")
  , ("free_sulfur_dioxide", "15")
  , ("total_sulfur_dioxide", "45")
  , ("density", "0.996")
  , ("pH", "3.3")
  , ("sulphates", "0.65")
  , ("alcohol", "11.5")
];

fn body_text(bytes: &[u8]) -> String
{   String::from_utf8_lossy(bytes).into_owned()
}

#[actix_web::test]
async fn test_index_renders_empty_form()
{   let stub = StubUpstream::new(refused());
    let app = test_app!(stub);

    let resp = test::call_service(
      &app, test::TestRequest::get().uri("/").to_request()
    ).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let html = body_text(&test::read_body(resp).await);
    assert!(html.contains("id=\"wineForm\""));
    assert!(html.contains("name=\"alcohol\""));
    assert!(!html.contains("id=\"result\""));
    assert!(!html.contains("id=\"error\""));
}

#[actix_web::test]
async fn test_index_prefills_preset()
{   let stub = StubUpstream::new(refused());
    let app = test_app!(stub);

    let resp = test::call_service(
      &app,
      test::TestRequest::get().uri("/?example=average-white").to_request()
    ).await;
    let html = body_text(&test::read_body(resp).await);
    assert!(html.contains("value=\"120\""));
    assert!(html.contains("<option value=\"0\" selected>White</option>"));
}

#[actix_web::test]
async fn test_predict_page_shows_result_and_keeps_input()
{   let prediction = json!({ "prediction": 7, "confidence": 0.8 });
    let stub = StubUpstream::new(ok(200, prediction.clone()));
    let app = test_app!(stub);

    let req = test::TestRequest::post()
      .uri("/predict")
      .set_form(GOOD_RED)
      .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let html = body_text(&test::read_body(resp).await);
    assert!(html.contains("<div class=\"score\">7</div>"));
    assert!(html.contains("value=\"11.5\""));
    let pretty = serde_json::to_string_pretty(&prediction).unwrap();
    assert!(html.contains(&vinoteca::pages::escape(&pretty)));

    let sent = stub.last_payload().unwrap();
    assert_eq!(sent["pH"], json!(3.3));
    assert_eq!(sent["wine_type_red"], json!(1));
}

#[actix_web::test]
async fn test_predict_page_shows_upstream_error_with_200()
{   let stub = StubUpstream::new(
      ok(422, json!({ "error": "density out of range" }))
    );
    let app = test_app!(stub);

    let req = test::TestRequest::post()
      .uri("/predict")
      .set_form(GOOD_RED)
      .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let html = body_text(&test::read_body(resp).await);
    assert!(html.contains("density out of range"));
    assert!(html.contains("value=\"0.996\""));
}

#[actix_web::test]
async fn test_predict_page_generic_message_without_error_field()
{   let stub = StubUpstream::new(ok(500, json!({ "detail": "boom" })));
    let app = test_app!(stub);

    let req = test::TestRequest::post()
      .uri("/predict")
      .set_form(GOOD_RED)
      .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_text(&test::read_body(resp).await);
    assert!(html.contains(UPSTREAM_ERROR_MESSAGE));
}

#[actix_web::test]
async fn test_predict_page_unreachable_upstream()
{   let stub = StubUpstream::new(refused());
    let app = test_app!(stub);

    let req = test::TestRequest::post()
      .uri("/predict")
      .set_form(GOOD_RED)
      .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_text(&test::read_body(resp).await);
    assert!(html.contains(UNAVAILABLE_MESSAGE));
    assert!(html.contains("value=\"8.5\""));
}

#[actix_web::test]
async fn test_non_numeric_field_is_forwarded_as_null()
{   let stub = StubUpstream::new(
      ok(400, json!({ "error": "invalid value for alcohol" }))
    );
    let app = test_app!(stub);

    let mut form = GOOD_RED.to_vec();
    form.retain(|(name, _)| *name != "alcohol");
    form.push(("alcohol", "abc"));

    let req = test::TestRequest::post()
      .uri("/predict")
      .set_form(&form)
      .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let html = body_text(&test::read_body(resp).await);
    assert!(html.contains("invalid value for alcohol"));
    assert!(html.contains("value=\"abc\""));
    assert_eq!(stub.last_payload().unwrap()["alcohol"], Value::Null);
}

#[actix_web::test]
async fn test_api_predict_success_passthrough()
{   let prediction = json!({ "prediction": 5, "confidence": 0.55 });
    let stub = StubUpstream::new(ok(200, prediction.clone()));
    let app = test_app!(stub);

    let payload = json!({ "alcohol": 9.4, "pH": 3.51 });
    let req = test::TestRequest::post()
      .uri("/api/predict")
      .set_json(&payload)
      .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, prediction);
    assert_eq!(stub.last_payload(), Some(payload));
}

#[actix_web::test]
async fn test_api_predict_reemits_upstream_error()
{   let stub = StubUpstream::new(
      ok(400, json!({ "error": "missing features: ['pH']" }))
    );
    let app = test_app!(stub);

    let req = test::TestRequest::post()
      .uri("/api/predict")
      .set_json(json!({ "alcohol": 9.4 }))
      .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "error": "missing features: ['pH']" }));
}

#[actix_web::test]
async fn test_api_predict_unreachable_is_500()
{   let stub = StubUpstream::new(refused());
    let app = test_app!(stub);

    let req = test::TestRequest::post()
      .uri("/api/predict")
      .set_json(json!({}))
      .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "error": UNAVAILABLE_MESSAGE }));
}

#[actix_web::test]
async fn test_api_predict_empty_body_sends_empty_object()
{   let stub = StubUpstream::new(ok(400, json!({ "error": "no data" })));
    let app = test_app!(stub);

    let req = test::TestRequest::post().uri("/api/predict").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(stub.last_payload(), Some(json!({})));
}

#[actix_web::test]
async fn test_malformed_json_shows_detail_in_development()
{   let stub = StubUpstream::new(refused());
    let app = test_app!(stub, Mode::Development);

    let req = test::TestRequest::post()
      .uri("/api/predict")
      .insert_header((header::CONTENT_TYPE, "application/json"))
      .set_payload("{\"alcohol\": ")
      .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let html = body_text(&test::read_body(resp).await);
    assert!(html.contains("Malformed input"));
    assert!(stub.last_payload().is_none());
}

#[actix_web::test]
async fn test_malformed_json_redacted_in_production()
{   let stub = StubUpstream::new(refused());
    let app = test_app!(stub, Mode::Production);

    let req = test::TestRequest::post()
      .uri("/api/predict")
      .insert_header((header::CONTENT_TYPE, "application/json"))
      .set_payload("not json")
      .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let html = body_text(&test::read_body(resp).await);
    assert!(html.contains("Internal server error"));
    assert!(!html.contains("Malformed input"));
}

#[actix_web::test]
async fn test_predict_page_accepts_json_body()
{   let stub = StubUpstream::new(ok(200, json!({ "prediction": 5 })));
    let app = test_app!(stub);

    let req = test::TestRequest::post()
      .uri("/predict")
      .set_json(json!({
        "fixed_acidity": 7.4,
        "alcohol": 9.4,
        "wine_type_red": 1
      }))
      .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let html = body_text(&test::read_body(resp).await);
    assert!(html.contains("<div class=\"score\">5</div>"));
    assert!(html.contains("value=\"9.4\""));

    let sent = stub.last_payload().unwrap();
    assert_eq!(sent["fixed_acidity"], json!(7.4));
    assert_eq!(sent["alcohol"], json!(9.4));
    assert_eq!(sent["wine_type_red"], json!(1));
    assert_eq!(sent["density"], Value::Null);
}

#[actix_web::test]
async fn test_predict_page_malformed_json_is_a_fault()
{   let stub = StubUpstream::new(refused());
    let app = test_app!(stub, Mode::Production);

    let req = test::TestRequest::post()
      .uri("/predict")
      .insert_header((header::CONTENT_TYPE, "application/json"))
      .set_payload("{\"alcohol\": ")
      .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(stub.last_payload().is_none());
}

#[actix_web::test]
async fn test_predict_page_unknown_body_type_still_renders()
{   let stub = StubUpstream::new(ok(400, json!({ "error": "no features" })));
    let app = test_app!(stub);

    let req = test::TestRequest::post()
      .uri("/predict")
      .insert_header((header::CONTENT_TYPE, "text/plain"))
      .set_payload("alcohol=9.4")
      .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let html = body_text(&test::read_body(resp).await);
    assert!(html.contains("no features"));
    assert_eq!(stub.last_payload().unwrap()["alcohol"], Value::Null);
}

#[actix_web::test]
async fn test_health_ok_and_unavailable()
{   let healthy = StubUpstream::new(refused());
    let app = test_app!(healthy);
    let resp = test::call_service(
      &app, test::TestRequest::get().uri("/health").to_request()
    ).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["frontend_status"], "healthy");
    assert_eq!(body["api_status"], json!({ "status": "healthy" }));
    assert!(body["timestamp"].is_string());
    assert!(body.get("error").is_none());

    let down = StubUpstream::with_health(refused(), refused());
    let app = test_app!(down);
    let resp = test::call_service(
      &app, test::TestRequest::get().uri("/health").to_request()
    ).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["frontend_status"], "healthy");
    assert_eq!(body["api_status"], "unavailable");
    assert!(body["error"].is_string());
    assert!(body["timestamp"].is_string());
}

#[actix_web::test]
async fn test_dataset_route_passthrough()
{   let stub = StubUpstream::new(ok(404, json!({ "error": "no dataset" })));
    let app = test_app!(stub);

    let resp = test::call_service(
      &app,
      test::TestRequest::get().uri("/api/best-worst-wines").to_request()
    ).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "error": "no dataset" }));
}

#[actix_web::test]
async fn test_api_info_page()
{   let stub = StubUpstream::new(refused());
    let app = test_app!(stub);

    let resp = test::call_service(
      &app, test::TestRequest::get().uri("/api-info").to_request()
    ).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_text(&test::read_body(resp).await);
    assert!(html.contains("POST /api/predict"));
}

#[actix_web::test]
async fn test_unmatched_routes_are_404()
{   let stub = StubUpstream::new(refused());
    let app = test_app!(stub);

    for req in [
      test::TestRequest::get().uri("/nope").to_request()
    , test::TestRequest::get().uri("/predict").to_request()
    , test::TestRequest::delete().uri("/health").to_request()
    ]
    {   let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    let resp = test::call_service(
      &app, test::TestRequest::get().uri("/nope").to_request()
    ).await;
    let html = body_text(&test::read_body(resp).await);
    assert!(html.contains("Page not found"));
    assert!(html.contains("/nope"));
}

#[actix_web::test]
async fn test_run_reports_port_in_use_as_io_error()
{   let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = taken.local_addr().unwrap().port();

    let config = FrontendConfig
    {   host: "127.0.0.1".to_string()
      , port
      , ..FrontendConfig::default()
    };
    let result = server::run(config, StubUpstream::new(refused())).await;
    assert!(matches!(result, Err(Error::Io(_))));
}

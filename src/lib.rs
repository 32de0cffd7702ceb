pub mod error;
pub mod config;
pub mod fields;
pub mod request;
pub mod upstream;
pub mod mediator;
pub mod pages;
pub mod server;

/*

vinoteca is the browser-facing frontend for the wine quality
prediction API. it collects a wine sample through an html form
(or raw json), forwards it to the prediction api, and renders
whatever comes back. every upstream call ends in one of three
outcomes: success, upstream error (it answered, non-2xx), or
unreachable (no answer at all).

vinoteca/
├── Cargo.toml
├── src/
│   ├── lib.rs          # Re-exports and this overview
│   ├── main.rs         # Logger, config, server startup
│   ├── error.rs        # Error enum
│   ├── config.rs       # FrontendConfig from the environment
│   ├── fields.rs       # Form inputs and preset examples
│   ├── request.rs      # WineSample, MediationOutcome, HealthReport
│   ├── upstream/       # Upstream trait and the reqwest client
│   ├── mediator.rs     # Classification, health check
│   ├── pages.rs        # HTML rendering
│   └── server.rs       # actix-web routes and fault page
└── tests/              # Mock-upstream and route tests

*/

pub use config::{FrontendConfig, Mode};
pub use error::Error;
pub use mediator::{classify, Mediator};
pub use request::{
  HealthBody, HealthReport, MediationOutcome, PredictionResult, WineSample
};
pub use server::AppState;
pub use upstream::{HttpUpstream, Upstream, UpstreamResponse};

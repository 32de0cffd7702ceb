use std::sync::Arc;
use log::{error, info};

use vinoteca::config::FrontendConfig;
use vinoteca::upstream::HttpUpstream;
use vinoteca::Error;

#[actix_web::main]
async fn main() -> Result<(), Error>
{   env_logger::Builder::from_env(
      env_logger::Env::default().default_filter_or("info")
    )
    .format_timestamp_millis()
    .format_module_path(false)
    .init();

    let config = FrontendConfig::from_env().map_err(|e| {
      error!("{}", e);
      e
    })?;

    info!("Starting wine quality frontend");
    let upstream = Arc::new(HttpUpstream::new(&config.api_url));
    vinoteca::server::run(config, upstream).await
}

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod api;
mod config;
mod models;
mod services;
mod utils;

use api::lark::LarkClient;
use api::market::MarketDataClient;
use config::Config;
use services::pipeline_service::{Pipeline, RunStatus};
use services::raster_service::ChromeRasterizer;

/// Exit status when the market data could not be fetched
const EXIT_FETCH_FAILED: i32 = 2;
/// Exit status when the configuration is invalid
const EXIT_CONFIG_INVALID: i32 = 3;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("asiabits_indices=info")),
        )
        .with_target(true)
        .init();

    info!("📈 asiabits indices v{}", env!("CARGO_PKG_VERSION"));

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("❌ Invalid configuration: {}", e);
            std::process::exit(EXIT_CONFIG_INVALID);
        }
    };
    if config.lark.credentials.is_none() {
        warn!("⚠️ LARK_APP_ID / LARK_APP_SECRET not set, images will not be sent");
    }

    let source = MarketDataClient::new(config.indices_api_url.clone(), config.http_timeout);
    let chat = LarkClient::new(config.lark.base_url.clone(), config.http_timeout, config.upload_timeout);
    let rasterizer = ChromeRasterizer::new(config.chrome_path.clone(), config.chrome_sandbox);

    let pipeline = Pipeline::new(&config, &source, &chat, &rasterizer);
    let summary = match pipeline.run(chrono::Utc::now()).await {
        Ok(summary) => summary,
        Err(e) => {
            error!("❌ {}", e);
            error!("💥 Run failed, nothing was produced");
            std::process::exit(EXIT_FETCH_FAILED);
        }
    };

    info!("\n{}", summary.render_table());

    let status = summary.status();
    match status {
        RunStatus::Delivered => info!("🎉 Done! All images delivered"),
        RunStatus::PartialFailure => warn!("⚠️ Partial failure: some images were not delivered"),
        RunStatus::Failed => error!("❌ No image was delivered (images kept in {})", config.output_dir.display()),
    }

    std::process::exit(status.exit_code());
}

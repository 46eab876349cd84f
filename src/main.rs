use tracing::{info, instrument};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use fuel_dashboard_service::app::Application;
use fuel_dashboard_service::config::Config;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables (RUST_LOG may come from .env)
    dotenvy::dotenv().ok();

    // Initialize tracing with environment filter support
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,fuel_dashboard_service=debug")),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_line_number(true),
        )
        .init();

    let config = Config::from_env()?;
    info!("Starting fuel dashboard service with config: {:?}", config);

    let application = Application::build(config).await?;
    application.run_until_stopped().await
}

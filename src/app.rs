use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::api::{create_router, AppState};
use crate::config::Config;
use crate::services::DashboardService;

/// Running application: the HTTP server task
pub struct Application {
    pub server_handle: JoinHandle<Result<(), std::io::Error>>,
}

impl Application {
    /// Build the dashboard service, preload the configured workbook (if any)
    /// and spawn the HTTP server
    ///
    /// A preload failure is logged and the service starts empty; clients can
    /// still upload a workbook.
    pub async fn build(config: Config) -> Result<Self, Box<dyn std::error::Error>> {
        info!("Initializing application components");

        let dashboard_service = DashboardService::new(config.ranking_size);

        if let Some(path) = config.workbook_path.clone() {
            info!("Preloading workbook {}", path.display());
            if let Err(e) = dashboard_service.load_workbook_path(path.clone()).await {
                warn!("Failed to preload workbook {}: {}", path.display(), e);
            }
        }

        let app_state = AppState {
            dashboard_service,
            max_upload_bytes: config.max_upload_bytes(),
        };
        let app = create_router(app_state).layer(TraceLayer::new_for_http());

        let addr = config.server_addr();
        info!("Starting HTTP server on {}", addr);

        let listener = tokio::net::TcpListener::bind(&addr).await?;
        let server_handle = tokio::spawn(async move { axum::serve(listener, app).await });

        info!("Application initialized successfully");

        Ok(Self { server_handle })
    }

    /// Run until the server stops
    pub async fn run_until_stopped(self) -> Result<(), Box<dyn std::error::Error>> {
        self.server_handle.await??;
        Ok(())
    }
}

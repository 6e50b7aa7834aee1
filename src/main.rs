use tower_http::trace::TraceLayer;
use tracing::{error, info, instrument};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use teller_report_service::api::{create_router, AppState};
use teller_report_service::config::Config;
use teller_report_service::fetcher::SheetFetcher;
use teller_report_service::services::ReportService;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing with environment filter support
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,teller_report_service=debug")),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_line_number(true),
        )
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::from_env()?;
    info!("Starting teller report service with config: {:?}", config);

    let fetcher = SheetFetcher::new(config.sheet_url.clone(), config.min_csv_length);
    let report_service = ReportService::new(fetcher);

    // One initial fetch when a session is already established; otherwise the
    // view triggers the first cycle through /refresh after login.
    if config.authenticated {
        info!("Authenticated session flag set, running initial fetch");
        match report_service.refresh().await {
            Ok(model) => info!(
                "Initial fetch complete: {} units, {} tellers",
                model.units.len(),
                model.total_tellers
            ),
            Err(e) => error!("Initial fetch failed, serving without data: {}", e),
        }
    } else {
        info!("No authenticated session, waiting for manual refresh");
    }

    // Create API router
    let app_state = AppState { report_service };
    let app = create_router(app_state).layer(TraceLayer::new_for_http());

    // Start server
    let addr = config.server_addr();
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

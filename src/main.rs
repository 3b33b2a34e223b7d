// Meetboard - tutor scheduling dashboard
// Loads the dashboard once against the local database and prints the view

use std::process::ExitCode;
use std::sync::Arc;

use chrono::Local;
use log::{error, info};
use tokio_util::sync::CancellationToken;

use meetboard::config::DashboardConfig;
use meetboard::routing::Router;
use meetboard::utils::logging::init_logging;
use meetboard::{AppError, Dashboard, DashboardController, Database, Sources};

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(e) = init_logging() {
        eprintln!("Failed to initialize logging: {}", e);
    }

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Meetboard failed: {}", e);
            eprintln!("{}", e.to_safe_string());
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), AppError> {
    info!("Starting Meetboard");
    let config = DashboardConfig::from_env()?;

    let database = Database::open(&config.db_path)
        .await?
        .with_default_user(config.default_user_id);
    let database = Arc::new(database);

    let router = Router::load(database.clone()).await;
    info!("Current route: {}", router.current_route());

    let today = Local::now().date_naive();
    let dashboard = Dashboard::with_months_in_view(today, config.months_in_view);
    let mut controller = DashboardController::new(dashboard, Sources::from_backend(database));

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            signal_token.cancel();
        }
    });

    controller.start();
    tokio::select! {
        _ = controller.run_until_idle() => {}
        _ = shutdown.cancelled() => {
            info!("Interrupted before the dashboard finished loading");
        }
    }

    let view = controller.view();
    let rendered = serde_json::to_string_pretty(&view)
        .map_err(|e| AppError::operation_failed(format!("Failed to render view: {}", e)))?;
    println!("{}", rendered);

    info!("Meetboard shutting down");
    Ok(())
}

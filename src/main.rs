use actix_web::{middleware, web, App, HttpServer};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use lottolab::config::AppConfig;
use lottolab::handlers::{health, run, AppState};
use lottolab::storage::Storage;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set subscriber");

    let config = AppConfig::from_env();
    let addr = format!("{}:{}", config.host, config.port);

    let storage = Storage::new(config.outputs_dir.clone())
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    let app_state = Arc::new(AppState { storage });

    info!(
        outputs = %config.outputs_dir.display(),
        "Starting lottolab server at http://{}", addr
    );

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .wrap(middleware::Logger::default())
            .route("/health", web::get().to(health::health_check))
            .route("/run", web::post().to(run::run_dataset))
    })
    .bind(&addr)?
    .run()
    .await
}

use intent_classifier::{
    api::{build_router, AppState, PREDICT_INTENT_PATH},
    config::Config,
    logging::init_tracing,
    ml::IntentModel,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration; a bad file or env override stops startup
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    // Initialize tracing
    init_tracing(&config.observability);

    tracing::info!("Starting intent-classifier v{}", env!("CARGO_PKG_VERSION"));

    // Load artifacts; nothing is served until this succeeds
    let paths = config.artifact_paths();
    let model = match IntentModel::load(&paths, config.serving.unknown_text_policy) {
        Ok(model) => model,
        Err(e) => {
            tracing::error!(
                vectorizer = %paths.vectorizer.display(),
                classifier = %paths.classifier.display(),
                "Failed to load intent model: {}",
                e
            );
            return Err(e.into());
        }
    };

    let app = build_router(AppState::new(model));

    // Start HTTP server
    let http_addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&http_addr).await?;

    tracing::info!("HTTP API server listening on http://{}", http_addr);
    tracing::info!("   Predict: POST http://{}{}", http_addr, PREDICT_INTENT_PATH);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutting down gracefully...");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

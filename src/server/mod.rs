//! HTTP service exposing the catalog as JSON.
//!
//! The router shares one `Arc<dyn ZooCatalog>` across handlers. CORS admits a
//! single configured origin with credentials.

mod handlers;
pub mod responses;

use crate::config::ServerConfig;
use crate::db::ZooCatalog;
use crate::error::{Result, ZooError};
use axum::http::HeaderValue;
use axum::routing::{get, post, put};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Catalog handle shared by every request.
pub type SharedCatalog = Arc<dyn ZooCatalog>;

/// Builds the CORS layer for one origin.
fn cors_layer(allowed_origin: &str) -> Result<CorsLayer> {
    let origin = HeaderValue::from_str(allowed_origin)
        .map_err(|e| ZooError::config(format!("Invalid allowed origin '{allowed_origin}': {e}")))?;

    // Wildcards are not allowed together with credentials; mirror instead.
    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true))
}

/// Builds the application router.
pub fn router(catalog: SharedCatalog, allowed_origin: &str) -> Result<Router> {
    let app = Router::new()
        .route("/", get(handlers::root))
        .route("/fornecedor/:id/alimentos", get(handlers::food_by_supplier))
        .route("/fornecedor/:id/info", get(handlers::supplier_info))
        .route(
            "/funcionarios",
            get(handlers::list_employees).post(handlers::create_employee),
        )
        .route("/funcionarios/emails", get(handlers::employee_emails))
        .route(
            "/funcionarios/emails-tardios",
            get(handlers::late_employees),
        )
        .route("/cuidadores/ranking", get(handlers::caretaker_ranking))
        .route("/faxineiros/ranking", get(handlers::cleaner_ranking))
        .route(
            "/habitats",
            get(handlers::list_habitats).post(handlers::create_habitat),
        )
        .route("/habitats/medicados", get(handlers::medicated_habitats))
        .route(
            "/animal/:id/fornecedor-principal",
            get(handlers::primary_supplier_phone),
        )
        .route("/animal/", post(handlers::create_animal))
        .route("/animais/resumo", get(handlers::animal_summary))
        .route(
            "/animais/ranking-alimentos",
            get(handlers::animal_food_ranking),
        )
        .route("/produtos", get(handlers::list_products))
        .route("/produto/", put(handlers::update_product))
        .layer(cors_layer(allowed_origin)?)
        .layer(TraceLayer::new_for_http())
        .with_state(catalog);

    Ok(app)
}

/// Serves the catalog until Ctrl+C or SIGTERM, then closes it.
pub async fn serve(catalog: SharedCatalog, config: &ServerConfig) -> Result<()> {
    let app = router(Arc::clone(&catalog), &config.allowed_origin)?;
    let addr = config.bind_address();

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| ZooError::internal(format!("Failed to bind {addr}: {e}")))?;

    info!("Zoo API listening on {addr} (allowed origin {})", config.allowed_origin);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ZooError::internal(format!("Server error: {e}")))?;

    catalog.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on SIGINT (Ctrl+C) or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT (Ctrl+C), initiating graceful shutdown..."),
        _ = terminate => info!("Received SIGTERM, initiating graceful shutdown..."),
    }
}

use std::sync::Arc;

use api::{
    AppState,
    config::{Configuration, StorageBackend},
    error::AppError,
    routes,
};
use axum::{
    Router,
    extract::Request,
    middleware::{Next, from_fn},
    response::Response,
};
use axum_tracing_opentelemetry::middleware::{OtelAxumLayer, OtelInResponseLayer};
use db::{DoctorStore, MemoryDoctorStore, PgDoctorStore};
use eyre::{Context as _, Result};
use init_tracing_opentelemetry::TracingConfig;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_log_error::log_error;

async fn log_app_error(request: Request, next: Next) -> Response {
    let response = next.run(request).await;

    if let Some(err) = response.extensions().get::<Arc<AppError>>() {
        if err.is_server_error() {
            log_error!(**err, "server error");
        }
    }

    response
}

async fn connect_store(config: &Configuration) -> Result<Arc<dyn DoctorStore>> {
    match config.storage {
        StorageBackend::Postgres => {
            let store = PgDoctorStore::connect(&config.store_options())
                .await
                .wrap_err("could not initialize database connection")?;

            Ok(Arc::new(store))
        }
        StorageBackend::Memory => {
            warn!("using in-memory storage, doctors are lost on shutdown");

            Ok(Arc::new(MemoryDoctorStore::new()))
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // load env variables, this is mainly useful for development
    let _ = dotenv::dotenv();

    let config = Configuration::load()?;

    // initialize tracing + opentelemetry
    let tracing_config = if config.is_production() {
        TracingConfig::production()
    } else {
        TracingConfig::development()
    };
    let _guard = tracing_config.init_subscriber()?;

    let store = connect_store(&config).await?;
    let port = config.port;

    let state = AppState {
        config: Arc::new(config),
        store,
    };

    // construct the axum router
    let router = Router::new()
        .merge(routes::build_router())
        .layer(OtelInResponseLayer)
        .layer(OtelAxumLayer::default())
        .layer(TraceLayer::new_for_http())
        // must be after route registration, in order to run correctly
        .layer(from_fn(log_app_error))
        .with_state(state);

    let listener = TcpListener::bind(("0.0.0.0", port))
        .await
        .wrap_err("failed to start listener")?;

    info!(port, "starting HTTP server");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            warn!("shutting down server")
        })
        .await
        .wrap_err("could not start HTTP server")?;

    Ok(())
}

use std::{net::SocketAddr, path::Path, sync::Arc};

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use shared::{
    error::{ApiError, ErrorCode},
    protocol::{AddressLookupQuery, AddressLookupResponse, GET_ADDRESSES_ROUTE},
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod api;
mod app_state;
mod config;

use api::AddressDirectory;
use app_state::AppState;
use config::load_settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = load_settings();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&settings.log_level)),
        )
        .init();

    let directory = match &settings.fixtures_path {
        Some(path) => AddressDirectory::from_file(Path::new(path)).await?,
        None => AddressDirectory::builtin(),
    };
    if directory.is_empty() {
        warn!("address directory is empty; every lookup will return 404");
    }
    info!(entries = directory.len(), "address directory ready");

    let app = build_router(AppState {
        directory: Arc::new(directory),
    });

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, "lookup server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route(GET_ADDRESSES_ROUTE, get(get_addresses))
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn get_addresses(
    State(state): State<AppState>,
    Query(query): Query<AddressLookupQuery>,
) -> Result<Json<AddressLookupResponse>, (StatusCode, Json<ApiError>)> {
    match state.directory.find(&query) {
        Ok(details) => {
            info!(postcode = %query.postcode, count = details.len(), "addresses found");
            Ok(Json(AddressLookupResponse::ok(details)))
        }
        Err(err) => {
            info!(postcode = %query.postcode, error = %err, "address lookup rejected");
            Err((status_for(err.code), Json(err)))
        }
    }
}

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::Validation => StatusCode::BAD_REQUEST,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
    }
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;

mod error;
mod handlers;
mod request_tracing;
mod routes;

use axum::{middleware, routing::get, Router};
use sqlx::{Pool, Sqlite};
use std::net::SocketAddr;

use crate::debts::DebtService;

#[derive(Clone)]
pub struct AppState {
    pub debts: DebtService,
}

impl AppState {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self {
            debts: DebtService::new(pool),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "Backend is running" }))
        .merge(routes::api_routes())
        .layer(middleware::from_fn(request_tracing::request_tracing_middleware))
        .with_state(state)
}

pub async fn run_server(pool: Pool<Sqlite>, addr: SocketAddr) -> anyhow::Result<()> {
    let app = build_router(AppState::new(pool));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}

use crate::config::ServerConfig;
use crate::room::RoomRegistry;
use crate::signaling::{
    DisconnectReconciler, SignalingOutput, SignalingRouter, SignalingService, ws_handler,
};
use anyhow::{Context, Result};
use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use rendezvous_core::DisconnectListener;
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

/// Everything a connection handler needs, owned by the server process.
pub struct AppState {
    pub signaling: SignalingService,
    pub router: SignalingRouter,
    pub reconciler: DisconnectReconciler,
    pub config: ServerConfig,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        let signaling = SignalingService::new(config.ice_servers.clone());
        let output: Arc<dyn SignalingOutput> = Arc::new(signaling.clone());
        let registry = RoomRegistry::new(output.clone());

        Self {
            router: SignalingRouter::new(registry.clone(), output.clone()),
            reconciler: DisconnectReconciler::new(registry, output),
            signaling,
            config,
        }
    }

    pub fn with_listener(mut self, listener: Arc<dyn DisconnectListener>) -> Self {
        self.reconciler = self.reconciler.with_listener(listener);
        self
    }
}

#[derive(Debug, Serialize)]
struct Health {
    rooms: usize,
    connections: usize,
}

async fn health(State(state): State<Arc<AppState>>) -> Json<Health> {
    Json(Health {
        rooms: state.router.registry().room_count(),
        connections: state.signaling.connection_count(),
    })
}

pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/ws", get(ws_handler))
        .route("/health", get(health))
        .layer(cors)
        .with_state(state)
}

pub async fn serve(config: ServerConfig) -> Result<()> {
    let addr = config.bind;
    let state = Arc::new(AppState::new(config));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Signaling server listening on http://{}", addr);

    axum::serve(listener, build_router(state))
        .await
        .context("Signaling server stopped unexpectedly")?;

    Ok(())
}

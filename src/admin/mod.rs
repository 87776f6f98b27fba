//! Admin API: status, on-demand probes, heartbeat control.

pub mod auth;
pub mod handlers;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::driver::Connection;
use crate::replica::GroupRegistry;
use self::auth::admin_auth_middleware;
use self::handlers::*;

/// Shared state for admin handlers.
pub struct AppState<C> {
    pub registry: Arc<GroupRegistry<C>>,
    pub api_key: Arc<str>,
    /// Interval used when a heartbeat start request does not give one.
    pub heartbeat_interval: Duration,
}

impl<C> Clone for AppState<C> {
    fn clone(&self) -> Self {
        Self {
            registry: self.registry.clone(),
            api_key: self.api_key.clone(),
            heartbeat_interval: self.heartbeat_interval,
        }
    }
}

pub fn setup_admin_router<C: Connection>(state: AppState<C>) -> Router {
    Router::new()
        .route("/admin/status", get(get_status::<C>))
        .route("/admin/groups/{group}/status", get(get_group_status::<C>))
        .route("/admin/groups/{group}/probe", post(probe_group::<C>))
        .route(
            "/admin/groups/{group}/heartbeat",
            post(start_heartbeat::<C>).delete(stop_heartbeat::<C>),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            admin_auth_middleware::<C>,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the admin API until `shutdown` resolves.
pub async fn serve<C, F>(listener: TcpListener, state: AppState<C>, shutdown: F) -> std::io::Result<()>
where
    C: Connection,
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    tracing::info!(address = %addr, "Admin API listening");

    axum::serve(listener, setup_admin_router(state))
        .with_graceful_shutdown(shutdown)
        .await?;

    tracing::info!("Admin API stopped");
    Ok(())
}

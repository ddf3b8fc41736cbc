//! Gateway - session and token authentication in front of protected routes

use axum::middleware;
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_users::{CredentialVerifier, InMemoryUserDirectory};
use http_auth::{
    access_gate, spawn_sweeper, GateState, RevocationList, RoutePolicy, SessionStore,
    ShutdownCoordinator, TokenService,
};
use std::sync::Arc;
use tracing::info;

mod api;
mod config;
mod seed;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment);

    // A contradictory prefix set is fatal before the listener opens.
    let policy = Arc::new(RoutePolicy::from_config(&config.policy)?);
    info!(
        protected = ?policy.protected_prefixes(),
        exempt = ?policy.exempt_prefixes(),
        "Route policy validated"
    );

    let revocations = RevocationList::new();
    let sessions = SessionStore::new(config.auth.session_ttl, config.auth.session_sliding);
    let tokens = TokenService::new(
        &config.auth.secret,
        config.auth.access_ttl,
        config.auth.refresh_ttl,
        config.auth.refresh_single_use,
        revocations.clone(),
    );

    let directory = Arc::new(InMemoryUserDirectory::new());
    if config.environment.is_development() {
        seed::seed_dev_users(&directory).await?;
    }
    let verifier = CredentialVerifier::new(directory)?;

    let state = AppState {
        config: config.clone(),
        verifier,
        sessions: sessions.clone(),
        tokens: tokens.clone(),
    };

    let (coordinator, sweeper_shutdown) = ShutdownCoordinator::new();
    let sweeper = spawn_sweeper(
        sessions.clone(),
        revocations,
        config.auth.sweep_interval,
        sweeper_shutdown,
    );

    let gate = GateState {
        policy,
        sessions,
        tokens,
        cookie: config.cookie.clone(),
        mode: config.policy.mode,
        login_redirect: config.policy.login_redirect.clone(),
        resolve_timeout: config.auth.resolve_timeout,
    };

    let app = api::routes(&state)
        .layer(middleware::from_fn_with_state(gate, access_gate))
        .layer(tower_http::trace::TraceLayer::new_for_http());

    let address = config.server.address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!("Gateway listening on {}", address);

    let serve_coordinator = coordinator.clone();
    tokio::spawn(async move { serve_coordinator.wait_for_signal().await });

    let mut serve_shutdown = coordinator.subscribe();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = serve_shutdown.recv().await;
        })
        .await?;

    // The sweeper drains on the same broadcast the serve loop used.
    coordinator.shutdown();
    let _ = sweeper.await;

    info!("Gateway shutdown complete");
    Ok(())
}

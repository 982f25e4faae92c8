pub mod auth;
pub mod error;
pub mod routes;
pub mod state;

use axum::routing::{get, post};
use axum::{middleware, Router};
use tower_http::trace::TraceLayer;

pub use state::AppState;

/// Build the axum Router with all routes and middleware.
/// Used by `serve_on()` and available for integration testing.
pub fn build_router(app_state: AppState) -> Router {
    let slack = Router::new()
        .route("/slack/actions", post(routes::actions::slack_actions))
        .layer(middleware::from_fn_with_state(
            app_state.clone(),
            auth::slack_signature_middleware,
        ));

    Router::new()
        .route("/healthz", get(routes::health::healthz))
        .merge(slack)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

/// Serve the webhook on a pre-bound listener until `shutdown` resolves.
///
/// Accepting a bound `TcpListener` lets the caller read the actual port
/// before starting (useful when `port = 0` and the OS picks a free port).
pub async fn serve_on(
    app_state: AppState,
    listener: tokio::net::TcpListener,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let actual_port = listener.local_addr()?.port();
    let repo = app_state.effector.repo().to_string();
    let signed = app_state.signing_secret.is_some();
    let app = build_router(app_state);

    tracing::info!(
        port = actual_port,
        repo = %repo,
        signature_check = signed,
        "remedy webhook listening on http://localhost:{actual_port}/slack/actions"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

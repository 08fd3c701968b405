//! Web server exposing the registration wizard over HTTP.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::store::RegistrationStore;
use crate::wizard::SharedWizardManager;

use super::handlers;

/// Shared state for web handlers
#[derive(Clone)]
pub struct AppState {
    pub wizards: SharedWizardManager,
    pub store: Arc<dyn RegistrationStore>,
}

/// Start the registration web server.
pub async fn start_web_server(port: u16, state: AppState) -> anyhow::Result<()> {
    // The landing page is served from a different origin; the API must be
    // callable from the browser
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/", get(handlers::health))
        .route("/api/counts", get(handlers::counts))
        .route("/api/wizard", post(handlers::open_wizard))
        .route(
            "/api/wizard/:id",
            get(handlers::snapshot).delete(handlers::close_wizard),
        )
        .route("/api/wizard/:id/field", post(handlers::set_field))
        .route("/api/wizard/:id/next", post(handlers::next_step))
        .route("/api/wizard/:id/previous", post(handlers::previous_step))
        .route("/api/wizard/:id/otp/send", post(handlers::otp_send))
        .route("/api/wizard/:id/otp/verify", post(handlers::otp_verify))
        .route("/api/wizard/:id/screenshot", post(handlers::attach_screenshot))
        .route("/api/wizard/:id/submit", post(handlers::submit))
        .route("/api/wizard/:id/receipt", get(handlers::receipt))
        .layer(cors)
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Registration server listening on http://{}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

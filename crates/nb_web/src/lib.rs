use std::net::SocketAddr;

use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tracing::info;

pub mod error;
pub mod handlers;
pub mod state;

pub use error::{ApiError, UserId, USER_HEADER};
pub use state::AppState;

pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::permissive();

    Router::new()
        .route("/api/configs", get(handlers::list_configs).post(handlers::save_config))
        .route("/api/configs/:id", delete(handlers::delete_config))
        .route("/api/configs/:id/generate", post(handlers::generate_briefing))
        .route("/api/briefings", get(handlers::list_briefings))
        .route("/api/briefings/latest", get(handlers::latest_briefing))
        .route("/api/briefings/:id", delete(handlers::delete_briefing))
        .route("/api/search", post(handlers::search))
        .route("/api/searches", get(handlers::list_searches))
        .route("/api/searches/summarize", post(handlers::summarize_search))
        .route("/api/searches/:id", delete(handlers::delete_search))
        .route("/api/summarize", post(handlers::summarize_article))
        .layer(cors)
        .with_state(state)
}

pub async fn serve(state: AppState, addr: SocketAddr) -> nb_core::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("🌐 Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, create_app(state)).await?;
    Ok(())
}

pub mod prelude {
    pub use crate::{create_app, serve, AppState};
    pub use nb_core::{Error, Result};
}

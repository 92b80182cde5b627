use std::sync::Arc;

use axum::routing::{get, post};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use super::container::Container;
use super::controller;

/// Builds the axum application around a shared [`Container`].
pub struct Router {
    container: Arc<Container>,
}

impl Router {
    pub fn new(container: Arc<Container>) -> Self {
        Self { container }
    }

    pub fn build(self) -> axum::Router {
        let static_files = ServeDir::new(self.container.static_dir());

        axum::Router::new()
            .route("/", get(controller::index))
            .route("/chat", post(controller::chat))
            .route("/health", get(controller::health))
            .nest_service("/static", static_files)
            .layer(TraceLayer::new_for_http())
            .with_state(self.container)
    }
}

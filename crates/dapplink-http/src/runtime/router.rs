//! HTTP router configuration

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::{debug, warn};

use crate::runtime::{
    ChatRuntime, RouterConfig,
    handlers::{chat, health_check},
};

impl ChatRuntime {
    /// Create the router with default options
    pub fn router(self) -> Router {
        self.router_with_config(&RouterConfig::default())
    }

    /// Create the router with custom options
    pub fn router_with_config(self, config: &RouterConfig) -> Router {
        let mut router = Router::new()
            .route("/chat", post(chat))
            .route("/health", get(health_check))
            .with_state(self);

        if let Some(dir) = &config.static_dir {
            if dir.is_dir() {
                debug!(dir = %dir.display(), "Serving static files");
                router = router.fallback_service(ServeDir::new(dir));
            } else {
                warn!(dir = %dir.display(), "Static directory not found, skipping");
            }
        }

        router = router.layer(TraceLayer::new_for_http());

        if config.enable_cors {
            router = router.layer(CorsLayer::permissive());
        }

        router
    }
}

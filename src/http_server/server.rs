//! # HTTP Server
//!
//! Combines the promotion, health, and metrics routers behind one CORS
//! layer and serves them with axum.

use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use super::config::HttpServerConfig;
use super::observability_routes::{health_routes, metrics_routes};
use super::promo_routes::{promo_routes, PromoState};
use crate::observability::{log_event_with_fields, Event};

/// HTTP server for the promotion API
pub struct HttpServer {
    config: HttpServerConfig,
    router: Router,
}

impl HttpServer {
    /// Create a server over shared promotion state
    pub fn with_state(config: HttpServerConfig, state: Arc<PromoState>) -> Self {
        let router = Self::build_router(&config, state);
        Self { config, router }
    }

    /// Build the combined router with all endpoints
    fn build_router(config: &HttpServerConfig, state: Arc<PromoState>) -> Router {
        let cors = if config.cors_origins.is_empty() {
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        } else {
            let origins: Vec<_> = config
                .cors_origins
                .iter()
                .filter_map(|s| s.parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any)
        };

        let metrics = state.manager.metrics_handle();

        Router::new()
            .merge(health_routes())
            .merge(metrics_routes(metrics))
            .nest("/api", promo_routes(state))
            .layer(cors)
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Start the HTTP server
    pub async fn start(self) -> Result<(), std::io::Error> {
        let addr = self.config.socket_addr();
        let listener = TcpListener::bind(&addr).await?;

        log_event_with_fields(Event::Serving, &[("addr", addr.as_str())]);

        axum::serve(listener, self.router).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{JwtConfig, JwtManager};
    use crate::codec::{PromoCodec, PromoKey};
    use crate::promo::PromotionManager;
    use crate::store::InMemoryPromoStore;

    fn state() -> Arc<PromoState> {
        Arc::new(PromoState::new(
            PromotionManager::new(
                InMemoryPromoStore::new(),
                PromoCodec::with_key(PromoKey::generate()),
            ),
            JwtManager::new(JwtConfig::default()),
        ))
    }

    #[test]
    fn test_server_with_custom_port() {
        let config = HttpServerConfig::with_port(8080);
        let server = HttpServer::with_state(config, state());
        assert_eq!(server.socket_addr(), "0.0.0.0:8080");
    }

    #[test]
    fn test_router_builds_with_origin_list() {
        let config = HttpServerConfig {
            cors_origins: vec!["http://localhost:5173".to_string()],
            ..Default::default()
        };
        let _router = HttpServer::with_state(config, state()).router();
    }
}

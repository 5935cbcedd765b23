//! HTTP API server.
//!
//! Thin axum layer over the pipelines; the UI is served from elsewhere, so
//! CORS is open by default.

pub mod handlers;
pub mod routes;

use std::net::SocketAddr;

use axum::http::Method;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

use crate::error::{AppError, Result};

pub use handlers::AppState;
pub use routes::create_router;

/// HTTP API server.
pub struct HttpServer {
    listen_addr: String,
    cors_enabled: bool,
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server.
    pub fn new(state: AppState) -> Self {
        Self {
            listen_addr: state.config.server.listen_addr.clone(),
            cors_enabled: state.config.server.cors_enabled,
            state,
        }
    }

    /// Run the HTTP server until the process is terminated.
    pub async fn run(self) -> Result<()> {
        let addr: SocketAddr = self
            .listen_addr
            .parse()
            .map_err(|e| AppError::server(format!("Invalid listen address: {e}")))?;

        let mut app = create_router(self.state);

        if self.cors_enabled {
            let cors = CorsLayer::new()
                .allow_methods([Method::GET])
                .allow_headers(Any)
                .allow_origin(Any);
            app = app.layer(cors);
        }

        let listener = TcpListener::bind(addr).await?;
        log::info!("HTTP server listening on {}", addr);

        axum::serve(listener, app)
            .await
            .map_err(|e| AppError::server(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use super::*;
    use crate::cache::MemoryCache;
    use crate::models::Config;
    use crate::services::{BrandRegistry, SearchScraper, SiteDiscovery};
    use crate::utils::http::create_async_client;

    fn test_state() -> AppState {
        let config = Arc::new(Config::default());
        let client = create_async_client(&config.scraper).unwrap();
        AppState {
            scraper: Arc::new(
                SearchScraper::new(config.scraper.clone(), config.extractor.clone()).unwrap(),
            ),
            discovery: Arc::new(SiteDiscovery::new(
                config.discovery.clone(),
                BrandRegistry::new(config.brands.clone()),
                client,
            )),
            cache: Arc::new(MemoryCache::new()),
            config,
        }
    }

    #[tokio::test]
    async fn test_search_requires_params() {
        let app = create_router(test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/search?q=batman")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_health() {
        let app = create_router(test_state());

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_search_end_to_end_against_mock_site() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/")
            .match_query(mockito::Matcher::UrlEncoded("s".into(), "batman".into()))
            .with_status(200)
            .with_body(
                r#"<h2 class="entry-title">
                     <a href="https://example.com/batman-begins">Batman Begins</a>
                   </h2>"#,
            )
            .create_async()
            .await;

        let app = create_router(test_state());
        let uri = format!(
            "/search?q=batman&url={}&name=Example",
            url::form_urlencoded::byte_serialize(server.url().as_bytes()).collect::<String>()
        );

        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-cache"], "MISS");
        assert_eq!(response.headers()["x-scrape-status"], "ok");

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["results"][0]["title"], "Batman Begins");
        assert_eq!(json["results"][0]["link"], "https://example.com/batman-begins");
        assert_eq!(json["results"][0]["site"], "Example");
    }
}

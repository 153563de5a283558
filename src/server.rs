use crate::lookup::PaletteCatalog;
use crate::models::Palette;
use axum::{
    extract::{Path, State},
    http::header,
    routing::get,
    Json, Router,
};
use std::path::Path as FsPath;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    catalog: Arc<PaletteCatalog>,
}

impl AppState {
    pub fn new(catalog: PaletteCatalog) -> Self {
        Self {
            catalog: Arc::new(catalog),
        }
    }
}

/// Lookup API plus the static frontend.
pub fn router(state: AppState, frontend_dir: &FsPath) -> Router {
    Router::new()
        .route("/api/palettes/{mood}", get(get_palettes))
        .route("/liveness_check", get(health_check))
        .fallback_service(ServeDir::new(frontend_dir))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
                .expose_headers([header::CONTENT_TYPE]),
        )
        .with_state(state)
}

pub async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down...");
        }
        _ = terminate => {
            info!("Received SIGTERM, shutting down...");
        }
    }
}

async fn health_check() -> &'static str {
    "OK"
}

/// Always 200; unknown moods get `[]`.
async fn get_palettes(
    Path(mood): Path<String>,
    State(state): State<AppState>,
) -> Json<Vec<Palette>> {
    let palettes = state.catalog.lookup(&mood).to_vec();
    info!(
        "Request received for mood: {}. Sending {} palettes.",
        mood,
        palettes.len()
    );
    Json(palettes)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::client::LookupClient;
    use crate::error::FetchError;
    use crate::lookup::MAX_PALETTES_PER_RESPONSE;
    use std::net::SocketAddr;

    pub(crate) fn test_catalog() -> PaletteCatalog {
        PaletteCatalog::from_json(include_str!("../data/palettes.json")).unwrap()
    }

    /// Serve the router on an ephemeral port, returning its base URL.
    pub(crate) async fn spawn_server(catalog: PaletteCatalog) -> String {
        spawn_app(router(AppState::new(catalog), FsPath::new("frontend"))).await
    }

    async fn spawn_app(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
            .await
            .unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_get_palettes_handler() {
        let state = AppState::new(test_catalog());
        let Json(palettes) = get_palettes(Path("Luxury".to_string()), State(state.clone())).await;
        assert_eq!(palettes.len(), MAX_PALETTES_PER_RESPONSE);

        let Json(palettes) = get_palettes(Path("Nostalgia".to_string()), State(state)).await;
        assert!(palettes.is_empty());
    }

    #[tokio::test]
    async fn test_lookup_over_http() {
        let base_url = spawn_server(test_catalog()).await;
        let client = LookupClient::new(&base_url).unwrap();

        let joy = client.fetch_palettes("Joy").await.unwrap();
        assert_eq!(joy.len(), 3);

        let empty = client.fetch_palettes("Sophistication").await.unwrap();
        assert!(empty.is_empty());

        let unknown = client.fetch_palettes("No Such Mood").await.unwrap();
        assert!(unknown.is_empty());
    }

    #[tokio::test]
    async fn test_lookup_error_status() {
        let base_url = spawn_server(test_catalog()).await;
        // Only the static fallback answers under this prefix
        let client = LookupClient::new(&format!("{}/nope", base_url)).unwrap();

        let err = client.fetch_palettes("Joy").await.unwrap_err();
        assert!(matches!(err, FetchError::Status(status) if status == reqwest::StatusCode::NOT_FOUND));
    }

    #[tokio::test]
    async fn test_lookup_rejects_non_palette_body() {
        async fn not_palettes() -> Json<serde_json::Value> {
            Json(serde_json::json!({ "not": "a list" }))
        }
        let base_url = spawn_app(Router::new().route("/api/palettes/{mood}", get(not_palettes))).await;
        let client = LookupClient::new(&base_url).unwrap();

        let err = client.fetch_palettes("Joy").await.unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
    }

    #[tokio::test]
    async fn test_health_check_over_http() {
        let base_url = spawn_server(PaletteCatalog::default()).await;
        let body = reqwest::get(format!("{}/liveness_check", base_url))
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert_eq!(body, "OK");
    }
}

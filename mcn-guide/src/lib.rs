//! mcn-guide library - visitor-facing museum guide service
//!
//! Serves the catalog, enforces scan-before-view access per visitor session,
//! tracks route progress, relays the chat assistant, and streams session
//! events over SSE.

use axum::Router;
use mcn_common::chat::ChatAssistant;
use mcn_common::config::SessionConfig;
use mcn_common::events::EventBus;
use mcn_common::navigation::NavigationController;
use mcn_common::Catalog;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod chat_client;
pub mod error;
pub mod sessions;

use sessions::SessionStore;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub navigation: NavigationController,
    pub sessions: SessionStore,
    pub event_bus: EventBus,
    /// External chat assistant
    pub chat: Arc<dyn ChatAssistant>,
    /// Base of shareable artwork links, without trailing slash
    pub public_base_url: String,
}

impl AppState {
    /// Create new application state
    pub fn new(
        catalog: Arc<Catalog>,
        chat: Arc<dyn ChatAssistant>,
        public_base_url: impl Into<String>,
        session: &SessionConfig,
    ) -> Self {
        let event_bus = EventBus::new(session.event_capacity);
        let sessions = SessionStore::new(
            catalog.clone(),
            event_bus.clone(),
            Duration::from_secs(session.idle_timeout_secs),
        );
        let public_base_url = public_base_url.into().trim_end_matches('/').to_string();

        Self {
            navigation: NavigationController::new(catalog.clone()),
            catalog,
            sessions,
            event_bus,
            chat,
            public_base_url,
        }
    }

    /// Shareable URL of an artwork detail page
    pub fn share_url(&self, artwork_id: &mcn_common::ArtworkId) -> String {
        format!(
            "{}{}",
            self.public_base_url,
            mcn_common::navigation::artwork_path(artwork_id)
        )
    }
}

/// Build application router
///
/// Catalog listings and health are public; everything touching a visitor's
/// access record, progress, scans, or chat requires a session. The detail
/// view alone gates a sessionless request as one with nothing scanned.
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{delete, get, post, put};

    let visitor = Router::new()
        .route(
            "/api/session",
            post(api::create_session)
                .get(api::get_session)
                .delete(api::end_session),
        )
        .route("/api/session/language", put(api::set_language))
        .route("/api/artworks/:id", get(api::get_artwork))
        .route("/api/routes/:id", get(api::get_route))
        .route("/api/routes/:id/start", post(api::start_route))
        .route("/api/routes/:id/seen", post(api::mark_seen))
        .route("/api/routes/:id/progress", get(api::get_progress))
        .route("/api/scan", post(api::submit_code))
        .route("/api/scan/camera", post(api::open_camera_scan))
        .route("/api/scan/camera/:scan_id", delete(api::close_camera_scan))
        .route("/api/scan/camera/:scan_id/decode", post(api::decode_camera_frame))
        .route("/api/scan/camera/:scan_id/denied", post(api::camera_denied))
        .route(
            "/api/chat",
            get(api::get_chat)
                .post(api::send_chat)
                .delete(api::reset_chat),
        )
        .route("/api/events", get(api::event_stream));

    let public = Router::new()
        .route("/api/artworks", get(api::list_artworks))
        .route("/api/catalog/facets", get(api::get_facets))
        .route("/api/routes", get(api::list_routes))
        .merge(api::health_routes());

    Router::new()
        .merge(visitor)
        .merge(public)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

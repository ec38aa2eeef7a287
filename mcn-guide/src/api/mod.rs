//! HTTP API handlers for mcn-guide

pub mod artworks;
pub mod chat;
pub mod health;
pub mod routes;
pub mod scan;
pub mod session;
pub mod sse;

pub use artworks::{get_artwork, get_facets, list_artworks};
pub use chat::{get_chat, reset_chat, send_chat};
pub use health::health_routes;
pub use routes::{get_progress, get_route, list_routes, mark_seen, start_route};
pub use scan::{camera_denied, close_camera_scan, decode_camera_frame, open_camera_scan, submit_code};
pub use session::{create_session, end_session, get_session, set_language, Visitor};
pub use sse::event_stream;

use mcn_common::Language;

use crate::error::{ApiError, ApiResult};

/// Language from a `lang` query value, else `fallback`
pub(crate) fn resolve_language(requested: Option<&str>, fallback: Language) -> ApiResult<Language> {
    match requested {
        Some(code) if !code.trim().is_empty() => code
            .parse()
            .map_err(|e: mcn_common::Error| ApiError::BadRequest(e.to_string())),
        _ => Ok(fallback),
    }
}

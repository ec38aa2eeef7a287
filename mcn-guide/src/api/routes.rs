//! Thematic route endpoints and per-session progress

use axum::{
    extract::{Path, Query, State},
    Json,
};
use mcn_common::navigation::{self, RouteDecision};
use mcn_common::progress::{MarkSeen, ProgressSnapshot};
use mcn_common::{ArtworkId, Language, RouteId};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::artworks::{ArtworkSummary, LangQuery};
use super::resolve_language;
use super::session::Visitor;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct RouteSummary {
    pub id: RouteId,
    pub title: String,
    pub description: String,
    pub artwork_count: usize,
}

#[derive(Debug, Serialize)]
pub struct RouteListResponse {
    pub language: Language,
    pub routes: Vec<RouteSummary>,
}

/// One stop on a route, flagged once the visitor marks it seen
#[derive(Debug, Serialize)]
pub struct RouteStop {
    #[serde(flatten)]
    pub artwork: ArtworkSummary,
    pub completed: bool,
}

#[derive(Debug, Serialize)]
pub struct RouteDetail {
    pub id: RouteId,
    pub language: Language,
    pub title: String,
    pub description: String,
    pub artworks: Vec<RouteStop>,
    pub progress: ProgressSnapshot,
    pub is_complete: bool,
}

#[derive(Debug, Serialize)]
pub struct ProgressResponse {
    pub route_id: RouteId,
    #[serde(flatten)]
    pub progress: ProgressSnapshot,
    pub is_complete: bool,
}

#[derive(Debug, Deserialize)]
pub struct MarkSeenRequest {
    pub artwork_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkSeenStatus {
    Recorded,
    AlreadySeen,
    NotOnRoute,
}

#[derive(Debug, Serialize)]
pub struct MarkSeenResponse {
    pub route_id: RouteId,
    pub artwork_id: ArtworkId,
    pub status: MarkSeenStatus,
    #[serde(flatten)]
    pub progress: ProgressSnapshot,
    pub is_complete: bool,
    /// One-time acknowledgment, present only on the mark that first completed the route
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

fn route_not_found(id: &str, language: Language) -> ApiError {
    ApiError::NotFound(navigation::route_not_found(id, language))
}

/// GET /api/routes?lang=
pub async fn list_routes(
    State(state): State<AppState>,
    Query(query): Query<LangQuery>,
) -> ApiResult<Json<RouteListResponse>> {
    let language = resolve_language(query.lang.as_deref(), Language::DEFAULT)?;
    let routes = state
        .catalog
        .routes()
        .iter()
        .map(|route| {
            let text = route.text(language);
            RouteSummary {
                id: route.id.clone(),
                title: text.map(|t| t.title.clone()).unwrap_or_default(),
                description: text.map(|t| t.description.clone()).unwrap_or_default(),
                artwork_count: state.catalog.route_members(route).len(),
            }
        })
        .collect();

    Ok(Json(RouteListResponse { language, routes }))
}

/// GET /api/routes/:id?lang=
///
/// Artworks come back in route order; references missing from the catalog
/// are skipped.
pub async fn get_route(
    State(state): State<AppState>,
    visitor: Visitor,
    Path(id): Path<String>,
    Query(query): Query<LangQuery>,
) -> ApiResult<Json<RouteDetail>> {
    let session = visitor.session.lock().await;
    let language = resolve_language(query.lang.as_deref(), session.language)?;

    let route = match state.navigation.request_route(&id, language) {
        RouteDecision::Render(route) => route,
        RouteDecision::NotFound(not_found) => return Err(ApiError::NotFound(not_found)),
    };
    let progress = session
        .tracker
        .progress(&route.id)
        .unwrap_or_else(|| ProgressSnapshot::new(0, 0));

    let artworks = state
        .catalog
        .artworks_for_route(route)
        .into_iter()
        .map(|artwork| RouteStop {
            completed: session.tracker.is_seen(&route.id, &artwork.id),
            artwork: ArtworkSummary::new(artwork, language),
        })
        .collect();

    let text = route.text(language);
    Ok(Json(RouteDetail {
        id: route.id.clone(),
        language,
        title: text.map(|t| t.title.clone()).unwrap_or_default(),
        description: text.map(|t| t.description.clone()).unwrap_or_default(),
        artworks,
        is_complete: progress.is_complete(),
        progress,
    }))
}

/// POST /api/routes/:id/start
///
/// Begins a fresh viewing: progress for the route starts empty again.
pub async fn start_route(
    visitor: Visitor,
    Path(id): Path<String>,
) -> ApiResult<Json<ProgressResponse>> {
    let mut session = visitor.session.lock().await;
    let route_id = RouteId::new(id.as_str());
    match session.tracker.begin(&route_id) {
        Some(progress) => Ok(Json(ProgressResponse {
            route_id,
            is_complete: progress.is_complete(),
            progress,
        })),
        None => Err(route_not_found(&id, session.language)),
    }
}

/// POST /api/routes/:id/seen
///
/// Marking an artwork that is not on the route changes nothing. Marking it
/// twice changes nothing.
pub async fn mark_seen(
    visitor: Visitor,
    Path(id): Path<String>,
    Json(req): Json<MarkSeenRequest>,
) -> ApiResult<Json<MarkSeenResponse>> {
    let mut session = visitor.session.lock().await;
    let route_id = RouteId::new(id.as_str());
    let artwork_id = ArtworkId::new(req.artwork_id.trim());

    let (outcome, notice) = session.mark_seen(&route_id, &artwork_id);
    let (status, progress) = match outcome {
        MarkSeen::UnknownRoute => return Err(route_not_found(&id, session.language)),
        MarkSeen::Recorded(p) => (MarkSeenStatus::Recorded, p),
        MarkSeen::AlreadySeen(p) => (MarkSeenStatus::AlreadySeen, p),
        MarkSeen::NotOnRoute(p) => (MarkSeenStatus::NotOnRoute, p),
    };
    debug!(session_id = %visitor.id, route_id = %route_id, artwork_id = %artwork_id, ?status, "Mark seen");

    Ok(Json(MarkSeenResponse {
        route_id,
        artwork_id,
        status,
        is_complete: progress.is_complete(),
        progress,
        notice,
    }))
}

/// GET /api/routes/:id/progress
pub async fn get_progress(
    visitor: Visitor,
    Path(id): Path<String>,
) -> ApiResult<Json<ProgressResponse>> {
    let session = visitor.session.lock().await;
    let route_id = RouteId::new(id.as_str());
    match session.tracker.progress(&route_id) {
        Some(progress) => Ok(Json(ProgressResponse {
            route_id,
            is_complete: progress.is_complete(),
            progress,
        })),
        None => Err(route_not_found(&id, session.language)),
    }
}

//! Artwork endpoints: gallery listing, floor-plan filtering, detail view
//!
//! Listings are public card summaries. The detail view is gated: an artwork
//! the session has not scanned answers with a redirect to the scanner. A
//! request without a live session is gated as one with nothing scanned.

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use mcn_common::access::AccessGate;
use mcn_common::catalog::{Artwork, CategoryFilter, Location, ALL_CATEGORIES};
use mcn_common::navigation::DetailDecision;
use mcn_common::{ArtworkId, Language};
use serde::{Deserialize, Serialize};

use super::resolve_language;
use super::session::Visitor;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ArtworkQuery {
    pub category: Option<String>,
    pub floor: Option<String>,
    pub lang: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LangQuery {
    pub lang: Option<String>,
}

/// Gallery card / map marker
#[derive(Debug, Serialize)]
pub struct ArtworkSummary {
    pub id: ArtworkId,
    pub title: String,
    pub image: String,
    pub category: String,
    pub period: String,
    pub has_audio: bool,
    pub has_ar: bool,
    pub location: Location,
}

impl ArtworkSummary {
    pub fn new(artwork: &Artwork, language: Language) -> Self {
        Self {
            id: artwork.id.clone(),
            title: artwork
                .text(language)
                .map(|text| text.title.clone())
                .unwrap_or_default(),
            image: artwork.image.clone(),
            category: artwork.category.clone(),
            period: artwork.period.clone(),
            has_audio: artwork.has_audio,
            has_ar: artwork.has_ar,
            location: artwork.location.clone(),
        }
    }
}

/// Full detail, only served once the artwork is unlocked
#[derive(Debug, Serialize)]
pub struct ArtworkDetail {
    #[serde(flatten)]
    pub summary: ArtworkSummary,
    pub language: Language,
    pub description: String,
    pub history: String,
    pub share_url: String,
}

#[derive(Debug, Serialize)]
pub struct ArtworkListResponse {
    pub language: Language,
    pub category: String,
    pub floor: Option<String>,
    pub artworks: Vec<ArtworkSummary>,
}

#[derive(Debug, Serialize)]
pub struct FacetsResponse {
    pub categories: Vec<String>,
    pub floors: Vec<String>,
}

/// GET /api/artworks?category=&floor=&lang=
///
/// Category defaults to "all". Results keep catalog order.
pub async fn list_artworks(
    State(state): State<AppState>,
    Query(query): Query<ArtworkQuery>,
) -> ApiResult<Json<ArtworkListResponse>> {
    let language = resolve_language(query.lang.as_deref(), Language::DEFAULT)?;
    let category = query
        .category
        .filter(|c| !c.trim().is_empty())
        .unwrap_or_else(|| ALL_CATEGORIES.to_string());
    let floor = query.floor.filter(|f| !f.trim().is_empty());

    let artworks = state
        .catalog
        .artworks_by_category(&CategoryFilter::parse(&category))
        .into_iter()
        .filter(|artwork| floor.as_deref().map_or(true, |f| artwork.location.floor == f))
        .map(|artwork| ArtworkSummary::new(artwork, language))
        .collect();

    Ok(Json(ArtworkListResponse {
        language,
        category,
        floor,
        artworks,
    }))
}

/// GET /api/catalog/facets
///
/// Distinct categories and floors, first-seen order.
pub async fn get_facets(State(state): State<AppState>) -> Json<FacetsResponse> {
    Json(FacetsResponse {
        categories: state.catalog.categories().into_iter().map(String::from).collect(),
        floors: state.catalog.floors().into_iter().map(String::from).collect(),
    })
}

/// GET /api/artworks/:id?lang=
///
/// - unknown id: 404 with a link back to the gallery
/// - not scanned in this session, or no session: 303 to the scanner,
///   replacing history
/// - scanned: 200 with the localized detail
pub async fn get_artwork(
    State(state): State<AppState>,
    visitor: Option<Visitor>,
    Path(id): Path<String>,
    Query(query): Query<LangQuery>,
) -> ApiResult<Response> {
    let session = match &visitor {
        Some(visitor) => Some(visitor.session.lock().await),
        None => None,
    };
    let anonymous;
    let (gate, session_language) = match &session {
        Some(session) => (&session.gate, session.language),
        None => {
            anonymous = AccessGate::new(state.catalog.clone());
            (&anonymous, Language::DEFAULT)
        }
    };
    let language = resolve_language(query.lang.as_deref(), session_language)?;

    match state.navigation.request_detail(gate, &id, language) {
        DetailDecision::NotFound(not_found) => Err(ApiError::NotFound(not_found)),
        DetailDecision::Redirect(redirect) => Ok((
            StatusCode::SEE_OTHER,
            [(header::LOCATION, redirect.location.clone())],
            Json(redirect),
        )
            .into_response()),
        DetailDecision::Render(artwork) => {
            let text = artwork.text(language);
            let detail = ArtworkDetail {
                summary: ArtworkSummary::new(artwork, language),
                language,
                description: text.map(|t| t.description.clone()).unwrap_or_default(),
                history: text.map(|t| t.history.clone()).unwrap_or_default(),
                share_url: state.share_url(&artwork.id),
            };
            Ok(Json(detail).into_response())
        }
    }
}

//! Visitor session endpoints and the session extractor
//!
//! A request names its session with the `x-mcn-session` header or the
//! `mcn_session` cookie set when the session is created.

use axum::{
    extract::{FromRequestParts, State},
    http::{header, request::Parts, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use mcn_common::access::AccessState;
use mcn_common::{ArtworkId, Language};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::sessions::{SharedSession, VisitorSession};
use crate::AppState;

pub const SESSION_HEADER: &str = "x-mcn-session";
pub const SESSION_COOKIE: &str = "mcn_session";

/// Session attached to the current request
///
/// Rejects with 401 `SESSION_REQUIRED` when the request names no live session.
pub struct Visitor {
    pub id: Uuid,
    pub session: SharedSession,
}

#[axum::async_trait]
impl FromRequestParts<AppState> for Visitor {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let id = session_id_from_headers(&parts.headers).ok_or(ApiError::SessionRequired)?;
        let session = state
            .sessions
            .get(&id)
            .await
            .ok_or(ApiError::SessionRequired)?;
        Ok(Visitor { id, session })
    }
}

/// Session id from the header, else the cookie
pub fn session_id_from_headers(headers: &HeaderMap) -> Option<Uuid> {
    if let Some(value) = headers.get(SESSION_HEADER).and_then(|v| v.to_str().ok()) {
        return Uuid::parse_str(value.trim()).ok();
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok())
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateSessionRequest {
    pub language: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LanguageRequest {
    pub language: String,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: Uuid,
    pub language: Language,
    /// Artworks unlocked in this session, sorted
    pub granted: Vec<ArtworkId>,
    /// Gate state of every catalog artwork, in catalog order
    pub access: Vec<AccessEntry>,
}

/// Access state of one artwork, for clients rendering locked cards
#[derive(Debug, Serialize)]
pub struct AccessEntry {
    pub artwork_id: ArtworkId,
    pub state: AccessState,
}

fn session_response(session: &VisitorSession) -> SessionResponse {
    let gate = &session.gate;
    SessionResponse {
        session_id: session.id(),
        language: session.language,
        granted: gate.record().granted().into_iter().cloned().collect(),
        access: gate
            .catalog()
            .artworks()
            .iter()
            .map(|artwork| AccessEntry {
                artwork_id: artwork.id.clone(),
                state: gate.state(&artwork.id),
            })
            .collect(),
    }
}

/// POST /api/session
///
/// Starts a session with an empty access record.
pub async fn create_session(
    State(state): State<AppState>,
    body: Option<Json<CreateSessionRequest>>,
) -> ApiResult<impl IntoResponse> {
    let requested = body.and_then(|Json(req)| req.language);
    let language = super::resolve_language(requested.as_deref(), Language::DEFAULT)?;

    let (session_id, session) = state.sessions.create(language).await;
    let body = session_response(&*session.lock().await);
    let cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax",
        SESSION_COOKIE, session_id
    );

    Ok((
        StatusCode::CREATED,
        [(header::SET_COOKIE, cookie)],
        Json(body),
    ))
}

/// GET /api/session
pub async fn get_session(visitor: Visitor) -> Json<SessionResponse> {
    Json(session_response(&*visitor.session.lock().await))
}

/// PUT /api/session/language
///
/// Later responses and notices use the new language. The chat history is
/// kept as is.
pub async fn set_language(
    visitor: Visitor,
    Json(req): Json<LanguageRequest>,
) -> ApiResult<Json<SessionResponse>> {
    let language = super::resolve_language(Some(&req.language), Language::DEFAULT)?;
    let mut session = visitor.session.lock().await;
    session.language = language;
    info!(session_id = %visitor.id, language = %language, "Session language changed");

    Ok(Json(session_response(&session)))
}

/// DELETE /api/session
///
/// Ends the session; every grant, progress record, and open scan goes with it.
pub async fn end_session(State(state): State<AppState>, visitor: Visitor) -> StatusCode {
    state.sessions.remove(&visitor.id).await;
    StatusCode::NO_CONTENT
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_session_id_from_header() {
        let id = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert(SESSION_HEADER, HeaderValue::from_str(&id.to_string()).unwrap());
        assert_eq!(session_id_from_headers(&headers), Some(id));
    }

    #[test]
    fn test_session_id_from_cookie() {
        let id = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("theme=dark; {}={}", SESSION_COOKIE, id)).unwrap(),
        );
        assert_eq!(session_id_from_headers(&headers), Some(id));
    }

    #[test]
    fn test_malformed_session_id() {
        let mut headers = HeaderMap::new();
        headers.insert(SESSION_HEADER, HeaderValue::from_static("not-a-uuid"));
        assert_eq!(session_id_from_headers(&headers), None);
        assert_eq!(session_id_from_headers(&HeaderMap::new()), None);
    }
}

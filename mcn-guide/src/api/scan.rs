//! Scan endpoints: manual code entry and camera scan sessions
//!
//! Both paths go through the same code validation. A camera scan accepts
//! the first valid code only; later decode events for it are ignored.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use mcn_common::navigation::ScanDecision;
use mcn_common::scan::{DecodeOutcome, ScanState};
use mcn_common::{messages, ArtworkId, CollaboratorFailure};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use super::session::Visitor;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CodeRequest {
    pub code: String,
}

#[derive(Debug, Deserialize)]
pub struct DecodeRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct GrantResponse {
    pub artwork_id: ArtworkId,
    /// False when the session had already unlocked this artwork
    pub newly_granted: bool,
    pub navigate_to: String,
}

#[derive(Debug, Serialize)]
pub struct ScanOpenedResponse {
    pub scan_id: Uuid,
    #[serde(flatten)]
    pub state: ScanState,
}

#[derive(Debug, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DecodeResponse {
    /// The scan already ended; nothing happened
    Ignored { scan_id: Uuid },
    Accepted {
        scan_id: Uuid,
        artwork_id: ArtworkId,
        navigate_to: String,
    },
}

/// POST /api/scan
///
/// Manual entry of an artwork number or a scanned URL.
pub async fn submit_code(
    State(state): State<AppState>,
    visitor: Visitor,
    Json(req): Json<CodeRequest>,
) -> ApiResult<Json<GrantResponse>> {
    let mut guard = visitor.session.lock().await;
    let session = &mut *guard;
    let language = session.language;

    match state.navigation.submit_code(&mut session.gate, &req.code, language) {
        ScanDecision::Granted {
            artwork_id,
            newly_granted,
            navigate_to,
        } => {
            if newly_granted {
                session.announce_access(&artwork_id);
            }
            Ok(Json(GrantResponse {
                artwork_id,
                newly_granted,
                navigate_to,
            }))
        }
        ScanDecision::Invalid { candidate, message } => {
            Err(ApiError::InvalidCode { candidate, message })
        }
    }
}

/// POST /api/scan/camera
///
/// Called once the browser holds the camera.
pub async fn open_camera_scan(visitor: Visitor) -> (StatusCode, Json<ScanOpenedResponse>) {
    let mut session = visitor.session.lock().await;
    let scan_id = session.open_scan();
    info!(session_id = %visitor.id, scan_id = %scan_id, "Camera scan opened");
    (
        StatusCode::CREATED,
        Json(ScanOpenedResponse {
            scan_id,
            state: ScanState::Scanning,
        }),
    )
}

/// POST /api/scan/camera/:scan_id/decode
///
/// An invalid code answers 422 and the scan keeps running.
pub async fn decode_camera_frame(
    State(state): State<AppState>,
    visitor: Visitor,
    Path(scan_id): Path<Uuid>,
    Json(req): Json<DecodeRequest>,
) -> ApiResult<Json<DecodeResponse>> {
    let mut guard = visitor.session.lock().await;
    let session = &mut *guard;
    let language = session.language;

    let scan = session
        .scans
        .get_mut(&scan_id)
        .ok_or_else(|| ApiError::ScanNotFound(scan_id.to_string()))?;

    match scan.on_decoded(&req.text, &state.navigation, &mut session.gate, language) {
        DecodeOutcome::Ignored => Ok(Json(DecodeResponse::Ignored { scan_id })),
        DecodeOutcome::Invalid { candidate, message } => {
            Err(ApiError::InvalidCode { candidate, message })
        }
        DecodeOutcome::Accepted {
            artwork_id,
            navigate_to,
        } => {
            session.announce_access(&artwork_id);
            Ok(Json(DecodeResponse::Accepted {
                scan_id,
                artwork_id,
                navigate_to,
            }))
        }
    }
}

/// DELETE /api/scan/camera/:scan_id
///
/// Leaving the scanner; the camera is released if still held.
pub async fn close_camera_scan(
    visitor: Visitor,
    Path(scan_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let mut session = visitor.session.lock().await;
    if session.close_scan(&scan_id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::ScanNotFound(scan_id.to_string()))
    }
}

/// POST /api/scan/camera/:scan_id/denied
///
/// The browser could not use the camera. The scan is closed and the visitor
/// is pointed at manual entry.
pub async fn camera_denied(
    visitor: Visitor,
    Path(scan_id): Path<Uuid>,
) -> ApiError {
    let mut session = visitor.session.lock().await;
    session.close_scan(&scan_id);
    warn!(session_id = %visitor.id, scan_id = %scan_id, "Camera permission denied");

    ApiError::Collaborator {
        failure: CollaboratorFailure::CameraPermissionDenied,
        message: messages::camera_unavailable(session.language).to_string(),
    }
}

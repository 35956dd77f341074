//! Wizard session handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::{info, warn};
use validator::Validate;

use core_kernel::{OperationMetadata, SessionId};
use domain_claims::{ClaimRecord, ClaimRecordPort, Transition, WizardController};

use crate::dto::wizard::{AnswerPatchRequest, OpenBranchRequest, RouteView, WizardView};
use crate::error::ApiError;
use crate::AppState;

fn parse_session_id(raw: &str) -> Result<SessionId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::BadRequest(format!("invalid session id: {raw}")))
}

fn unknown_session(id: SessionId) -> ApiError {
    ApiError::NotFound(format!("wizard session {id}"))
}

/// Starts a new wizard session
pub async fn create_wizard(
    State(state): State<AppState>,
) -> (StatusCode, Json<WizardView>) {
    let wizard = WizardController::new(state.resolver.clone());
    let initial = wizard.clone();
    let id = state.sessions.insert(wizard).await;

    info!(session_id = %id, "wizard session started");

    (StatusCode::CREATED, Json(WizardView::new(id, &initial)))
}

/// Returns the current state of a session
pub async fn get_wizard(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<WizardView>, ApiError> {
    let id = parse_session_id(&raw_id)?;
    state
        .sessions
        .inspect(id, |wizard| WizardView::new(id, wizard))
        .await
        .map(Json)
        .ok_or_else(|| unknown_session(id))
}

/// Merges answers into a session
pub async fn update_answers(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    Json(req): Json<AnswerPatchRequest>,
) -> Result<Json<WizardView>, ApiError> {
    let id = parse_session_id(&raw_id)?;
    req.validate()?;

    let view = state
        .sessions
        .with_session(id, |wizard| {
            wizard.update_answers(req.into())?;
            Ok::<_, ApiError>(WizardView::new(id, wizard))
        })
        .await
        .ok_or_else(|| unknown_session(id))??;

    Ok(Json(view))
}

/// Moves to the next step, or routes and completes the claim on the last one
///
/// A completed session is handed to the claim store and discarded; the
/// returned view is its final state.
pub async fn advance(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<WizardView>, ApiError> {
    let id = parse_session_id(&raw_id)?;

    let (view, completed) = state
        .sessions
        .with_session(id, |wizard| {
            let transition = wizard.advance()?;
            let completed = match transition {
                Transition::Completed(_) => wizard.completed_claim(),
                Transition::Moved(_) => None,
            };
            Ok::<_, ApiError>((WizardView::new(id, wizard), completed))
        })
        .await
        .ok_or_else(|| unknown_session(id))??;

    if let Some(record) = completed {
        store_completed_claim(&state, id, record);
        state.sessions.remove(id).await;
    }

    Ok(Json(view))
}

/// Hands a completed claim to the record port without blocking the response
fn store_completed_claim(state: &AppState, session_id: SessionId, record: ClaimRecord) {
    let claims = state.claims.clone();
    let metadata = OperationMetadata::with_correlation_id(session_id.to_string());

    info!(
        session_id = %session_id,
        claim_id = %record.id,
        route = %record.route.route,
        "claim routed"
    );

    tokio::spawn(async move {
        if let Err(err) = claims.save_claim(&record, &metadata).await {
            warn!(claim_id = %record.id, error = %err, "failed to store completed claim");
        }
    });
}

/// Moves back one step
pub async fn retreat(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<WizardView>, ApiError> {
    let id = parse_session_id(&raw_id)?;

    let view = state
        .sessions
        .with_session(id, |wizard| {
            wizard.retreat()?;
            Ok::<_, ApiError>(WizardView::new(id, wizard))
        })
        .await
        .ok_or_else(|| unknown_session(id))??;

    Ok(Json(view))
}

/// Opens a branch screen over the current step
pub async fn open_branch(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    Json(req): Json<OpenBranchRequest>,
) -> Result<Json<WizardView>, ApiError> {
    let id = parse_session_id(&raw_id)?;

    let view = state
        .sessions
        .with_session(id, |wizard| {
            wizard.open_branch_screen(req.kind)?;
            Ok::<_, ApiError>(WizardView::new(id, wizard))
        })
        .await
        .ok_or_else(|| unknown_session(id))??;

    Ok(Json(view))
}

/// Closes the open branch screen
pub async fn close_branch(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<WizardView>, ApiError> {
    let id = parse_session_id(&raw_id)?;

    let view = state
        .sessions
        .with_session(id, |wizard| {
            wizard.close_branch()?;
            Ok::<_, ApiError>(WizardView::new(id, wizard))
        })
        .await
        .ok_or_else(|| unknown_session(id))??;

    Ok(Json(view))
}

/// Resolves the route for the current answers without changing the session
pub async fn preview_route(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<RouteView>, ApiError> {
    let id = parse_session_id(&raw_id)?;

    let result = state
        .sessions
        .inspect(id, |wizard| wizard.preview_route())
        .await
        .ok_or_else(|| unknown_session(id))??;

    Ok(Json(RouteView::from(&result)))
}

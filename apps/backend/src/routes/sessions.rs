//! Session-related HTTP routes.
//!
//! All writes are forwarded to the session actor that owns the game state;
//! handlers never touch round state directly.

use actix_web::{web, HttpResponse, Result};
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::cards::RoleLens;
use crate::domain::state::SelectionInput;
use crate::error::AppError;
use crate::state::app_state::AppState;

#[derive(Debug, Deserialize)]
struct SelectLensRequest {
    participant_id: Uuid,
    lens: RoleLens,
}

#[derive(Debug, Deserialize)]
struct SubmitRequest {
    participant_id: Uuid,
    #[serde(flatten)]
    selection: SelectionInput,
}

#[derive(Debug, Deserialize)]
struct LeaveSessionRequest {
    participant_id: Uuid,
}

/// POST /api/sessions/{session_id}/lens
async fn select_lens(
    path: web::Path<Uuid>,
    body: web::Json<SelectLensRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let session_id = path.into_inner();
    app_state
        .rooms()
        .select_lens(session_id, body.participant_id, body.lens)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// POST /api/sessions/{session_id}/submit
///
/// Locks in the caller's selection for the current round. The receipt holds
/// the server-assigned rank; nobody learns anyone else's selection until
/// the reveal.
async fn submit(
    path: web::Path<Uuid>,
    body: web::Json<SubmitRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let session_id = path.into_inner();
    let body = body.into_inner();
    let receipt = app_state
        .rooms()
        .submit(session_id, body.participant_id, body.selection)
        .await?;
    Ok(HttpResponse::Ok().json(receipt))
}

/// POST /api/sessions/{session_id}/leave
async fn leave_session(
    path: web::Path<Uuid>,
    body: web::Json<LeaveSessionRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let session_id = path.into_inner();
    let outcome = app_state
        .rooms()
        .leave_session(session_id, body.participant_id)
        .await?;
    Ok(HttpResponse::Ok().json(outcome))
}

/// GET /api/sessions/{session_id}/status
async fn session_status(
    path: web::Path<Uuid>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let session_id = path.into_inner();
    let status = app_state.rooms().session_status(session_id).await?;
    Ok(HttpResponse::Ok().json(status))
}

/// GET /api/sessions/{session_id}/leaderboard
///
/// Works for live and archived sessions alike.
async fn leaderboard(
    path: web::Path<Uuid>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let session_id = path.into_inner();
    let entries = app_state.rooms().leaderboard(session_id).await?;
    Ok(HttpResponse::Ok().json(entries))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/{session_id}/lens").route(web::post().to(select_lens)));
    cfg.service(web::resource("/{session_id}/submit").route(web::post().to(submit)));
    cfg.service(web::resource("/{session_id}/leave").route(web::post().to(leave_session)));
    cfg.service(web::resource("/{session_id}/status").route(web::get().to(session_status)));
    cfg.service(web::resource("/{session_id}/leaderboard").route(web::get().to(leaderboard)));
}

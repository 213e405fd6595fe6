//! Room-related HTTP routes.

use actix_web::{web, HttpResponse, Result};
use serde::Deserialize;

use crate::error::AppError;
use crate::state::app_state::AppState;

#[derive(Debug, Deserialize)]
struct JoinRoomRequest {
    display_name: String,
}

#[derive(Debug, Deserialize)]
struct LeaveRoomRequest {
    display_name: String,
}

/// POST /api/rooms/{room_id}/join
///
/// Joins (or rejoins) a perpetual room under a display name. A dormant room
/// wakes up and starts a game; a room mid-round queues the caller for the
/// next intermission instead of failing.
async fn join_room(
    path: web::Path<i64>,
    body: web::Json<JoinRoomRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let room_id = path.into_inner();
    let receipt = app_state
        .rooms()
        .join_room(room_id, &body.display_name)
        .await?;
    Ok(HttpResponse::Ok().json(receipt))
}

/// POST /api/rooms/{room_id}/leave
///
/// Idempotent; leaving a room you never joined reports `left: false`.
async fn leave_room(
    path: web::Path<i64>,
    body: web::Json<LeaveRoomRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let room_id = path.into_inner();
    let left = app_state
        .rooms()
        .leave_room(room_id, &body.display_name)
        .await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "left": left })))
}

/// GET /api/rooms/{room_id}/status
async fn room_status(
    path: web::Path<i64>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let room_id = path.into_inner();
    let status = app_state.rooms().room_status(room_id).await?;
    Ok(HttpResponse::Ok().json(status))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/{room_id}/join").route(web::post().to(join_room)));
    cfg.service(web::resource("/{room_id}/leave").route(web::post().to(leave_room)));
    cfg.service(web::resource("/{room_id}/status").route(web::get().to(room_status)));
}

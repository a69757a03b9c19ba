//! Session pull interfaces and lobby actions over HTTP.

use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::domain::Team;
use crate::error::AppError;
use crate::extractors::current_user::CurrentUser;
use crate::services::game_flow::SessionSnapshot;
use crate::state::app_state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JoinRequest {
    team: String,
    #[serde(default)]
    expected_version: Option<i32>,
}

async fn create_session(
    user: CurrentUser,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let snapshot = app_state.game_flow.create_session(&user.username).await?;
    Ok(HttpResponse::Created().json(snapshot))
}

async fn join_session(
    user: CurrentUser,
    path: web::Path<String>,
    body: web::Json<JoinRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let session_id = path.into_inner();
    let team = body.team.parse::<Team>()?;
    let outcome = app_state
        .game_flow
        .join_session(&session_id, &user.username, team, body.expected_version)
        .await?;
    Ok(HttpResponse::Ok().json(SessionSnapshot::new(&outcome.session, outcome.version)))
}

async fn get_session(
    _user: CurrentUser,
    path: web::Path<String>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let snapshot = app_state.game_flow.session_snapshot(&path).await?;
    Ok(HttpResponse::Ok().json(snapshot))
}

async fn get_round(
    user: CurrentUser,
    path: web::Path<String>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let view = app_state
        .game_flow
        .round_view(&path, &user.username)
        .await?;
    Ok(HttpResponse::Ok().json(view))
}

async fn get_moves(
    user: CurrentUser,
    path: web::Path<(String, u32)>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let (session_id, round_no) = path.into_inner();
    let moves = app_state
        .game_flow
        .move_log(&session_id, &user.username, round_no)
        .await?;
    Ok(HttpResponse::Ok().json(moves))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("", web::post().to(create_session))
        .route("/{session_id}", web::get().to(get_session))
        .route("/{session_id}/join", web::put().to(join_session))
        .route("/{session_id}/round", web::get().to(get_round))
        .route(
            "/{session_id}/rounds/{round_no}/moves",
            web::get().to(get_moves),
        );
}

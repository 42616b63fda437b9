use crate::dtos::{CreateRoomRequest, ListResponse, RoomListParams, UpdateRoomRequest};
use crate::middleware::{MaybeUser, RootUser};
use crate::models::Room;
use crate::startup::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use service_core::error::AppError;
use uuid::Uuid;
use validator::Validate;

fn room_not_found(room_id: Uuid) -> AppError {
    AppError::NotFound(anyhow::anyhow!("Room {} not found", room_id))
}

/// Active rooms for visitors; staff may pass `?all=true` to include closed rooms.
pub async fn list_rooms(
    State(state): State<AppState>,
    user: MaybeUser,
    Query(params): Query<RoomListParams>,
) -> Result<Json<ListResponse<Room>>, AppError> {
    params.validate()?;
    let page = params.pagination();
    let active_only = !(params.all && user.is_staff());

    let rooms = state
        .db
        .list_rooms(active_only, page.limit(), page.offset())
        .await?;

    Ok(Json(ListResponse::new(rooms, page)))
}

pub async fn get_room(
    State(state): State<AppState>,
    user: MaybeUser,
    Path(room_id): Path<Uuid>,
) -> Result<Json<Room>, AppError> {
    let room = state
        .db
        .get_room(room_id)
        .await?
        .filter(|room| room.active || user.is_staff())
        .ok_or_else(|| room_not_found(room_id))?;

    Ok(Json(room))
}

pub async fn create_room(
    State(state): State<AppState>,
    _root: RootUser,
    Json(payload): Json<CreateRoomRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let room = state.db.create_room(&payload.into()).await?;

    Ok((StatusCode::CREATED, Json(room)))
}

pub async fn update_room(
    State(state): State<AppState>,
    _root: RootUser,
    Path(room_id): Path<Uuid>,
    Json(payload): Json<UpdateRoomRequest>,
) -> Result<Json<Room>, AppError> {
    payload.validate()?;

    let room = state
        .db
        .update_room(room_id, &payload.into())
        .await?
        .ok_or_else(|| room_not_found(room_id))?;

    Ok(Json(room))
}

pub async fn delete_room(
    State(state): State<AppState>,
    _root: RootUser,
    Path(room_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !state.db.delete_room(room_id).await? {
        return Err(room_not_found(room_id));
    }
    Ok(StatusCode::NO_CONTENT)
}

use crate::dtos::{BookingPayload, CancelResponse, IdsRequest, ListResponse, ReservationListParams};
use crate::middleware::AuthUser;
use crate::models::{Reservation, ReservationDetails};
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

fn reservation_not_found(reservation_id: Uuid) -> AppError {
    AppError::NotFound(anyhow::anyhow!("Reservation {} not found", reservation_id))
}

pub async fn list_reservations(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(params): Query<ReservationListParams>,
) -> Result<Json<ListResponse<ReservationDetails>>, AppError> {
    params.validate()?;

    let reservations = state.db.list_reservations(&params.filter()).await?;

    Ok(Json(ListResponse::new(reservations, params.pagination())))
}

/// Book a room. Overlapping dates answer 409.
pub async fn create_reservation(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(payload): Json<BookingPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let request = payload.into_request(claims.agent_id());
    let reservation = state.db.create_reservation(&request).await?;

    Ok((StatusCode::CREATED, Json(reservation)))
}

pub async fn get_reservation(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(reservation_id): Path<Uuid>,
) -> Result<Json<ReservationDetails>, AppError> {
    state
        .db
        .get_reservation(reservation_id)
        .await?
        .map(Json)
        .ok_or_else(|| reservation_not_found(reservation_id))
}

pub async fn update_reservation(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(reservation_id): Path<Uuid>,
    Json(payload): Json<BookingPayload>,
) -> Result<Json<ReservationDetails>, AppError> {
    payload.validate()?;

    // created_by is fixed at booking time
    let request = payload.into_request(None);
    let reservation = state
        .db
        .update_reservation(reservation_id, &request)
        .await?;

    Ok(Json(reservation))
}

pub async fn delete_reservation(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(reservation_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !state.db.delete_reservation(reservation_id).await? {
        return Err(reservation_not_found(reservation_id));
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn cancel_reservations(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(payload): Json<IdsRequest>,
) -> Result<Json<CancelResponse>, AppError> {
    payload.validate()?;

    let canceled = state.db.cancel_reservations(&payload.ids).await?;

    Ok(Json(CancelResponse { canceled }))
}

pub async fn finish_reservation(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(reservation_id): Path<Uuid>,
) -> Result<Json<Reservation>, AppError> {
    let reservation = state.db.finish_reservation(reservation_id).await?;
    Ok(Json(reservation))
}

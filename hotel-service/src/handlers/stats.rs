use crate::middleware::AuthUser;
use crate::models::HotelStats;
use crate::startup::AppState;
use axum::{extract::State, Json};
use service_core::error::AppError;

pub async fn get_stats(
    State(state): State<AppState>,
    _user: AuthUser,
) -> Result<Json<HotelStats>, AppError> {
    Ok(Json(state.db.hotel_stats_today().await?))
}

use crate::dtos::{CreateCustomerRequest, CustomerListParams, ListResponse, UpdateCustomerRequest};
use crate::middleware::AuthUser;
use crate::models::Customer;
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

fn customer_not_found(customer_id: Uuid) -> AppError {
    AppError::NotFound(anyhow::anyhow!("Customer {} not found", customer_id))
}

pub async fn list_customers(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(params): Query<CustomerListParams>,
) -> Result<Json<ListResponse<Customer>>, AppError> {
    params.validate()?;
    let page = params.pagination();

    let customers = state
        .db
        .list_customers(params.search.as_deref(), page.limit(), page.offset())
        .await?;

    Ok(Json(ListResponse::new(customers, page)))
}

pub async fn create_customer(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(payload): Json<CreateCustomerRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let customer = state.db.create_customer(&payload.into()).await?;

    Ok((StatusCode::CREATED, Json(customer)))
}

pub async fn get_customer(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(customer_id): Path<Uuid>,
) -> Result<Json<Customer>, AppError> {
    state
        .db
        .get_customer(customer_id)
        .await?
        .map(Json)
        .ok_or_else(|| customer_not_found(customer_id))
}

pub async fn update_customer(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(customer_id): Path<Uuid>,
    Json(payload): Json<UpdateCustomerRequest>,
) -> Result<Json<Customer>, AppError> {
    payload.validate()?;

    state
        .db
        .update_customer(customer_id, &payload.into())
        .await?
        .map(Json)
        .ok_or_else(|| customer_not_found(customer_id))
}

pub async fn delete_customer(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(customer_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !state.db.delete_customer(customer_id).await? {
        return Err(customer_not_found(customer_id));
    }
    Ok(StatusCode::NO_CONTENT)
}

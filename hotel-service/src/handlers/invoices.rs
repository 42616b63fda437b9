use crate::dtos::{
    IdsRequest, InvoiceDetailResponse, InvoiceListParams, ListResponse, PaymentListParams,
    ValidateInvoicesRequest,
};
use crate::middleware::AuthUser;
use crate::models::{Invoice, Payment};
use crate::startup::AppState;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use service_core::error::AppError;
use uuid::Uuid;
use validator::Validate;

pub async fn list_invoices(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(params): Query<InvoiceListParams>,
) -> Result<Json<ListResponse<Invoice>>, AppError> {
    params.validate()?;

    let invoices = state.db.list_invoices(&params.filter()).await?;

    Ok(Json(ListResponse::new(invoices, params.pagination())))
}

/// Invoice with the payments recorded against it.
pub async fn get_invoice(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(invoice_id): Path<Uuid>,
) -> Result<Json<InvoiceDetailResponse>, AppError> {
    let invoice = state
        .db
        .get_invoice(invoice_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Invoice {} not found", invoice_id)))?;

    let payments = state
        .db
        .list_payments(Some(invoice_id), crate::dtos::MAX_PAGE_SIZE, 0)
        .await?;

    Ok(Json(InvoiceDetailResponse { invoice, payments }))
}

/// Mark a batch of pending invoices as paid.
pub async fn validate_invoices(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(payload): Json<ValidateInvoicesRequest>,
) -> Result<Json<Vec<Invoice>>, AppError> {
    payload.validate()?;

    let invoices = state
        .db
        .validate_invoices(&payload.ids, &payload.payment())
        .await?;

    Ok(Json(invoices))
}

pub async fn cancel_invoices(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(payload): Json<IdsRequest>,
) -> Result<Json<Vec<Invoice>>, AppError> {
    payload.validate()?;

    let invoices = state.db.cancel_invoices(&payload.ids).await?;

    Ok(Json(invoices))
}

pub async fn list_payments(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(params): Query<PaymentListParams>,
) -> Result<Json<ListResponse<Payment>>, AppError> {
    params.validate()?;
    let page = params.pagination();

    let payments = state
        .db
        .list_payments(params.invoice_id, page.limit(), page.offset())
        .await?;

    Ok(Json(ListResponse::new(payments, page)))
}

//! Invoice validation and cancellation, plus invoice/payment reads.

use super::{commit, Database};
use crate::models::{
    Invoice, InvoiceStatus, ListInvoicesFilter, NewPayment, Payment, ReservationStatus,
};
use crate::services::metrics::{
    DB_QUERY_DURATION, INVOICE_TRANSITIONS_TOTAL, PAYMENT_AMOUNT_TOTAL, RESERVATIONS_TOTAL,
};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use service_core::error::AppError;
use sqlx::{FromRow, PgConnection};
use tracing::{info, instrument};
use uuid::Uuid;

#[derive(Debug, FromRow)]
struct LockedInvoice {
    invoice_id: Uuid,
    reservation_id: Uuid,
    amount: Decimal,
    status: String,
    reservation_status: String,
}

/// Locks the invoices and their reservations, failing the whole batch on the
/// first unknown id or invoice that is no longer pending.
async fn lock_pending_invoices(
    conn: &mut PgConnection,
    invoice_ids: &[Uuid],
    next: InvoiceStatus,
) -> Result<Vec<LockedInvoice>, AppError> {
    let mut ids = invoice_ids.to_vec();
    ids.sort_unstable();
    ids.dedup();

    if ids.is_empty() {
        return Err(AppError::BadRequest(anyhow::anyhow!("No invoices given")));
    }

    // Lock in id order so concurrent batches cannot deadlock
    let locked = sqlx::query_as::<_, LockedInvoice>(
        r#"
        SELECT i.invoice_id, i.reservation_id, i.amount, i.status,
               r.status AS reservation_status
        FROM invoices i
        JOIN reservations r ON r.reservation_id = i.reservation_id
        WHERE i.invoice_id = ANY($1)
        ORDER BY i.invoice_id
        FOR UPDATE
        "#,
    )
    .bind(&ids)
    .fetch_all(&mut *conn)
    .await
    .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to lock invoices: {}", e)))?;

    if let Some(missing) = ids
        .iter()
        .find(|id| !locked.iter().any(|i| i.invoice_id == **id))
    {
        return Err(AppError::NotFound(anyhow::anyhow!(
            "Invoice {} not found",
            missing
        )));
    }

    for invoice in &locked {
        let allowed = InvoiceStatus::parse(&invoice.status)
            .is_some_and(|current| current.can_transition_to(next));
        if !allowed {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "Invoice {} is {}, only pending invoices can be {}",
                invoice.invoice_id,
                invoice.status,
                next.as_str()
            )));
        }
        let reservation_follows = ReservationStatus::parse(&invoice.reservation_status)
            .is_some_and(|current| current.can_transition_to(next.reservation_status()));
        if !reservation_follows {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "Reservation {} of invoice {} is {}",
                invoice.reservation_id,
                invoice.invoice_id,
                invoice.reservation_status
            )));
        }
    }

    Ok(locked)
}

impl Database {
    /// Mark pending invoices paid, record one payment each and move their
    /// reservations to `paid`. All-or-nothing.
    #[instrument(skip(self, invoice_ids, payment), fields(count = invoice_ids.len(), mode = payment.mode.as_str()))]
    pub async fn validate_invoices(
        &self,
        invoice_ids: &[Uuid],
        payment: &NewPayment,
    ) -> Result<Vec<Invoice>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["validate_invoices"])
            .start_timer();

        let mut tx = self.begin().await?;

        let locked = lock_pending_invoices(&mut tx, invoice_ids, InvoiceStatus::Paid).await?;
        let ids: Vec<Uuid> = locked.iter().map(|i| i.invoice_id).collect();
        let reservation_ids: Vec<Uuid> = locked.iter().map(|i| i.reservation_id).collect();

        let invoices = sqlx::query_as::<_, Invoice>(
            r#"
            UPDATE invoices
            SET status = 'paid', updated_utc = NOW()
            WHERE invoice_id = ANY($1)
            RETURNING invoice_id, reservation_id, code, amount, status, created_utc, updated_utc
            "#,
        )
        .bind(&ids)
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| AppError::from_db("Failed to mark invoices paid", e))?;

        sqlx::query(
            r#"
            UPDATE reservations
            SET status = 'paid', updated_utc = NOW()
            WHERE reservation_id = ANY($1)
            "#,
        )
        .bind(&reservation_ids)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::from_db("Failed to mark reservations paid", e))?;

        let mut collected = Decimal::ZERO;
        for invoice in &locked {
            sqlx::query(
                r#"
                INSERT INTO payments (payment_id, invoice_id, mode, amount, note)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(invoice.invoice_id)
            .bind(payment.mode.as_str())
            .bind(invoice.amount)
            .bind(&payment.note)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::from_db("Failed to record payment", e))?;

            collected += invoice.amount;
        }

        commit(tx).await?;
        timer.observe_duration();

        let count = invoices.len() as f64;
        INVOICE_TRANSITIONS_TOTAL
            .with_label_values(&["paid"])
            .inc_by(count);
        RESERVATIONS_TOTAL.with_label_values(&["paid"]).inc_by(count);
        PAYMENT_AMOUNT_TOTAL
            .with_label_values(&[payment.mode.as_str()])
            .inc_by(collected.to_f64().unwrap_or(0.0));

        info!(
            count = invoices.len(),
            collected = %collected,
            mode = payment.mode.as_str(),
            "Invoices validated"
        );

        Ok(invoices)
    }

    /// Cancel pending invoices together with their reservations. All-or-nothing.
    #[instrument(skip(self, invoice_ids), fields(count = invoice_ids.len()))]
    pub async fn cancel_invoices(&self, invoice_ids: &[Uuid]) -> Result<Vec<Invoice>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["cancel_invoices"])
            .start_timer();

        let mut tx = self.begin().await?;

        let locked = lock_pending_invoices(&mut tx, invoice_ids, InvoiceStatus::Canceled).await?;
        let ids: Vec<Uuid> = locked.iter().map(|i| i.invoice_id).collect();
        let reservation_ids: Vec<Uuid> = locked.iter().map(|i| i.reservation_id).collect();

        let invoices = sqlx::query_as::<_, Invoice>(
            r#"
            UPDATE invoices
            SET status = 'canceled', updated_utc = NOW()
            WHERE invoice_id = ANY($1)
            RETURNING invoice_id, reservation_id, code, amount, status, created_utc, updated_utc
            "#,
        )
        .bind(&ids)
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| AppError::from_db("Failed to cancel invoices", e))?;

        sqlx::query(
            r#"
            UPDATE reservations
            SET status = 'canceled', updated_utc = NOW()
            WHERE reservation_id = ANY($1)
            "#,
        )
        .bind(&reservation_ids)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::from_db("Failed to cancel reservations", e))?;

        commit(tx).await?;
        timer.observe_duration();

        let count = invoices.len() as f64;
        INVOICE_TRANSITIONS_TOTAL
            .with_label_values(&["canceled"])
            .inc_by(count);
        RESERVATIONS_TOTAL
            .with_label_values(&["canceled"])
            .inc_by(count);
        info!(count = invoices.len(), "Invoices canceled");

        Ok(invoices)
    }

    /// Get invoice by ID.
    #[instrument(skip(self), fields(invoice_id = %invoice_id))]
    pub async fn get_invoice(&self, invoice_id: Uuid) -> Result<Option<Invoice>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_invoice"])
            .start_timer();

        let invoice = sqlx::query_as::<_, Invoice>(
            r#"
            SELECT invoice_id, reservation_id, code, amount, status, created_utc, updated_utc
            FROM invoices
            WHERE invoice_id = $1
            "#,
        )
        .bind(invoice_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get invoice: {}", e)))?;

        timer.observe_duration();

        Ok(invoice)
    }

    /// List invoices, newest first.
    #[instrument(skip(self, filter))]
    pub async fn list_invoices(&self, filter: &ListInvoicesFilter) -> Result<Vec<Invoice>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_invoices"])
            .start_timer();

        let invoices = sqlx::query_as::<_, Invoice>(
            r#"
            SELECT invoice_id, reservation_id, code, amount, status, created_utc, updated_utc
            FROM invoices
            WHERE ($1::varchar IS NULL OR status = $1)
            ORDER BY created_utc DESC, invoice_id
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(filter.status.map(|s| s.as_str()))
        .bind(filter.limit)
        .bind(filter.offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to list invoices: {}", e)))?;

        timer.observe_duration();

        Ok(invoices)
    }

    /// Payments, oldest first, optionally for a single invoice.
    #[instrument(skip(self))]
    pub async fn list_payments(
        &self,
        invoice_id: Option<Uuid>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Payment>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_payments"])
            .start_timer();

        let payments = sqlx::query_as::<_, Payment>(
            r#"
            SELECT payment_id, invoice_id, mode, amount, note, created_utc
            FROM payments
            WHERE ($1::uuid IS NULL OR invoice_id = $1)
            ORDER BY created_utc, payment_id
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(invoice_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to list payments: {}", e)))?;

        timer.observe_duration();

        Ok(payments)
    }
}

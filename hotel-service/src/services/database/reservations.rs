//! Reservation workflow: booking, rebooking, cancellation, check-out.

use super::{commit, Database};
use crate::models::{
    BookingRequest, InvoiceStatus, ListReservationsFilter, Reservation, ReservationDetails,
    ReservationStatus,
};
use crate::services::booking::{self, Stay};
use crate::services::metrics::{
    BOOKING_CONFLICTS_TOTAL, DB_QUERY_DURATION, INVOICE_TRANSITIONS_TOTAL, RESERVATIONS_TOTAL,
};
use chrono::{Datelike, Utc};
use rust_decimal::Decimal;
use service_core::error::AppError;
use sqlx::{FromRow, PgConnection};
use tracing::{info, instrument, warn};
use uuid::Uuid;

const RESERVATION_COLUMNS: &str = r#"
    reservation_id, customer_id, room_id, check_in, check_out, amount, discount, tva,
    status, created_by, created_utc, updated_utc
"#;

const DETAILS_SELECT: &str = r#"
    SELECT r.reservation_id, r.customer_id, r.room_id, r.check_in, r.check_out, r.amount,
        r.discount, r.tva, r.status, r.created_by, r.created_utc, r.updated_utc,
        c.first_name || ' ' || c.last_name AS customer_name,
        m.number AS room_number,
        i.invoice_id, i.code AS invoice_code, i.amount AS invoice_amount, i.status AS invoice_status
    FROM reservations r
    JOIN customers c ON c.customer_id = r.customer_id
    JOIN rooms m ON m.room_id = r.room_id
    JOIN invoices i ON i.reservation_id = r.reservation_id
"#;

#[derive(Debug, FromRow)]
struct LockedRoom {
    price: Decimal,
    active: bool,
}

#[derive(Debug, FromRow)]
struct LockedReservation {
    reservation_id: Uuid,
    status: String,
    invoice_status: String,
}

impl LockedReservation {
    /// Whether the reservation may move to `next` with its invoice following.
    fn can_move_to(&self, next: ReservationStatus) -> bool {
        let invoice_next = match next {
            ReservationStatus::Paid => InvoiceStatus::Paid,
            ReservationStatus::Canceled => InvoiceStatus::Canceled,
            ReservationStatus::Confirmed | ReservationStatus::Finished => return false,
        };
        let reservation = ReservationStatus::parse(&self.status);
        let invoice = InvoiceStatus::parse(&self.invoice_status);
        reservation.is_some_and(|r| r.can_transition_to(next))
            && invoice.is_some_and(|i| i.can_transition_to(invoice_next))
    }
}

/// Locks the room row so concurrent bookings of the same room run one after another.
async fn lock_room(conn: &mut PgConnection, room_id: Uuid) -> Result<LockedRoom, AppError> {
    let room = sqlx::query_as::<_, LockedRoom>(
        "SELECT price, active FROM rooms WHERE room_id = $1 FOR UPDATE",
    )
    .bind(room_id)
    .fetch_optional(&mut *conn)
    .await
    .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to lock room: {}", e)))?
    .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Room {} not found", room_id)))?;

    if !room.active {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "Room {} is not open for booking",
            room_id
        )));
    }

    Ok(room)
}

async fn ensure_customer(conn: &mut PgConnection, customer_id: Uuid) -> Result<(), AppError> {
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (SELECT 1 FROM customers WHERE customer_id = $1)",
    )
    .bind(customer_id)
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to check customer: {}", e)))?;

    if !exists {
        return Err(AppError::NotFound(anyhow::anyhow!(
            "Customer {} not found",
            customer_id
        )));
    }
    Ok(())
}

/// Room-holding reservations of `room_id` sharing at least one night with `stay`:
/// an existing stay starting inside, ending inside or containing the new one.
async fn find_conflicts(
    conn: &mut PgConnection,
    room_id: Uuid,
    stay: &Stay,
    exclude: Option<Uuid>,
) -> Result<Vec<Uuid>, AppError> {
    sqlx::query_scalar::<_, Uuid>(
        r#"
        SELECT reservation_id
        FROM reservations
        WHERE room_id = $1
          AND status = ANY($5)
          AND check_in < $3
          AND check_out > $2
          AND ($4::uuid IS NULL OR reservation_id <> $4)
        ORDER BY check_in
        "#,
    )
    .bind(room_id)
    .bind(stay.check_in)
    .bind(stay.check_out)
    .bind(exclude)
    .bind(ReservationStatus::room_holding())
    .fetch_all(&mut *conn)
    .await
    .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to check availability: {}", e)))
}

fn conflict_error(room_id: Uuid, stay: &Stay, conflicts: &[Uuid]) -> AppError {
    BOOKING_CONFLICTS_TOTAL.inc();
    warn!(
        room_id = %room_id,
        check_in = %stay.check_in,
        check_out = %stay.check_out,
        conflicts = ?conflicts,
        "Booking rejected, room already reserved"
    );
    let ids: Vec<String> = conflicts.iter().map(Uuid::to_string).collect();
    AppError::Conflict(anyhow::anyhow!(
        "Room is already reserved between {} and {} (reservations: {})",
        stay.check_in,
        stay.check_out,
        ids.join(", ")
    ))
}

/// Checks customer, room and availability; returns the base amount to bill.
async fn prepare_booking(
    conn: &mut PgConnection,
    request: &BookingRequest,
    stay: &Stay,
    exclude: Option<Uuid>,
) -> Result<Decimal, AppError> {
    ensure_customer(conn, request.customer_id).await?;
    let room = lock_room(conn, request.room_id).await?;

    let conflicts = find_conflicts(conn, request.room_id, stay, exclude).await?;
    if !conflicts.is_empty() {
        return Err(conflict_error(request.room_id, stay, &conflicts));
    }

    match request.amount {
        Some(amount) => Ok(amount),
        None => Ok(booking::base_amount(room.price, stay)?),
    }
}

fn dedup(ids: &[Uuid]) -> Vec<Uuid> {
    let mut ids = ids.to_vec();
    ids.sort_unstable();
    ids.dedup();
    ids
}

impl Database {
    /// Book a room: reservation (`confirmed`) plus its `pending` invoice, atomically.
    #[instrument(skip(self, request), fields(room_id = %request.room_id, customer_id = %request.customer_id))]
    pub async fn create_reservation(
        &self,
        request: &BookingRequest,
    ) -> Result<ReservationDetails, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_reservation"])
            .start_timer();

        let stay = booking::validate_booking(request)?;

        let mut tx = self.begin().await?;

        let amount = prepare_booking(&mut tx, request, &stay, None).await?;
        let total = booking::compute_total(amount, request.discount, request.tva)?;

        let reservation_id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO reservations (
                reservation_id, customer_id, room_id, check_in, check_out, amount, discount, tva,
                status, created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'confirmed', $9)
            "#,
        )
        .bind(reservation_id)
        .bind(request.customer_id)
        .bind(request.room_id)
        .bind(stay.check_in)
        .bind(stay.check_out)
        .bind(amount)
        .bind(request.discount)
        .bind(request.tva)
        .bind(request.created_by)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::from_db("Failed to create reservation", e))?;

        let sequence = sqlx::query_scalar::<_, i64>("SELECT nextval('invoice_code_seq')")
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to allocate invoice code: {}", e))
            })?;
        let code = booking::invoice_code(Utc::now().year(), sequence);

        sqlx::query(
            r#"
            INSERT INTO invoices (invoice_id, reservation_id, code, amount, status)
            VALUES ($1, $2, $3, $4, 'pending')
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(reservation_id)
        .bind(&code)
        .bind(total)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::from_db("Failed to create invoice", e))?;

        commit(tx).await?;
        timer.observe_duration();

        RESERVATIONS_TOTAL.with_label_values(&["created"]).inc();
        info!(
            reservation_id = %reservation_id,
            invoice_code = %code,
            nights = stay.nights(),
            total = %total,
            "Reservation created"
        );

        self.get_reservation(reservation_id)
            .await?
            .ok_or_else(|| AppError::InternalError(anyhow::anyhow!("Reservation vanished after commit")))
    }

    /// Rebook a `confirmed` reservation and recompute its pending invoice.
    #[instrument(skip(self, request), fields(reservation_id = %reservation_id, room_id = %request.room_id))]
    pub async fn update_reservation(
        &self,
        reservation_id: Uuid,
        request: &BookingRequest,
    ) -> Result<ReservationDetails, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["update_reservation"])
            .start_timer();

        let stay = booking::validate_booking(request)?;

        let mut tx = self.begin().await?;

        let current = sqlx::query_as::<_, LockedReservation>(
            r#"
            SELECT r.reservation_id, r.status, i.status AS invoice_status
            FROM reservations r
            JOIN invoices i ON i.reservation_id = r.reservation_id
            WHERE r.reservation_id = $1
            FOR UPDATE
            "#,
        )
        .bind(reservation_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to lock reservation: {}", e)))?
        .ok_or_else(|| {
            AppError::NotFound(anyhow::anyhow!("Reservation {} not found", reservation_id))
        })?;

        // Editable for as long as it could still be canceled
        if !current.can_move_to(ReservationStatus::Canceled) {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "Only confirmed reservations with a pending invoice can be modified (status: {}, invoice: {})",
                current.status,
                current.invoice_status
            )));
        }

        let amount = prepare_booking(&mut tx, request, &stay, Some(reservation_id)).await?;
        let total = booking::compute_total(amount, request.discount, request.tva)?;

        sqlx::query(
            r#"
            UPDATE reservations
            SET customer_id = $2,
                room_id = $3,
                check_in = $4,
                check_out = $5,
                amount = $6,
                discount = $7,
                tva = $8,
                updated_utc = NOW()
            WHERE reservation_id = $1
            "#,
        )
        .bind(current.reservation_id)
        .bind(request.customer_id)
        .bind(request.room_id)
        .bind(stay.check_in)
        .bind(stay.check_out)
        .bind(amount)
        .bind(request.discount)
        .bind(request.tva)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::from_db("Failed to update reservation", e))?;

        sqlx::query(
            r#"
            UPDATE invoices
            SET amount = $2, updated_utc = NOW()
            WHERE reservation_id = $1 AND status = 'pending'
            "#,
        )
        .bind(reservation_id)
        .bind(total)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::from_db("Failed to update invoice amount", e))?;

        commit(tx).await?;
        timer.observe_duration();

        RESERVATIONS_TOTAL.with_label_values(&["updated"]).inc();
        info!(reservation_id = %reservation_id, total = %total, "Reservation updated");

        self.get_reservation(reservation_id)
            .await?
            .ok_or_else(|| AppError::InternalError(anyhow::anyhow!("Reservation vanished after commit")))
    }

    /// Cancel a batch of `confirmed` reservations together with their pending invoices.
    ///
    /// All-or-nothing: one unknown id or one reservation past `confirmed` aborts the batch.
    #[instrument(skip(self, reservation_ids), fields(count = reservation_ids.len()))]
    pub async fn cancel_reservations(&self, reservation_ids: &[Uuid]) -> Result<u64, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["cancel_reservations"])
            .start_timer();

        let ids = dedup(reservation_ids);
        if ids.is_empty() {
            return Err(AppError::BadRequest(anyhow::anyhow!("No reservations given")));
        }

        let mut tx = self.begin().await?;

        // Lock in id order so concurrent batches cannot deadlock
        let locked = sqlx::query_as::<_, LockedReservation>(
            r#"
            SELECT r.reservation_id, r.status, i.status AS invoice_status
            FROM reservations r
            JOIN invoices i ON i.reservation_id = r.reservation_id
            WHERE r.reservation_id = ANY($1)
            ORDER BY r.reservation_id
            FOR UPDATE
            "#,
        )
        .bind(&ids)
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to lock reservations: {}", e))
        })?;

        if locked.len() != ids.len() {
            let missing: Vec<String> = ids
                .iter()
                .filter(|id| !locked.iter().any(|r| r.reservation_id == **id))
                .map(Uuid::to_string)
                .collect();
            return Err(AppError::NotFound(anyhow::anyhow!(
                "Reservations not found: {}",
                missing.join(", ")
            )));
        }

        let blocked: Vec<String> = locked
            .iter()
            .filter(|r| !r.can_move_to(ReservationStatus::Canceled))
            .map(|r| format!("{} ({})", r.reservation_id, r.status))
            .collect();
        if !blocked.is_empty() {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "Only confirmed reservations can be canceled: {}",
                blocked.join(", ")
            )));
        }

        let canceled = sqlx::query(
            r#"
            UPDATE reservations
            SET status = 'canceled', updated_utc = NOW()
            WHERE reservation_id = ANY($1)
            "#,
        )
        .bind(&ids)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::from_db("Failed to cancel reservations", e))?
        .rows_affected();

        sqlx::query(
            r#"
            UPDATE invoices
            SET status = 'canceled', updated_utc = NOW()
            WHERE reservation_id = ANY($1)
            "#,
        )
        .bind(&ids)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::from_db("Failed to cancel invoices", e))?;

        commit(tx).await?;
        timer.observe_duration();

        RESERVATIONS_TOTAL
            .with_label_values(&["canceled"])
            .inc_by(canceled as f64);
        INVOICE_TRANSITIONS_TOTAL
            .with_label_values(&["canceled"])
            .inc_by(canceled as f64);
        info!(count = canceled, "Reservations canceled");

        Ok(canceled)
    }

    /// Check the guest out: `paid` → `finished`, releasing the room.
    #[instrument(skip(self), fields(reservation_id = %reservation_id))]
    pub async fn finish_reservation(&self, reservation_id: Uuid) -> Result<Reservation, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["finish_reservation"])
            .start_timer();

        let mut tx = self.begin().await?;

        let current = sqlx::query_as::<_, Reservation>(&format!(
            "SELECT {} FROM reservations WHERE reservation_id = $1 FOR UPDATE",
            RESERVATION_COLUMNS
        ))
        .bind(reservation_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to lock reservation: {}", e)))?
        .ok_or_else(|| {
            AppError::NotFound(anyhow::anyhow!("Reservation {} not found", reservation_id))
        })?;

        let allowed = current
            .status()
            .is_some_and(|s| s.can_transition_to(ReservationStatus::Finished));
        if !allowed {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "Only paid reservations can be finished (status: {})",
                current.status
            )));
        }

        let reservation = sqlx::query_as::<_, Reservation>(&format!(
            r#"
            UPDATE reservations
            SET status = 'finished', updated_utc = NOW()
            WHERE reservation_id = $1
            RETURNING {}
            "#,
            RESERVATION_COLUMNS
        ))
        .bind(reservation_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::from_db("Failed to finish reservation", e))?;

        commit(tx).await?;
        timer.observe_duration();

        RESERVATIONS_TOTAL.with_label_values(&["finished"]).inc();
        info!(reservation_id = %reservation_id, "Reservation finished");

        Ok(reservation)
    }

    /// Delete a canceled reservation; its invoice goes with it.
    #[instrument(skip(self), fields(reservation_id = %reservation_id))]
    pub async fn delete_reservation(&self, reservation_id: Uuid) -> Result<bool, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["delete_reservation"])
            .start_timer();

        let result = sqlx::query(
            "DELETE FROM reservations WHERE reservation_id = $1 AND status = 'canceled'",
        )
        .bind(reservation_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::from_db("Failed to delete reservation", e))?;

        timer.observe_duration();

        if result.rows_affected() > 0 {
            RESERVATIONS_TOTAL.with_label_values(&["deleted"]).inc();
            info!(reservation_id = %reservation_id, "Reservation deleted");
            return Ok(true);
        }

        match self.get_reservation(reservation_id).await? {
            Some(details) => Err(AppError::BadRequest(anyhow::anyhow!(
                "Only canceled reservations can be deleted (status: {})",
                details.reservation.status
            ))),
            None => Ok(false),
        }
    }

    /// Get a reservation with its guest, room and invoice.
    #[instrument(skip(self), fields(reservation_id = %reservation_id))]
    pub async fn get_reservation(
        &self,
        reservation_id: Uuid,
    ) -> Result<Option<ReservationDetails>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_reservation"])
            .start_timer();

        let details = sqlx::query_as::<_, ReservationDetails>(&format!(
            "{} WHERE r.reservation_id = $1",
            DETAILS_SELECT
        ))
        .bind(reservation_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get reservation: {}", e)))?;

        timer.observe_duration();

        Ok(details)
    }

    /// List reservations, newest check-in first.
    #[instrument(skip(self, filter))]
    pub async fn list_reservations(
        &self,
        filter: &ListReservationsFilter,
    ) -> Result<Vec<ReservationDetails>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_reservations"])
            .start_timer();

        let reservations = sqlx::query_as::<_, ReservationDetails>(&format!(
            r#"
            {}
            WHERE ($1::varchar IS NULL OR r.status = $1)
              AND ($2::uuid IS NULL OR r.room_id = $2)
              AND ($3::uuid IS NULL OR r.customer_id = $3)
            ORDER BY r.check_in DESC, r.reservation_id
            LIMIT $4 OFFSET $5
            "#,
            DETAILS_SELECT
        ))
        .bind(filter.status.map(|s| s.as_str()))
        .bind(filter.room_id)
        .bind(filter.customer_id)
        .bind(filter.limit)
        .bind(filter.offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to list reservations: {}", e))
        })?;

        timer.observe_duration();

        Ok(reservations)
    }
}

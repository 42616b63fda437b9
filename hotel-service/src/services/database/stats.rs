use super::Database;
use crate::models::{HotelStats, ReservationStatus, StatusCount};
use crate::services::metrics::DB_QUERY_DURATION;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use service_core::error::AppError;
use sqlx::FromRow;
use tracing::instrument;

#[derive(Debug, FromRow)]
struct Counts {
    rooms: i64,
    active_rooms: i64,
    occupied_rooms_today: i64,
    customers: i64,
    agents: i64,
    revenue: Decimal,
    unread_contacts: i64,
}

impl Database {
    /// Dashboard figures for `today` (a room is occupied when an active stay covers the night).
    #[instrument(skip(self))]
    pub async fn hotel_stats(&self, today: NaiveDate) -> Result<HotelStats, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["hotel_stats"])
            .start_timer();

        let counts = sqlx::query_as::<_, Counts>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM rooms) AS rooms,
                (SELECT COUNT(*) FROM rooms WHERE active) AS active_rooms,
                (SELECT COUNT(DISTINCT room_id) FROM reservations
                    WHERE status = ANY($2)
                      AND check_in <= $1 AND check_out > $1) AS occupied_rooms_today,
                (SELECT COUNT(*) FROM customers) AS customers,
                (SELECT COUNT(*) FROM agents) AS agents,
                (SELECT COALESCE(SUM(amount), 0) FROM payments) AS revenue,
                (SELECT COUNT(*) FROM contacts WHERE NOT read) AS unread_contacts
            "#,
        )
        .bind(today)
        .bind(ReservationStatus::room_holding())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to load stats: {}", e)))?;

        let reservations_by_status = sqlx::query_as::<_, StatusCount>(
            "SELECT status, COUNT(*) AS count FROM reservations GROUP BY status ORDER BY status",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to count reservations: {}", e))
        })?;

        let invoices_by_status = sqlx::query_as::<_, StatusCount>(
            "SELECT status, COUNT(*) AS count FROM invoices GROUP BY status ORDER BY status",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to count invoices: {}", e)))?;

        timer.observe_duration();

        Ok(HotelStats {
            rooms: counts.rooms,
            active_rooms: counts.active_rooms,
            occupied_rooms_today: counts.occupied_rooms_today,
            customers: counts.customers,
            agents: counts.agents,
            reservations_by_status,
            invoices_by_status,
            revenue: counts.revenue,
            unread_contacts: counts.unread_contacts,
        })
    }

    /// Stats for the current UTC date.
    pub async fn hotel_stats_today(&self) -> Result<HotelStats, AppError> {
        self.hotel_stats(Utc::now().date_naive()).await
    }
}

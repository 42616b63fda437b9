//! Reservation model and lifecycle.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Reservation status.
///
/// `confirmed` and `paid` reservations hold their room; `finished` and
/// `canceled` ones release it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    Confirmed,
    Paid,
    Finished,
    Canceled,
}

impl ReservationStatus {
    pub const ALL: [ReservationStatus; 4] = [
        ReservationStatus::Confirmed,
        ReservationStatus::Paid,
        ReservationStatus::Finished,
        ReservationStatus::Canceled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Confirmed => "confirmed",
            ReservationStatus::Paid => "paid",
            ReservationStatus::Finished => "finished",
            ReservationStatus::Canceled => "canceled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "confirmed" => Some(ReservationStatus::Confirmed),
            "paid" => Some(ReservationStatus::Paid),
            "finished" => Some(ReservationStatus::Finished),
            "canceled" => Some(ReservationStatus::Canceled),
            _ => None,
        }
    }

    /// Whether the reservation still blocks its room for the booked dates.
    pub fn holds_room(&self) -> bool {
        matches!(self, ReservationStatus::Confirmed | ReservationStatus::Paid)
    }

    /// Column values of the statuses that block a room, for SQL `= ANY(..)` filters.
    pub fn room_holding() -> Vec<&'static str> {
        Self::ALL
            .iter()
            .filter(|status| status.holds_room())
            .map(|status| status.as_str())
            .collect()
    }

    pub fn can_transition_to(&self, next: ReservationStatus) -> bool {
        matches!(
            (self, next),
            (ReservationStatus::Confirmed, ReservationStatus::Paid)
                | (ReservationStatus::Confirmed, ReservationStatus::Canceled)
                | (ReservationStatus::Paid, ReservationStatus::Finished)
        )
    }
}

/// Reservation row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Reservation {
    pub reservation_id: Uuid,
    pub customer_id: Uuid,
    pub room_id: Uuid,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub amount: Decimal,
    pub discount: Decimal,
    pub tva: Decimal,
    pub status: String,
    pub created_by: Option<Uuid>,
    pub created_utc: DateTime<Utc>,
    pub updated_utc: DateTime<Utc>,
}

impl Reservation {
    pub fn status(&self) -> Option<ReservationStatus> {
        ReservationStatus::parse(&self.status)
    }
}

/// Reservation joined with its guest, room and invoice.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ReservationDetails {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub reservation: Reservation,
    pub customer_name: String,
    pub room_number: String,
    pub invoice_id: Uuid,
    pub invoice_code: String,
    pub invoice_amount: Decimal,
    pub invoice_status: String,
}

/// Booking input shared by create and update.
#[derive(Debug, Clone)]
pub struct BookingRequest {
    pub customer_id: Uuid,
    pub room_id: Uuid,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    /// Base price before discount and tax; `None` means nightly rate × nights.
    pub amount: Option<Decimal>,
    pub discount: Decimal,
    pub tva: Decimal,
    pub created_by: Option<Uuid>,
}

/// Filter parameters for listing reservations.
#[derive(Debug, Clone, Default)]
pub struct ListReservationsFilter {
    pub status: Option<ReservationStatus>,
    pub room_id: Option<Uuid>,
    pub customer_id: Option<Uuid>,
    pub limit: i64,
    pub offset: i64,
}

#[cfg(test)]
mod tests {
    use super::ReservationStatus::*;
    use super::*;

    #[test]
    fn status_round_trips_through_str() {
        for status in [Confirmed, Paid, Finished, Canceled] {
            assert_eq!(ReservationStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(ReservationStatus::parse("cancelled"), None);
    }

    #[test]
    fn only_active_statuses_hold_the_room() {
        assert!(Confirmed.holds_room());
        assert!(Paid.holds_room());
        assert!(!Finished.holds_room());
        assert!(!Canceled.holds_room());
        assert_eq!(ReservationStatus::room_holding(), vec!["confirmed", "paid"]);
    }

    #[test]
    fn lifecycle_transitions() {
        assert!(Confirmed.can_transition_to(Paid));
        assert!(Confirmed.can_transition_to(Canceled));
        assert!(Paid.can_transition_to(Finished));

        assert!(!Paid.can_transition_to(Canceled));
        assert!(!Canceled.can_transition_to(Confirmed));
        assert!(!Finished.can_transition_to(Paid));
        assert!(!Confirmed.can_transition_to(Finished));
    }
}

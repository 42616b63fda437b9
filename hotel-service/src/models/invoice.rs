//! Invoice model.

use super::ReservationStatus;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Invoice status. Only `pending` invoices may change state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Pending,
    Paid,
    Canceled,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Pending => "pending",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Canceled => "canceled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(InvoiceStatus::Pending),
            "paid" => Some(InvoiceStatus::Paid),
            "canceled" => Some(InvoiceStatus::Canceled),
            _ => None,
        }
    }

    pub fn can_transition_to(&self, next: InvoiceStatus) -> bool {
        matches!(
            (self, next),
            (InvoiceStatus::Pending, InvoiceStatus::Paid)
                | (InvoiceStatus::Pending, InvoiceStatus::Canceled)
        )
    }

    /// Reservation status that goes with an invoice in this status.
    pub fn reservation_status(&self) -> ReservationStatus {
        match self {
            InvoiceStatus::Pending => ReservationStatus::Confirmed,
            InvoiceStatus::Paid => ReservationStatus::Paid,
            InvoiceStatus::Canceled => ReservationStatus::Canceled,
        }
    }
}

/// Invoice attached 1:1 to a reservation.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Invoice {
    pub invoice_id: Uuid,
    pub reservation_id: Uuid,
    pub code: String,
    pub amount: Decimal,
    pub status: String,
    pub created_utc: DateTime<Utc>,
    pub updated_utc: DateTime<Utc>,
}

/// Filter parameters for listing invoices.
#[derive(Debug, Clone, Default)]
pub struct ListInvoicesFilter {
    pub status: Option<InvoiceStatus>,
    pub limit: i64,
    pub offset: i64,
}

#[cfg(test)]
mod tests {
    use super::InvoiceStatus::*;
    use super::*;

    #[test]
    fn only_pending_invoices_move() {
        assert!(Pending.can_transition_to(Paid));
        assert!(Pending.can_transition_to(Canceled));

        for from in [Paid, Canceled] {
            for to in [Pending, Paid, Canceled] {
                assert!(!from.can_transition_to(to), "{:?} -> {:?}", from, to);
            }
        }
    }

    #[test]
    fn invoice_moves_keep_the_reservation_in_step() {
        for next in [Paid, Canceled] {
            assert!(Pending.can_transition_to(next));
            assert!(Pending
                .reservation_status()
                .can_transition_to(next.reservation_status()));
        }
    }
}

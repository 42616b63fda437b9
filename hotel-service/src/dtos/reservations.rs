//! Reservation, invoice and payment payloads.

use super::Pagination;
use crate::models::{
    BookingRequest, Invoice, InvoiceStatus, ListInvoicesFilter, ListReservationsFilter,
    NewPayment, Payment, PaymentMode, ReservationStatus,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Body of `POST /api/reservations` and `PUT /api/reservations/:id`.
#[derive(Debug, Deserialize, Validate)]
pub struct BookingPayload {
    pub customer_id: Uuid,
    pub room_id: Uuid,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    /// Base price; defaults to the room's nightly rate times the number of nights.
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub discount: Decimal,
    #[serde(default)]
    pub tva: Decimal,
}

impl BookingPayload {
    pub fn into_request(self, created_by: Option<Uuid>) -> BookingRequest {
        BookingRequest {
            customer_id: self.customer_id,
            room_id: self.room_id,
            check_in: self.check_in,
            check_out: self.check_out,
            amount: self.amount,
            discount: self.discount,
            tva: self.tva,
            created_by,
        }
    }
}

/// Batch of ids for cancel operations.
#[derive(Debug, Deserialize, Validate)]
pub struct IdsRequest {
    #[validate(length(min = 1, max = 500, message = "ids must contain 1-500 entries"))]
    pub ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ValidateInvoicesRequest {
    #[validate(length(min = 1, max = 500, message = "ids must contain 1-500 entries"))]
    pub ids: Vec<Uuid>,
    pub mode: PaymentMode,
    #[validate(length(max = 1000))]
    pub note: Option<String>,
}

impl ValidateInvoicesRequest {
    pub fn payment(&self) -> NewPayment {
        NewPayment {
            mode: self.mode,
            note: self.note.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CancelResponse {
    pub canceled: u64,
}

#[derive(Debug, Serialize)]
pub struct InvoiceDetailResponse {
    #[serde(flatten)]
    pub invoice: Invoice,
    pub payments: Vec<Payment>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct ReservationListParams {
    pub status: Option<ReservationStatus>,
    pub room_id: Option<Uuid>,
    pub customer_id: Option<Uuid>,
    #[validate(range(min = 1, message = "page must be at least 1"))]
    pub page: Option<i64>,
    #[validate(range(min = 1, max = 100, message = "page_size must be between 1 and 100"))]
    pub page_size: Option<i64>,
}

impl ReservationListParams {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.page_size)
    }

    pub fn filter(&self) -> ListReservationsFilter {
        let page = self.pagination();
        ListReservationsFilter {
            status: self.status,
            room_id: self.room_id,
            customer_id: self.customer_id,
            limit: page.limit(),
            offset: page.offset(),
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct InvoiceListParams {
    pub status: Option<InvoiceStatus>,
    #[validate(range(min = 1, message = "page must be at least 1"))]
    pub page: Option<i64>,
    #[validate(range(min = 1, max = 100, message = "page_size must be between 1 and 100"))]
    pub page_size: Option<i64>,
}

impl InvoiceListParams {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.page_size)
    }

    pub fn filter(&self) -> ListInvoicesFilter {
        let page = self.pagination();
        ListInvoicesFilter {
            status: self.status,
            limit: page.limit(),
            offset: page.offset(),
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct PaymentListParams {
    pub invoice_id: Option<Uuid>,
    #[validate(range(min = 1, message = "page must be at least 1"))]
    pub page: Option<i64>,
    #[validate(range(min = 1, max = 100, message = "page_size must be between 1 and 100"))]
    pub page_size: Option<i64>,
}

impl PaymentListParams {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.page_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn booking_payload_defaults_discount_and_tva() {
        let payload: BookingPayload = serde_json::from_value(json!({
            "customer_id": Uuid::nil(),
            "room_id": Uuid::nil(),
            "check_in": "2026-07-01",
            "check_out": "2026-07-04"
        }))
        .unwrap();

        let request = payload.into_request(None);
        assert_eq!(request.discount, Decimal::ZERO);
        assert_eq!(request.tva, Decimal::ZERO);
        assert!(request.amount.is_none());
    }

    #[test]
    fn empty_id_batch_is_invalid() {
        let req = IdsRequest { ids: vec![] };
        assert!(req.validate().is_err());
    }

    #[test]
    fn validate_request_parses_mode() {
        let req: ValidateInvoicesRequest = serde_json::from_value(json!({
            "ids": [Uuid::new_v4()],
            "mode": "card",
            "note": "front desk"
        }))
        .unwrap();
        assert!(req.validate().is_ok());
        assert_eq!(req.payment().mode, PaymentMode::Card);
    }

    #[test]
    fn list_filter_uses_pagination() {
        let params = ReservationListParams {
            status: Some(ReservationStatus::Paid),
            page: Some(2),
            page_size: Some(10),
            ..Default::default()
        };
        let filter = params.filter();
        assert_eq!(filter.limit, 10);
        assert_eq!(filter.offset, 10);
        assert_eq!(filter.status, Some(ReservationStatus::Paid));
    }
}

pub mod auth;
pub mod content;
pub mod people;
pub mod reservations;
pub mod rooms;

pub use auth::{LoginRequest, MeResponse};
pub use content::{
    BlogListParams, ContactListParams, CreateBlogRequest, CreateContactRequest, CreateFaqRequest,
    UpdateBlogRequest, UpdateFaqRequest,
};
pub use people::{
    AgentResponse, CreateAgentRequest, CreateCustomerRequest, CustomerListParams,
    UpdateAgentRequest, UpdateCustomerRequest,
};
pub use reservations::{
    BookingPayload, CancelResponse, IdsRequest, InvoiceDetailResponse, InvoiceListParams,
    PaymentListParams, ReservationListParams, ValidateInvoicesRequest,
};
pub use rooms::{CreateRoomRequest, RoomListParams, UpdateRoomRequest};

use serde::{Deserialize, Serialize};
use validator::Validate;

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Resolved `page`/`page_size` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub page_size: i64,
}

impl Pagination {
    pub fn new(page: Option<i64>, page_size: Option<i64>) -> Self {
        Self {
            page: page.unwrap_or(1),
            page_size: page_size.unwrap_or(DEFAULT_PAGE_SIZE),
        }
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.page_size
    }
}

/// Query string for lists without filters.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct PageParams {
    #[validate(range(min = 1, message = "page must be at least 1"))]
    pub page: Option<i64>,
    #[validate(range(min = 1, max = 100, message = "page_size must be between 1 and 100"))]
    pub page_size: Option<i64>,
}

impl PageParams {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.page_size)
    }
}

/// Paged list envelope.
#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    pub page: i64,
    pub page_size: i64,
}

impl<T> ListResponse<T> {
    pub fn new(items: Vec<T>, pagination: Pagination) -> Self {
        Self {
            items,
            page: pagination.page,
            page_size: pagination.page_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_defaults_and_offset() {
        let p = Pagination::new(None, None);
        assert_eq!((p.page, p.page_size), (1, DEFAULT_PAGE_SIZE));
        assert_eq!(p.offset(), 0);

        let p = Pagination::new(Some(3), Some(25));
        assert_eq!(p.limit(), 25);
        assert_eq!(p.offset(), 50);
    }

    #[test]
    fn page_params_reject_out_of_range() {
        let ok = PageParams {
            page: Some(1),
            page_size: Some(MAX_PAGE_SIZE),
        };
        assert!(ok.validate().is_ok());

        let zero_page = PageParams {
            page: Some(0),
            page_size: None,
        };
        assert!(zero_page.validate().is_err());

        let too_big = PageParams {
            page: None,
            page_size: Some(MAX_PAGE_SIZE + 1),
        };
        assert!(too_big.validate().is_err());
    }
}

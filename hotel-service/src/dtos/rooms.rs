use super::Pagination;
use crate::models::{CreateRoom, RoomType, UpdateRoom};
use crate::services::booking::MAX_AMOUNT;
use rust_decimal::Decimal;
use serde::Deserialize;
use validator::{Validate, ValidationError};

/// Nightly rate as the `price` column stores it: 0 to `MAX_AMOUNT`, in cents.
fn room_price(value: &Decimal) -> Result<(), ValidationError> {
    if *value < Decimal::ZERO {
        return Err(ValidationError::new("price must not be negative"));
    }
    if *value > MAX_AMOUNT {
        return Err(ValidationError::new("price is too large"));
    }
    if value.normalize().scale() > 2 {
        return Err(ValidationError::new("price must have at most two decimal places"));
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateRoomRequest {
    #[validate(length(min = 1, max = 16, message = "Room number must be 1-16 characters"))]
    pub number: String,
    pub room_type: RoomType,
    #[validate(range(min = 1, message = "Capacity must be at least 1"))]
    pub capacity: i32,
    #[validate(custom(function = "room_price"))]
    pub price: Decimal,
    pub description: Option<String>,
    #[validate(url(message = "image_url must be a URL"))]
    pub image_url: Option<String>,
}

impl From<CreateRoomRequest> for CreateRoom {
    fn from(req: CreateRoomRequest) -> Self {
        Self {
            number: req.number,
            room_type: req.room_type,
            capacity: req.capacity,
            price: req.price,
            description: req.description,
            image_url: req.image_url,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateRoomRequest {
    #[validate(length(min = 1, max = 16, message = "Room number must be 1-16 characters"))]
    pub number: Option<String>,
    pub room_type: Option<RoomType>,
    #[validate(range(min = 1, message = "Capacity must be at least 1"))]
    pub capacity: Option<i32>,
    #[validate(custom(function = "room_price"))]
    pub price: Option<Decimal>,
    pub description: Option<String>,
    #[validate(url(message = "image_url must be a URL"))]
    pub image_url: Option<String>,
    pub active: Option<bool>,
}

impl From<UpdateRoomRequest> for UpdateRoom {
    fn from(req: UpdateRoomRequest) -> Self {
        Self {
            number: req.number,
            room_type: req.room_type,
            capacity: req.capacity,
            price: req.price,
            description: req.description,
            image_url: req.image_url,
            active: req.active,
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct RoomListParams {
    /// Include inactive rooms (back office only).
    #[serde(default)]
    pub all: bool,
    #[validate(range(min = 1, message = "page must be at least 1"))]
    pub page: Option<i64>,
    #[validate(range(min = 1, max = 100, message = "page_size must be between 1 and 100"))]
    pub page_size: Option<i64>,
}

impl RoomListParams {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.page_size)
    }
}

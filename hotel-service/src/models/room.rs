//! Room model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Room category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomType {
    Single,
    Double,
    Suite,
    Family,
}

impl RoomType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoomType::Single => "single",
            RoomType::Double => "double",
            RoomType::Suite => "suite",
            RoomType::Family => "family",
        }
    }
}

/// Bookable room.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Room {
    pub room_id: Uuid,
    pub number: String,
    pub room_type: String,
    pub capacity: i32,
    pub price: Decimal,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub active: bool,
    pub created_utc: DateTime<Utc>,
    pub updated_utc: DateTime<Utc>,
}

/// Input for creating a room.
#[derive(Debug, Clone)]
pub struct CreateRoom {
    pub number: String,
    pub room_type: RoomType,
    pub capacity: i32,
    pub price: Decimal,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

/// Partial room update; `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct UpdateRoom {
    pub number: Option<String>,
    pub room_type: Option<RoomType>,
    pub capacity: Option<i32>,
    pub price: Option<Decimal>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub active: Option<bool>,
}

//! Dashboard statistics.

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct StatusCount {
    pub status: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct HotelStats {
    pub rooms: i64,
    pub active_rooms: i64,
    pub occupied_rooms_today: i64,
    pub customers: i64,
    pub agents: i64,
    pub reservations_by_status: Vec<StatusCount>,
    pub invoices_by_status: Vec<StatusCount>,
    pub revenue: Decimal,
    pub unread_contacts: i64,
}

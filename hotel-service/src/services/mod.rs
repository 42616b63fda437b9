//! Services module for hotel-service.

pub mod booking;
pub mod database;
pub mod jwt;
pub mod metrics;

pub use database::Database;
pub use jwt::{Claims, JwtService, Role};
pub use metrics::{get_metrics, init_metrics};

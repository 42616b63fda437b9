//! HTTP handlers for hotel-service.

pub mod agents;
pub mod auth;
pub mod content;
pub mod customers;
pub mod health;
pub mod invoices;
pub mod reservations;
pub mod rooms;
pub mod stats;

//! Hotel Service - rooms, guests, reservations and invoicing for a hotel back office.

pub mod config;
pub mod dtos;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod startup;
pub mod utils;

//! Payment record, appended when an invoice is validated.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMode {
    Cash,
    Card,
    Transfer,
    Cheque,
}

impl PaymentMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMode::Cash => "cash",
            PaymentMode::Card => "card",
            PaymentMode::Transfer => "transfer",
            PaymentMode::Cheque => "cheque",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Payment {
    pub payment_id: Uuid,
    pub invoice_id: Uuid,
    pub mode: String,
    pub amount: Decimal,
    pub note: Option<String>,
    pub created_utc: DateTime<Utc>,
}

/// Payment details applied to every invoice of a validation batch.
#[derive(Debug, Clone)]
pub struct NewPayment {
    pub mode: PaymentMode,
    pub note: Option<String>,
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Faq {
    pub faq_id: Uuid,
    pub question: String,
    pub answer: String,
    pub position: i32,
    pub created_utc: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateFaq {
    pub question: String,
    pub answer: String,
    pub position: i32,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateFaq {
    pub question: Option<String>,
    pub answer: Option<String>,
    pub position: Option<i32>,
}

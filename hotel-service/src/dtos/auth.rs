use crate::services::Role;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// The caller as seen by the back office.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub sub: String,
    pub email: String,
    pub role: Role,
    pub exp: i64,
}
